//! Tangent plane of a neighborhood sphere

use lfsh_core::{Point3d, Vector3d};
use serde::{Deserialize, Serialize};

/// A plane given by a reference point and a unit normal, n·(x − c) = 0
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TangentPlane {
    /// Point of tangency with the neighborhood sphere
    pub reference: Point3d,
    pub unit_normal: Vector3d,
}

impl TangentPlane {
    /// Build the plane tangent to the sphere of `radius` around `center`,
    /// touching it at `center + radius * unit_normal`.
    ///
    /// The reference point depends only on the center, radius and normal, not
    /// on how densely the neighborhood is sampled.
    pub fn tangent_to_sphere(center: &Point3d, radius: f64, unit_normal: &Vector3d) -> Self {
        Self {
            reference: center + unit_normal * radius,
            unit_normal: *unit_normal,
        }
    }

    /// Signed offset of `point` along the normal: p·n − n·c
    pub fn signed_distance(&self, point: &Point3d) -> f64 {
        point.coords.dot(&self.unit_normal) - self.unit_normal.dot(&self.reference.coords)
    }

    /// Orthogonal projection of `point` onto the plane
    pub fn project(&self, point: &Point3d) -> Point3d {
        point - self.unit_normal * self.signed_distance(point)
    }

    /// In-plane distance between the projection of `point` and the
    /// reference point
    pub fn radial_distance(&self, point: &Point3d) -> f64 {
        (self.project(point) - self.reference).norm()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn tilted() -> TangentPlane {
        let normal = Vector3d::new(1.0, 2.0, -2.0).normalize();
        TangentPlane::tangent_to_sphere(&Point3d::new(0.5, -1.0, 3.0), 2.0, &normal)
    }

    #[test]
    fn test_reference_point_is_on_plane() {
        let plane = tilted();
        assert_relative_eq!(plane.signed_distance(&plane.reference), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_center_is_one_radius_below_plane() {
        let center = Point3d::new(0.5, -1.0, 3.0);
        let plane = tilted();

        assert_relative_eq!(plane.signed_distance(&center), -2.0, epsilon = 1e-12);
        assert_relative_eq!(plane.radial_distance(&center), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_signed_distance_along_axis() {
        let plane = TangentPlane::tangent_to_sphere(
            &Point3d::origin(),
            1.0,
            &Vector3d::new(0.0, 0.0, 1.0),
        );

        assert_eq!(plane.reference, Point3d::new(0.0, 0.0, 1.0));
        assert_eq!(plane.signed_distance(&Point3d::new(4.0, 5.0, 3.0)), 2.0);
        assert_eq!(plane.signed_distance(&Point3d::new(4.0, 5.0, -1.0)), -2.0);
    }

    #[test]
    fn test_projection_lands_on_plane() {
        let plane = tilted();
        let point = Point3d::new(3.0, 1.0, -4.0);
        let projected = plane.project(&point);

        assert_relative_eq!(plane.signed_distance(&projected), 0.0, epsilon = 1e-12);
        assert_relative_eq!(
            (point - projected).normalize().dot(&plane.unit_normal).abs(),
            1.0,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_radial_distance_ignores_normal_offset() {
        let plane = TangentPlane::tangent_to_sphere(
            &Point3d::origin(),
            1.0,
            &Vector3d::new(0.0, 0.0, 1.0),
        );

        assert_eq!(plane.radial_distance(&Point3d::new(3.0, 4.0, -7.0)), 5.0);
        assert_eq!(plane.radial_distance(&Point3d::new(3.0, 4.0, 1.0)), 5.0);
    }
}
