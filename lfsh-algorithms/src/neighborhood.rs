//! Spherical neighborhoods with write-once derived values

use lfsh_core::Point3d;
use std::sync::OnceLock;
use tracing::debug;

use crate::config::NormalOrientation;
use crate::normals::{estimate_normal, orient_normal, Confidence, NormalEstimate};
use crate::plane::TangentPlane;

/// The points of the universe within `radius` of a center point.
///
/// Holds member indices only, never coordinates. The normal and tangent plane
/// are derived on first use and then fixed for the neighborhood's lifetime.
#[derive(Debug)]
pub struct Neighborhood {
    center_index: usize,
    center: Point3d,
    radius: f64,
    members: Vec<usize>,
    normal: OnceLock<NormalEstimate>,
    plane: OnceLock<TangentPlane>,
}

impl Neighborhood {
    /// `members` must be sorted and contain `center_index`
    pub fn new(center_index: usize, center: Point3d, radius: f64, members: Vec<usize>) -> Self {
        debug_assert!(members.binary_search(&center_index).is_ok());
        Self {
            center_index,
            center,
            radius,
            members,
            normal: OnceLock::new(),
            plane: OnceLock::new(),
        }
    }

    pub fn center_index(&self) -> usize {
        self.center_index
    }

    pub fn center(&self) -> &Point3d {
        &self.center
    }

    pub fn radius(&self) -> f64 {
        self.radius
    }

    /// Member indices into the universe, ascending
    pub fn members(&self) -> &[usize] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Always false for neighborhoods built by a finder, which include the center
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Member coordinates looked up in `universe`
    pub(crate) fn points<'a>(
        &'a self,
        universe: &'a [Point3d],
    ) -> impl Iterator<Item = &'a Point3d> + 'a {
        self.members.iter().map(move |&idx| &universe[idx])
    }

    /// Cached normal estimate, if it has been derived yet
    pub fn normal_estimate(&self) -> Option<&NormalEstimate> {
        self.normal.get()
    }

    /// Cached tangent plane, if it has been derived yet
    pub fn plane(&self) -> Option<&TangentPlane> {
        self.plane.get()
    }

    /// Cached confidence, if the normal has been derived yet
    pub fn confidence(&self) -> Option<Confidence> {
        self.normal.get().map(|estimate| estimate.confidence)
    }

    /// Estimate the normal once, then return the cached value.
    ///
    /// `universe` and `orientation` must be the ones this neighborhood was
    /// built against; only the owning analyzer calls this.
    pub(crate) fn derive_normal(
        &self,
        universe: &[Point3d],
        orientation: &NormalOrientation,
    ) -> &NormalEstimate {
        self.normal.get_or_init(|| {
            let points: Vec<Point3d> = self.points(universe).copied().collect();
            let mut estimate = estimate_normal(&points, self.radius);
            estimate.normal = orient_normal(estimate.normal, &self.center, orientation);

            if let Confidence::Degenerate(reason) = estimate.confidence {
                debug!(
                    index = self.center_index,
                    members = self.members.len(),
                    ?reason,
                    "Degenerate neighborhood"
                );
            }
            estimate
        })
    }

    /// Build the tangent plane once, then return the cached value
    pub(crate) fn derive_plane(
        &self,
        universe: &[Point3d],
        orientation: &NormalOrientation,
    ) -> &TangentPlane {
        self.plane.get_or_init(|| {
            let normal = self.derive_normal(universe, orientation).normal;
            TangentPlane::tangent_to_sphere(&self.center, self.radius, &normal)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_derived_values_are_cached() {
        let universe = vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(1.0, 0.0, 0.0),
            Point3d::new(0.0, 1.0, 0.0),
            Point3d::new(-1.0, 0.0, 0.0),
            Point3d::new(0.0, -1.0, 0.0),
        ];
        let neighborhood = Neighborhood::new(0, universe[0], 1.0, vec![0, 1, 2, 3, 4]);
        let orientation = NormalOrientation::Unoriented;

        assert!(neighborhood.normal_estimate().is_none());
        assert!(neighborhood.plane().is_none());

        let first = *neighborhood.derive_normal(&universe, &orientation);
        let second = *neighborhood.derive_normal(&universe, &orientation);
        assert_eq!(first, second);
        assert_eq!(neighborhood.normal_estimate(), Some(&first));
        assert!(std::ptr::eq(
            neighborhood.derive_plane(&universe, &orientation),
            neighborhood.derive_plane(&universe, &orientation)
        ));

        assert_relative_eq!(first.normal.z.abs(), 1.0, epsilon = 1e-12);
        let plane = neighborhood.plane().unwrap();
        assert_relative_eq!(plane.signed_distance(&plane.reference), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_points_follow_member_indices() {
        let universe = vec![
            Point3d::new(0.0, 0.0, 0.0),
            Point3d::new(9.0, 0.0, 0.0),
            Point3d::new(0.5, 0.0, 0.0),
        ];
        let neighborhood = Neighborhood::new(0, universe[0], 1.0, vec![0, 2]);
        let points: Vec<Point3d> = neighborhood.points(&universe).copied().collect();

        assert_eq!(points, vec![universe[0], universe[2]]);
        assert_eq!(neighborhood.len(), 2);
        assert_eq!(neighborhood.confidence(), None);
        neighborhood.derive_normal(&universe, &NormalOrientation::Unoriented);
        assert_eq!(
            neighborhood.confidence(),
            Some(Confidence::Degenerate(crate::normals::DegeneracyReason::TooFewPoints))
        );
    }
}
