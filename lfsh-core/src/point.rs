//! Point types and related functionality

use nalgebra::{Point3, Vector3};
use serde::{Deserialize, Serialize};

/// A 3D point with double precision coordinates
pub type Point3d = Point3<f64>;

/// A 3D vector with double precision components
pub type Vector3d = Vector3<f64>;

/// A point with color information
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ColoredPoint3d {
    pub position: Point3d,
    pub color: [u8; 3],
}

impl Default for ColoredPoint3d {
    fn default() -> Self {
        Self {
            position: Point3d::origin(),
            color: [255, 255, 255],
        }
    }
}

/// Squared Euclidean distance between two points.
///
/// Components are accumulated in x, y, z order so every neighborhood finder
/// produces bit-identical values for the same pair.
#[inline]
pub fn distance_squared(a: &Point3d, b: &Point3d) -> f64 {
    let dx = a.x - b.x;
    let dy = a.y - b.y;
    let dz = a.z - b.z;
    dx * dx + dy * dy + dz * dz
}

/// Returns true when every coordinate of the point is finite
#[inline]
pub fn is_finite_point(point: &Point3d) -> bool {
    point.x.is_finite() && point.y.is_finite() && point.z.is_finite()
}
