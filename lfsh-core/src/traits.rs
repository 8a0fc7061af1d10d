//! Core traits for lfsh

use crate::{point::*, point_cloud::*};

/// A source of indexed 3D points.
///
/// This is the only thing the descriptor pipeline needs from whatever layer
/// acquired the data: a size and a stable `index -> point` mapping.
pub trait PointSource {
    /// Number of points available
    fn size(&self) -> usize;

    /// Point stored at `index`. Callers guarantee `index < self.size()`.
    fn point_at(&self, index: usize) -> Point3d;
}

/// Trait for fixed-radius neighbor search over an immutable universe
pub trait RadiusSearch {
    /// Indices of every point whose squared distance to `query` is at most
    /// `radius * radius`, in ascending index order.
    fn radius_neighbors(&self, query: &Point3d, radius: f64) -> Vec<usize>;
}

impl PointSource for PointCloud<Point3d> {
    fn size(&self) -> usize {
        self.len()
    }

    fn point_at(&self, index: usize) -> Point3d {
        self.points[index]
    }
}

impl PointSource for PointCloud<ColoredPoint3d> {
    fn size(&self) -> usize {
        self.len()
    }

    fn point_at(&self, index: usize) -> Point3d {
        self.points[index].position
    }
}

impl PointSource for [Point3d] {
    fn size(&self) -> usize {
        self.len()
    }

    fn point_at(&self, index: usize) -> Point3d {
        self[index]
    }
}
