//! Fixed-radius neighbor search implementations

use lfsh_core::{distance_squared, Point3d, RadiusSearch};
use rstar::primitives::GeomWithData;
use rstar::RTree;

/// Simple brute force radius search.
///
/// Borrows the universe, so constructing one is free. Every query scans all
/// points, which is O(N) per query and O(N²) for a whole cloud.
pub struct BruteForceSearch<'a> {
    points: &'a [Point3d],
}

impl<'a> BruteForceSearch<'a> {
    pub fn new(points: &'a [Point3d]) -> Self {
        Self { points }
    }

    /// Neighborhood of the point stored at `index`, the point itself included
    pub fn neighbors_of(&self, index: usize, radius: f64) -> Vec<usize> {
        self.radius_neighbors(&self.points[index], radius)
    }
}

impl RadiusSearch for BruteForceSearch<'_> {
    fn radius_neighbors(&self, query: &Point3d, radius: f64) -> Vec<usize> {
        // A non-positive radius only admits points coincident with the query.
        let radius_squared = if radius > 0.0 { radius * radius } else { 0.0 };
        self.points
            .iter()
            .enumerate()
            .filter_map(|(idx, point)| {
                if distance_squared(point, query) <= radius_squared {
                    Some(idx)
                } else {
                    None
                }
            })
            .collect()
    }
}

type IndexedPoint = GeomWithData<[f64; 3], usize>;

/// R*-tree backed radius search.
///
/// The tree only prunes candidates; membership is still decided by the
/// inclusive squared-distance test, so results match [`BruteForceSearch`].
pub struct RTreeSearch {
    tree: RTree<IndexedPoint>,
}

impl RTreeSearch {
    pub fn new(points: &[Point3d]) -> Self {
        let entries = points
            .iter()
            .enumerate()
            .map(|(idx, p)| IndexedPoint::new([p.x, p.y, p.z], idx))
            .collect();
        Self {
            tree: RTree::bulk_load(entries),
        }
    }

    /// Number of indexed points
    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}

impl RadiusSearch for RTreeSearch {
    fn radius_neighbors(&self, query: &Point3d, radius: f64) -> Vec<usize> {
        let radius_squared = if radius > 0.0 { radius * radius } else { 0.0 };
        let mut indices: Vec<usize> = self
            .tree
            .locate_within_distance([query.x, query.y, query.z], radius_squared)
            .filter(|entry| {
                let [x, y, z] = *entry.geom();
                distance_squared(&Point3d::new(x, y, z), query) <= radius_squared
            })
            .map(|entry| entry.data)
            .collect();
        indices.sort_unstable();
        indices
    }
}
