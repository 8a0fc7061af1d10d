//! Per-point LFSH descriptor computation over an immutable universe

use lfsh_core::{Error, Point3d, PointCloud3d, PointSource, RadiusSearch, Result, Vector3d};
use rayon::prelude::*;
use rayon::ThreadPool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::OnceLock;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{LfshConfig, SearchStrategy};
use crate::features::{
    local_depth_histogram, normal_deviance_histogram, radial_density_histogram, LfshDescriptor,
};
use crate::nearest_neighbor::{BruteForceSearch, RTreeSearch};
use crate::neighborhood::Neighborhood;
use crate::histogram::Histogram;
use crate::normals::{Confidence, DegeneracyReason, NormalEstimate};
use crate::parallel::{build_thread_pool, run_in_pool, CancellationToken};
use crate::plane::TangentPlane;

/// Computes LFSH descriptors for the points of one cloud.
///
/// The analyzer owns the universe and never mutates it. Neighborhoods (with
/// their normals and planes) are cached per index in write-once slots, so
/// each is computed at most once even when many threads ask for it at the
/// same time, and the cache is shared by every descriptor computed here.
pub struct LfshAnalyzer {
    universe: PointCloud3d,
    config: LfshConfig,
    index: Option<RTreeSearch>,
    neighborhoods: Vec<OnceLock<Neighborhood>>,
    pool: Option<ThreadPool>,
}

impl LfshAnalyzer {
    /// Create an analyzer over `universe`.
    ///
    /// Fails on an invalid configuration (non-positive radius, zero bins) or
    /// on non-finite coordinates.
    pub fn new(universe: PointCloud3d, config: LfshConfig) -> Result<Self> {
        config.validate()?;
        universe.validate_finite()?;

        let index = match config.search {
            SearchStrategy::BruteForce => None,
            SearchStrategy::RTree => Some(RTreeSearch::new(universe.as_slice())),
        };
        let pool = config.threads.map(build_thread_pool).transpose()?;
        let neighborhoods = (0..universe.len()).map(|_| OnceLock::new()).collect();

        debug!(
            points = universe.len(),
            radius = config.radius,
            search = ?config.search,
            "LFSH analyzer created"
        );

        Ok(Self {
            universe,
            config,
            index,
            neighborhoods,
            pool,
        })
    }

    /// Create an analyzer from any point provider, copying its points
    pub fn from_source<S: PointSource + ?Sized>(source: &S, config: LfshConfig) -> Result<Self> {
        let universe = (0..source.size()).map(|i| source.point_at(i)).collect();
        Self::new(universe, config)
    }

    /// Number of points in the universe
    pub fn len(&self) -> usize {
        self.universe.len()
    }

    pub fn is_empty(&self) -> bool {
        self.universe.is_empty()
    }

    pub fn universe(&self) -> &PointCloud3d {
        &self.universe
    }

    pub fn config(&self) -> &LfshConfig {
        &self.config
    }

    /// Number of neighborhoods computed so far
    pub fn cached_neighborhoods(&self) -> usize {
        self.neighborhoods.iter().filter(|slot| slot.get().is_some()).count()
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index >= self.len() {
            return Err(Error::IndexOutOfRange {
                index,
                len: self.len(),
            });
        }
        Ok(())
    }

    fn points(&self) -> &[Point3d] {
        self.universe.as_slice()
    }

    fn find_members(&self, index: usize) -> Vec<usize> {
        let query = &self.universe[index];
        match &self.index {
            Some(tree) => tree.radius_neighbors(query, self.config.radius),
            None => {
                BruteForceSearch::new(self.points()).radius_neighbors(query, self.config.radius)
            }
        }
    }

    /// Cached neighborhood; `index` must already be checked
    fn neighborhood_at(&self, index: usize) -> &Neighborhood {
        self.neighborhoods[index].get_or_init(|| {
            Neighborhood::new(
                index,
                self.universe[index],
                self.config.radius,
                self.find_members(index),
            )
        })
    }

    /// Neighborhood of the point at `index`, computed on first request
    pub fn neighborhood(&self, index: usize) -> Result<&Neighborhood> {
        self.check_index(index)?;
        Ok(self.neighborhood_at(index))
    }

    /// Estimated normal of the point at `index`
    pub fn normal(&self, index: usize) -> Result<NormalEstimate> {
        let neighborhood = self.neighborhood(index)?;
        Ok(*neighborhood.derive_normal(self.points(), &self.config.orientation))
    }

    /// Tangent plane of the point at `index`
    pub fn plane(&self, index: usize) -> Result<TangentPlane> {
        let neighborhood = self.neighborhood(index)?;
        Ok(*neighborhood.derive_plane(self.points(), &self.config.orientation))
    }

    /// Unit normal of every point, in index order
    fn collect_normals(&self) -> Vec<Vector3d> {
        run_in_pool(self.pool.as_ref(), || {
            (0..self.len())
                .into_par_iter()
                .map(|j| {
                    self.neighborhood_at(j)
                        .derive_normal(self.points(), &self.config.orientation)
                        .normal
                })
                .collect()
        })
    }

    /// Build the descriptor for a checked index from the normals of the
    /// whole universe
    fn assemble(&self, index: usize, normals: &[Vector3d]) -> LfshDescriptor {
        let neighborhood = self.neighborhood_at(index);
        let universe = self.points();
        let orientation = &self.config.orientation;
        let radius = self.config.radius;

        let estimate = neighborhood.derive_normal(universe, orientation);
        let plane = neighborhood.derive_plane(universe, orientation);

        let local_depth = local_depth_histogram(
            neighborhood.points(universe),
            plane,
            radius,
            self.config.depth_bins,
        );
        let normal_deviance = normal_deviance_histogram(
            &estimate.normal,
            normals.iter().copied(),
            self.config.deviance_bins,
        );
        let radial_density = radial_density_histogram(
            neighborhood.points(universe),
            plane,
            radius,
            self.config.annuli,
        );
        let confidence = descriptor_confidence(
            estimate.confidence,
            &[&local_depth, &normal_deviance, &radial_density],
        );

        LfshDescriptor {
            index,
            local_depth,
            normal_deviance,
            radial_density,
            confidence,
        }
    }

    /// LFSH descriptor of the point at `index`.
    ///
    /// The normal deviance histogram needs the normal of every point in the
    /// universe, so the first call on a fresh analyzer fills the whole cache.
    /// Repeated calls return identical histograms.
    pub fn descriptor(&self, index: usize) -> Result<LfshDescriptor> {
        self.check_index(index)?;
        let normals = self.collect_normals();
        Ok(self.assemble(index, &normals))
    }

    /// Compute every neighborhood, normal and plane in parallel.
    ///
    /// Stops between points once `cancel` fires and reports how many points
    /// were finished; finished work stays cached.
    pub fn precompute(&self, cancel: &CancellationToken) -> Result<()> {
        let total = self.len();
        let completed = AtomicUsize::new(0);
        let start = Instant::now();

        run_in_pool(self.pool.as_ref(), || {
            (0..total).into_par_iter().for_each(|i| {
                if cancel.is_cancelled() {
                    return;
                }
                self.neighborhood_at(i).derive_plane(self.points(), &self.config.orientation);
                completed.fetch_add(1, Ordering::Relaxed);
            })
        });

        let completed = completed.into_inner();
        if completed < total {
            warn!(completed, total, "Neighborhood precomputation cancelled");
            return Err(Error::Cancelled { completed, total });
        }

        debug!(
            points = total,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Neighborhoods precomputed"
        );
        Ok(())
    }

    /// Descriptors for every point, in index order
    pub fn descriptors(&self, cancel: &CancellationToken) -> Result<Vec<LfshDescriptor>> {
        let indices: Vec<usize> = (0..self.len()).collect();
        self.descriptors_for(&indices, cancel)
    }

    /// Descriptors for the given points, in the order given.
    ///
    /// Runs in two phases: all neighborhoods and normals are precomputed in
    /// parallel, then each descriptor is assembled from cached values only.
    pub fn descriptors_for(
        &self,
        indices: &[usize],
        cancel: &CancellationToken,
    ) -> Result<Vec<LfshDescriptor>> {
        for &index in indices {
            self.check_index(index)?;
        }

        let start = Instant::now();
        info!(
            requested = indices.len(),
            points = self.len(),
            radius = self.config.radius,
            "Computing LFSH descriptors"
        );

        self.precompute(cancel)?;
        let normals = self.collect_normals();

        let results: Vec<Option<LfshDescriptor>> = run_in_pool(self.pool.as_ref(), || {
            indices
                .par_iter()
                .map(|&index| {
                    if cancel.is_cancelled() {
                        None
                    } else {
                        Some(self.assemble(index, &normals))
                    }
                })
                .collect()
        });

        let completed = results.iter().filter(|d| d.is_some()).count();
        if completed < indices.len() {
            warn!(completed, total = indices.len(), "Descriptor computation cancelled");
            return Err(Error::Cancelled {
                completed,
                total: indices.len(),
            });
        }

        let descriptors: Vec<LfshDescriptor> = results.into_iter().flatten().collect();
        info!(
            descriptors = descriptors.len(),
            degenerate = descriptors.iter().filter(|d| !d.is_reliable()).count(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "LFSH descriptors computed"
        );
        Ok(descriptors)
    }
}

/// Downgrade a reliable normal when any histogram had to skip a value that
/// overflowed or turned NaN
fn descriptor_confidence(normal: Confidence, histograms: &[&Histogram]) -> Confidence {
    if normal.is_reliable() && histograms.iter().any(|h| h.non_finite() > 0) {
        Confidence::Degenerate(DegeneracyReason::NonFinite)
    } else {
        normal
    }
}
