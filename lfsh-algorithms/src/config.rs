//! Analysis session configuration

use lfsh_core::{Error, Point3d, Result};
use serde::{Deserialize, Serialize};

use crate::histogram::HistogramKind;

/// Default number of local depth bins (N1)
pub const DEFAULT_DEPTH_BINS: usize = 10;

/// Default number of normal deviance bins (N2)
pub const DEFAULT_DEVIANCE_BINS: usize = 15;

/// Default number of radial density annuli (N3)
pub const DEFAULT_ANNULI: usize = 5;

/// How neighborhoods are located in the universe.
///
/// Both strategies return the same index sets; the R*-tree only prunes
/// candidates before the exact squared-distance test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchStrategy {
    /// Linear scan over the whole universe for every query
    #[default]
    BruteForce,
    /// Bulk-loaded R*-tree built once per analyzer
    RTree,
}

/// Sign policy applied to estimated normals.
///
/// PCA normals are only defined up to sign. `Unoriented` keeps whatever the
/// eigensolver returns, which means neighboring points on a smooth surface can
/// disagree by a half turn.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum NormalOrientation {
    /// Keep the eigensolver's sign
    #[default]
    Unoriented,
    /// Flip each normal so it points toward the given viewpoint
    TowardViewpoint(Point3d),
}

/// Configuration for an LFSH analysis session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LfshConfig {
    /// Neighborhood search radius, in the units of the point coordinates
    pub radius: f64,
    /// Number of notional local depth bins (N1)
    pub depth_bins: usize,
    /// Number of notional normal deviance bins (N2)
    pub deviance_bins: usize,
    /// Number of notional radial density annuli (N3)
    pub annuli: usize,
    /// Neighborhood search strategy
    pub search: SearchStrategy,
    /// Normal sign policy
    pub orientation: NormalOrientation,
    /// Worker threads for bulk computation (None = rayon's global pool)
    pub threads: Option<usize>,
}

impl LfshConfig {
    /// Create a configuration with the given radius and default bin counts.
    ///
    /// There is no default radius: it depends entirely on the units and
    /// sampling density of the cloud being analyzed.
    pub fn new(radius: f64) -> Self {
        Self {
            radius,
            depth_bins: DEFAULT_DEPTH_BINS,
            deviance_bins: DEFAULT_DEVIANCE_BINS,
            annuli: DEFAULT_ANNULI,
            search: SearchStrategy::default(),
            orientation: NormalOrientation::default(),
            threads: None,
        }
    }

    /// Set the three bin counts (N1, N2, N3)
    pub fn with_bins(mut self, depth_bins: usize, deviance_bins: usize, annuli: usize) -> Self {
        self.depth_bins = depth_bins;
        self.deviance_bins = deviance_bins;
        self.annuli = annuli;
        self
    }

    /// Set the search strategy
    pub fn with_search(mut self, search: SearchStrategy) -> Self {
        self.search = search;
        self
    }

    /// Set the normal sign policy
    pub fn with_orientation(mut self, orientation: NormalOrientation) -> Self {
        self.orientation = orientation;
        self
    }

    /// Run bulk computation on a dedicated pool of `threads` workers
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Notional bucket count configured for `kind`
    pub fn bins(&self, kind: HistogramKind) -> usize {
        match kind {
            HistogramKind::LocalDepth => self.depth_bins,
            HistogramKind::NormalDeviance => self.deviance_bins,
            HistogramKind::RadialDensity => self.annuli,
        }
    }

    /// Check the configuration before any query is served
    pub fn validate(&self) -> Result<()> {
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "radius must be positive and finite, got {}",
                self.radius
            )));
        }

        if self.depth_bins == 0 || self.deviance_bins == 0 || self.annuli == 0 {
            return Err(Error::InvalidConfig(format!(
                "bin counts must be non-zero, got depth={} deviance={} annuli={}",
                self.depth_bins, self.deviance_bins, self.annuli
            )));
        }

        if self.threads == Some(0) {
            return Err(Error::InvalidConfig("thread count must be non-zero".to_string()));
        }

        if let NormalOrientation::TowardViewpoint(viewpoint) = &self.orientation {
            if !lfsh_core::is_finite_point(viewpoint) {
                return Err(Error::InvalidConfig(format!(
                    "viewpoint must be finite, got {:?}",
                    viewpoint
                )));
            }
        }

        Ok(())
    }
}
