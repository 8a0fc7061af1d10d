//! # LFSH Algorithms
//!
//! Local Feature Statistics Histogram descriptors for 3D point cloud
//! registration.
//!
//! For every point of a cloud this crate finds its spherical neighborhood,
//! estimates a surface normal by PCA, builds the plane tangent to the
//! neighborhood sphere along that normal, and summarizes the neighborhood
//! into local depth, normal deviance and radial density histograms.
//!
//! ```rust
//! use lfsh_algorithms::{CancellationToken, LfshAnalyzer, LfshConfig};
//! use lfsh_core::{Point3d, PointCloud};
//!
//! let cloud: PointCloud<Point3d> = (0..25)
//!     .map(|i| Point3d::new((i % 5) as f64, (i / 5) as f64, 0.0))
//!     .collect();
//! let analyzer = LfshAnalyzer::new(cloud, LfshConfig::new(1.5)).unwrap();
//!
//! let descriptor = analyzer.descriptor(12).unwrap();
//! assert_eq!(descriptor.normal_deviance.total(), 25);
//!
//! let all = analyzer.descriptors(&CancellationToken::new()).unwrap();
//! assert_eq!(all.len(), 25);
//! ```

pub mod analyzer;
pub mod color;
pub mod config;
pub mod features;
pub mod histogram;
pub mod nearest_neighbor;
pub mod neighborhood;
pub mod normals;
pub mod parallel;
pub mod plane;

// Re-export commonly used items
pub use analyzer::*;
pub use color::*;
pub use config::*;
pub use features::*;
pub use histogram::*;
pub use nearest_neighbor::*;
pub use neighborhood::*;
pub use normals::*;
pub use parallel::*;
pub use plane::*;
