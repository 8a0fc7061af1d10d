//! LFSH (Local Feature Statistics Histogram) descriptor extraction
//!
//! An LFSH descriptor summarizes the geometry around one point with three
//! histograms built against the tangent plane of its neighborhood sphere:
//!
//! - local depth: signed distance of each member to the plane,
//! - normal deviance: angle between the query normal and the normal of every
//!   point of the cloud,
//! - radial density: in-plane distance of each projected member from the
//!   point of tangency.

use lfsh_core::{Point3d, Vector3d};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

use crate::histogram::{Histogram, HistogramKind};
use crate::normals::Confidence;
use crate::plane::TangentPlane;

/// The three LFSH histograms for one query point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LfshDescriptor {
    /// Index of the query point in the universe
    pub index: usize,
    pub local_depth: Histogram,
    pub normal_deviance: Histogram,
    pub radial_density: Histogram,
    /// Reliability of the query's normal. Degenerate descriptors are still
    /// complete, but built on a best-effort normal.
    pub confidence: Confidence,
}

impl LfshDescriptor {
    pub fn histogram(&self, kind: HistogramKind) -> &Histogram {
        match kind {
            HistogramKind::LocalDepth => &self.local_depth,
            HistogramKind::NormalDeviance => &self.normal_deviance,
            HistogramKind::RadialDensity => &self.radial_density,
        }
    }

    pub fn is_reliable(&self) -> bool {
        self.confidence.is_reliable()
    }
}

/// Bin each point's signed distance to the plane into `bins` buckets spanning 2R
pub fn local_depth_histogram<'a, I>(
    points: I,
    plane: &TangentPlane,
    radius: f64,
    bins: usize,
) -> Histogram
where
    I: IntoIterator<Item = &'a Point3d>,
{
    let width = (2.0 * radius) / bins as f64;
    let mut histogram = Histogram::new();
    for point in points {
        histogram.record(plane.signed_distance(point), width);
    }
    histogram
}

/// Angle between two normals in [0, π].
///
/// The dot product is clamped so rounding on unit vectors cannot push acos
/// out of its domain.
pub fn deviance_angle(a: &Vector3d, b: &Vector3d) -> f64 {
    a.dot(b).clamp(-1.0, 1.0).acos()
}

/// Bin the angle between `query_normal` and each of `normals` into `bins`
/// buckets spanning [0, π]
pub fn normal_deviance_histogram<I>(query_normal: &Vector3d, normals: I, bins: usize) -> Histogram
where
    I: IntoIterator<Item = Vector3d>,
{
    let width = PI / bins as f64;
    let mut histogram = Histogram::new();
    for normal in normals {
        histogram.record(deviance_angle(query_normal, &normal), width);
    }
    histogram
}

/// Bin the distance between each point's projection onto the plane and the
/// point of tangency into `annuli` rings of width R / annuli
pub fn radial_density_histogram<'a, I>(
    points: I,
    plane: &TangentPlane,
    radius: f64,
    annuli: usize,
) -> Histogram
where
    I: IntoIterator<Item = &'a Point3d>,
{
    let width = radius / annuli as f64;
    let mut histogram = Histogram::new();
    for point in points {
        histogram.record(plane.radial_distance(point), width);
    }
    histogram
}
