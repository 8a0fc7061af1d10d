//! Normal estimation by principal component analysis

use lfsh_core::{Matrix3, Point3d, Vector3d};
use nalgebra::SymmetricEigen;
use serde::{Deserialize, Serialize};

use crate::config::NormalOrientation;

/// Minimum number of points for a well-posed covariance matrix
pub const MIN_NORMAL_POINTS: usize = 3;

/// Relative tolerance below which a covariance direction counts as absent
const RANK_TOLERANCE: f64 = 1e-10;

/// Absolute spread, relative to the squared radius, below which a
/// neighborhood is treated as a single coincident point
const SPREAD_TOLERANCE: f64 = 1e-12;

/// Why a neighborhood's normal is unreliable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DegeneracyReason {
    /// Fewer than three member points
    TooFewPoints,
    /// Coincident or collinear members: the covariance has rank below two
    RankDeficient,
    /// The covariance or its eigenvectors contained NaN or infinity
    NonFinite,
}

/// Confidence attached to a normal and everything derived from it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    Reliable,
    Degenerate(DegeneracyReason),
}

impl Confidence {
    pub fn is_reliable(&self) -> bool {
        matches!(self, Confidence::Reliable)
    }
}

/// Result of normal estimation for one neighborhood
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormalEstimate {
    /// Unit normal, or the zero vector when the solver produced nothing usable
    pub normal: Vector3d,
    /// Eigenvalue paired with `normal`
    pub eigenvalue: f64,
    pub confidence: Confidence,
}

/// Mean-centered covariance of a point set, normalized by the point count.
///
/// The mean is the set's own centroid. An empty set yields the zero matrix.
pub fn covariance_matrix(points: &[Point3d]) -> Matrix3<f64> {
    if points.is_empty() {
        return Matrix3::zeros();
    }

    let count = points.len() as f64;
    let centroid: Vector3d = points.iter().map(|p| p.coords).sum::<Vector3d>() / count;

    let mut covariance = Matrix3::zeros();
    for point in points {
        let diff = point.coords - centroid;
        covariance += diff * diff.transpose();
    }
    covariance / count
}

/// Estimate the surface normal of a point set.
///
/// Takes the eigenvector of the covariance matrix whose eigenvalue is
/// smallest; on ties the first one in the solver's order wins. The sign is
/// left as the solver returns it. This never panics: degenerate input comes
/// back flagged with a best-effort vector.
pub fn estimate_normal(points: &[Point3d], radius: f64) -> NormalEstimate {
    let covariance = covariance_matrix(points);

    if covariance.iter().any(|v| !v.is_finite()) {
        return NormalEstimate {
            normal: Vector3d::zeros(),
            eigenvalue: f64::NAN,
            confidence: Confidence::Degenerate(DegeneracyReason::NonFinite),
        };
    }

    let eigen = SymmetricEigen::new(covariance);
    let eigenvalues = eigen.eigenvalues;

    let mut min_idx = 0;
    for i in 1..eigenvalues.len() {
        if eigenvalues[i] < eigenvalues[min_idx] {
            min_idx = i;
        }
    }

    let column = eigen.eigenvectors.column(min_idx);
    let raw = Vector3d::new(column[0], column[1], column[2]);
    let norm = raw.norm();

    if !norm.is_finite() || norm < 1e-12 || eigenvalues.iter().any(|v| !v.is_finite()) {
        return NormalEstimate {
            normal: Vector3d::zeros(),
            eigenvalue: eigenvalues[min_idx],
            confidence: Confidence::Degenerate(DegeneracyReason::NonFinite),
        };
    }

    let confidence = if points.len() < MIN_NORMAL_POINTS {
        Confidence::Degenerate(DegeneracyReason::TooFewPoints)
    } else if is_rank_deficient(&eigenvalues, radius) {
        Confidence::Degenerate(DegeneracyReason::RankDeficient)
    } else {
        Confidence::Reliable
    };

    NormalEstimate {
        normal: raw / norm,
        eigenvalue: eigenvalues[min_idx],
        confidence,
    }
}

/// A planar patch has two significant directions; anything less has no
/// well-defined normal.
fn is_rank_deficient(eigenvalues: &Vector3d, radius: f64) -> bool {
    let mut sorted = [eigenvalues[0], eigenvalues[1], eigenvalues[2]];
    sorted.sort_by(|a, b| b.total_cmp(a));
    let [largest, middle, _] = sorted;

    largest <= SPREAD_TOLERANCE * radius * radius || middle <= RANK_TOLERANCE * largest
}

/// Apply a sign policy to an estimated normal anchored at `center`
pub fn orient_normal(
    normal: Vector3d,
    center: &Point3d,
    orientation: &NormalOrientation,
) -> Vector3d {
    match orientation {
        NormalOrientation::Unoriented => normal,
        NormalOrientation::TowardViewpoint(viewpoint) => {
            if normal.dot(&(viewpoint - center)) < 0.0 {
                -normal
            } else {
                normal
            }
        }
    }
}
