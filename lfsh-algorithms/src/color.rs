//! Debug coloring of descriptors

use lfsh_core::{ColoredPoint3d, ColoredPointCloud3d, Error, Result};

use crate::analyzer::LfshAnalyzer;
use crate::config::LfshConfig;
use crate::features::LfshDescriptor;
use crate::histogram::{Histogram, HistogramKind};

/// Map the mean bucket of a histogram onto 0..=255 across its nominal range
fn channel(histogram: &Histogram, kind: HistogramKind, bins: usize) -> u8 {
    let Some(mean) = histogram.weighted_mean() else {
        return 0;
    };
    let (low, _) = kind.nominal_range(bins);
    let scaled = (mean - low as f64) / bins as f64 * 255.0;
    scaled.clamp(0.0, 255.0).round() as u8
}

/// RGB color summarizing a descriptor: red for local depth, green for normal
/// deviance, blue for radial density.
///
/// Purely a visualization aid; two different descriptors can share a color.
pub fn descriptor_color(descriptor: &LfshDescriptor, config: &LfshConfig) -> [u8; 3] {
    HistogramKind::ALL.map(|kind| channel(descriptor.histogram(kind), kind, config.bins(kind)))
}

/// Color each described point of the analyzer's universe by its descriptor
pub fn colorize(
    analyzer: &LfshAnalyzer,
    descriptors: &[LfshDescriptor],
) -> Result<ColoredPointCloud3d> {
    descriptors
        .iter()
        .map(|descriptor| {
            let position = *analyzer.universe().get(descriptor.index).ok_or_else(|| {
                Error::IndexOutOfRange {
                    index: descriptor.index,
                    len: analyzer.len(),
                }
            })?;
            Ok(ColoredPoint3d {
                position,
                color: descriptor_color(descriptor, analyzer.config()),
            })
        })
        .collect()
}
