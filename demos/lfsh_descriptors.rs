//! LFSH Descriptor Example
//!
//! Reads a point cloud from an XYZ text file (one `x y z` triple per line,
//! whitespace or comma separated, `#` comments allowed), computes LFSH
//! descriptors and prints them either as a summary table or as JSON lines.
//!
//! Without an input file a synthetic wavy patch is analyzed instead.

use anyhow::{bail, Context, Result};
use clap::Parser;
use lfsh_algorithms::{
    descriptor_color, CancellationToken, LfshAnalyzer, LfshConfig, LfshDescriptor,
    NormalOrientation, SearchStrategy,
};
use lfsh_core::{Point3d, PointCloud3d};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "lfsh_descriptors", about = "Compute LFSH descriptors for a point cloud")]
struct Args {
    /// XYZ text file to analyze (defaults to a synthetic surface patch)
    input: Option<PathBuf>,

    /// Neighborhood search radius, in the cloud's units
    #[arg(short, long)]
    radius: f64,

    /// Only describe these point indices
    #[arg(short, long, value_delimiter = ',')]
    index: Vec<usize>,

    /// Worker threads (defaults to one per core)
    #[arg(short, long)]
    threads: Option<usize>,

    /// Use an R*-tree instead of a linear scan for neighborhood search
    #[arg(long)]
    rtree: bool,

    /// Orient normals toward this viewpoint, given as x,y,z
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    viewpoint: Option<Vec<f64>>,

    /// Emit one JSON object per descriptor instead of a table
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct DescriptorRecord<'a> {
    #[serde(flatten)]
    descriptor: &'a LfshDescriptor,
    color: [u8; 3],
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let cloud = match &args.input {
        Some(path) => read_xyz(path)?,
        None => create_wavy_patch(30),
    };
    info!(points = cloud.len(), "Loaded point cloud");

    let mut config = LfshConfig::new(args.radius);
    if args.rtree {
        config = config.with_search(SearchStrategy::RTree);
    }
    if let Some(threads) = args.threads {
        config = config.with_threads(threads);
    }
    if let Some(v) = &args.viewpoint {
        if v.len() != 3 {
            bail!("--viewpoint expects x,y,z, got {} values", v.len());
        }
        let viewpoint = Point3d::new(v[0], v[1], v[2]);
        config = config.with_orientation(NormalOrientation::TowardViewpoint(viewpoint));
    }

    let analyzer = LfshAnalyzer::new(cloud, config).context("Failed to create analyzer")?;

    let start = Instant::now();
    let cancel = CancellationToken::new();
    let descriptors = if args.index.is_empty() {
        analyzer.descriptors(&cancel)?
    } else {
        analyzer.descriptors_for(&args.index, &cancel)?
    };
    info!(
        descriptors = descriptors.len(),
        elapsed_ms = start.elapsed().as_millis() as u64,
        "Done"
    );

    if args.json {
        for descriptor in &descriptors {
            let record = DescriptorRecord {
                descriptor,
                color: descriptor_color(descriptor, analyzer.config()),
            };
            println!("{}", serde_json::to_string(&record)?);
        }
    } else {
        print_table(&analyzer, &descriptors);
    }

    Ok(())
}

fn print_table(analyzer: &LfshAnalyzer, descriptors: &[LfshDescriptor]) {
    println!(
        "{:>8}  {:>8}  {:>10}  {:<28}  {:<28}  {:<20}",
        "index", "members", "confidence", "depth", "deviance", "radial"
    );
    for descriptor in descriptors {
        let members = analyzer
            .neighborhood(descriptor.index)
            .map(|n| n.len())
            .unwrap_or(0);
        println!(
            "{:>8}  {:>8}  {:>10}  {:<28}  {:<28}  {:<20}",
            descriptor.index,
            members,
            if descriptor.is_reliable() { "reliable" } else { "degenerate" },
            format_histogram(&descriptor.local_depth),
            format_histogram(&descriptor.normal_deviance),
            format_histogram(&descriptor.radial_density),
        );
    }
}

fn format_histogram(histogram: &lfsh_algorithms::Histogram) -> String {
    histogram
        .iter()
        .map(|(bucket, count)| format!("{}:{}", bucket, count))
        .collect::<Vec<_>>()
        .join(" ")
}

fn read_xyz(path: &Path) -> Result<PointCloud3d> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut cloud = PointCloud3d::new();
    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let values = line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .take(3)
            .map(|s| s.parse::<f64>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .with_context(|| format!("{}:{}: invalid coordinate", path.display(), line_no + 1))?;

        if values.len() < 3 {
            bail!(
                "{}:{}: expected 3 coordinates, found {}",
                path.display(),
                line_no + 1,
                values.len()
            );
        }
        cloud.push(Point3d::new(values[0], values[1], values[2]));
    }

    Ok(cloud)
}

fn create_wavy_patch(side: usize) -> PointCloud3d {
    let mut cloud = PointCloud3d::with_capacity(side * side);
    for i in 0..side {
        for j in 0..side {
            let x = i as f64 * 0.1;
            let y = j as f64 * 0.1;
            cloud.push(Point3d::new(x, y, 0.2 * (x * 2.0).sin() * (y * 1.5).cos()));
        }
    }
    cloud
}
