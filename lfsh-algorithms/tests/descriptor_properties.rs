//! Property tests for LFSH descriptors
//!
//! These run the analyzer over synthetic clouds and check the invariants
//! every descriptor must satisfy regardless of the input geometry.

use approx::assert_relative_eq;
use lfsh_algorithms::*;
use lfsh_core::{Point3d, PointCloud3d};
use rand::prelude::*;
use rand::rngs::StdRng;
use std::sync::Arc;
use std::thread;

/// Noisy samples of a gently curved surface patch
fn create_wavy_patch(num_points: usize, seed: u64) -> PointCloud3d {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_points)
        .map(|_| {
            let x: f64 = rng.gen_range(-3.0..3.0);
            let y: f64 = rng.gen_range(-3.0..3.0);
            let z = 0.3 * (x * 0.8).sin() * (y * 0.5).cos() + rng.gen_range(-0.02..0.02);
            Point3d::new(x, y, z)
        })
        .collect()
}

/// Points on a sphere using a golden-angle spiral
fn create_sphere_point_cloud(radius: f64, num_points: usize) -> PointCloud3d {
    let golden_angle = std::f64::consts::PI * (3.0 - 5.0_f64.sqrt());
    (0..num_points)
        .map(|i| {
            let z = 1.0 - 2.0 * (i as f64 + 0.5) / num_points as f64;
            let r = (1.0 - z * z).sqrt();
            let theta = golden_angle * i as f64;
            Point3d::new(radius * r * theta.cos(), radius * r * theta.sin(), radius * z)
        })
        .collect()
}

#[test]
fn test_histogram_totals_match_set_sizes() {
    let cloud = create_wavy_patch(300, 11);
    let analyzer = LfshAnalyzer::new(cloud, LfshConfig::new(0.8)).unwrap();
    let descriptors = analyzer.descriptors(&CancellationToken::new()).unwrap();

    for descriptor in &descriptors {
        let members = analyzer.neighborhood(descriptor.index).unwrap().len();
        assert_eq!(descriptor.local_depth.total(), members);
        assert_eq!(descriptor.radial_density.total(), members);
        assert_eq!(descriptor.normal_deviance.total(), analyzer.len());
    }
}

#[test]
fn test_reliable_normals_are_unit_length() {
    let cloud = create_sphere_point_cloud(5.0, 500);
    let analyzer = LfshAnalyzer::new(cloud, LfshConfig::new(1.2)).unwrap();

    let mut reliable = 0;
    for index in 0..analyzer.len() {
        let estimate = analyzer.normal(index).unwrap();
        if estimate.confidence.is_reliable() {
            assert_relative_eq!(estimate.normal.norm(), 1.0, epsilon = 1e-6);
            reliable += 1;
        }
        assert!(estimate.normal.iter().all(|v| v.is_finite()));
    }
    assert!(reliable > 0);
}

#[test]
fn test_sphere_normals_are_radial() {
    let cloud = create_sphere_point_cloud(5.0, 800);
    let analyzer = LfshAnalyzer::new(cloud.clone(), LfshConfig::new(1.0)).unwrap();

    for (index, point) in cloud.iter().enumerate() {
        let normal = analyzer.normal(index).unwrap().normal;
        let radial = point.coords.normalize();
        assert!(
            normal.dot(&radial).abs() > 0.95,
            "normal at {} deviates from radial direction: {:?}",
            index,
            normal
        );
    }
}

#[test]
fn test_plane_reference_is_on_plane() {
    let cloud = create_wavy_patch(200, 3);
    let analyzer = LfshAnalyzer::new(cloud, LfshConfig::new(0.9)).unwrap();

    for index in 0..analyzer.len() {
        let plane = analyzer.plane(index).unwrap();
        assert_relative_eq!(plane.signed_distance(&plane.reference), 0.0, epsilon = 1e-9);
    }
}

#[test]
fn test_descriptors_are_deterministic_across_analyzers() {
    let first = LfshAnalyzer::new(create_wavy_patch(150, 5), LfshConfig::new(1.0)).unwrap();
    let second = LfshAnalyzer::new(
        create_wavy_patch(150, 5),
        LfshConfig::new(1.0).with_threads(3),
    )
    .unwrap();

    let cancel = CancellationToken::new();
    let bulk = second.descriptors(&cancel).unwrap();
    for index in (0..first.len()).rev() {
        assert_eq!(first.descriptor(index).unwrap(), bulk[index]);
    }
}

#[test]
fn test_rtree_and_brute_force_agree_on_random_cloud() {
    let cloud = create_wavy_patch(250, 21);
    let brute = LfshAnalyzer::new(cloud.clone(), LfshConfig::new(0.7)).unwrap();
    let tree_config = LfshConfig::new(0.7).with_search(SearchStrategy::RTree);
    let tree = LfshAnalyzer::new(cloud, tree_config).unwrap();

    for index in 0..brute.len() {
        assert_eq!(
            brute.neighborhood(index).unwrap().members(),
            tree.neighborhood(index).unwrap().members()
        );
    }
}

#[test]
fn test_points_exactly_radius_apart_are_mutual_neighbors() {
    let cloud = PointCloud3d::from_points(vec![
        Point3d::new(0.0, 0.0, 0.0),
        Point3d::new(3.0, 4.0, 0.0),
    ]);

    for search in [SearchStrategy::BruteForce, SearchStrategy::RTree] {
        let config = LfshConfig::new(5.0).with_search(search);
        let analyzer = LfshAnalyzer::new(cloud.clone(), config).unwrap();
        assert_eq!(analyzer.neighborhood(0).unwrap().members(), &[0, 1]);
        assert_eq!(analyzer.neighborhood(1).unwrap().members(), &[0, 1]);
    }
}

#[test]
fn test_isolated_point_does_not_crash() {
    let mut cloud = create_wavy_patch(50, 8);
    cloud.push(Point3d::new(100.0, 100.0, 100.0));
    let isolated = cloud.len() - 1;

    let analyzer = LfshAnalyzer::new(cloud, LfshConfig::new(0.5)).unwrap();
    assert_eq!(analyzer.neighborhood(isolated).unwrap().members(), &[isolated]);

    let descriptor = analyzer.descriptor(isolated).unwrap();
    assert_eq!(
        descriptor.confidence,
        Confidence::Degenerate(DegeneracyReason::TooFewPoints)
    );
    assert_eq!(descriptor.local_depth.total(), 1);
    assert_eq!(descriptor.normal_deviance.total(), 51);
}

#[test]
fn test_mirrored_cloud_has_paired_annuli() {
    // Center at the origin plus axis-aligned points mirrored across z = 0.
    let mut points = vec![Point3d::new(0.0, 0.0, 0.0)];
    let offsets = [
        (1.0, 0.0),
        (-1.0, 0.0),
        (0.0, 1.0),
        (0.0, -1.0),
        (2.0, 0.0),
        (-2.0, 0.0),
        (0.0, 2.0),
        (0.0, -2.0),
    ];
    for (x, y) in offsets {
        points.push(Point3d::new(x, y, 0.25));
        points.push(Point3d::new(x, y, -0.25));
    }
    let cloud = PointCloud3d::from_points(points);
    let analyzer = LfshAnalyzer::new(cloud, LfshConfig::new(2.5)).unwrap();

    let normal = analyzer.normal(0).unwrap();
    assert!(normal.confidence.is_reliable());
    assert_relative_eq!(normal.normal.z.abs(), 1.0, epsilon = 1e-12);

    let descriptor = analyzer.descriptor(0).unwrap();
    let annuli: Vec<(i64, usize)> = descriptor.radial_density.iter().collect();
    assert_eq!(annuli, vec![(0, 1), (2, 8), (4, 8)]);

    // mirrored members sit at depths -2.25 and -2.75, the center at -2.5
    assert_eq!(descriptor.local_depth.count(-5), 9);
    assert_eq!(descriptor.local_depth.count(-6), 8);
}

#[test]
fn test_concurrent_requests_share_one_neighborhood() {
    let analyzer = LfshAnalyzer::new(create_wavy_patch(120, 13), LfshConfig::new(0.9)).unwrap();
    let analyzer = Arc::new(analyzer);

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let analyzer = Arc::clone(&analyzer);
            thread::spawn(move || {
                let neighborhood = analyzer.neighborhood(42).unwrap();
                let descriptor = analyzer.descriptor(42).unwrap();
                (neighborhood as *const Neighborhood as usize, descriptor)
            })
        })
        .collect();

    let results: Vec<(usize, LfshDescriptor)> =
        handles.into_iter().map(|h| h.join().unwrap()).collect();
    for (address, descriptor) in &results {
        assert_eq!(*address, results[0].0);
        assert_eq!(descriptor, &results[0].1);
    }
    assert_eq!(analyzer.cached_neighborhoods(), analyzer.len());
}

#[test]
fn test_from_source_matches_owned_cloud() {
    let cloud = create_wavy_patch(60, 2);
    let points = cloud.points.clone();

    let owned = LfshAnalyzer::new(cloud, LfshConfig::new(1.0)).unwrap();
    let sourced = LfshAnalyzer::from_source(points.as_slice(), LfshConfig::new(1.0)).unwrap();

    assert_eq!(owned.descriptor(10).unwrap(), sourced.descriptor(10).unwrap());
}
