#![allow(clippy::uninlined_format_args)]
use std::sync::atomic::{AtomicUsize, Ordering};

use approx::assert_relative_eq;
use sholl_core::{
    Calibration, Dimensions, Error, Hemishell, Raster, RasterPoint, SamplingConfig,
    SpanIntegration, VoxelGrid,
};
use sholl_sampling::{
    group_planar, points_on_circle, points_on_shell, Bounds, ProfileAssembler, SamplingControl,
};

fn filled(width: usize, height: usize, depth: usize) -> VoxelGrid<u8> {
    VoxelGrid::from_vec(width, height, depth, vec![255; width * height * depth]).unwrap()
}

#[test]
fn test_circle_points_lie_on_circle() {
    let center = RasterPoint::planar(20, 20);
    let bounds = Bounds::new(0, 30, 0, 30, 0, 0);
    for r in 1..25 {
        let pts = points_on_circle(center, r, &bounds);
        let mut seen = std::collections::HashSet::new();
        for p in &pts {
            #[allow(clippy::cast_precision_loss)]
            let d = (p.distance_squared(&center) as f64).sqrt();
            assert!((d - f64::from(r)).abs() < 1.0, "r={} p={:?}", r, p);
            assert!(bounds.contains(p));
            assert!(seen.insert(*p), "duplicate {:?}", p);
        }
    }
}

#[test]
fn test_adjacent_block_collapses_to_one() {
    let block: Vec<RasterPoint> = (0..3)
        .flat_map(|x| (0..3).map(move |y| RasterPoint::planar(x, y)))
        .collect();
    let reps = group_planar::<fn(i32, i32) -> bool>(&block, None);
    assert_eq!(reps.len(), 1);
}

#[test]
fn test_filled_disk_counts_one_group() {
    let grid = filled(41, 41, 1);
    let config = SamplingConfig::new().with_radii(1.0, 1.0, 15.0);
    let profile = ProfileAssembler::new(&grid, RasterPoint::planar(20, 20), config)
        .unwrap()
        .assemble()
        .unwrap();
    assert_eq!(profile.len(), 15);
    assert!(profile.counts().iter().all(|&c| (c - 1.0).abs() < f64::EPSILON));
    assert_eq!(profile.dimensions(), Dimensions::TwoD);
}

#[test]
fn test_lines_from_center() {
    let mut grid: VoxelGrid<u8> = VoxelGrid::new(41, 41, 1);
    for i in 20..41 {
        grid.set(20, i, 0, 255); // vertical arm
        grid.set(i, 20, 0, 255); // horizontal arm
    }
    let config = SamplingConfig::new().with_radii(3.0, 1.0, 15.0);
    let profile = ProfileAssembler::new(&grid, RasterPoint::planar(20, 20), config)
        .unwrap()
        .assemble()
        .unwrap();
    for count in profile.counts() {
        assert_relative_eq!(count, 2.0);
    }
    assert!(profile.has_points());
}

#[test]
fn test_spike_suppression_discards_staircase_corner() {
    let mut grid: VoxelGrid<u8> = VoxelGrid::new(21, 21, 1);
    // 2x2 block touching the r=5 circle at its (-4, +4) corner only
    for (x, y) in [(6, 14), (5, 14), (5, 15), (6, 15)] {
        grid.set(x, y, 0, 255);
    }
    let center = RasterPoint::planar(10, 10);

    let suppressed = ProfileAssembler::new(
        &grid,
        center,
        SamplingConfig::new().with_radii_list(vec![5.0]),
    )
    .unwrap()
    .assemble()
    .unwrap();
    assert_relative_eq!(suppressed.counts()[0], 0.0);

    let kept = ProfileAssembler::new(
        &grid,
        center,
        SamplingConfig::new()
            .with_radii_list(vec![5.0])
            .with_spike_suppression(false),
    )
    .unwrap()
    .assemble()
    .unwrap();
    assert_relative_eq!(kept.counts()[0], 1.0);
}

#[test]
fn test_span_integration() {
    let grid = filled(41, 41, 1);
    let config = SamplingConfig::new()
        .with_radii(5.0, 5.0, 15.0)
        .with_spans(3, SpanIntegration::Median);
    let profile = ProfileAssembler::new(&grid, RasterPoint::planar(20, 20), config)
        .unwrap()
        .assemble()
        .unwrap();
    assert_eq!(profile.counts(), vec![1.0, 1.0, 1.0]);
    assert_eq!(profile.properties().n_spans, 3);
}

#[test]
fn test_hemishell_restricts_points() {
    let grid = filled(41, 41, 1);
    let config = SamplingConfig::new()
        .with_radii(2.0, 2.0, 12.0)
        .with_hemishell(Hemishell::North);
    let profile = ProfileAssembler::new(&grid, RasterPoint::planar(20, 20), config)
        .unwrap()
        .assemble()
        .unwrap();
    for entry in profile.entries() {
        for p in entry.points.as_ref().unwrap() {
            assert!(p.y <= 20.0);
        }
    }
}

#[test]
fn test_shell_sizes_grow_with_radius() {
    let cal = Calibration::default();
    let bounds = Bounds::new(0, 23, 0, 23, 0, 23);
    let sizes: Vec<usize> = (2..=8)
        .map(|r| points_on_shell(RasterPoint::new(12, 12, 12), f64::from(r), &cal, 1.0, &bounds).len())
        .collect();
    assert!(sizes.windows(2).all(|w| w[1] >= w[0]), "{:?}", sizes);
}

#[test]
fn test_filled_cube_profile_grows() {
    let grid = filled(24, 24, 24);
    let config = SamplingConfig::new().with_radii(2.0, 1.0, 8.0).with_workers(1);
    let profile = ProfileAssembler::new(&grid, RasterPoint::new(12, 12, 12), config)
        .unwrap()
        .assemble()
        .unwrap();
    let counts = profile.counts();
    assert_eq!(counts.len(), 7);
    assert!(counts.iter().all(|&c| c > 0.0));
    assert!(counts[0] < counts[6]);
    assert!(counts.windows(2).all(|w| w[1] >= w[0]), "{:?}", counts);
    assert_eq!(profile.dimensions(), Dimensions::ThreeD);
}

#[test]
fn test_worker_count_does_not_change_result() {
    let grid = filled(24, 24, 24);
    let run = |workers: usize| {
        let config = SamplingConfig::new()
            .with_radii(1.0, 1.0, 9.0)
            .with_workers(workers);
        ProfileAssembler::new(&grid, RasterPoint::new(12, 12, 12), config)
            .unwrap()
            .assemble()
            .unwrap()
    };
    let single = run(1);
    assert_eq!(single.counts(), run(4).counts());
    assert_eq!(single.radii(), run(3).radii());
}

/// Raster that requests cancellation the first time it is read.
struct CancellingRaster<'a> {
    inner: VoxelGrid<u8>,
    control: &'a SamplingControl,
    reads: AtomicUsize,
}

impl Raster for CancellingRaster<'_> {
    fn width(&self) -> usize {
        self.inner.width()
    }

    fn height(&self) -> usize {
        self.inner.height()
    }

    fn depth(&self) -> usize {
        self.inner.depth()
    }

    fn value(&self, x: usize, y: usize, z: usize) -> f64 {
        if self.reads.fetch_add(1, Ordering::SeqCst) == 0 {
            self.control.cancel();
        }
        self.inner.value(x, y, z)
    }
}

#[test]
fn test_cancellation_returns_partial_profile() {
    let control = SamplingControl::new();
    let raster = CancellingRaster {
        inner: filled(24, 24, 24),
        control: &control,
        reads: AtomicUsize::new(0),
    };
    let config = SamplingConfig::new().with_radii(1.0, 1.0, 8.0).with_workers(1);
    let profile = ProfileAssembler::new(&raster, RasterPoint::new(12, 12, 12), config)
        .unwrap()
        .assemble_with(&control)
        .unwrap();
    assert_eq!(profile.len(), 1);
    assert_eq!(control.progress(), 1);
    assert_eq!(control.total(), 8);
}

#[test]
fn test_invalid_inputs() {
    let grid = filled(10, 10, 1);
    assert!(matches!(
        ProfileAssembler::new(&grid, RasterPoint::planar(10, 3), SamplingConfig::new()),
        Err(Error::InvalidParameter(_))
    ));
    let config = SamplingConfig::new().with_radii(5.0, 1.0, 2.0);
    let assembler = ProfileAssembler::new(&grid, RasterPoint::planar(5, 5), config).unwrap();
    assert!(matches!(assembler.assemble(), Err(Error::InvalidParameter(_))));
}

#[test]
fn test_radii_are_clamped() {
    let grid = filled(11, 11, 1);
    let config = SamplingConfig::new().with_radii(0.1, 0.2, 1000.0);
    let assembler = ProfileAssembler::new(&grid, RasterPoint::planar(5, 5), config).unwrap();
    let radii = assembler.radii(true).unwrap();
    assert_relative_eq!(radii.first().unwrap(), 1.0);
    assert_relative_eq!(radii.step(), 1.0);
    assert!(radii.last().unwrap() <= assembler.max_possible_radius(true));
}
