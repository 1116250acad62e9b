//! Spherical shell sampling.

#![allow(clippy::cast_possible_truncation)]

use sholl_core::{Calibration, Raster, RasterPoint, Threshold};

use crate::bounds::Bounds;

/// Face-adjacent neighbor offsets, in the order they are tested.
const FACE_NEIGHBORS: [(i32, i32, i32); 6] = [
    (-1, 0, 0),
    (1, 0, 0),
    (0, -1, 0),
    (0, 1, 0),
    (0, 0, 1),
    (0, 0, -1),
];

/// Voxels of the discretized shell of `radius` around `center`, in z, y, x
/// scan order.
///
/// A voxel belongs to the shell when its calibrated squared distance `d²` to
/// the center lies strictly inside the band `(r - v)² < d² < (r + v)²`, where
/// `v` is the isotropic voxel size. For unit voxels and an integer radius
/// this is `(r-1)² < d² < (r+1)²`.
#[must_use]
pub fn points_on_shell(
    center: RasterPoint,
    radius: f64,
    cal: &Calibration,
    voxel_size: f64,
    bounds: &Bounds,
) -> Vec<RasterPoint> {
    let (lower, upper) = (radius - voxel_size, radius + voxel_size);
    let (lower_sq, upper_sq) = (lower * lower, upper * upper);
    let extent = |size: f64| (upper / size).ceil() as i32;
    let (ex, ey, ez) = (
        extent(cal.pixel_width),
        extent(cal.pixel_height),
        extent(cal.pixel_depth),
    );
    let (min_x, max_x) = ((center.x - ex).max(bounds.min_x), (center.x + ex).min(bounds.max_x));
    let (min_y, max_y) = ((center.y - ey).max(bounds.min_y), (center.y + ey).min(bounds.max_y));
    let (min_z, max_z) = ((center.z - ez).max(bounds.min_z), (center.z + ez).min(bounds.max_z));

    let mut points = Vec::new();
    for z in min_z..=max_z {
        let dz = f64::from(z - center.z) * cal.pixel_depth;
        for y in min_y..=max_y {
            let dy = f64::from(y - center.y) * cal.pixel_height;
            for x in min_x..=max_x {
                let dx = f64::from(x - center.x) * cal.pixel_width;
                let d2 = dx * dx + dy * dy + dz * dz;
                if d2 > lower_sq && d2 < upper_sq {
                    points.push(RasterPoint::new(x, y, z));
                }
            }
        }
    }
    points
}

/// Samples foreground voxels on spherical shells of a volume.
pub struct ShellSampler<'a, R: Raster + ?Sized> {
    raster: &'a R,
    center: RasterPoint,
    bounds: Bounds,
    threshold: Threshold,
    calibration: Calibration,
    voxel_size: f64,
    skip_single_voxels: bool,
}

impl<'a, R: Raster + ?Sized> ShellSampler<'a, R> {
    /// Creates a sampler restricted to `bounds`.
    pub fn new(raster: &'a R, center: RasterPoint, bounds: Bounds, threshold: Threshold) -> Self {
        let calibration = raster.calibration();
        let voxel_size = calibration.isotropic_size(raster.depth());
        Self {
            raster,
            center,
            bounds,
            threshold,
            calibration,
            voxel_size,
            skip_single_voxels: true,
        }
    }

    /// Enables or disables the isolated-voxel filter.
    #[must_use]
    pub fn with_skip_single_voxels(mut self, skip: bool) -> Self {
        self.skip_single_voxels = skip;
        self
    }

    /// Calibration used for distances and returned points.
    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    fn is_foreground(&self, x: i32, y: i32, z: i32) -> bool {
        match (usize::try_from(x), usize::try_from(y), usize::try_from(z)) {
            (Ok(ux), Ok(uy), Ok(uz)) if self.raster.contains(x, y, z) => {
                self.threshold.contains(self.raster.value(ux, uy, uz))
            }
            _ => false,
        }
    }

    /// Face neighbors are visited in a fixed order: the first one outside
    /// the volume rejects the voxel, the first foreground one accepts it.
    fn has_neighbors(&self, p: RasterPoint) -> bool {
        for (dx, dy, dz) in FACE_NEIGHBORS {
            let (x, y, z) = (p.x + dx, p.y + dy, p.z + dz);
            if !self.raster.contains(x, y, z) {
                return false;
            }
            if self.is_foreground(x, y, z) {
                return true;
            }
        }
        false
    }

    /// Foreground voxels on the shell of `radius`, in scan order.
    pub fn sample(&self, radius: f64) -> Vec<RasterPoint> {
        points_on_shell(
            self.center,
            radius,
            &self.calibration,
            self.voxel_size,
            &self.bounds,
        )
        .into_iter()
        .filter(|p| self.is_foreground(p.x, p.y, p.z))
        .filter(|p| !self.skip_single_voxels || self.has_neighbors(*p))
        .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sholl_core::VoxelGrid;

    fn open() -> Bounds {
        Bounds::new(-100, 100, -100, 100, -100, 100)
    }

    #[test]
    fn test_unit_shell_distances() {
        let cal = Calibration::default();
        let origin = RasterPoint::new(0, 0, 0);
        for radius in 1..8_i32 {
            let r = i64::from(radius);
            let pts = points_on_shell(origin, f64::from(radius), &cal, 1.0, &open());
            assert!(!pts.is_empty());
            for p in &pts {
                let d2 = p.distance_squared(&origin);
                assert!((r - 1) * (r - 1) < d2 && d2 < (r + 1) * (r + 1), "{:?} at r = {}", p, r);
            }
            // every lattice point inside the band is present
            let expected = (-r..=r)
                .flat_map(|z| (-r..=r).flat_map(move |y| (-r..=r).map(move |x| x * x + y * y + z * z)))
                .filter(|d2| (r - 1) * (r - 1) < *d2 && *d2 < (r + 1) * (r + 1))
                .count();
            assert_eq!(pts.len(), expected);
        }
    }

    #[test]
    fn test_shell_radius_one_is_full_neighborhood() {
        let origin = RasterPoint::new(0, 0, 0);
        let pts = points_on_shell(origin, 1.0, &Calibration::default(), 1.0, &open());
        assert_eq!(pts.len(), 26);
        assert!(!pts.contains(&origin));
        assert!(pts.windows(2).all(|w| (w[0].z, w[0].y, w[0].x) < (w[1].z, w[1].y, w[1].x)));
    }

    #[test]
    fn test_shell_respects_anisotropic_calibration() {
        // z spacing of 2 units: the voxel two planes up lies 4 units away
        let cal = Calibration::new(1.0, 1.0, 2.0);
        let origin = RasterPoint::new(0, 0, 0);
        let pts = points_on_shell(origin, 4.0, &cal, 1.0, &open());
        assert!(pts.contains(&RasterPoint::new(0, 0, 2)));
        assert!(pts.contains(&RasterPoint::new(4, 0, 0)));
        assert!(!pts.contains(&RasterPoint::new(0, 0, 4)));
        assert!(!pts.contains(&RasterPoint::new(2, 0, 0)));
    }

    #[test]
    fn test_isolated_voxel_filter() {
        let mut grid: VoxelGrid<u8> = VoxelGrid::new(9, 9, 9);
        grid.set(6, 4, 4, 255);
        let bounds = Bounds::of_raster(&grid);
        let c = RasterPoint::new(4, 4, 4);
        let sampler = ShellSampler::new(&grid, c, bounds, Threshold::binary());
        assert!(sampler.sample(2.0).is_empty());
        let lenient = ShellSampler::new(&grid, c, bounds, Threshold::binary())
            .with_skip_single_voxels(false);
        assert_eq!(lenient.sample(2.0), vec![RasterPoint::new(6, 4, 4)]);

        grid.set(6, 5, 4, 255);
        let sampler = ShellSampler::new(&grid, c, bounds, Threshold::binary());
        assert_eq!(sampler.sample(2.0).len(), 2);
    }
}
