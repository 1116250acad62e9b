//! Sampling bounds and hemishell restriction.

#![allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use sholl_core::{Calibration, Hemishell, Point, Raster, RasterPoint};

/// Inclusive raster-space box that sampled coordinates must fall in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Bounds {
    /// Smallest x.
    pub min_x: i32,
    /// Largest x.
    pub max_x: i32,
    /// Smallest y.
    pub min_y: i32,
    /// Largest y.
    pub max_y: i32,
    /// Smallest z.
    pub min_z: i32,
    /// Largest z.
    pub max_z: i32,
}

impl Bounds {
    /// Creates a box from explicit limits.
    #[must_use]
    pub fn new(min_x: i32, max_x: i32, min_y: i32, max_y: i32, min_z: i32, max_z: i32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
            min_z,
            max_z,
        }
    }

    /// Box covering a whole raster.
    #[must_use]
    pub fn of_raster<R: Raster + ?Sized>(raster: &R) -> Self {
        Self::new(
            0,
            raster.width() as i32 - 1,
            0,
            raster.height() as i32 - 1,
            0,
            raster.depth() as i32 - 1,
        )
    }

    /// Restricts the z range to a single slice.
    #[must_use]
    pub fn with_slice(mut self, z: i32) -> Self {
        self.min_z = z;
        self.max_z = z;
        self
    }

    /// True if `(x, y)` is inside the box, ignoring z.
    #[inline]
    #[must_use]
    pub fn contains_xy(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// True if the point is inside the box.
    #[inline]
    #[must_use]
    pub fn contains(&self, p: &RasterPoint) -> bool {
        self.contains_xy(p.x, p.y) && p.z >= self.min_z && p.z <= self.max_z
    }

    /// Intersection with another box.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        Self::new(
            self.min_x.max(other.min_x),
            self.max_x.min(other.max_x),
            self.min_y.max(other.min_y),
            self.max_y.min(other.max_y),
            self.min_z.max(other.min_z),
            self.max_z.min(other.max_z),
        )
    }
}

/// Box reachable by the largest sampling radius, clipped to the raster and
/// halved according to `hemishell`.
#[must_use]
pub fn sampling_bounds<R: Raster + ?Sized>(
    raster: &R,
    center: RasterPoint,
    max_radius: f64,
    hemishell: Hemishell,
) -> Bounds {
    let cal = raster.calibration();
    let extent = |size: f64| (max_radius / size).ceil() as i32;
    let (ex, ey, ez) = (
        extent(cal.pixel_width),
        extent(cal.pixel_height),
        extent(cal.pixel_depth),
    );
    let reach = Bounds::new(
        center.x - ex,
        center.x + ex,
        center.y - ey,
        center.y + ey,
        center.z - ez,
        center.z + ez,
    );
    let mut bounds = Bounds::of_raster(raster).intersect(&reach);
    match hemishell {
        Hemishell::None => {}
        Hemishell::North => bounds.max_y = center.y,
        Hemishell::South => bounds.min_y = center.y,
        Hemishell::East => bounds.max_x = center.x,
        Hemishell::West => bounds.min_x = center.x,
    }
    bounds
}

/// Largest calibrated distance from `center` to any corner of the raster.
///
/// With `planar` set, only the corners of the plane through `center` are
/// considered.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn max_possible_radius<R: Raster + ?Sized>(raster: &R, center: RasterPoint, planar: bool) -> f64 {
    let cal: Calibration = raster.calibration();
    let c = center.to_world(&cal);
    let xs = [0.0, (raster.width().saturating_sub(1)) as f64 * cal.pixel_width];
    let ys = [0.0, (raster.height().saturating_sub(1)) as f64 * cal.pixel_height];
    let zs = if planar {
        [c.z, c.z]
    } else {
        [0.0, (raster.depth().saturating_sub(1)) as f64 * cal.pixel_depth]
    };
    let mut max = 0.0_f64;
    for &x in &xs {
        for &y in &ys {
            for &z in &zs {
                max = max.max(Point::new(x, y, z).distance(&c));
            }
        }
    }
    max
}
