//! Point types for raster and calibrated coordinates.

use std::hash::{Hash, Hasher};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::raster::Calibration;

/// Integer pixel/voxel position in raster space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RasterPoint {
    /// X coordinate (column).
    pub x: i32,
    /// Y coordinate (row).
    pub y: i32,
    /// Z coordinate (slice).
    pub z: i32,
}

impl RasterPoint {
    /// Creates a new raster position.
    #[inline]
    #[must_use]
    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Creates a planar position (z = 0).
    #[inline]
    #[must_use]
    pub fn planar(x: i32, y: i32) -> Self {
        Self { x, y, z: 0 }
    }

    /// Squared Euclidean distance to another position, in raster units.
    #[inline]
    #[must_use]
    pub fn distance_squared(&self, other: &Self) -> i64 {
        let dx = i64::from(self.x - other.x);
        let dy = i64::from(self.y - other.y);
        let dz = i64::from(self.z - other.z);
        dx * dx + dy * dy + dz * dz
    }

    /// Chessboard distance within the XY plane.
    #[inline]
    #[must_use]
    pub fn chebyshev_xy(&self, other: &Self) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Chessboard distance over all three axes.
    #[inline]
    #[must_use]
    pub fn chebyshev(&self, other: &Self) -> i32 {
        self.chebyshev_xy(other).max((self.z - other.z).abs())
    }

    /// Converts to calibrated (world) coordinates.
    #[must_use]
    pub fn to_world(&self, cal: &Calibration) -> Point {
        Point::new(
            f64::from(self.x) * cal.pixel_width,
            f64::from(self.y) * cal.pixel_height,
            f64::from(self.z) * cal.pixel_depth,
        )
    }
}

/// A point in calibrated (world) units.
///
/// Equality and hashing compare the exact bit patterns of the coordinates, so
/// points can be collected in hash sets.
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl Point {
    /// Creates a new point.
    #[inline]
    #[must_use]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Squared Euclidean distance to another point.
    #[inline]
    #[must_use]
    pub fn distance_squared(&self, other: &Self) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        let dz = self.z - other.z;
        dx * dx + dy * dy + dz * dz
    }

    /// Euclidean distance to another point.
    #[inline]
    #[must_use]
    pub fn distance(&self, other: &Self) -> f64 {
        self.distance_squared(other).sqrt()
    }

    /// Scales each axis independently.
    #[must_use]
    pub fn scaled(&self, sx: f64, sy: f64, sz: f64) -> Self {
        Self::new(self.x * sx, self.y * sy, self.z * sz)
    }

    /// Converts back to raster coordinates (truncating).
    #[allow(clippy::cast_possible_truncation)]
    #[must_use]
    pub fn to_raster(&self, cal: &Calibration) -> RasterPoint {
        RasterPoint::new(
            (self.x / cal.pixel_width) as i32,
            (self.y / cal.pixel_height) as i32,
            (self.z / cal.pixel_depth) as i32,
        )
    }

    fn key(&self) -> [u64; 3] {
        // fold -0.0 onto 0.0 so that equal coordinates hash identically
        [
            (self.x + 0.0).to_bits(),
            (self.y + 0.0).to_bits(),
            (self.z + 0.0).to_bits(),
        ]
    }
}

impl PartialEq for Point {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for Point {}

impl Hash for Point {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key().hash(state);
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.3},{:.3},{:.3}", self.x, self.y, self.z)
    }
}
