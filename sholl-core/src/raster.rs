//! Raster access, spatial calibration and threshold windows.
//!
//! The samplers only ever read intensities through [`Raster`], so any pixel
//! or voxel container can be analyzed regardless of its bit depth.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Physical size of a voxel along each axis.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Calibration {
    /// Voxel width (x).
    pub pixel_width: f64,
    /// Voxel height (y).
    pub pixel_height: f64,
    /// Voxel depth (z).
    pub pixel_depth: f64,
    /// Physical unit label.
    pub unit: String,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            pixel_width: 1.0,
            pixel_height: 1.0,
            pixel_depth: 1.0,
            unit: "pixel".to_string(),
        }
    }
}

impl Calibration {
    /// Creates an unnamed calibration.
    #[must_use]
    pub fn new(pixel_width: f64, pixel_height: f64, pixel_depth: f64) -> Self {
        Self {
            pixel_width,
            pixel_height,
            pixel_depth,
            ..Self::default()
        }
    }

    /// Sets the unit label.
    #[must_use]
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    /// True if the calibration differs from one raster unit per voxel.
    #[must_use]
    #[allow(clippy::float_cmp)]
    pub fn is_scaled(&self) -> bool {
        self.pixel_width != 1.0 || self.pixel_height != 1.0 || self.pixel_depth != 1.0
    }

    /// Isotropic voxel size: mean of all three axes for stacks with more
    /// than two slices, otherwise the mean of x and y.
    #[must_use]
    pub fn isotropic_size(&self, n_slices: usize) -> f64 {
        if n_slices > 2 {
            (self.pixel_width + self.pixel_height + self.pixel_depth) / 3.0
        } else {
            (self.pixel_width + self.pixel_height) / 2.0
        }
    }

    /// Checks that every axis size is a positive finite number.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] otherwise.
    pub fn validate(&self) -> Result<()> {
        let sizes = [self.pixel_width, self.pixel_height, self.pixel_depth];
        if sizes.iter().all(|s| s.is_finite() && *s > 0.0) {
            Ok(())
        } else {
            Err(Error::invalid(format!(
                "voxel sizes must be positive: {sizes:?}"
            )))
        }
    }
}

/// Closed intensity window `[lower, upper]` defining foreground.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Threshold {
    /// Lowest foreground value.
    pub lower: f64,
    /// Highest foreground value.
    pub upper: f64,
}

impl Threshold {
    /// Creates a threshold window.
    #[must_use]
    pub fn new(lower: f64, upper: f64) -> Self {
        Self { lower, upper }
    }

    /// Window used for binary masks (any non-zero 8-bit value).
    #[must_use]
    pub fn binary() -> Self {
        Self::new(1.0, 255.0)
    }

    /// Membership test: `lower <= value <= upper`.
    #[inline]
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        value >= self.lower && value <= self.upper
    }

    /// Checks the window is well formed.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] for NaN bounds or `lower > upper`.
    pub fn validate(&self) -> Result<()> {
        if self.lower.is_nan() || self.upper.is_nan() || self.lower > self.upper {
            return Err(Error::invalid(format!(
                "invalid threshold window [{}, {}]",
                self.lower, self.upper
            )));
        }
        Ok(())
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::binary()
    }
}

/// Read-only access to a segmented image or volume.
///
/// Coordinates are bounds-checked by the caller before [`Raster::value`] is
/// invoked.
pub trait Raster: Sync {
    /// Width in pixels.
    fn width(&self) -> usize;

    /// Height in pixels.
    fn height(&self) -> usize;

    /// Number of slices (1 for planar images).
    fn depth(&self) -> usize {
        1
    }

    /// Intensity at `(x, y, z)`.
    fn value(&self, x: usize, y: usize, z: usize) -> f64;

    /// Spatial calibration of the raster.
    fn calibration(&self) -> Calibration {
        Calibration::default()
    }

    /// True if `(x, y, z)` lies inside the raster.
    #[inline]
    fn contains(&self, x: i32, y: i32, z: i32) -> bool {
        usize::try_from(x).is_ok_and(|x| x < self.width())
            && usize::try_from(y).is_ok_and(|y| y < self.height())
            && usize::try_from(z).is_ok_and(|z| z < self.depth())
    }
}

/// Dense voxel container stored in x-fastest order.
#[derive(Debug, Clone, PartialEq)]
pub struct VoxelGrid<T> {
    width: usize,
    height: usize,
    depth: usize,
    data: Vec<T>,
    calibration: Calibration,
}

impl<T: Copy + Default> VoxelGrid<T> {
    /// Creates a grid filled with `T::default()`.
    #[must_use]
    pub fn new(width: usize, height: usize, depth: usize) -> Self {
        Self {
            width,
            height,
            depth,
            data: vec![T::default(); width * height * depth],
            calibration: Calibration::default(),
        }
    }
}

impl<T: Copy> VoxelGrid<T> {
    /// Wraps existing voxel data.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] if the buffer length does not
    /// match the dimensions.
    pub fn from_vec(width: usize, height: usize, depth: usize, data: Vec<T>) -> Result<Self> {
        if data.len() != width * height * depth {
            return Err(Error::invalid(format!(
                "buffer of {} voxels does not match {width}x{height}x{depth}",
                data.len()
            )));
        }
        Ok(Self {
            width,
            height,
            depth,
            data,
            calibration: Calibration::default(),
        })
    }

    /// Sets the spatial calibration.
    #[must_use]
    pub fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.calibration = calibration;
        self
    }

    #[inline]
    fn index(&self, x: usize, y: usize, z: usize) -> usize {
        (z * self.height + y) * self.width + x
    }

    /// Returns the voxel at `(x, y, z)`.
    #[inline]
    #[must_use]
    pub fn get(&self, x: usize, y: usize, z: usize) -> T {
        self.data[self.index(x, y, z)]
    }

    /// Writes the voxel at `(x, y, z)`.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, value: T) {
        let idx = self.index(x, y, z);
        self.data[idx] = value;
    }

    /// Raw voxel buffer.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T> Raster for VoxelGrid<T>
where
    T: Copy + Into<f64> + Send + Sync,
{
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn depth(&self) -> usize {
        self.depth
    }

    #[inline]
    fn value(&self, x: usize, y: usize, z: usize) -> f64 {
        self.get(x, y, z).into()
    }

    fn calibration(&self) -> Calibration {
        self.calibration.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_membership() {
        let t = Threshold::new(10.0, 20.0);
        assert!(t.contains(10.0));
        assert!(t.contains(20.0));
        assert!(!t.contains(9.99));
        assert!(Threshold::new(5.0, 1.0).validate().is_err());
    }

    #[test]
    fn test_isotropic_size() {
        let cal = Calibration::new(0.5, 0.5, 2.0);
        assert!((cal.isotropic_size(1) - 0.5).abs() < f64::EPSILON);
        assert!((cal.isotropic_size(10) - 1.0).abs() < f64::EPSILON);
        assert!(Calibration::new(0.0, 1.0, 1.0).validate().is_err());
    }

    #[test]
    fn test_voxel_grid_access() {
        let mut grid: VoxelGrid<u8> = VoxelGrid::new(4, 3, 2);
        grid.set(3, 2, 1, 255);
        assert_eq!(grid.get(3, 2, 1), 255);
        assert!((grid.value(3, 2, 1) - 255.0).abs() < f64::EPSILON);
        assert!(grid.contains(3, 2, 1));
        assert!(!grid.contains(4, 0, 0));
        assert!(!grid.contains(-1, 0, 0));
        assert!(VoxelGrid::from_vec(2, 2, 1, vec![0u8; 3]).is_err());
    }
}
