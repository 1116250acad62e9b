//! Sampling configuration.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::raster::Threshold;

/// Largest number of concentric samples per radius in 2D.
pub const MAX_N_SPANS: usize = 10;

/// How repeated samples at a nominal radius are combined into one count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SpanIntegration {
    /// Arithmetic mean.
    #[default]
    Mean,
    /// 50th percentile.
    Median,
    /// Smallest of the most frequent values.
    Mode,
}

impl fmt::Display for SpanIntegration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Mean => "Mean",
            Self::Median => "Median",
            Self::Mode => "Mode",
        };
        f.write_str(name)
    }
}

/// Restriction of sampling to one side of the focal point.
///
/// `East` and `West` name the side of the reference axis the half-plane
/// faces away from: `East` keeps `x <= xc` and `West` keeps `x >= xc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Hemishell {
    /// Full circles/spheres.
    #[default]
    None,
    /// Keep `y <= yc` (above the center).
    North,
    /// Keep `y >= yc` (below the center).
    South,
    /// Keep `x <= xc`.
    East,
    /// Keep `x >= xc`.
    West,
}

impl FromStr for Hemishell {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let flag = s.trim().to_lowercase();
        if flag.is_empty() || flag.contains("none") || flag.contains("full") {
            Ok(Self::None)
        } else if flag.contains("above") || flag.contains("north") {
            Ok(Self::North)
        } else if flag.contains("below") || flag.contains("south") {
            Ok(Self::South)
        } else if flag.contains("left") || flag.contains("east") {
            Ok(Self::East)
        } else if flag.contains("right") || flag.contains("west") {
            Ok(Self::West)
        } else {
            Err(Error::invalid(format!("unrecognized hemishell flag: {s}")))
        }
    }
}

impl fmt::Display for Hemishell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::None => "none",
            Self::North => "north",
            Self::South => "south",
            Self::East => "east",
            Self::West => "west",
        };
        f.write_str(name)
    }
}

/// Parameters for sampling a profile from a raster.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SamplingConfig {
    /// First radius (calibrated units). `None` uses one voxel.
    pub start_radius: Option<f64>,
    /// Radius increment (calibrated units). `None` uses one voxel.
    pub step_size: Option<f64>,
    /// Last radius (calibrated units). `None` uses the largest radius that
    /// still reaches the image.
    pub end_radius: Option<f64>,
    /// Explicit radii; overrides start/step/end when set.
    pub radii: Option<Vec<f64>>,
    /// Foreground intensity window.
    pub threshold: Threshold,
    /// Concentric samples per radius (2D only).
    pub n_spans: usize,
    /// Combination of repeated samples (2D only).
    pub span_integration: SpanIntegration,
    /// Discard single-pixel diagonal artifacts (2D only).
    pub spike_suppression: bool,
    /// Ignore voxels without 6-connected foreground neighbors (3D only).
    pub skip_single_voxels: bool,
    /// Hemicircle/hemisphere restriction.
    pub hemishell: Hemishell,
    /// Worker threads for 3D sampling. `None` uses available parallelism.
    pub workers: Option<usize>,
    /// Slice analyzed by 2D sampling (0-based).
    pub slice: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            start_radius: None,
            step_size: None,
            end_radius: None,
            radii: None,
            threshold: Threshold::binary(),
            n_spans: 1,
            span_integration: SpanIntegration::Mean,
            spike_suppression: true,
            skip_single_voxels: true,
            hemishell: Hemishell::None,
            workers: None,
            slice: 0,
        }
    }
}

impl SamplingConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets start, step and end radii.
    #[must_use]
    pub fn with_radii(mut self, start: f64, step: f64, end: f64) -> Self {
        self.start_radius = Some(start);
        self.step_size = Some(step);
        self.end_radius = Some(end);
        self
    }

    /// Uses an explicit list of radii.
    #[must_use]
    pub fn with_radii_list(mut self, radii: Vec<f64>) -> Self {
        self.radii = Some(radii);
        self
    }

    /// Sets the foreground window.
    #[must_use]
    pub fn with_threshold(mut self, lower: f64, upper: f64) -> Self {
        self.threshold = Threshold::new(lower, upper);
        self
    }

    /// Sets the number of samples per radius, clamped to `1..=MAX_N_SPANS`.
    #[must_use]
    pub fn with_spans(mut self, n_spans: usize, integration: SpanIntegration) -> Self {
        self.n_spans = n_spans.clamp(1, MAX_N_SPANS);
        self.span_integration = integration;
        self
    }

    /// Enables or disables spike suppression.
    #[must_use]
    pub fn with_spike_suppression(mut self, enabled: bool) -> Self {
        self.spike_suppression = enabled;
        self
    }

    /// Enables or disables the isolated-voxel filter.
    #[must_use]
    pub fn with_skip_single_voxels(mut self, enabled: bool) -> Self {
        self.skip_single_voxels = enabled;
        self
    }

    /// Sets the hemishell restriction.
    #[must_use]
    pub fn with_hemishell(mut self, hemishell: Hemishell) -> Self {
        self.hemishell = hemishell;
        self
    }

    /// Sets the number of 3D worker threads.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers.max(1));
        self
    }

    /// Sets the slice used by 2D sampling.
    #[must_use]
    pub fn with_slice(mut self, slice: usize) -> Self {
        self.slice = slice;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_builder() {
        let config = SamplingConfig::new()
            .with_radii(10.0, 5.0, 100.0)
            .with_threshold(128.0, 255.0)
            .with_spans(25, SpanIntegration::Median)
            .with_spike_suppression(false)
            .with_workers(0);

        assert_eq!(config.start_radius, Some(10.0));
        assert_eq!(config.n_spans, MAX_N_SPANS);
        assert_eq!(config.span_integration, SpanIntegration::Median);
        assert!(!config.spike_suppression);
        assert_eq!(config.workers, Some(1));
        assert!(config.threshold.contains(200.0));
    }

    #[test]
    fn test_hemishell_parsing() {
        assert_eq!("Above line".parse::<Hemishell>().unwrap(), Hemishell::North);
        assert_eq!("south".parse::<Hemishell>().unwrap(), Hemishell::South);
        assert_eq!("Left of line".parse::<Hemishell>().unwrap(), Hemishell::East);
        assert_eq!("right".parse::<Hemishell>().unwrap(), Hemishell::West);
        assert_eq!("".parse::<Hemishell>().unwrap(), Hemishell::None);
        assert!("diagonal".parse::<Hemishell>().is_err());
    }
}
