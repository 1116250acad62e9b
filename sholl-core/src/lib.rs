//! sholl-core: Core types for Sholl analysis.
//!
//! This crate provides the profile model, radius series, raster access
//! abstraction, calibration and sampling configuration shared by the
//! sampling and statistics crates.
//!

pub mod config;
pub mod error;
pub mod point;
pub mod profile;
pub mod radii;
pub mod raster;
pub mod tabular;

pub use config::{Hemishell, SamplingConfig, SpanIntegration, MAX_N_SPANS};
pub use error::{Error, Result};
pub use point::{Point, RasterPoint};
pub use profile::{Dimensions, Profile, ProfileEntry, ProfileProperties, Source};
pub use radii::RadiusSeries;
pub use raster::{Calibration, Raster, Threshold, VoxelGrid};
