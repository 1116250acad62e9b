//! sholl-sampling: Intersection sampling for Sholl analysis.
//!
//! This crate turns a segmented raster into a Sholl profile:
//! - **Circles** - midpoint rasterization with 8-fold symmetry (2D)
//! - **Shells** - discretized spherical shells (3D)
//! - **Grouping** - union-find 8-connectivity with spike suppression (2D),
//!   scan-order merging (3D)
//! - **Assembler** - radii, bounds, span integration and parallel shells
//!
#![warn(missing_docs)]

mod assembler;
pub mod bounds;
pub mod circle;
mod control;
pub mod grouping;
mod planar;
pub mod shell;
mod volumetric;

pub use assembler::ProfileAssembler;
pub use bounds::{max_possible_radius, sampling_bounds, Bounds};
pub use circle::points_on_circle;
pub use control::SamplingControl;
pub use grouping::{group_planar, group_sequential, is_spike};
pub use planar::{combine_spans, sample_planar};
pub use shell::{points_on_shell, ShellSampler};
pub use volumetric::{default_workers, sample_volume};
