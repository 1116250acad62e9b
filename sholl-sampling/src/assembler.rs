//! High-level driver turning a segmented raster into a [`Profile`].

#![allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]

use log::debug;
use sholl_core::{
    Dimensions, Error, Profile, ProfileProperties, RadiusSeries, Raster, RasterPoint, Result,
    SamplingConfig, Source,
};

use crate::bounds::{max_possible_radius, sampling_bounds, Bounds};
use crate::control::SamplingControl;
use crate::planar::sample_planar;
use crate::shell::ShellSampler;
use crate::volumetric::{default_workers, sample_volume};

/// Samples a raster around a focal point according to a [`SamplingConfig`].
///
/// Planar rasters (one slice) are sampled with circles, stacks with
/// spherical shells unless [`ProfileAssembler::assemble_planar`] is used.
pub struct ProfileAssembler<'a, R: Raster + ?Sized> {
    raster: &'a R,
    center: RasterPoint,
    config: SamplingConfig,
}

impl<'a, R: Raster + ?Sized> ProfileAssembler<'a, R> {
    /// Creates an assembler after validating the inputs.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] if the center lies outside the
    /// raster, the slice does not exist, or the calibration or threshold
    /// window is malformed.
    pub fn new(raster: &'a R, center: RasterPoint, config: SamplingConfig) -> Result<Self> {
        raster.calibration().validate()?;
        config.threshold.validate()?;
        if !raster.contains(center.x, center.y, center.z) {
            return Err(Error::invalid(format!(
                "center ({}, {}, {}) lies outside the {}x{}x{} raster",
                center.x,
                center.y,
                center.z,
                raster.width(),
                raster.height(),
                raster.depth()
            )));
        }
        if config.slice >= raster.depth() {
            return Err(Error::invalid(format!(
                "slice {} out of range (depth {})",
                config.slice,
                raster.depth()
            )));
        }
        Ok(Self {
            raster,
            center,
            config,
        })
    }

    /// Sampling configuration.
    pub fn config(&self) -> &SamplingConfig {
        &self.config
    }

    /// True if the raster is a stack and will be sampled with shells.
    pub fn is_volumetric(&self) -> bool {
        self.raster.depth() > 1
    }

    fn planar_center(&self) -> RasterPoint {
        RasterPoint::new(self.center.x, self.center.y, self.config.slice as i32)
    }

    /// Isotropic voxel size used as the minimum start radius and step.
    pub fn voxel_size(&self, planar: bool) -> f64 {
        let depth = if planar { 1 } else { self.raster.depth() };
        self.raster.calibration().isotropic_size(depth)
    }

    /// Largest radius that still reaches the raster.
    pub fn max_possible_radius(&self, planar: bool) -> f64 {
        if planar {
            max_possible_radius(self.raster, self.planar_center(), true)
        } else {
            max_possible_radius(self.raster, self.center, false)
        }
    }

    /// Radii to sample.
    ///
    /// An explicit list is used as given. Otherwise unset or NaN start and
    /// step default to one voxel and are clamped to at least one voxel, and
    /// the end radius defaults to and is clamped to the largest possible
    /// radius.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] for an invalid explicit list or
    /// if the clamped end radius is smaller than the start radius.
    pub fn radii(&self, planar: bool) -> Result<RadiusSeries> {
        if let Some(list) = &self.config.radii {
            return RadiusSeries::from_values(list);
        }
        let voxel = self.voxel_size(planar);
        let max_radius = self.max_possible_radius(planar);
        let start = self
            .config
            .start_radius
            .filter(|r| !r.is_nan())
            .map_or(voxel, |r| r.max(voxel));
        let step = self
            .config
            .step_size
            .filter(|s| !s.is_nan())
            .map_or(voxel, |s| s.max(voxel));
        let end = self
            .config
            .end_radius
            .filter(|r| !r.is_nan())
            .map_or(max_radius, |r| r.min(max_radius));
        RadiusSeries::generate(start, step, end)
    }

    /// Box sampled for the given radii.
    pub fn bounds(&self, radii: &RadiusSeries, planar: bool) -> Bounds {
        let last = radii.last().unwrap_or(0.0);
        if planar {
            let c = self.planar_center();
            sampling_bounds(self.raster, c, last, self.config.hemishell).with_slice(c.z)
        } else {
            sampling_bounds(self.raster, self.center, last, self.config.hemishell)
        }
    }

    /// Samples the raster, choosing circles or shells by its depth.
    ///
    /// # Errors
    /// See [`ProfileAssembler::assemble_with`].
    pub fn assemble(&self) -> Result<Profile> {
        self.assemble_with(&SamplingControl::new())
    }

    /// Samples the raster, reporting progress to and honoring cancellation
    /// from `control`. A cancelled run returns the radii completed so far.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] for invalid radii and
    /// [`Error::ThreadPool`] if the 3D worker pool cannot be created.
    pub fn assemble_with(&self, control: &SamplingControl) -> Result<Profile> {
        if self.is_volumetric() {
            self.assemble_volumetric(control)
        } else {
            self.assemble_planar(control)
        }
    }

    /// Samples circles on the configured slice.
    ///
    /// # Errors
    /// See [`ProfileAssembler::assemble_with`].
    pub fn assemble_planar(&self, control: &SamplingControl) -> Result<Profile> {
        let radii = self.radii(true)?;
        let bounds = self.bounds(&radii, true);
        let center = self.planar_center();
        let profile = sample_planar(
            self.raster,
            center,
            radii.as_slice(),
            &bounds,
            &self.config,
            control,
        )?;
        Ok(self.finish(profile, center, Dimensions::TwoD))
    }

    /// Samples spherical shells across the stack.
    ///
    /// # Errors
    /// See [`ProfileAssembler::assemble_with`].
    pub fn assemble_volumetric(&self, control: &SamplingControl) -> Result<Profile> {
        let radii = self.radii(false)?;
        let bounds = self.bounds(&radii, false);
        let sampler = ShellSampler::new(self.raster, self.center, bounds, self.config.threshold)
            .with_skip_single_voxels(self.config.skip_single_voxels);
        let workers = self.config.workers.unwrap_or_else(default_workers);
        let profile = sample_volume(&sampler, radii.as_slice(), workers, control)?;
        Ok(self.finish(profile, self.center, Dimensions::ThreeD))
    }

    fn finish(&self, profile: Profile, center: RasterPoint, dimensions: Dimensions) -> Profile {
        let cal = self.raster.calibration();
        debug!(
            "assembled {dimensions:?} profile with {} radii ({} empty)",
            profile.len(),
            profile.zero_counts()
        );
        let planar = dimensions == Dimensions::TwoD;
        let properties = ProfileProperties {
            identifier: None,
            source: Source::Image,
            dimensions,
            center: Some(center.to_world(&cal)),
            calibration: Some(cal),
            threshold: Some(self.config.threshold),
            hemishell: self.config.hemishell,
            n_spans: if planar { self.config.n_spans } else { 1 },
            span_integration: self.config.span_integration,
        };
        profile.with_properties(properties)
    }
}
