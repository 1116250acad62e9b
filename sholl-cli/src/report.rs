//! JSON summaries written by the `sample` and `stats` commands.

use log::warn;
use serde::Serialize;
use sholl_core::{Profile, ProfileProperties};
use sholl_stats::{
    CountSource, CountView, Integrator, LinearProfileStats, NormalizedProfileStats, ProfilePoint,
};

/// Sampled profile without intersection points.
#[derive(Debug, Serialize)]
pub struct SampleReport {
    pub properties: ProfileProperties,
    pub radii: Vec<f64>,
    pub counts: Vec<f64>,
}

impl SampleReport {
    pub fn new(profile: &Profile) -> Self {
        Self {
            properties: profile.properties().clone(),
            radii: profile.radii(),
            counts: profile.counts(),
        }
    }
}

/// Descriptors of one count array.
#[derive(Debug, Serialize)]
pub struct CountSummary {
    pub mean: f64,
    pub median: f64,
    pub sum: f64,
    pub sum_sq: f64,
    pub variance: f64,
    pub skewness: f64,
    pub kurtosis: f64,
    pub min: f64,
    pub max: f64,
    pub intersecting_radii: usize,
    pub centroid: ProfilePoint,
    pub polygon_centroid: ProfilePoint,
    pub centered_maximum: ProfilePoint,
    pub enclosing_radius: f64,
}

impl CountSummary {
    fn new(view: &CountView<'_>, cutoff: f64) -> Self {
        Self {
            mean: view.mean(),
            median: view.median(),
            sum: view.sum(),
            sum_sq: view.sum_sq(),
            variance: view.variance(),
            skewness: view.skewness(),
            kurtosis: view.kurtosis(),
            min: view.min(),
            max: view.max(),
            intersecting_radii: view.intersecting_radii(),
            centroid: view.centroid(),
            polygon_centroid: view.polygon_centroid(),
            centered_maximum: view.centered_maximum(),
            enclosing_radius: view.enclosing_radius(cutoff),
        }
    }
}

/// Polynomial fit descriptors.
#[derive(Debug, Serialize)]
pub struct FitSummary {
    pub degree: usize,
    pub description: String,
    pub coefficients: Vec<f64>,
    pub r_squared: f64,
    pub adjusted_r_squared: f64,
    pub ks_p_value: f64,
    pub critical_value: f64,
    pub critical_radius: f64,
    pub mean_value: f64,
    pub ramification_index: f64,
    pub counts: CountSummary,
}

/// Normalized profile descriptors.
#[derive(Debug, Serialize)]
pub struct NormalizedSummary {
    pub normalizer: String,
    pub method: String,
    pub n: usize,
    pub determination_ratio: f64,
    pub r_squared: f64,
    pub r: f64,
    pub slope: f64,
    pub intercept: f64,
    pub sholl_decay: f64,
}

impl NormalizedSummary {
    pub fn new(stats: &NormalizedProfileStats) -> Self {
        Self {
            normalizer: stats.normalizer_description().to_string(),
            method: stats.method_description().to_string(),
            n: stats.n(),
            determination_ratio: stats.determination_ratio(),
            r_squared: stats.r_squared(),
            r: stats.r(),
            slope: stats.slope(),
            intercept: stats.intercept(),
            sholl_decay: stats.sholl_decay(),
        }
    }
}

/// Full `stats` output.
#[derive(Debug, Serialize)]
pub struct StatsReport {
    pub n: usize,
    pub start_radius: f64,
    pub end_radius: f64,
    pub step_size: f64,
    pub primary_branches: f64,
    pub ramification_index: f64,
    pub sampled: CountSummary,
    pub fit: Option<FitSummary>,
    pub normalized: Option<NormalizedSummary>,
}

impl StatsReport {
    pub fn new(
        stats: &LinearProfileStats,
        integrator: Integrator,
        cutoff: f64,
        normalized: Option<&NormalizedProfileStats>,
    ) -> sholl_core::Result<Self> {
        let fit = if stats.is_fitted() {
            Some(fit_summary(stats, integrator, cutoff)?)
        } else {
            None
        };
        Ok(Self {
            n: stats.n(),
            start_radius: stats.start_radius(),
            end_radius: stats.end_radius(),
            step_size: stats.step_size(),
            primary_branches: stats.primary_branches(),
            ramification_index: stats.ramification_index(CountSource::Sampled)?,
            sampled: CountSummary::new(&stats.sampled(), cutoff),
            fit,
            normalized: normalized.map(NormalizedSummary::new),
        })
    }
}

fn fit_summary(
    stats: &LinearProfileStats,
    integrator: Integrator,
    cutoff: f64,
) -> sholl_core::Result<FitSummary> {
    let fit = stats.fit()?;
    let critical = stats.critical_point()?;
    let mean_value = stats.mean_value(integrator)?;
    if mean_value.is_nan() {
        warn!("mean value of the fit could not be integrated");
    }
    Ok(FitSummary {
        degree: fit.degree(),
        description: stats.polynomial_as_string()?,
        coefficients: fit.coefficients().to_vec(),
        r_squared: stats.r_squared()?,
        adjusted_r_squared: stats.adjusted_r_squared()?,
        ks_p_value: stats.ks_test()?,
        critical_value: critical.count,
        critical_radius: critical.radius,
        mean_value,
        ramification_index: stats.ramification_index(CountSource::Fitted)?,
        counts: CountSummary::new(&stats.fitted()?, cutoff),
    })
}
