//! Semi-log and log-log regression of normalized profiles.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use log::debug;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use sholl_core::{Error, Profile, Result};

use crate::descriptive;
use crate::regression::SimpleRegression;

/// Geometric factor dividing each count before the log transform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Normalizer {
    /// Disk area `πr²`.
    Area,
    /// Circumference `2πr`.
    Perimeter,
    /// Annulus `π(r2² - r1²)` with `r1, r2 = r ∓ step/2`.
    Annulus,
    /// Ball volume `4/3 πr³`.
    Volume,
    /// Sphere surface `4πr²`.
    Surface,
    /// Spherical shell `4/3 π(r2³ - r1³)` with `r1, r2 = r ∓ step/2`.
    SphericalShell,
}

impl Normalizer {
    /// All normalizers.
    pub const ALL: [Self; 6] = [
        Self::Area,
        Self::Perimeter,
        Self::Annulus,
        Self::Volume,
        Self::Surface,
        Self::SphericalShell,
    ];

    /// True for planar normalizers.
    #[must_use]
    pub fn is_2d(self) -> bool {
        matches!(self, Self::Area | Self::Perimeter | Self::Annulus)
    }

    /// True for volumetric normalizers.
    #[must_use]
    pub fn is_3d(self) -> bool {
        !self.is_2d()
    }

    /// Human-readable name.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Area => "Area",
            Self::Perimeter => "Perimeter",
            Self::Annulus => "Annulus",
            Self::Volume => "Volume",
            Self::Surface => "Surface",
            Self::SphericalShell => "Spherical shell",
        }
    }

    /// Normalizing factor at radius `r` for profiles sampled every `step`.
    #[must_use]
    pub fn factor(self, r: f64, step: f64) -> f64 {
        let (r1, r2) = (r - step / 2.0, r + step / 2.0);
        match self {
            Self::Area => PI * r * r,
            Self::Perimeter => 2.0 * PI * r,
            Self::Annulus => PI * (r2 * r2 - r1 * r1),
            Self::Volume => 4.0 / 3.0 * PI * r * r * r,
            Self::Surface => 4.0 * PI * r * r,
            Self::SphericalShell => 4.0 / 3.0 * PI * (r2 * r2 * r2 - r1 * r1 * r1),
        }
    }
}

impl fmt::Display for Normalizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl FromStr for Normalizer {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "area" => Ok(Self::Area),
            "perimeter" => Ok(Self::Perimeter),
            "annulus" => Ok(Self::Annulus),
            "volume" => Ok(Self::Volume),
            "surface" => Ok(Self::Surface),
            "shell" | "spherical shell" | "spherical-shell" => Ok(Self::SphericalShell),
            other => Err(Error::invalid(format!("unknown normalizer '{other}'"))),
        }
    }
}

/// Regression used for the normalized profile.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum RegressionMethod {
    /// Semi-log if the determination ratio is at least 1, else log-log.
    #[default]
    Auto,
    /// `ln(count / normalizer)` against radius.
    SemiLog,
    /// `ln(count / normalizer)` against `ln(radius)`.
    LogLog,
}

impl RegressionMethod {
    /// Human-readable name.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Auto => "Auto",
            Self::SemiLog => "Semi-log",
            Self::LogLog => "Log-log",
        }
    }
}

impl fmt::Display for RegressionMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl FromStr for RegressionMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "auto" | "guess" => Ok(Self::Auto),
            "semi-log" | "semilog" | "semi_log" => Ok(Self::SemiLog),
            "log-log" | "loglog" | "log_log" => Ok(Self::LogLog),
            other => Err(Error::invalid(format!("unknown regression method '{other}'"))),
        }
    }
}

/// Normalized Sholl profile statistics.
///
/// Works on a copy of the profile without zero or `NaN` counts. Both
/// regressions are computed up front; the selected one can later be
/// restricted to a sub-range and reset.
#[derive(Clone, Debug)]
pub struct NormalizedProfileStats {
    radii: Vec<f64>,
    counts: Vec<f64>,
    log_radii: Vec<f64>,
    log_counts: Vec<f64>,
    normalizer: Normalizer,
    method: RegressionMethod,
    semi_log: SimpleRegression,
    log_log: SimpleRegression,
    determination_ratio: f64,
}

impl NormalizedProfileStats {
    /// Normalizes `profile` and selects the regression automatically.
    ///
    /// # Errors
    /// See [`NormalizedProfileStats::with_method`].
    pub fn new(profile: &Profile, normalizer: Normalizer) -> Result<Self> {
        Self::with_method(profile, normalizer, RegressionMethod::Auto)
    }

    /// Normalizes `profile` and selects `method`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] for a volumetric normalizer on a
    /// planar profile and [`Error::InsufficientData`] if no entry with a
    /// positive count remains after trimming.
    pub fn with_method(
        profile: &Profile,
        normalizer: Normalizer,
        method: RegressionMethod,
    ) -> Result<Self> {
        if profile.is_2d() && normalizer.is_3d() {
            return Err(Error::invalid(format!(
                "3D normalization ({normalizer}) requested on a 2D profile"
            )));
        }
        let trimmed = profile.trimmed();
        if trimmed.is_empty() {
            return Err(Error::insufficient(
                "no positive counts left after trimming the profile",
            ));
        }
        let radii = trimmed.radii();
        let counts = trimmed.counts();
        let step = trimmed.step_size();
        let log_radii: Vec<f64> = radii.iter().map(|r| r.ln()).collect();
        let log_counts: Vec<f64> = radii
            .iter()
            .zip(&counts)
            .map(|(r, c)| (c / normalizer.factor(*r, step)).ln())
            .collect();

        let mut semi_log = SimpleRegression::new();
        let mut log_log = SimpleRegression::new();
        for i in 0..radii.len() {
            semi_log.add(radii[i], log_counts[i]);
            log_log.add(log_radii[i], log_counts[i]);
        }
        let determination_ratio = semi_log.r_squared() / log_log.r_squared().max(f64::MIN_POSITIVE);
        let method = match method {
            RegressionMethod::Auto if determination_ratio >= 1.0 => RegressionMethod::SemiLog,
            RegressionMethod::Auto => RegressionMethod::LogLog,
            pinned => pinned,
        };
        debug!(
            "normalized by {normalizer}: {} points, determination ratio {determination_ratio:.4}, using {method}",
            radii.len()
        );
        Ok(Self {
            radii,
            counts,
            log_radii,
            log_counts,
            normalizer,
            method,
            semi_log,
            log_log,
            determination_ratio,
        })
    }

    /// Normalizer in use.
    #[must_use]
    pub fn normalizer(&self) -> Normalizer {
        self.normalizer
    }

    /// Name of the normalizer.
    #[must_use]
    pub fn normalizer_description(&self) -> &'static str {
        self.normalizer.description()
    }

    /// True if a planar normalizer is in use.
    #[must_use]
    pub fn is_2d_normalizer(&self) -> bool {
        self.normalizer.is_2d()
    }

    /// True if a volumetric normalizer is in use.
    #[must_use]
    pub fn is_3d_normalizer(&self) -> bool {
        self.normalizer.is_3d()
    }

    /// Selected regression (never [`RegressionMethod::Auto`]).
    #[must_use]
    pub fn method(&self) -> RegressionMethod {
        self.method
    }

    /// Name of the selected regression.
    #[must_use]
    pub fn method_description(&self) -> &'static str {
        self.method.description()
    }

    /// `R²(semi-log) / R²(log-log)`, computed on all points.
    #[must_use]
    pub fn determination_ratio(&self) -> f64 {
        self.determination_ratio
    }

    /// Number of points after trimming.
    #[must_use]
    pub fn n(&self) -> usize {
        self.radii.len()
    }

    /// Radii after trimming.
    #[must_use]
    pub fn radii(&self) -> &[f64] {
        &self.radii
    }

    /// Counts after trimming.
    #[must_use]
    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    /// Independent variable of the selected regression.
    #[must_use]
    pub fn x_values(&self) -> &[f64] {
        match self.method {
            RegressionMethod::LogLog => &self.log_radii,
            _ => &self.radii,
        }
    }

    /// Normalized log counts.
    #[must_use]
    pub fn y_values(&self) -> &[f64] {
        &self.log_counts
    }

    /// Selected regression's prediction at each x value.
    #[must_use]
    pub fn fitted_y_values(&self) -> Vec<f64> {
        let regression = self.regression();
        self.x_values().iter().map(|x| regression.predict(*x)).collect()
    }

    /// Selected regression.
    #[must_use]
    pub fn regression(&self) -> &SimpleRegression {
        match self.method {
            RegressionMethod::LogLog => &self.log_log,
            _ => &self.semi_log,
        }
    }

    fn regression_mut(&mut self) -> &mut SimpleRegression {
        match self.method {
            RegressionMethod::LogLog => &mut self.log_log,
            _ => &mut self.semi_log,
        }
    }

    /// R² of the semi-log regression.
    #[must_use]
    pub fn semi_log_r_squared(&self) -> f64 {
        self.semi_log.r_squared()
    }

    /// R² of the log-log regression.
    #[must_use]
    pub fn log_log_r_squared(&self) -> f64 {
        self.log_log.r_squared()
    }

    /// R² of the selected regression.
    #[must_use]
    pub fn r_squared(&self) -> f64 {
        self.regression().r_squared()
    }

    /// Correlation coefficient of the selected regression.
    #[must_use]
    pub fn r(&self) -> f64 {
        self.regression().r()
    }

    /// Intercept of the selected regression.
    #[must_use]
    pub fn intercept(&self) -> f64 {
        self.regression().intercept()
    }

    /// Slope of the selected regression.
    #[must_use]
    pub fn slope(&self) -> f64 {
        self.regression().slope()
    }

    /// Sholl decay: negated slope of the selected regression.
    #[must_use]
    pub fn sholl_decay(&self) -> f64 {
        -self.slope()
    }

    /// Refills the selected regression with every point.
    pub fn reset_regression(&mut self) {
        let x = self.x_values().to_vec();
        let y = self.log_counts.clone();
        let regression = self.regression_mut();
        regression.clear();
        for (x, y) in x.into_iter().zip(y) {
            regression.add(x, y);
        }
    }

    /// Restricts the selected regression to x values in `[x1, x2]`.
    ///
    /// Bounds snap down to the nearest x value; the regression is reset
    /// first so restrictions do not compound.
    pub fn restrict_to_range(&mut self, x1: f64, x2: f64) {
        self.reset_regression();
        let x = self.x_values().to_vec();
        let first = descriptive::floor_index(&x, x1).unwrap_or(0);
        let last = descriptive::floor_index(&x, x2);
        let y = self.log_counts.clone();
        let regression = self.regression_mut();
        for (i, (xi, yi)) in x.iter().zip(&y).enumerate() {
            let keep = i >= first && last.is_some_and(|l| i <= l);
            if !keep {
                regression.remove(*xi, *yi);
            }
        }
        debug!(
            "regression restricted to [{x1}, {x2}]: {} of {} points",
            self.regression().n(),
            self.n()
        );
    }

    /// Restricts the selected regression to the x values between the
    /// percentiles `p1` and `p2` of the x data.
    pub fn restrict_to_percentile(&mut self, p1: f64, p2: f64) {
        let x1 = descriptive::percentile(self.x_values(), p1);
        let x2 = descriptive::percentile(self.x_values(), p2);
        self.restrict_to_range(x1, x2);
    }
}
