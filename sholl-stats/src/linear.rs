//! Statistics of the linear (non-normalized) profile and its polynomial fit.

#![allow(clippy::cast_precision_loss, clippy::float_cmp)]

use log::{debug, warn};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use sholl_core::{Error, Profile, Result};

use crate::descriptive;
use crate::integration::Integrator;
use crate::ks::ks_test;
use crate::polynomial::Polynomial;

/// Smallest dataset on which curve fitting is refused.
pub const SMALLEST_DATASET: usize = 6;

/// Default number of subdivisions used to locate the critical point.
pub const DEFAULT_PRECISION: usize = 1000;

/// Default evaluation budget of the root solver.
pub const DEFAULT_MAX_EVALUATIONS: usize = 1000;

/// Which count array an accessor works on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum CountSource {
    /// Counts as sampled.
    #[default]
    Sampled,
    /// Polynomial fit evaluated at each sampled radius.
    Fitted,
}

/// A `(radius, count)` pair.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ProfilePoint {
    /// Radius.
    pub radius: f64,
    /// Count at that radius.
    pub count: f64,
}

impl ProfilePoint {
    /// Creates a point.
    #[must_use]
    pub fn new(radius: f64, count: f64) -> Self {
        Self { radius, count }
    }
}

/// Least-squares polynomial and its values at the sampled radii.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PolynomialFit {
    polynomial: Polynomial,
    degree: usize,
    fitted: Vec<f64>,
}

impl PolynomialFit {
    /// Requested degree.
    #[must_use]
    pub fn degree(&self) -> usize {
        self.degree
    }

    /// Ascending coefficients.
    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        self.polynomial.coefficients()
    }

    /// Fitted polynomial.
    #[must_use]
    pub fn polynomial(&self) -> &Polynomial {
        &self.polynomial
    }

    /// Fitted counts at each sampled radius.
    #[must_use]
    pub fn fitted_counts(&self) -> &[f64] {
        &self.fitted
    }
}

/// Read-only view over the radii and one count array.
#[derive(Clone, Copy, Debug)]
pub struct CountView<'a> {
    radii: &'a [f64],
    values: &'a [f64],
}

impl<'a> CountView<'a> {
    /// Counts in radius order.
    #[must_use]
    pub fn values(&self) -> &'a [f64] {
        self.values
    }

    /// Arithmetic mean.
    #[must_use]
    pub fn mean(&self) -> f64 {
        descriptive::mean(self.values)
    }

    /// Sum of counts.
    #[must_use]
    pub fn sum(&self) -> f64 {
        descriptive::sum(self.values)
    }

    /// Sum of squared counts.
    #[must_use]
    pub fn sum_sq(&self) -> f64 {
        descriptive::sum_sq(self.values)
    }

    /// Population variance.
    #[must_use]
    pub fn variance(&self) -> f64 {
        descriptive::variance(self.values)
    }

    /// Population skewness.
    #[must_use]
    pub fn skewness(&self) -> f64 {
        descriptive::skewness(self.values)
    }

    /// Population excess kurtosis.
    #[must_use]
    pub fn kurtosis(&self) -> f64 {
        descriptive::kurtosis(self.values)
    }

    /// Median count.
    #[must_use]
    pub fn median(&self) -> f64 {
        descriptive::median(self.values)
    }

    /// Smallest count.
    #[must_use]
    pub fn min(&self) -> f64 {
        descriptive::min(self.values)
    }

    /// Largest count.
    #[must_use]
    pub fn max(&self) -> f64 {
        descriptive::max(self.values)
    }

    /// Number of radii with a positive count.
    #[must_use]
    pub fn intersecting_radii(&self) -> usize {
        self.values.iter().filter(|c| **c > 0.0).count()
    }

    /// Count at the first radius.
    #[must_use]
    pub fn primary_branches(&self) -> f64 {
        self.values[0]
    }

    /// Mean radius and mean count.
    #[must_use]
    pub fn centroid(&self) -> ProfilePoint {
        ProfilePoint::new(descriptive::mean(self.radii), self.mean())
    }

    /// Centroid of the polygon traced by the profile (shoelace formula).
    ///
    /// The polygon is closed through the origin: only consecutive profile
    /// points contribute edges.
    #[must_use]
    pub fn polygon_centroid(&self) -> ProfilePoint {
        let (r, y) = (self.radii, self.values);
        let mut area = 0.0;
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        for i in 1..r.len() {
            let cross = r[i - 1] * y[i] - r[i] * y[i - 1];
            sum_x += (r[i - 1] + r[i]) * cross;
            sum_y += (y[i - 1] + y[i]) * cross;
            area += cross / 2.0;
        }
        ProfilePoint::new(sum_x / (6.0 * area), sum_y / (6.0 * area))
    }

    /// Largest radius whose count is at least `cutoff` (`NaN` if none).
    #[must_use]
    pub fn enclosing_radius(&self, cutoff: f64) -> f64 {
        self.values
            .iter()
            .rposition(|c| *c >= cutoff)
            .map_or(f64::NAN, |i| self.radii[i])
    }

    /// Every point attaining the maximum count, in radius order.
    #[must_use]
    pub fn maxima(&self) -> Vec<ProfilePoint> {
        let max = self.max();
        self.radii
            .iter()
            .zip(self.values)
            .filter(|(_, c)| **c == max)
            .map(|(r, c)| ProfilePoint::new(*r, *c))
            .collect()
    }

    /// Average of all maxima.
    #[must_use]
    pub fn centered_maximum(&self) -> ProfilePoint {
        let maxima = self.maxima();
        let n = maxima.len() as f64;
        let (sx, sy) = maxima
            .iter()
            .fold((0.0, 0.0), |(sx, sy), p| (sx + p.radius, sy + p.count));
        ProfilePoint::new(sx / n, sy / n)
    }

    /// Index of the first occurrence of the largest count not above `count`.
    #[must_use]
    pub fn index_of_count(&self, count: f64) -> Option<usize> {
        descriptive::floor_index(self.values, count)
    }
}

/// Descriptive statistics, polynomial fitting and fit-derived metrics of a
/// linear Sholl profile.
///
/// Accessors that depend on a fit fail with [`Error::FitNotPerformed`]
/// until [`LinearProfileStats::fit_polynomial`] succeeds.
#[derive(Clone, Debug)]
pub struct LinearProfileStats {
    radii: Vec<f64>,
    counts: Vec<f64>,
    fit: Option<PolynomialFit>,
    primary_branches: Option<f64>,
    min_fit_points: usize,
    precision: usize,
    max_evaluations: usize,
}

impl LinearProfileStats {
    /// Creates statistics over a profile.
    ///
    /// # Errors
    /// Returns [`Error::InsufficientData`] if the profile has no entries or
    /// only zero counts.
    pub fn new(profile: &Profile) -> Result<Self> {
        if profile.is_empty() {
            return Err(Error::insufficient(
                "cannot compute statistics of an empty profile",
            ));
        }
        Self::from_data(&profile.radii(), &profile.counts())
    }

    /// Creates statistics from parallel radius and count arrays.
    ///
    /// # Errors
    /// Returns [`Error::InsufficientData`] for empty input and
    /// [`Error::InvalidParameter`] if the lengths differ.
    pub fn from_data(radii: &[f64], counts: &[f64]) -> Result<Self> {
        if radii.is_empty() {
            return Err(Error::insufficient(
                "cannot compute statistics of an empty profile",
            ));
        }
        if radii.len() != counts.len() {
            return Err(Error::invalid(format!(
                "{} radii but {} counts",
                radii.len(),
                counts.len()
            )));
        }
        Ok(Self {
            radii: radii.to_vec(),
            counts: counts.to_vec(),
            fit: None,
            primary_branches: None,
            min_fit_points: SMALLEST_DATASET + 1,
            precision: DEFAULT_PRECISION,
            max_evaluations: DEFAULT_MAX_EVALUATIONS,
        })
    }

    /// Sets the minimum number of points required for fitting.
    #[must_use]
    pub fn with_min_fit_points(mut self, n: usize) -> Self {
        self.set_min_fit_points(n);
        self
    }

    /// Sets the minimum number of points required for fitting.
    pub fn set_min_fit_points(&mut self, n: usize) {
        self.min_fit_points = n;
    }

    /// Minimum number of points required for fitting.
    #[must_use]
    pub fn min_fit_points(&self) -> usize {
        self.min_fit_points
    }

    /// Sets the number of subdivisions used to locate the critical point.
    #[must_use]
    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision.max(1);
        self
    }

    /// Subdivisions used to locate the critical point.
    #[must_use]
    pub fn precision(&self) -> usize {
        self.precision
    }

    /// Sets the root solver's evaluation budget.
    #[must_use]
    pub fn with_max_evaluations(mut self, max_evaluations: usize) -> Self {
        self.max_evaluations = max_evaluations;
        self
    }

    /// Root solver's evaluation budget.
    #[must_use]
    pub fn max_evaluations(&self) -> usize {
        self.max_evaluations
    }

    /// Overrides the count used as denominator of the ramification index.
    /// `None`, zero or `NaN` restore the count at the first radius.
    pub fn set_primary_branches(&mut self, branches: Option<f64>) {
        self.primary_branches = branches.filter(|b| *b != 0.0 && !b.is_nan());
    }

    /// Primary branch count: the explicit value if set, otherwise the
    /// sampled count at the first radius.
    #[must_use]
    pub fn primary_branches(&self) -> f64 {
        self.primary_branches.unwrap_or(self.counts[0])
    }

    /// Number of sampled points.
    #[must_use]
    pub fn n(&self) -> usize {
        self.radii.len()
    }

    /// Sampled radii.
    #[must_use]
    pub fn radii(&self) -> &[f64] {
        &self.radii
    }

    /// Sampled counts.
    #[must_use]
    pub fn counts(&self) -> &[f64] {
        &self.counts
    }

    /// Smallest radius.
    #[must_use]
    pub fn start_radius(&self) -> f64 {
        descriptive::min(&self.radii)
    }

    /// Largest radius.
    #[must_use]
    pub fn end_radius(&self) -> f64 {
        descriptive::max(&self.radii)
    }

    /// Mean spacing between radii.
    #[must_use]
    pub fn step_size(&self) -> f64 {
        let n = self.radii.len();
        if n < 2 {
            return 0.0;
        }
        (self.radii[n - 1] - self.radii[0]) / (n - 1) as f64
    }

    /// Index of the first occurrence of the largest radius not above
    /// `radius`.
    #[must_use]
    pub fn index_of_radius(&self, radius: f64) -> Option<usize> {
        descriptive::floor_index(&self.radii, radius)
    }

    /// Index lookup on the counts of `source`.
    ///
    /// # Errors
    /// Returns [`Error::FitNotPerformed`] for fitted counts without a fit.
    pub fn index_of_inters(&self, source: CountSource, count: f64) -> Result<Option<usize>> {
        Ok(self.view(source)?.index_of_count(count))
    }

    /// View over the sampled counts.
    #[must_use]
    pub fn sampled(&self) -> CountView<'_> {
        CountView {
            radii: &self.radii,
            values: &self.counts,
        }
    }

    /// View over the fitted counts.
    ///
    /// # Errors
    /// Returns [`Error::FitNotPerformed`] if no fit exists.
    pub fn fitted(&self) -> Result<CountView<'_>> {
        let fit = self.fit()?;
        Ok(CountView {
            radii: &self.radii,
            values: &fit.fitted,
        })
    }

    /// View over the counts of `source`.
    ///
    /// # Errors
    /// Returns [`Error::FitNotPerformed`] for fitted counts without a fit.
    pub fn view(&self, source: CountSource) -> Result<CountView<'_>> {
        match source {
            CountSource::Sampled => Ok(self.sampled()),
            CountSource::Fitted => self.fitted(),
        }
    }

    /// True once a polynomial has been fitted.
    #[must_use]
    pub fn is_fitted(&self) -> bool {
        self.fit.is_some()
    }

    /// Current fit.
    ///
    /// # Errors
    /// Returns [`Error::FitNotPerformed`] if no fit exists.
    pub fn fit(&self) -> Result<&PolynomialFit> {
        self.fit.as_ref().ok_or(Error::FitNotPerformed)
    }

    /// Fitted counts at each sampled radius.
    ///
    /// # Errors
    /// Returns [`Error::FitNotPerformed`] if no fit exists.
    pub fn fitted_counts(&self) -> Result<&[f64]> {
        Ok(&self.fit()?.fitted)
    }

    /// Fitted polynomial.
    ///
    /// # Errors
    /// Returns [`Error::FitNotPerformed`] if no fit exists.
    pub fn polynomial(&self) -> Result<&Polynomial> {
        Ok(&self.fit()?.polynomial)
    }

    /// Degree of the fitted polynomial.
    ///
    /// # Errors
    /// Returns [`Error::FitNotPerformed`] if no fit exists.
    pub fn polynomial_degree(&self) -> Result<usize> {
        Ok(self.fit()?.degree)
    }

    /// Degree as an ordinal, e.g. `"3rd deg."`.
    ///
    /// # Errors
    /// Returns [`Error::FitNotPerformed`] if no fit exists.
    pub fn polynomial_as_string(&self) -> Result<String> {
        Ok(format!("{} deg.", ordinal(self.polynomial_degree()?)))
    }

    /// Least-squares fit of count against radius.
    ///
    /// Replaces any previous fit; on failure the previous fit is kept.
    ///
    /// # Errors
    /// Returns [`Error::InsufficientData`] if fewer than
    /// [`LinearProfileStats::min_fit_points`] points are available, and
    /// [`Error::InvalidParameter`] for a zero degree, a degree not below
    /// the number of points, or a singular system.
    pub fn fit_polynomial(&mut self, degree: usize) -> Result<()> {
        let n = self.n();
        if n < self.min_fit_points {
            warn!(
                "refusing polynomial fit: {n} points, at least {} required",
                self.min_fit_points
            );
            return Err(Error::insufficient(format!(
                "curve fitting requires at least {} points, profile has {n}",
                self.min_fit_points
            )));
        }
        if degree == 0 || degree >= n {
            return Err(Error::invalid(format!(
                "polynomial degree must be in 1..{n}, got {degree}"
            )));
        }
        let polynomial = Polynomial::fit(&self.radii, &self.counts, degree)
            .map_err(|e| Error::invalid(format!("polynomial fit failed: {e}")))?;
        let fitted = self.radii.iter().map(|r| polynomial.value(*r)).collect();
        debug!("fitted {} polynomial: {polynomial}", ordinal(degree));
        self.fit = Some(PolynomialFit {
            polynomial,
            degree,
            fitted,
        });
        Ok(())
    }

    /// Fits every degree in `min_degree..=max_degree` and keeps the one with
    /// the highest adjusted R² among fits with R² above `r2_cutoff` and a KS
    /// p-value above `p_cutoff`. Returns the chosen degree.
    ///
    /// # Errors
    /// Returns [`Error::InvalidParameter`] for an empty degree range and
    /// [`Error::InsufficientData`] if no fit passes, in which case the
    /// previous fit is restored.
    pub fn find_best_fit(
        &mut self,
        min_degree: usize,
        max_degree: usize,
        r2_cutoff: f64,
        p_cutoff: f64,
    ) -> Result<usize> {
        if min_degree == 0 || min_degree > max_degree {
            return Err(Error::invalid(format!(
                "invalid degree range {min_degree}..={max_degree}"
            )));
        }
        let previous = self.fit.take();
        let mut best: Option<(f64, PolynomialFit)> = None;
        for degree in min_degree..=max_degree.min(self.n().saturating_sub(1)) {
            if let Err(e) = self.fit_polynomial(degree) {
                debug!("degree {degree} skipped: {e}");
                continue;
            }
            let r2 = self.r_squared()?;
            let p = self.ks_test()?;
            if r2.is_nan() || r2 < r2_cutoff || p.is_nan() || p < p_cutoff {
                continue;
            }
            let adjusted = self.adjusted_r_squared()?;
            if best.as_ref().map_or(true, |(b, _)| adjusted > *b) {
                best = self.fit.take().map(|fit| (adjusted, fit));
            }
        }
        match best {
            Some((adjusted, fit)) => {
                let degree = fit.degree;
                debug!("best fit: degree {degree} (adjusted R² {adjusted:.4})");
                self.fit = Some(fit);
                Ok(degree)
            }
            None => {
                warn!("no polynomial of degree {min_degree}..={max_degree} passed the cutoffs");
                self.fit = previous;
                Err(Error::insufficient(format!(
                    "no polynomial of degree {min_degree}..={max_degree} passed the cutoffs"
                )))
            }
        }
    }

    /// Local maximum of the fitted polynomial near the highest fitted count.
    ///
    /// The bracket spans halfway to the neighboring radii around the index
    /// of the highest fitted count. Real roots of the derivative inside the
    /// bracket and `precision` evenly spaced points across it are
    /// evaluated; the candidate with the largest value wins.
    ///
    /// # Errors
    /// Returns [`Error::FitNotPerformed`] if no fit exists.
    pub fn critical_point(&self) -> Result<ProfilePoint> {
        let fit = self.fit()?;
        let x = &self.radii;
        let last = x.len() - 1;
        let max_idx = fit
            .fitted
            .iter()
            .enumerate()
            .fold(0, |best, (i, v)| if *v > fit.fitted[best] { i } else { best });
        let left = (x[max_idx.saturating_sub(1)] + x[max_idx]) / 2.0;
        let right = (x[(max_idx + 1).min(last)] + x[max_idx]) / 2.0;

        let mut candidates: Vec<f64> = match fit
            .polynomial
            .derivative()
            .real_roots(x[max_idx], self.max_evaluations)
        {
            Ok(roots) => roots
                .into_iter()
                .filter(|r| *r >= left && *r <= right)
                .collect(),
            Err(e) => {
                warn!("derivative roots unavailable, using subdivision only: {e}");
                Vec::new()
            }
        };
        let step = (right - left) / self.precision as f64;
        candidates.extend((0..=self.precision).map(|i| left + i as f64 * step));

        let mut best = ProfilePoint::new(x[max_idx], fit.fitted[max_idx]);
        for r in candidates {
            let v = fit.polynomial.value(r);
            if v > best.count {
                best = ProfilePoint::new(r, v);
            }
        }
        Ok(best)
    }

    /// Count at the critical point.
    ///
    /// # Errors
    /// Returns [`Error::FitNotPerformed`] if no fit exists.
    pub fn critical_value(&self) -> Result<f64> {
        Ok(self.critical_point()?.count)
    }

    /// Radius of the critical point.
    ///
    /// # Errors
    /// Returns [`Error::FitNotPerformed`] if no fit exists.
    pub fn critical_radius(&self) -> Result<f64> {
        Ok(self.critical_point()?.radius)
    }

    /// Local maxima of the fitted polynomial within `[lower, upper]`,
    /// sorted by descending value.
    ///
    /// A derivative root counts as a maximum if the polynomial is larger
    /// there than one mean step to either side. Solver failure yields an
    /// empty list.
    ///
    /// # Errors
    /// Returns [`Error::FitNotPerformed`] if no fit exists.
    pub fn polynomial_maxima(
        &self,
        lower: f64,
        upper: f64,
        initial_guess: f64,
    ) -> Result<Vec<ProfilePoint>> {
        let poly = self.polynomial()?;
        let roots = match poly
            .derivative()
            .real_roots(initial_guess, self.max_evaluations)
        {
            Ok(roots) => roots,
            Err(e) => {
                warn!("polynomial maxima unavailable: {e}");
                return Ok(Vec::new());
            }
        };
        let tolerance = self.step_size();
        let mut maxima: Vec<ProfilePoint> = roots
            .into_iter()
            .filter(|x| *x >= lower && *x <= upper)
            .map(|x| ProfilePoint::new(x, poly.value(x)))
            .filter(|p| {
                p.count > poly.value(p.radius - tolerance) && p.count > poly.value(p.radius + tolerance)
            })
            .collect();
        maxima.sort_by(|a, b| b.count.total_cmp(&a.count));
        maxima.dedup_by(|a, b| (a.radius - b.radius).abs() < f64::EPSILON * a.radius.abs().max(1.0));
        Ok(maxima)
    }

    /// Mean value of the fit over `[start_radius, end_radius]`.
    ///
    /// Integration failure yields `NaN`.
    ///
    /// # Errors
    /// Returns [`Error::FitNotPerformed`] if no fit exists.
    pub fn mean_value(&self, integrator: Integrator) -> Result<f64> {
        self.mean_value_between(integrator, self.start_radius(), self.end_radius())
    }

    /// Mean value of the fit over `[lower, upper]` (`NaN` on failure).
    ///
    /// # Errors
    /// Returns [`Error::FitNotPerformed`] if no fit exists.
    pub fn mean_value_between(&self, integrator: Integrator, lower: f64, upper: f64) -> Result<f64> {
        let poly = self.polynomial()?;
        match integrator.integrate(|x| poly.value(x), lower, upper) {
            Ok(integral) => Ok(integral / (upper - lower)),
            Err(e) => {
                warn!("{integrator} integration failed: {e}");
                Ok(f64::NAN)
            }
        }
    }

    /// Coefficient of determination of the fit against the sampled counts.
    ///
    /// # Errors
    /// Returns [`Error::FitNotPerformed`] if no fit exists.
    pub fn r_squared(&self) -> Result<f64> {
        let fitted = self.fitted_counts()?;
        let mean = descriptive::mean(&self.counts);
        let (ss_res, ss_tot) = self
            .counts
            .iter()
            .zip(fitted)
            .fold((0.0, 0.0), |(res, tot), (y, f)| {
                (res + (y - f) * (y - f), tot + (y - mean) * (y - mean))
            });
        Ok(1.0 - ss_res / ss_tot)
    }

    /// R² adjusted for `p = degree - 1` parameters.
    ///
    /// # Errors
    /// Returns [`Error::FitNotPerformed`] if no fit exists.
    pub fn adjusted_r_squared(&self) -> Result<f64> {
        let r2 = self.r_squared()?;
        let p = self.polynomial_degree()? as f64 - 1.0;
        let dof = self.n() as f64 - p - 1.0;
        Ok(r2 - (1.0 - r2) * (p / dof))
    }

    /// Two-sample Kolmogorov-Smirnov p-value between sampled and fitted
    /// counts.
    ///
    /// # Errors
    /// Returns [`Error::FitNotPerformed`] if no fit exists.
    pub fn ks_test(&self) -> Result<f64> {
        Ok(ks_test(&self.counts, self.fitted_counts()?))
    }

    /// Ramification index.
    ///
    /// Sampled: maximum count over the count at the first radius. Fitted:
    /// critical value over the fitted count at the first radius. An explicit
    /// primary branch count replaces either denominator; a zero denominator
    /// yields `NaN`.
    ///
    /// # Errors
    /// Returns [`Error::FitNotPerformed`] for fitted data without a fit.
    pub fn ramification_index(&self, source: CountSource) -> Result<f64> {
        let (numerator, first) = match source {
            CountSource::Sampled => (self.sampled().max(), self.counts[0]),
            CountSource::Fitted => (self.critical_value()?, self.fitted_counts()?[0]),
        };
        let denominator = self.primary_branches.unwrap_or(first);
        if denominator == 0.0 || denominator.is_nan() {
            return Ok(f64::NAN);
        }
        Ok(numerator / denominator)
    }
}

/// English ordinal of `n` ("1st", "12th", "23rd").
fn ordinal(n: usize) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{n}{suffix}")
}
