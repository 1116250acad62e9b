//! Descriptive statistics over count arrays.
//!
//! Moments use population formulas (division by `n`).

#![allow(clippy::cast_precision_loss)]

/// Sum of values.
#[must_use]
pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Sum of squared values.
#[must_use]
pub fn sum_sq(values: &[f64]) -> f64 {
    values.iter().map(|v| v * v).sum()
}

/// Arithmetic mean (`NaN` when empty).
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    sum(values) / values.len() as f64
}

/// Smallest value (`NaN` when empty).
#[must_use]
pub fn min(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .reduce(f64::min)
        .unwrap_or(f64::NAN)
}

/// Largest value (`NaN` when empty).
#[must_use]
pub fn max(values: &[f64]) -> f64 {
    values
        .iter()
        .copied()
        .reduce(f64::max)
        .unwrap_or(f64::NAN)
}

/// Central moments of order 2, 3 and 4.
fn central_moments(values: &[f64]) -> (f64, f64, f64) {
    let m = mean(values);
    let n = values.len() as f64;
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for v in values {
        let d = v - m;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    (m2 / n, m3 / n, m4 / n)
}

/// Population variance.
#[must_use]
pub fn variance(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    central_moments(values).0
}

/// Population skewness `m3 / m2^1.5` (`NaN` for constant data).
#[must_use]
pub fn skewness(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let (m2, m3, _) = central_moments(values);
    if m2 == 0.0 {
        return f64::NAN;
    }
    m3 / m2.powf(1.5)
}

/// Population excess kurtosis `m4 / m2^2 - 3` (`NaN` for constant data).
#[must_use]
pub fn kurtosis(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let (m2, _, m4) = central_moments(values);
    if m2 == 0.0 {
        return f64::NAN;
    }
    m4 / (m2 * m2) - 3.0
}

/// Percentile `p` in `(0, 100]` using the `(n + 1)` position estimator with
/// linear interpolation. Returns `NaN` for empty input or `p` out of range.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
#[must_use]
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() || p.is_nan() || p <= 0.0 || p > 100.0 {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let pos = p * (n as f64 + 1.0) / 100.0;
    if pos < 1.0 {
        return sorted[0];
    }
    if pos >= n as f64 {
        return sorted[n - 1];
    }
    let floor = pos.floor();
    let d = pos - floor;
    let lower = sorted[floor as usize - 1];
    let upper = sorted[floor as usize];
    lower + d * (upper - lower)
}

/// Median (50th percentile).
#[must_use]
pub fn median(values: &[f64]) -> f64 {
    percentile(values, 50.0)
}

/// Index of the first element equal to the largest element not greater than
/// `value`, or `None` if every element exceeds `value`.
#[allow(clippy::float_cmp)]
#[must_use]
pub fn floor_index(values: &[f64], value: f64) -> Option<usize> {
    let candidate = values
        .iter()
        .copied()
        .filter(|v| *v <= value)
        .reduce(f64::max)?;
    values.iter().position(|v| *v == candidate)
}
