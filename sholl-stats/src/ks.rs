//! Two-sample Kolmogorov-Smirnov test.

#![allow(clippy::cast_precision_loss)]

/// Sample-size product below which the exact distribution is used.
const EXACT_PRODUCT_LIMIT: usize = 10_000;
/// Terms of the asymptotic series.
const MAX_SERIES_TERMS: u32 = 100_000;
const SERIES_TOLERANCE: f64 = 1e-20;

/// Largest absolute difference between the empirical distribution
/// functions of `x` and `y`.
#[must_use]
pub fn ks_statistic(x: &[f64], y: &[f64]) -> f64 {
    if x.is_empty() || y.is_empty() {
        return f64::NAN;
    }
    let mut xs = x.to_vec();
    let mut ys = y.to_vec();
    xs.sort_by(f64::total_cmp);
    ys.sort_by(f64::total_cmp);
    let (m, n) = (xs.len() as f64, ys.len() as f64);
    let (mut i, mut j) = (0, 0);
    let mut d: f64 = 0.0;
    while i < xs.len() && j < ys.len() {
        let v = xs[i].min(ys[j]);
        while i < xs.len() && xs[i] <= v {
            i += 1;
        }
        while j < ys.len() && ys[j] <= v {
            j += 1;
        }
        d = d.max((i as f64 / m - j as f64 / n).abs());
    }
    d
}

/// Two-sided p-value of the two-sample test between `x` and `y`.
///
/// Small samples use the exact lattice-path distribution, larger ones the
/// asymptotic Kolmogorov distribution. `NaN` if either sample is empty.
#[must_use]
pub fn ks_test(x: &[f64], y: &[f64]) -> f64 {
    let d = ks_statistic(x, y);
    if d.is_nan() {
        return f64::NAN;
    }
    if x.len() * y.len() < EXACT_PRODUCT_LIMIT {
        exact_p(d, x.len(), y.len())
    } else {
        approximate_p(d, x.len(), y.len())
    }
}

/// `P(D >= d)` by counting monotone lattice paths that stay inside the band.
fn exact_p(d: f64, m: usize, n: usize) -> f64 {
    let (m, n) = if m > n { (n, m) } else { (m, n) };
    let (md, nd) = (m as f64, n as f64);
    let q = (0.5 + (d * md * nd - 1e-7).floor()) / (md * nd);
    let mut u: Vec<f64> = (0..=n)
        .map(|j| if j as f64 / nd > q { 0.0 } else { 1.0 })
        .collect();
    for i in 1..=m {
        let w = i as f64 / (i + n) as f64;
        u[0] = if i as f64 / md > q { 0.0 } else { w * u[0] };
        for j in 1..=n {
            u[j] = if (i as f64 / md - j as f64 / nd).abs() > q {
                0.0
            } else {
                w * u[j] + u[j - 1]
            };
        }
    }
    (1.0 - u[n]).clamp(0.0, 1.0)
}

/// Asymptotic `P(D >= d)` from the Kolmogorov series.
fn approximate_p(d: f64, m: usize, n: usize) -> f64 {
    let (md, nd) = (m as f64, n as f64);
    let t = d * (md * nd / (md + nd)).sqrt();
    if t <= 0.0 {
        return 1.0;
    }
    let mut sum = 0.0;
    let mut sign = 1.0;
    for k in 1..=MAX_SERIES_TERMS {
        let kf = f64::from(k);
        let term = (-2.0 * kf * kf * t * t).exp();
        sum += sign * term;
        sign = -sign;
        if term < SERIES_TOLERANCE {
            break;
        }
    }
    (2.0 * sum).clamp(0.0, 1.0)
}
