//! Polynomials: evaluation, least-squares fitting and complex roots.

#![allow(clippy::cast_precision_loss, clippy::float_cmp)]

use std::fmt;

use log::warn;
use nalgebra::{DMatrix, DVector};
use num_complex::Complex64;
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{NumericalError, NumericalResult};

/// Absolute accuracy of the Laguerre iteration.
const SOLVER_ABSOLUTE_ACCURACY: f64 = 1e-6;
/// Relative accuracy of the Laguerre iteration.
const SOLVER_RELATIVE_ACCURACY: f64 = 1e-14;
/// Residual below which a root is accepted.
const SOLVER_FUNCTION_ACCURACY: f64 = 1e-15;

/// Polynomial with real coefficients in ascending order of power.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    /// Creates a polynomial from ascending coefficients.
    ///
    /// Trailing zero coefficients are dropped; an empty slice yields the
    /// zero polynomial.
    #[must_use]
    pub fn new(coefficients: &[f64]) -> Self {
        let mut coefficients = coefficients.to_vec();
        while coefficients.len() > 1 && coefficients.last().is_some_and(|c| *c == 0.0) {
            coefficients.pop();
        }
        if coefficients.is_empty() {
            coefficients.push(0.0);
        }
        Self { coefficients }
    }

    /// Ascending coefficients `c0, c1, ...`.
    #[must_use]
    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    /// Degree (0 for constants).
    #[must_use]
    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// Evaluates the polynomial at `x` (Horner).
    #[must_use]
    pub fn value(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc.mul_add(x, *c))
    }

    /// First derivative.
    #[must_use]
    pub fn derivative(&self) -> Self {
        if self.coefficients.len() == 1 {
            return Self::new(&[0.0]);
        }
        let coefficients: Vec<f64> = self
            .coefficients
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, c)| c * i as f64)
            .collect();
        Self::new(&coefficients)
    }

    /// Least-squares fit of the given degree to `(x, y)`.
    ///
    /// The abscissae are centered and scaled to `[-1, 1]` before the normal
    /// equations are solved (QR, falling back to SVD), and the solution is
    /// mapped back to the input variable.
    ///
    /// # Errors
    /// Returns [`NumericalError::NonConvergence`] if the system is singular
    /// or the inputs are inconsistent.
    pub fn fit(x: &[f64], y: &[f64], degree: usize) -> NumericalResult<Self> {
        if x.len() != y.len() || x.len() <= degree {
            return Err(NumericalError::NonConvergence(format!(
                "cannot fit degree {degree} to {} points",
                x.len()
            )));
        }
        let n_coeffs = degree + 1;
        let lo = x.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = x.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let shift = 0.5 * (lo + hi);
        let scale = if hi > lo { 0.5 * (hi - lo) } else { 1.0 };

        let mut xtx = vec![0.0; n_coeffs * n_coeffs];
        let mut xty = vec![0.0; n_coeffs];
        let mut powers = vec![0.0; 2 * degree + 1];
        for (xi, yi) in x.iter().zip(y) {
            let t = (xi - shift) / scale;
            let mut p = 1.0;
            for power in &mut powers {
                *power = p;
                p *= t;
            }
            for row in 0..n_coeffs {
                xty[row] += powers[row] * yi;
                for col in 0..n_coeffs {
                    xtx[col * n_coeffs + row] += powers[row + col];
                }
            }
        }

        let matrix = DMatrix::from_column_slice(n_coeffs, n_coeffs, &xtx);
        let rhs = DVector::from_column_slice(&xty);
        let solution = match matrix.clone().qr().solve(&rhs) {
            Some(solution) => solution,
            None => {
                warn!("QR solve failed for degree {degree} fit, falling back to SVD");
                matrix
                    .svd(true, true)
                    .solve(&rhs, f64::EPSILON * 100.0)
                    .map_err(|e| NumericalError::NonConvergence(e.to_string()))?
            }
        };
        if solution.iter().any(|c| !c.is_finite()) {
            return Err(NumericalError::NonConvergence(
                "non-finite fit coefficients".to_string(),
            ));
        }
        Ok(Self::from_scaled(solution.as_slice(), shift, scale))
    }

    /// Expands `sum b_k ((x - shift) / scale)^k` into powers of `x`.
    fn from_scaled(scaled: &[f64], shift: f64, scale: f64) -> Self {
        let linear = [-shift / scale, 1.0 / scale];
        let mut acc: Vec<f64> = vec![0.0];
        for b in scaled.iter().rev() {
            let mut next = vec![0.0; acc.len() + 1];
            for (i, a) in acc.iter().enumerate() {
                next[i] += a * linear[0];
                next[i + 1] += a * linear[1];
            }
            next[0] += b;
            acc = next;
        }
        acc.truncate(scaled.len());
        Self::new(&acc)
    }

    /// All complex roots via Laguerre's method with deflation.
    ///
    /// # Errors
    /// Returns [`NumericalError::TooManyEvaluations`] if more than
    /// `max_evaluations` iterations are needed in total.
    pub fn complex_roots(
        &self,
        initial: f64,
        max_evaluations: usize,
    ) -> NumericalResult<Vec<Complex64>> {
        let n = self.degree();
        let mut c: Vec<Complex64> = self
            .coefficients
            .iter()
            .map(|v| Complex64::new(*v, 0.0))
            .collect();
        let z0 = Complex64::new(initial, 0.0);
        let mut evaluations = 0;
        let mut roots = Vec::with_capacity(n);
        for i in 0..n {
            let root = laguerre(&c[..=n - i], z0, &mut evaluations, max_evaluations)?;
            // synthetic division by (z - root)
            let mut carry = c[n - i];
            for j in (0..n - i).rev() {
                let old = c[j];
                c[j] = carry;
                carry = old + carry * root;
            }
            roots.push(root);
        }
        Ok(roots)
    }

    /// Real roots (imaginary part negligible) of the polynomial.
    ///
    /// # Errors
    /// See [`Polynomial::complex_roots`].
    pub fn real_roots(&self, initial: f64, max_evaluations: usize) -> NumericalResult<Vec<f64>> {
        let roots = self.complex_roots(initial, max_evaluations)?;
        Ok(roots
            .into_iter()
            .filter(|z| z.im.abs() <= SOLVER_ABSOLUTE_ACCURACY.max(z.re.abs() * 1e-8))
            .map(|z| z.re)
            .collect())
    }
}

/// Single root of the polynomial with ascending complex coefficients `c`.
fn laguerre(
    c: &[Complex64],
    initial: Complex64,
    evaluations: &mut usize,
    max_evaluations: usize,
) -> NumericalResult<Complex64> {
    let n = c.len() - 1;
    let big_n = Complex64::new(n as f64, 0.0);
    let big_n1 = Complex64::new(n as f64 - 1.0, 0.0);
    let mut z = initial;
    let mut old = Complex64::new(f64::INFINITY, f64::INFINITY);
    loop {
        let mut pv = c[n];
        let mut dv = Complex64::new(0.0, 0.0);
        let mut d2v = Complex64::new(0.0, 0.0);
        for coeff in c[..n].iter().rev() {
            d2v = dv + z * d2v;
            dv = pv + z * dv;
            pv = coeff + z * pv;
        }
        d2v *= 2.0;

        let tolerance = (SOLVER_RELATIVE_ACCURACY * z.norm()).max(SOLVER_ABSOLUTE_ACCURACY);
        if (z - old).norm() <= tolerance || pv.norm() <= SOLVER_FUNCTION_ACCURACY {
            return Ok(z);
        }

        let g = dv / pv;
        let g2 = g * g;
        let h = g2 - d2v / pv;
        let delta = big_n1 * (big_n * h - g2);
        let delta_sqrt = delta.sqrt();
        let dplus = g + delta_sqrt;
        let dminus = g - delta_sqrt;
        let denominator = if dplus.norm() > dminus.norm() {
            dplus
        } else {
            dminus
        };
        if denominator.norm() == 0.0 {
            z += Complex64::new(tolerance, tolerance);
            old = Complex64::new(f64::INFINITY, f64::INFINITY);
        } else {
            old = z;
            z -= big_n / denominator;
        }

        *evaluations += 1;
        if *evaluations > max_evaluations {
            return Err(NumericalError::TooManyEvaluations(max_evaluations));
        }
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (i, c) in self.coefficients.iter().enumerate().rev() {
            if *c == 0.0 && self.coefficients.len() > 1 {
                continue;
            }
            let sign = if c.is_sign_negative() { "-" } else { "+" };
            if first {
                if c.is_sign_negative() {
                    write!(f, "-")?;
                }
                first = false;
            } else {
                write!(f, " {sign} ")?;
            }
            match i {
                0 => write!(f, "{}", c.abs())?,
                1 => write!(f, "{} x", c.abs())?,
                _ => write!(f, "{} x^{i}", c.abs())?,
            }
        }
        Ok(())
    }
}
