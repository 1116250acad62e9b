//! Definite integrals by iterated trapezoid refinement.

#![allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]

use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{NumericalError, NumericalResult};

const RELATIVE_ACCURACY: f64 = 1e-6;
const ABSOLUTE_ACCURACY: f64 = 1e-15;
const MIN_ITERATIONS: usize = 3;
/// Trapezoid stage `k` costs `2^(k-1)` evaluations.
const SIMPSON_MAX_ITERATIONS: usize = 30;
const ROMBERG_MAX_ITERATIONS: usize = 32;

/// Quadrature rule.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Integrator {
    /// Simpson's rule.
    #[default]
    Simpson,
    /// Romberg extrapolation.
    Romberg,
}

impl fmt::Display for Integrator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Simpson => write!(f, "Simpson"),
            Self::Romberg => write!(f, "Romberg"),
        }
    }
}

impl Integrator {
    /// Integrates `func` over `[lower, upper]`.
    ///
    /// # Errors
    /// Returns [`NumericalError::InvalidInterval`] for an empty or non-finite
    /// interval and [`NumericalError::TooManyEvaluations`] if the estimate
    /// does not converge.
    pub fn integrate<F: Fn(f64) -> f64>(
        self,
        func: F,
        lower: f64,
        upper: f64,
    ) -> NumericalResult<f64> {
        if !lower.is_finite() || !upper.is_finite() || lower >= upper {
            return Err(NumericalError::InvalidInterval { lower, upper });
        }
        let trapezoid = Trapezoid::new(func, lower, upper);
        match self {
            Self::Simpson => simpson(trapezoid),
            Self::Romberg => romberg(trapezoid),
        }
    }
}

fn converged(previous: f64, current: f64) -> bool {
    let delta = (current - previous).abs();
    let limit = RELATIVE_ACCURACY * (previous.abs() + current.abs()) * 0.5;
    delta <= limit || delta <= ABSOLUTE_ACCURACY
}

/// Successive trapezoid refinements; each stage halves the spacing.
struct Trapezoid<F> {
    func: F,
    lower: f64,
    upper: f64,
    estimate: f64,
    stage: usize,
}

impl<F: Fn(f64) -> f64> Trapezoid<F> {
    fn new(func: F, lower: f64, upper: f64) -> Self {
        Self {
            func,
            lower,
            upper,
            estimate: 0.0,
            stage: 0,
        }
    }

    fn refine(&mut self) -> f64 {
        let width = self.upper - self.lower;
        if self.stage == 0 {
            self.estimate = 0.5 * width * ((self.func)(self.lower) + (self.func)(self.upper));
        } else {
            let np = 1_u64 << (self.stage - 1);
            let spacing = width / np as f64;
            let mut x = self.lower + 0.5 * spacing;
            let mut sum = 0.0;
            for _ in 0..np {
                sum += (self.func)(x);
                x += spacing;
            }
            self.estimate = 0.5 * (self.estimate + sum * spacing);
        }
        self.stage += 1;
        self.estimate
    }
}

fn simpson<F: Fn(f64) -> f64>(mut trapezoid: Trapezoid<F>) -> NumericalResult<f64> {
    let mut old_t = trapezoid.refine();
    let mut old_s = 0.0;
    for iteration in 1..=SIMPSON_MAX_ITERATIONS {
        let t = trapezoid.refine();
        let s = (4.0 * t - old_t) / 3.0;
        if iteration >= MIN_ITERATIONS && converged(old_s, s) {
            return Ok(s);
        }
        old_s = s;
        old_t = t;
    }
    Err(NumericalError::TooManyEvaluations(SIMPSON_MAX_ITERATIONS))
}

fn romberg<F: Fn(f64) -> f64>(mut trapezoid: Trapezoid<F>) -> NumericalResult<f64> {
    let mut previous = vec![0.0; ROMBERG_MAX_ITERATIONS + 1];
    let mut current = vec![0.0; ROMBERG_MAX_ITERATIONS + 1];
    current[0] = trapezoid.refine();
    let mut old_s = current[0];
    for i in 1..=ROMBERG_MAX_ITERATIONS {
        std::mem::swap(&mut previous, &mut current);
        current[0] = trapezoid.refine();
        let mut factor = 1.0;
        for j in 1..=i {
            factor *= 4.0;
            current[j] = current[j - 1] + (current[j - 1] - previous[j - 1]) / (factor - 1.0);
        }
        let s = current[i];
        if i >= MIN_ITERATIONS && converged(old_s, s) {
            return Ok(s);
        }
        old_s = s;
    }
    Err(NumericalError::TooManyEvaluations(ROMBERG_MAX_ITERATIONS))
}
