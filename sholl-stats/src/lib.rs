//! sholl-stats: Statistics of Sholl profiles.
//!
//! This crate provides:
//! - **Linear statistics** - descriptive moments, centroids, maxima,
//!   polynomial fitting, critical value, mean value and goodness of fit
//! - **Normalized statistics** - semi-log and log-log regressions of
//!   area/volume normalized counts and the Sholl decay
//! - **Numeric kernels** - least squares, Laguerre roots, Simpson and
//!   Romberg quadrature, simple regression, two-sample KS test
//!
//! Numerical failures inside the kernels surface as `NaN`; contract
//! violations surface as [`sholl_core::Error`].
//!
#![warn(missing_docs)]

pub mod descriptive;
mod error;
mod integration;
pub mod ks;
mod linear;
mod normalized;
mod polynomial;
mod regression;

pub use error::{NumericalError, NumericalResult};
pub use integration::Integrator;
pub use ks::{ks_statistic, ks_test};
pub use linear::{
    CountSource, CountView, LinearProfileStats, PolynomialFit, ProfilePoint,
    DEFAULT_MAX_EVALUATIONS, DEFAULT_PRECISION, SMALLEST_DATASET,
};
pub use normalized::{NormalizedProfileStats, Normalizer, RegressionMethod};
pub use polynomial::Polynomial;
pub use regression::SimpleRegression;
pub use sholl_core::{Error, Result};
