//! Failures of the numeric kernels.
//!
//! These never cross the public statistics API: callers of
//! [`crate::LinearProfileStats`] observe them as `NaN` results.

use thiserror::Error;

/// Non-fatal numerical failure.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NumericalError {
    /// The evaluation budget was exhausted.
    #[error("maximal count ({0}) exceeded")]
    TooManyEvaluations(usize),

    /// An iterative method failed to converge.
    #[error("convergence failed: {0}")]
    NonConvergence(String),

    /// The integration interval is empty or not finite.
    #[error("invalid interval [{lower}, {upper}]")]
    InvalidInterval {
        /// Lower bound.
        lower: f64,
        /// Upper bound.
        upper: f64,
    },
}

/// Result type alias for the numeric kernels.
pub type NumericalResult<T> = std::result::Result<T, NumericalError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        assert_eq!(
            NumericalError::TooManyEvaluations(10).to_string(),
            "maximal count (10) exceeded"
        );
        let err = NumericalError::InvalidInterval {
            lower: 1.0,
            upper: 1.0,
        };
        assert!(err.to_string().contains("[1, 1]"));
    }
}
