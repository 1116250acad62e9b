//! Error types for sholl-core.

use thiserror::Error;

/// Result type alias for Sholl operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for Sholl sampling and statistics.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    /// A caller-supplied parameter failed validation.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Not enough data to perform the requested analysis.
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// A fit-derived quantity was requested before a fit exists.
    #[error("fit not performed: fit_polynomial() has not been called")]
    FitNotPerformed,

    /// A profile already holds an entry at this radius.
    #[error("profile already contains an entry at radius {0}")]
    DuplicateRadius(f64),

    /// Tabular data could not be parsed.
    #[error("parse error at line {line}: {message}")]
    Parse {
        /// 1-based line number.
        line: usize,
        /// What went wrong.
        message: String,
    },

    /// The worker pool for volumetric sampling could not be created.
    #[error("thread pool error: {0}")]
    ThreadPool(String),
}

impl Error {
    /// Convenience constructor for [`Error::InvalidParameter`].
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }

    /// Convenience constructor for [`Error::InsufficientData`].
    pub fn insufficient(message: impl Into<String>) -> Self {
        Self::InsufficientData(message.into())
    }
}
