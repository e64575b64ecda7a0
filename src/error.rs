//! Error types for the stockcast library.

use thiserror::Error;

/// Result type alias for planning operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while aggregating, fitting, forecasting or planning.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// A caller-supplied parameter is out of range (horizon, ratio, ...).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A date cell could not be parsed.
    #[error("invalid date '{value}' at row {row}")]
    InvalidDate { row: usize, value: String },

    /// The tabular input could not be read.
    #[error("csv error: {0}")]
    Csv(String),

    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Numerical failure while fitting the model.
    #[error("model fit failed: {0}")]
    ModelFit(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Timestamp-related error.
    #[error("timestamp error: {0}")]
    TimestampError(String),
}

impl ForecastError {
    /// True when the selection produced no usable data.
    ///
    /// The presentation layer shows these as "no data for this selection"
    /// instead of a generic failure.
    pub fn is_no_data(&self) -> bool {
        matches!(
            self,
            ForecastError::EmptyData | ForecastError::InsufficientData { .. }
        )
    }

    /// True when the caller must correct a parameter and resubmit.
    pub fn is_input_validation(&self) -> bool {
        matches!(
            self,
            ForecastError::InvalidInput(_)
                | ForecastError::InvalidDate { .. }
                | ForecastError::Csv(_)
        )
    }
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::Csv(err.to_string())
    }
}
