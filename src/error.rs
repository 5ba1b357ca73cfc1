//! Error types for the qos-forecast library.

use thiserror::Error;

/// Result type alias for forecast operations.
pub type Result<T> = std::result::Result<T, ForecastError>;

/// Errors that can occur while preparing data, fitting or forecasting.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ForecastError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Dimension mismatch between data structures.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    /// Model has not been fitted yet.
    #[error("model must be fitted before prediction")]
    FitRequired,

    /// Index out of bounds.
    #[error("index out of bounds: {index} (size: {size})")]
    IndexOutOfBounds { index: usize, size: usize },

    /// An input row has too few fields.
    #[error("malformed row at line {line}: expected {expected} fields, found {found}")]
    MalformedRow {
        line: u64,
        found: usize,
        expected: usize,
    },

    /// A field could not be parsed as a number.
    #[error("invalid number {value:?} at line {line}, column {column}")]
    DataFormat {
        line: u64,
        column: usize,
        value: String,
    },

    /// Reading or writing tabular data failed.
    #[error("i/o error: {0}")]
    Io(String),

    /// Computation error (e.g., numerical issues).
    #[error("computation error: {0}")]
    ComputationError(String),
}

impl From<csv::Error> for ForecastError {
    fn from(err: csv::Error) -> Self {
        ForecastError::Io(err.to_string())
    }
}

impl From<std::io::Error> for ForecastError {
    fn from(err: std::io::Error) -> Self {
        ForecastError::Io(err.to_string())
    }
}
