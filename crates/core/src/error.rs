//! Error types for airsurf

use thiserror::Error;

/// Main error type for airsurf operations.
///
/// Every variant is terminal for the interpolation run that produced it.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("No usable samples remain after cleaning")]
    EmptySampleSet,

    #[error("Insufficient data: need at least {needed} samples, got {got}")]
    InsufficientData { needed: usize, got: usize },

    #[error("Kriging system is singular (pivot {pivot:e} at row {pivot_index})")]
    SingularSystem { pivot_index: usize, pivot: f64 },

    #[error("Invalid grid specification: {0}")]
    InvalidGridSpec(String),

    #[error("Reading {index} of source '{source_name}' has no usable '{field}' field")]
    MissingField {
        source_name: String,
        index: usize,
        field: String,
    },

    #[error("Coordinate out of range: lat={latitude}, lon={longitude}")]
    InvalidCoordinate { latitude: f64, longitude: f64 },

    #[error("Duplicate sample coordinate: lat={latitude}, lon={longitude}")]
    DuplicateCoordinate { latitude: f64, longitude: f64 },

    #[error("Size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch { er: usize, ec: usize, ar: usize, ac: usize },

    #[error("Index out of bounds: ({row}, {col}) in surface of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("Invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("Interpolation run was cancelled")]
    Cancelled,
}

impl Error {
    /// Shorthand for [`Error::InvalidParameter`].
    pub fn invalid_parameter(
        name: &'static str,
        value: impl ToString,
        reason: impl Into<String>,
    ) -> Self {
        Error::InvalidParameter {
            name,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for airsurf operations
pub type Result<T> = std::result::Result<T, Error>;
