//! Structured error types for the rocsift crates.

use thiserror::Error;

/// Unified error type for every ingestion and export operation.
///
/// Validation findings are not errors; they are reported through the
/// validator's report type instead.
#[derive(Debug, Error)]
pub enum RocError {
    /// Malformed text (bad CSV structure, missing header columns, bad cells)
    #[error("parse error: {0}")]
    Parse(String),

    /// A curve violates the canonical shape (lengths, ranges, ordering)
    #[error("shape error: {0}")]
    Shape(String),

    /// Invalid arguments (empty export set, unsupported option combination)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// CSV tokenizing or writing failed
    #[error("CSV error: {0}")]
    Csv(String),

    /// JSON text could not be parsed or serialized
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl RocError {
    /// Stable machine-readable category, independent of the message text.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Parse(_) => "parse",
            Self::Shape(_) => "shape",
            Self::InvalidInput(_) => "invalid_input",
            Self::Csv(_) => "csv",
            Self::Json(_) => "json",
        }
    }
}

/// Convenience alias used throughout the rocsift crates.
pub type Result<T> = std::result::Result<T, RocError>;
