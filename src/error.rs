//! Error types for tablestash

use thiserror::Error;

/// Result type alias for tablestash operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tablestash operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Invalid key: {0:?}")]
    InvalidKey(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Cannot parse {value:?} as {dtype} in column '{column}' (row {row})")]
    Parse {
        column: String,
        row: usize,
        value: String,
        dtype: crate::model::DType,
    },

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Corruption detected: {0}")]
    Corruption(String),

    #[error("Round trip check failed for '{key}': {details}")]
    Consistency { key: String, details: String },

    #[error("Objects differ: {0}")]
    Mismatch(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// True for a missing primary file or sidecar, and for a key stored as
    /// the other kind of object.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Io(e) => e.kind() == std::io::ErrorKind::NotFound,
            Error::Csv(e) => matches!(
                e.kind(),
                csv::ErrorKind::Io(io) if io.kind() == std::io::ErrorKind::NotFound
            ),
            Error::NotFound(_) => true,
            _ => false,
        }
    }
}
