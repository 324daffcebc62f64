//! Error types for canopy-core

use thiserror::Error;

/// Main error type for the canopy-core library
///
/// The analytics engine itself never fails: missing optional data degrades to
/// `None` or an "Unspecified" bucket. Errors only arise at the edges, when
/// loading input documents or configuration.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Input document violates the engine contract (e.g. not an array)
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for canopy-core
pub type Result<T> = std::result::Result<T, Error>;
