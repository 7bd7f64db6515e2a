//! Structured error types for the ADDZYME workspace.

use thiserror::Error;

/// Unified error type for all ADDZYME operations.
#[derive(Debug, Error)]
pub enum AddzymeError {
    /// I/O error (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error (malformed SMILES, descriptor list, config file)
    #[error("parse error: {0}")]
    Parse(String),

    /// Invalid input (bad arguments, out-of-range values)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A model artifact is missing, malformed, or incompatible
    #[error("model error: {0}")]
    Model(String),

    /// Invalid configuration values
    #[error("config error: {0}")]
    Config(String),

    /// Catch-all for other errors
    #[error("{0}")]
    Other(String),
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, AddzymeError>;
