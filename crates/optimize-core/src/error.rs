//! Crate-wide error taxonomy (spec §7).
//!
//! Mirrors the `DracoError`/`GltfError` pattern used in `draco-core`/`draco-io`:
//! one `thiserror` enum, one `Result` alias, propagated with `?` throughout.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum OptimizeError {
    #[error("invalid file: {0}")]
    InvalidFile(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid option `{field}`: {message}")]
    InvalidOptions {
        field: &'static str,
        message: String,
    },

    #[error("step `{step}` failed: {message}")]
    OptimizationFailed {
        step: &'static str,
        message: String,
    },

    #[error("failed to write output: {0}")]
    WriteFailed(String),

    #[error("cancelled")]
    Cancelled,

    #[error("internal error: {0}")]
    Internal(String),
}

impl OptimizeError {
    /// The stable kind name used in step results and CLI error output.
    pub fn kind(&self) -> &'static str {
        match self {
            OptimizeError::InvalidFile(_) => "InvalidFile",
            OptimizeError::Io(_) => "Io",
            OptimizeError::InvalidOptions { .. } => "InvalidOptions",
            OptimizeError::OptimizationFailed { .. } => "OptimizationFailed",
            OptimizeError::WriteFailed(_) => "WriteFailed",
            OptimizeError::Cancelled => "Cancelled",
            OptimizeError::Internal(_) => "Internal",
        }
    }

    pub fn invalid_options(field: &'static str, message: impl Into<String>) -> Self {
        OptimizeError::InvalidOptions {
            field,
            message: message.into(),
        }
    }

    pub fn optimization_failed(step: &'static str, message: impl Into<String>) -> Self {
        OptimizeError::OptimizationFailed {
            step,
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, OptimizeError>;
