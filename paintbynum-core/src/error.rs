//! Error types for the paintbynum-core pipeline

use thiserror::Error;

/// Top-level failure kinds the pipeline can report.
///
/// Mirrors the four-way split a caller needs: `Validation` and `Fatal` abort
/// the call before any result exists, `Cancelled` is a caller-requested stop,
/// and `Internal` marks an algorithm precondition violation that the stage
/// recovers from by dropping the offending unit rather than failing the call.
#[derive(Error, Debug)]
pub enum PaintError {
    #[error("invalid input: {message}")]
    Validation { message: String },

    #[error("operation cancelled")]
    Cancelled,

    #[error("internal algorithm error: {message}")]
    Internal { message: String },

    #[error("fatal error: {message}")]
    Fatal { message: String },
}

impl PaintError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn fatal(message: impl Into<String>) -> Self {
        Self::Fatal {
            message: message.into(),
        }
    }
}

pub type PaintResult<T> = Result<T, PaintError>;
