//! Error types for codec collaborators.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by external codec collaborators.
///
/// Decode/encode failures are consumed by the strategy fallback chain and
/// only surface to callers once every fallback is exhausted.
#[derive(Debug, Error)]
pub enum CodecError {
    /// External tool binary not found.
    #[error("Tool not found at path: {path}")]
    ToolNotFound { path: PathBuf },

    /// Decoding the input bytes failed.
    #[error("Decode failed: {reason}")]
    DecodeFailed { reason: String },

    /// Encoding to the target format failed.
    #[error("Encode failed: {reason}")]
    EncodeFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// Markup conversion failed.
    #[error("Conversion failed: {reason}")]
    ConvertFailed {
        reason: String,
        stderr: Option<String>,
    },

    /// Speech synthesis failed.
    #[error("Speech synthesis failed: {reason}")]
    SynthesisFailed { reason: String },

    /// The collaborator call exceeded its wall-clock budget. Treated the
    /// same as a strategy failure by callers.
    #[error("Operation timed out after {timeout_secs} seconds")]
    Timeout { timeout_secs: u64 },

    /// I/O error while staging temporary files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CodecError {
    pub fn decode_failed(reason: impl Into<String>) -> Self {
        Self::DecodeFailed {
            reason: reason.into(),
        }
    }

    pub fn encode_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::EncodeFailed {
            reason: reason.into(),
            stderr,
        }
    }

    pub fn convert_failed(reason: impl Into<String>, stderr: Option<String>) -> Self {
        Self::ConvertFailed {
            reason: reason.into(),
            stderr,
        }
    }

    pub fn synthesis_failed(reason: impl Into<String>) -> Self {
        Self::SynthesisFailed {
            reason: reason.into(),
        }
    }
}
