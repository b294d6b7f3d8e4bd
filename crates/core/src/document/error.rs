//! Error type for the document engines.

use thiserror::Error;

/// Errors raised by the native document engines.
///
/// Consumed by the strategy fallback chain; a failing engine advances the
/// chain rather than surfacing directly.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The input could not be parsed as the declared format.
    #[error("Malformed {format} input: {reason}")]
    Malformed { format: String, reason: String },

    /// Building the output artifact failed.
    #[error("Failed to render {format} output: {reason}")]
    Render { format: String, reason: String },

    /// I/O error while staging document data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DocumentError {
    pub fn malformed(format: impl Into<String>, reason: impl ToString) -> Self {
        Self::Malformed {
            format: format.into(),
            reason: reason.to_string(),
        }
    }

    pub fn render(format: impl Into<String>, reason: impl ToString) -> Self {
        Self::Render {
            format: format.into(),
            reason: reason.to_string(),
        }
    }
}
