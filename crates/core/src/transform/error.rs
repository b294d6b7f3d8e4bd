//! Error type for transform validation.

use thiserror::Error;

/// Errors raised while validating a transform specification.
///
/// These are caller faults: surfaced immediately, never retried.
#[derive(Debug, Error)]
pub enum TransformError {
    /// A transform parameter is out of its documented range.
    #[error("Invalid parameter: {reason}")]
    InvalidParameter { reason: String },
}

impl TransformError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            reason: reason.into(),
        }
    }
}
