//! Internal pipeline stage errors.

use thiserror::Error;

use crate::codec::CodecError;
use crate::family::FormatError;
use crate::strategy::StrategyError;
use crate::transform::TransformError;

/// Error raised by a pipeline stage before being attributed to an entry.
///
/// Every variant names its failing stage; the executor flattens these into
/// a `ConversionError` carrying the original filename.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Parameter validation failed; caller's fault, no retry.
    #[error(transparent)]
    Validation(#[from] TransformError),

    /// Output format not in the declared supported set.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// Codec collaborator failure.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Every conversion strategy was exhausted.
    #[error(transparent)]
    Strategy(#[from] StrategyError),

    /// In-memory decode failed.
    #[error("Decode failed: {reason}")]
    Decode { reason: String },

    /// In-memory encode failed.
    #[error("Encode failed: {reason}")]
    Encode { reason: String },
}

impl PipelineError {
    pub fn decode(reason: impl ToString) -> Self {
        Self::Decode {
            reason: reason.to_string(),
        }
    }

    pub fn encode(reason: impl ToString) -> Self {
        Self::Encode {
            reason: reason.to_string(),
        }
    }
}
