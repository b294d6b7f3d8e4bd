//! Document merge and split engines.
//!
//! Both compose the pipeline executor rather than reimplementing
//! conversion: merge funnels every input through the pipeline toward a
//! common intermediate, split re-encodes chunks through the native
//! document engines.

mod merge;
mod split;

pub use merge::MergeEngine;
pub use split::{SplitEngine, SplitSpec};

use thiserror::Error;

use crate::document::DocumentError;
use crate::family::FormatError;

/// Errors raised by the merge/split engines.
#[derive(Debug, Error)]
pub enum ComposeError {
    /// Merge requires at least two inputs.
    #[error("Please provide at least 2 documents to merge (got {count})")]
    NotEnoughInputs { count: usize },

    /// The requested output format is unsupported.
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A document engine failed.
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// The combined content could not be re-encoded to the target.
    #[error("Failed to encode merged content: {reason}")]
    Encode { reason: String },
}
