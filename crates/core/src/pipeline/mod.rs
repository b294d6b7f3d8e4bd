//! Pipeline execution.
//!
//! One `ConversionRequest` covers one logical unit of work: a single file
//! or one archive entry. The executor decodes, applies the transform
//! primitives in their mandatory order, and encodes to the target format,
//! retrying only through the strategy fallback chain for documents.

mod error;
mod executor;
mod types;

pub use error::PipelineError;
pub use executor::PipelineExecutor;
pub use types::{ConversionError, ConversionRequest, ConversionResult, ExportOptions, MediaItem};
