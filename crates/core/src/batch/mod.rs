//! Archive batch processing.
//!
//! Applies one shared `ConversionRequest` to every matching entry of a zip
//! archive. Entries whose extension is not in the supported set for the
//! target kind are skipped silently; a failing entry is recorded and never
//! aborts the batch. Zero successes is a batch-level failure, distinct from
//! a successful batch that carries warnings.

mod processor;

pub use processor::{build_archive, BatchError, BatchOutcome, BatchProcessor};
