//! Batch processor implementation.

use futures::future;
use serde::{Deserialize, Serialize};
use std::io::{Cursor, Read, Write};
use thiserror::Error;
use tracing::{debug, warn};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use crate::family::{classify_extension, extension_of};
use crate::pipeline::{ConversionError, ConversionRequest, PipelineExecutor};

/// Errors raised at the batch level.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The upload is not a readable zip archive.
    #[error("Invalid archive: {reason}")]
    InvalidArchive { reason: String },

    /// The requested output format does not map to a media kind.
    #[error("Unsupported output format: {format}")]
    UnsupportedOutput { format: String },

    /// No entry succeeded; carries every per-entry failure.
    #[error("No valid entries could be processed ({} failures)", errors.len())]
    TotalFailure { errors: Vec<ConversionError> },

    /// Building the output archive failed.
    #[error("Failed to build output archive: {reason}")]
    ArchiveBuild { reason: String },
}

/// Outcome of one batch run.
///
/// Every matching entry appears in exactly one of `successes` or `errors`,
/// in archive enumeration order; non-matching entries appear in neither.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BatchOutcome {
    pub successes: Vec<(String, Vec<u8>)>,
    pub errors: Vec<ConversionError>,
}

impl BatchOutcome {
    /// Per-entry failures rendered as warning strings.
    pub fn warnings(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.to_string()).collect()
    }

    pub fn is_partial(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Runs the pipeline over every matching entry of an archive.
pub struct BatchProcessor<'a> {
    executor: &'a PipelineExecutor,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(executor: &'a PipelineExecutor) -> Self {
        Self { executor }
    }

    /// Processes an archive under one shared request template.
    ///
    /// Entries are independent, so they run concurrently; the outcome keeps
    /// archive enumeration order regardless of completion order.
    pub async fn process_archive(
        &self,
        archive_bytes: &[u8],
        request: &ConversionRequest,
    ) -> Result<BatchOutcome, BatchError> {
        let kind = classify_extension(&request.output_format)
            .map(|family| family.kind())
            .ok_or_else(|| BatchError::UnsupportedOutput {
                format: request.output_format.clone(),
            })?;

        let mut archive =
            ZipArchive::new(Cursor::new(archive_bytes)).map_err(|e| BatchError::InvalidArchive {
                reason: e.to_string(),
            })?;

        let mut outcome = BatchOutcome::default();
        let mut entries: Vec<(String, Vec<u8>)> = Vec::new();
        for index in 0..archive.len() {
            let mut entry = archive
                .by_index(index)
                .map_err(|e| BatchError::InvalidArchive {
                    reason: e.to_string(),
                })?;
            if entry.is_dir() {
                continue;
            }
            let name = entry.name().to_string();

            // Entries outside the supported set are skipped, not reported.
            let matches = extension_of(&name)
                .map(|ext| kind.accepts_extension(&ext))
                .unwrap_or(false);
            if !matches {
                debug!(entry = %name, "skipping unsupported archive entry");
                continue;
            }

            let mut bytes = Vec::with_capacity(entry.size() as usize);
            match entry.read_to_end(&mut bytes) {
                Ok(_) => entries.push((name, bytes)),
                Err(e) => outcome.errors.push(ConversionError::new(name, e)),
            }
        }

        let results = future::join_all(entries.iter().map(|(name, bytes)| async {
            self.executor.execute(bytes, name, request).await
        }))
        .await;

        for ((name, _), result) in entries.iter().zip(results) {
            match result {
                Ok(converted) => {
                    let renamed = processed_name(name, &request.output_format);
                    outcome.successes.push((renamed, converted.output_bytes));
                }
                Err(error) => {
                    warn!(entry = %name, %error, "archive entry failed, continuing batch");
                    outcome.errors.push(error);
                }
            }
        }

        if outcome.successes.is_empty() {
            return Err(BatchError::TotalFailure {
                errors: outcome.errors,
            });
        }
        Ok(outcome)
    }
}

/// Builds a deflate-compressed archive from processed entries, preserving
/// their order.
pub fn build_archive(entries: &[(String, Vec<u8>)]) -> Result<Vec<u8>, BatchError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    for (name, bytes) in entries {
        writer
            .start_file(name.as_str(), options)
            .map_err(|e| BatchError::ArchiveBuild {
                reason: e.to_string(),
            })?;
        writer
            .write_all(bytes)
            .map_err(|e| BatchError::ArchiveBuild {
                reason: e.to_string(),
            })?;
    }
    let cursor = writer.finish().map_err(|e| BatchError::ArchiveBuild {
        reason: e.to_string(),
    })?;
    Ok(cursor.into_inner())
}

/// `dir/photo.png` converted to webp becomes `photo_processed.webp`.
fn processed_name(entry_name: &str, output_format: &str) -> String {
    let base = entry_name.rsplit('/').next().unwrap_or(entry_name);
    let stem = base
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(base);
    format!("{stem}_processed.{output_format}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_processed_name() {
        assert_eq!(processed_name("photo.png", "webp"), "photo_processed.webp");
        assert_eq!(
            processed_name("album/track.flac", "mp3"),
            "track_processed.mp3"
        );
    }

    #[test]
    fn test_build_archive_round_trip() {
        let entries = vec![
            ("a_processed.png".to_string(), vec![1u8, 2, 3]),
            ("b_processed.png".to_string(), vec![4u8, 5]),
        ];
        let archive = build_archive(&entries).unwrap();

        let mut reader = ZipArchive::new(Cursor::new(archive.as_slice())).unwrap();
        assert_eq!(reader.len(), 2);
        let mut first = Vec::new();
        reader
            .by_name("a_processed.png")
            .unwrap()
            .read_to_end(&mut first)
            .unwrap();
        assert_eq!(first, vec![1, 2, 3]);
    }
}
