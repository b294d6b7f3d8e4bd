//! Document merge engine.

use tracing::warn;

use crate::document::{extract_text, merge_pdfs, text_to_pdf};
use crate::family::{extension_of, validate_output, MediaKind};
use crate::pipeline::{ConversionRequest, PipelineExecutor};

use super::ComposeError;

/// Merges multiple documents into one output document.
pub struct MergeEngine<'a> {
    executor: &'a PipelineExecutor,
}

impl<'a> MergeEngine<'a> {
    pub fn new(executor: &'a PipelineExecutor) -> Self {
        Self { executor }
    }

    /// Merges `documents` (name, bytes pairs) in submission order.
    ///
    /// For a PDF target each input is individually converted to PDF and the
    /// page trees are concatenated; a failing input contributes an error
    /// placeholder page instead of aborting the merge. For other targets
    /// everything is flattened to headed text and re-encoded once.
    pub async fn merge(
        &self,
        documents: &[(String, Vec<u8>)],
        output_format: &str,
    ) -> Result<Vec<u8>, ComposeError> {
        if documents.len() < 2 {
            return Err(ComposeError::NotEnoughInputs {
                count: documents.len(),
            });
        }
        let output_format = validate_output(MediaKind::Document, output_format)?;

        if output_format == "pdf" {
            self.merge_as_pdf(documents).await
        } else {
            self.merge_via_text(documents, &output_format).await
        }
    }

    async fn merge_as_pdf(
        &self,
        documents: &[(String, Vec<u8>)],
    ) -> Result<Vec<u8>, ComposeError> {
        let request = ConversionRequest::new("pdf");
        let mut parts = Vec::with_capacity(documents.len());

        for (name, bytes) in documents {
            let is_pdf = extension_of(name).as_deref() == Some("pdf");
            let part = if is_pdf {
                bytes.clone()
            } else {
                match self.executor.execute(bytes, name, &request).await {
                    Ok(result) => result.output_bytes,
                    Err(error) => {
                        warn!(document = %name, %error, "input failed, inserting placeholder page");
                        text_to_pdf(&format!("Failed to convert {name}: {}", error.message))?
                    }
                }
            };
            parts.push(part);
        }

        Ok(merge_pdfs(&parts)?)
    }

    async fn merge_via_text(
        &self,
        documents: &[(String, Vec<u8>)],
        output_format: &str,
    ) -> Result<Vec<u8>, ComposeError> {
        let mut combined = String::new();
        for (i, (name, bytes)) in documents.iter().enumerate() {
            let format = extension_of(name).unwrap_or_else(|| "txt".to_string());
            let text = extract_text(bytes, &format);
            combined.push_str(&format!("\n\n=== Document {}: {} ===\n\n{}", i + 1, name, text));
        }

        let request = ConversionRequest::new(output_format);
        self.executor
            .execute(combined.trim_start().as_bytes(), "merged.txt", &request)
            .await
            .map(|result| result.output_bytes)
            .map_err(|e| ComposeError::Encode {
                reason: e.to_string(),
            })
    }
}
