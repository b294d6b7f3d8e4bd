//! Document split engine.

use serde::{Deserialize, Serialize};

use crate::document::{extract_text, split_into_slides, split_pdf, text_to_docx, text_to_pdf};
use crate::family::extension_of;

use super::ComposeError;

/// How a document is divided into chunks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitSpec {
    /// Fixed page count per chunk; paginated formats only.
    Pages { per_chunk: usize },
    /// Accumulated content length per chunk, on word boundaries.
    Content { max_chars: usize },
}

/// Splits one document into multiple parts.
pub struct SplitEngine;

impl SplitEngine {
    /// Splits a document, returning `(filename, bytes)` chunks in
    /// generation order. Chunk boundaries never split a word.
    ///
    /// PDFs split by pages; text-bearing formats split by content length
    /// and are re-encoded in their own format (txt/docx natively, anything
    /// else recreated as PDF).
    pub fn split(
        &self,
        bytes: &[u8],
        filename: &str,
        spec: SplitSpec,
    ) -> Result<Vec<(String, Vec<u8>)>, ComposeError> {
        let format = extension_of(filename).unwrap_or_else(|| "txt".to_string());

        if format == "pdf" {
            let per_chunk = match spec {
                SplitSpec::Pages { per_chunk } => per_chunk.max(1),
                // Content-driven splitting of a paginated format falls back
                // to one page per chunk.
                SplitSpec::Content { .. } => 1,
            };
            let parts = split_pdf(bytes, per_chunk)?;
            return Ok(parts
                .into_iter()
                .enumerate()
                .map(|(i, part)| (format!("split_{}.pdf", i + 1), part))
                .collect());
        }

        let max_chars = match spec {
            SplitSpec::Content { max_chars } => max_chars.max(1),
            // A page of body text approximates a thousand characters.
            SplitSpec::Pages { per_chunk } => per_chunk.max(1) * 1000,
        };

        let text = extract_text(bytes, &format);
        let chunks = split_into_slides(&text, max_chars);

        let mut parts = Vec::with_capacity(chunks.len());
        for (i, chunk) in chunks.iter().enumerate() {
            let (extension, content): (&str, Vec<u8>) = match format.as_str() {
                "txt" | "md" | "csv" => (format.as_str(), chunk.clone().into_bytes()),
                "docx" => ("docx", text_to_docx(chunk)?),
                _ => ("pdf", text_to_pdf(chunk)?),
            };
            parts.push((format!("split_{}.{extension}", i + 1), content));
        }
        Ok(parts)
    }
}
