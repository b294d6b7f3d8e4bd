//! Ordered fallback chain over document conversion methods.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::codec::UniversalConverter;
use crate::document::{
    csv_to_xlsx, docx_to_text, error_deck, extract_text, markdown_to_html, pdf_to_text,
    slides_to_pptx, split_into_slides, text_to_docx, text_to_epub, text_to_html, text_to_pdf,
    xlsx_to_csv,
};
use crate::family::{classify_extension, MediaFamily};

/// Character budget per generated slide when recreating presentations.
const SLIDE_CHARS: usize = 500;

/// A single conversion method in a fallback chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversionMethod {
    /// Family-specific direct converter.
    DirectFamily,
    /// PDF input recreated as a slide deck.
    PdfToSlides,
    /// Publishing-target converter (pdf/epub/html).
    Publishing,
    /// General-purpose markup converter.
    Universal,
    /// Text extraction plus target-specific recreation.
    TextRecreate,
    /// Terminal single-slide error artifact; presentation targets only.
    ErrorDeck,
}

impl ConversionMethod {
    /// Human-readable label used in logs and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::DirectFamily => "direct",
            Self::PdfToSlides => "pdf_to_slides",
            Self::Publishing => "publishing",
            Self::Universal => "universal",
            Self::TextRecreate => "text_recreate",
            Self::ErrorDeck => "error_deck",
        }
    }
}

/// Errors surfaced once a fallback chain is exhausted.
#[derive(Debug, Error)]
pub enum StrategyError {
    /// Every method in the chain failed.
    #[error(
        "All conversion methods failed converting {input_format} to {output_format}: {last_error}"
    )]
    Exhausted {
        input_format: String,
        output_format: String,
        attempts: Vec<String>,
        last_error: String,
    },
}

/// Builds the ordered method chain for an (input, output) pair.
///
/// Exactly one method's output becomes the result: the first one that
/// completes without error.
pub fn plan(input_format: &str, output_format: &str) -> Vec<ConversionMethod> {
    let input_family = classify_extension(input_format);
    let output_family = classify_extension(output_format);

    let mut methods = Vec::new();

    if input_format == "pdf" && output_family == Some(MediaFamily::Presentation) {
        methods.push(ConversionMethod::PdfToSlides);
    } else if input_family.is_some() && input_family == output_family {
        methods.push(ConversionMethod::DirectFamily);
    } else if output_family == Some(MediaFamily::Publishing) {
        methods.push(ConversionMethod::Publishing);
    } else {
        methods.push(ConversionMethod::Universal);
    }

    if !methods.contains(&ConversionMethod::Universal) {
        methods.push(ConversionMethod::Universal);
    }
    methods.push(ConversionMethod::TextRecreate);
    if output_family == Some(MediaFamily::Presentation) {
        methods.push(ConversionMethod::ErrorDeck);
    }

    methods
}

/// Evaluates the fallback chain for one document conversion request.
pub struct StrategySelector<'a> {
    universal: &'a dyn UniversalConverter,
}

impl<'a> StrategySelector<'a> {
    pub fn new(universal: &'a dyn UniversalConverter) -> Self {
        Self { universal }
    }

    /// Runs the chain until a method succeeds. Returns the converted bytes
    /// and the label of the winning method.
    pub async fn convert(
        &self,
        bytes: &[u8],
        input_format: &str,
        output_format: &str,
    ) -> Result<(Vec<u8>, &'static str), StrategyError> {
        let methods = plan(input_format, output_format);
        let mut attempts = Vec::new();
        let mut last_error = String::from("no conversion method applied");

        for method in methods {
            let result = match method {
                ConversionMethod::DirectFamily => {
                    self.direct(bytes, input_format, output_format)
                }
                ConversionMethod::PdfToSlides => self.pdf_to_slides(bytes),
                ConversionMethod::Publishing => {
                    self.publishing(bytes, input_format, output_format)
                }
                ConversionMethod::Universal => self
                    .universal
                    .convert(bytes, input_format, output_format)
                    .await
                    .map_err(|e| e.to_string()),
                ConversionMethod::TextRecreate => {
                    self.text_recreate(bytes, input_format, output_format).await
                }
                ConversionMethod::ErrorDeck => Ok(error_deck(&last_error)),
            };

            match result {
                Ok(output) => {
                    debug!(
                        method = method.label(),
                        input_format, output_format, "conversion method succeeded"
                    );
                    return Ok((output, method.label()));
                }
                Err(reason) => {
                    warn!(
                        method = method.label(),
                        input_format, output_format, %reason,
                        "conversion method failed, advancing chain"
                    );
                    attempts.push(method.label().to_string());
                    last_error = reason;
                }
            }
        }

        Err(StrategyError::Exhausted {
            input_format: input_format.to_string(),
            output_format: output_format.to_string(),
            attempts,
            last_error,
        })
    }

    /// Native fast paths within one family, mirroring the pairs the gateway
    /// understands directly. Unknown pairs advance the chain.
    fn direct(
        &self,
        bytes: &[u8],
        input_format: &str,
        output_format: &str,
    ) -> Result<Vec<u8>, String> {
        match (input_format, output_format) {
            ("docx", "txt") => docx_to_text(bytes)
                .map(String::into_bytes)
                .map_err(|e| e.to_string()),
            ("txt", "docx") => {
                text_to_docx(&String::from_utf8_lossy(bytes)).map_err(|e| e.to_string())
            }
            ("json", "txt") => Ok(extract_text(bytes, "json").into_bytes()),
            ("xlsx", "csv") => xlsx_to_csv(bytes).map_err(|e| e.to_string()),
            ("csv", "xlsx") => {
                csv_to_xlsx(&String::from_utf8_lossy(bytes)).map_err(|e| e.to_string())
            }
            ("pdf", out) => self.publishing(bytes, "pdf", out),
            (_, _) => Err(format!(
                "no direct converter for {input_format} to {output_format}"
            )),
        }
    }

    /// Conversions into the publishing family (pdf/epub/html).
    fn publishing(
        &self,
        bytes: &[u8],
        input_format: &str,
        output_format: &str,
    ) -> Result<Vec<u8>, String> {
        match output_format {
            "pdf" => {
                let text = usable_text(bytes, input_format)?;
                text_to_pdf(&text).map_err(|e| e.to_string())
            }
            "epub" => {
                let text = usable_text(bytes, input_format)?;
                text_to_epub("Converted Document", &text).map_err(|e| e.to_string())
            }
            "html" => match input_format {
                "md" => Ok(markdown_to_html(&String::from_utf8_lossy(bytes)).into_bytes()),
                "txt" => Ok(text_to_html(&String::from_utf8_lossy(bytes)).into_bytes()),
                _ => {
                    let text = usable_text(bytes, input_format)?;
                    Ok(text_to_html(&text).into_bytes())
                }
            },
            other => Err(format!("{other} is not a publishing format")),
        }
    }

    /// PDF recreated as a slide deck: title slide first, then word-boundary
    /// chunks of the extracted text.
    fn pdf_to_slides(&self, bytes: &[u8]) -> Result<Vec<u8>, String> {
        let text = match pdf_to_text(bytes) {
            Ok(text) if !text.trim().is_empty() => text,
            Ok(_) => "PDF content could not be extracted. This is a placeholder slide.".to_string(),
            Err(e) => return Err(e.to_string()),
        };
        let slides = split_into_slides(&text, SLIDE_CHARS);
        slides_to_pptx("Converted PDF Document", &slides).map_err(|e| e.to_string())
    }

    /// Last-resort recreation from extracted text.
    async fn text_recreate(
        &self,
        bytes: &[u8],
        input_format: &str,
        output_format: &str,
    ) -> Result<Vec<u8>, String> {
        let text = usable_text(bytes, input_format)?;

        match output_format {
            "txt" | "md" | "csv" => Ok(text.into_bytes()),
            "html" => Ok(text_to_html(&text).into_bytes()),
            "pdf" => text_to_pdf(&text).map_err(|e| e.to_string()),
            "docx" => text_to_docx(&text).map_err(|e| e.to_string()),
            "epub" => text_to_epub("Converted Document", &text).map_err(|e| e.to_string()),
            "json" => {
                let value = serde_json::json!({
                    "content": text,
                    "source_format": input_format,
                    "converted_at": chrono::Utc::now().timestamp(),
                });
                serde_json::to_vec_pretty(&value).map_err(|e| e.to_string())
            }
            other => self
                .universal
                .convert(text.as_bytes(), "md", other)
                .await
                .map_err(|e| e.to_string()),
        }
    }
}

/// Extracted text usable for recreation; an empty or failed extraction
/// advances the chain.
fn usable_text(bytes: &[u8], input_format: &str) -> Result<String, String> {
    let text = extract_text(bytes, input_format);
    if text.trim().is_empty() {
        return Err(format!("no text could be extracted from {input_format}"));
    }
    if text.starts_with("Text extraction failed") {
        return Err(text);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_same_family_starts_direct() {
        let methods = plan("docx", "txt");
        assert_eq!(
            methods,
            vec![
                ConversionMethod::DirectFamily,
                ConversionMethod::Universal,
                ConversionMethod::TextRecreate,
            ]
        );
    }

    #[test]
    fn test_plan_publishing_target() {
        let methods = plan("docx", "pdf");
        assert_eq!(methods[0], ConversionMethod::Publishing);
        assert!(methods.contains(&ConversionMethod::Universal));
        assert!(methods.contains(&ConversionMethod::TextRecreate));
        assert!(!methods.contains(&ConversionMethod::ErrorDeck));
    }

    #[test]
    fn test_plan_pdf_to_presentation_special_case() {
        let methods = plan("pdf", "pptx");
        assert_eq!(methods[0], ConversionMethod::PdfToSlides);
        assert_eq!(*methods.last().unwrap(), ConversionMethod::ErrorDeck);
    }

    #[test]
    fn test_plan_cross_family_starts_universal() {
        let methods = plan("csv", "docx");
        assert_eq!(methods[0], ConversionMethod::Universal);
        // Universal is not repeated as a fallback of itself.
        assert_eq!(
            methods
                .iter()
                .filter(|m| **m == ConversionMethod::Universal)
                .count(),
            1
        );
    }

    #[test]
    fn test_plan_presentation_target_ends_in_error_deck() {
        for input in ["docx", "txt", "xlsx"] {
            let methods = plan(input, "pptx");
            assert_eq!(*methods.last().unwrap(), ConversionMethod::ErrorDeck);
        }
    }
}
