//! Best-effort text extraction.
//!
//! `extract_text` never fails: when a format cannot be parsed it returns an
//! explanatory string instead, so downstream recreation always has
//! something to work with.

use regex_lite::Regex;
use tracing::debug;

use super::{docx, pdf, pptx, xlsx};

/// Extracts plain text from document bytes of the declared format.
pub fn extract_text(bytes: &[u8], format: &str) -> String {
    let format = format.to_ascii_lowercase();
    let result = match format.as_str() {
        "txt" | "csv" | "rtf" => Ok(lossy_text(bytes)),
        "md" => Ok(strip_markdown(&lossy_text(bytes))),
        "json" => Ok(pretty_json(bytes)),
        "html" => Ok(strip_html(&lossy_text(bytes))),
        "docx" => docx::docx_to_text(bytes).map_err(|e| e.to_string()),
        "xlsx" | "xls" | "ods" => xlsx::xlsx_to_text(bytes).map_err(|e| e.to_string()),
        "pptx" | "ppt" | "odp" => pptx::pptx_to_text(bytes).map_err(|e| e.to_string()),
        "pdf" => pdf::pdf_to_text(bytes).map_err(|e| e.to_string()),
        _ => Ok(lossy_text(bytes)),
    };

    match result {
        Ok(text) => text,
        Err(reason) => {
            debug!(format, %reason, "text extraction fell back to explanatory string");
            format!("Text extraction failed for {format}: {reason}")
        }
    }
}

fn lossy_text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn pretty_json(bytes: &[u8]) -> String {
    let text = lossy_text(bytes);
    if text.trim().is_empty() {
        return "Empty JSON file".to_string();
    }
    match serde_json::from_str::<serde_json::Value>(&text) {
        Ok(value) => serde_json::to_string_pretty(&value).unwrap_or(text),
        Err(e) => format!("Invalid JSON format: {e}"),
    }
}

/// Strips markdown syntax down to readable plain text.
fn strip_markdown(text: &str) -> String {
    let mut out = text.to_string();
    let patterns = [
        (r"(?m)^#{1,6}\s*", ""),
        (r"\[([^\]]+)\]\([^)]*\)", "$1"),
        (r"\*\*([^*]+)\*\*", "$1"),
        (r"\*([^*]+)\*", "$1"),
        (r"`([^`]+)`", "$1"),
    ];
    for (pattern, replacement) in patterns {
        if let Ok(re) = Regex::new(pattern) {
            out = re.replace_all(&out, replacement).into_owned();
        }
    }
    out
}

/// Strips HTML tags and decodes the common entities.
fn strip_html(text: &str) -> String {
    let without_tags = match Regex::new(r"<[^>]*>") {
        Ok(re) => re.replace_all(text, "").into_owned(),
        Err(_) => text.to_string(),
    };
    without_tags
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
}
