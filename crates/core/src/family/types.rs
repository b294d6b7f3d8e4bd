//! Media family and format tables.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Image formats accepted for decode and encode.
pub const IMAGE_FORMATS: &[&str] = &["jpeg", "jpg", "png", "webp", "bmp", "gif"];

/// Audio formats accepted for decode and encode.
pub const AUDIO_FORMATS: &[&str] = &[
    "aac", "ac3", "aif", "aifc", "aiff", "amr", "au", "caf", "dss", "flac", "m4a", "m4b", "mp3",
    "oga", "voc", "wav", "weba", "wma",
];

/// Video container formats accepted for decode and encode.
pub const VIDEO_FORMATS: &[&str] = &[
    "3g2", "3gp", "3gpp", "avi", "cavs", "dv", "dvr", "flv", "m2ts", "m4v", "mkv", "mod", "mov",
    "mp4", "mpeg", "mpg", "mts", "mxf", "ogg", "rm", "rmvb", "swf", "ts", "vob", "webm", "wmv",
    "wtv",
];

/// Word-processing document formats.
pub const WORD_PROCESSING_FORMATS: &[&str] = &["doc", "docx", "rtf", "odt", "txt", "md", "json"];

/// Spreadsheet formats.
pub const SPREADSHEET_FORMATS: &[&str] = &["xls", "xlsx", "ods", "csv"];

/// Presentation formats.
pub const PRESENTATION_FORMATS: &[&str] = &["ppt", "pptx", "odp"];

/// Publishing formats.
pub const PUBLISHING_FORMATS: &[&str] = &["pdf", "epub", "html"];

/// Errors raised during format validation.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The requested output format is not in the supported set for the kind.
    #[error("Unsupported output format: {format}. Supported formats: {supported}")]
    UnsupportedOutput { format: String, supported: String },

    /// The input filename carries no recognizable extension.
    #[error("Unable to determine input format for: {filename}")]
    UnknownInput { filename: String },
}

/// Media family of a single file.
///
/// A closed set: every supported extension belongs to exactly one family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaFamily {
    Image,
    Audio,
    Video,
    WordProcessing,
    Spreadsheet,
    Presentation,
    Publishing,
}

impl MediaFamily {
    /// Returns the extensions belonging to this family.
    pub fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::Image => IMAGE_FORMATS,
            Self::Audio => AUDIO_FORMATS,
            Self::Video => VIDEO_FORMATS,
            Self::WordProcessing => WORD_PROCESSING_FORMATS,
            Self::Spreadsheet => SPREADSHEET_FORMATS,
            Self::Presentation => PRESENTATION_FORMATS,
            Self::Publishing => PUBLISHING_FORMATS,
        }
    }

    /// Returns the coarse media kind this family belongs to.
    pub fn kind(&self) -> MediaKind {
        match self {
            Self::Image => MediaKind::Image,
            Self::Audio => MediaKind::Audio,
            Self::Video => MediaKind::Video,
            Self::WordProcessing | Self::Spreadsheet | Self::Presentation | Self::Publishing => {
                MediaKind::Document
            }
        }
    }

    /// Whether this family is one of the document families.
    pub fn is_document(&self) -> bool {
        self.kind() == MediaKind::Document
    }
}

/// Coarse media kind; determines the supported-format set used for output
/// validation and batch entry filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
    Audio,
    Video,
    Document,
}

impl MediaKind {
    /// All output formats accepted for this kind.
    pub fn supported_formats(&self) -> Vec<&'static str> {
        match self {
            Self::Image => IMAGE_FORMATS.to_vec(),
            Self::Audio => AUDIO_FORMATS.to_vec(),
            Self::Video => VIDEO_FORMATS.to_vec(),
            Self::Document => WORD_PROCESSING_FORMATS
                .iter()
                .chain(SPREADSHEET_FORMATS)
                .chain(PRESENTATION_FORMATS)
                .chain(PUBLISHING_FORMATS)
                .copied()
                .collect(),
        }
    }

    /// Whether `extension` (already lowercased) is accepted for this kind.
    pub fn accepts_extension(&self, extension: &str) -> bool {
        self.supported_formats().contains(&extension)
    }
}

/// Derives the lowercased extension of a filename: text after the last `.`.
pub fn extension_of(filename: &str) -> Option<String> {
    let ext = filename.rsplit_once('.')?.1;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Classifies a filename into a media family by its extension.
pub fn classify(filename: &str) -> Option<MediaFamily> {
    classify_extension(&extension_of(filename)?)
}

/// Classifies an already-extracted extension (case-insensitive).
pub fn classify_extension(extension: &str) -> Option<MediaFamily> {
    let ext = extension.to_ascii_lowercase();
    let families = [
        MediaFamily::Image,
        MediaFamily::Audio,
        MediaFamily::Video,
        MediaFamily::WordProcessing,
        MediaFamily::Spreadsheet,
        MediaFamily::Presentation,
        MediaFamily::Publishing,
    ];
    families
        .into_iter()
        .find(|f| f.extensions().contains(&ext.as_str()))
}

/// Validates a requested output format against the supported set of a kind.
///
/// Must run before any decode work so that unsupported requests fail fast
/// with the full supported set in the message.
pub fn validate_output(kind: MediaKind, format: &str) -> Result<String, FormatError> {
    let normalized = format.to_ascii_lowercase();
    if kind.accepts_extension(&normalized) {
        Ok(normalized)
    } else {
        Err(FormatError::UnsupportedOutput {
            format: format.to_string(),
            supported: kind.supported_formats().join(", "),
        })
    }
}

/// Supported output formats for a kind, for callers that want to list them.
pub fn supported_formats(kind: MediaKind) -> Vec<&'static str> {
    kind.supported_formats()
}

/// Serializable report of every supported format set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityReport {
    pub images: Vec<String>,
    pub audios: Vec<String>,
    pub videos: Vec<String>,
    pub word_processing: Vec<String>,
    pub spreadsheet: Vec<String>,
    pub presentation: Vec<String>,
    pub publishing: Vec<String>,
}

impl CapabilityReport {
    pub fn new() -> Self {
        let owned = |s: &[&str]| s.iter().map(|f| f.to_string()).collect();
        Self {
            images: owned(IMAGE_FORMATS),
            audios: owned(AUDIO_FORMATS),
            videos: owned(VIDEO_FORMATS),
            word_processing: owned(WORD_PROCESSING_FORMATS),
            spreadsheet: owned(SPREADSHEET_FORMATS),
            presentation: owned(PRESENTATION_FORMATS),
            publishing: owned(PUBLISHING_FORMATS),
        }
    }
}

impl Default for CapabilityReport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_by_extension() {
        assert_eq!(classify("photo.JPG"), Some(MediaFamily::Image));
        assert_eq!(classify("song.flac"), Some(MediaFamily::Audio));
        assert_eq!(classify("clip.mkv"), Some(MediaFamily::Video));
        assert_eq!(classify("report.docx"), Some(MediaFamily::WordProcessing));
        assert_eq!(classify("sheet.csv"), Some(MediaFamily::Spreadsheet));
        assert_eq!(classify("deck.pptx"), Some(MediaFamily::Presentation));
        assert_eq!(classify("book.epub"), Some(MediaFamily::Publishing));
    }

    #[test]
    fn test_classify_unknown() {
        assert_eq!(classify("archive.xyz"), None);
        assert_eq!(classify("noextension"), None);
        assert_eq!(classify("trailing."), None);
    }

    #[test]
    fn test_validate_output_accepts_case_insensitive() {
        assert_eq!(validate_output(MediaKind::Image, "PNG").unwrap(), "png");
        assert_eq!(validate_output(MediaKind::Document, "pdf").unwrap(), "pdf");
    }

    #[test]
    fn test_validate_output_lists_supported_set() {
        let err = validate_output(MediaKind::Image, "tiff").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("tiff"));
        assert!(msg.contains("png"));
        assert!(msg.contains("webp"));
    }

    #[test]
    fn test_document_kind_spans_all_document_families() {
        let formats = MediaKind::Document.supported_formats();
        assert!(formats.contains(&"docx"));
        assert!(formats.contains(&"csv"));
        assert!(formats.contains(&"pptx"));
        assert!(formats.contains(&"pdf"));
        assert!(!formats.contains(&"mp3"));
    }

    #[test]
    fn test_capability_report_covers_every_family() {
        let report = CapabilityReport::new();
        assert!(!report.images.is_empty());
        assert!(!report.audios.is_empty());
        assert!(!report.videos.is_empty());
        assert!(!report.word_processing.is_empty());
        assert!(!report.spreadsheet.is_empty());
        assert!(!report.presentation.is_empty());
        assert!(!report.publishing.is_empty());
    }
}
