//! Pipeline request and result types.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::codec::AudioClip;
use crate::family::MediaKind;
use crate::transform::{TransformError, TransformSpec};
use crate::video::VideoQuality;

/// Export parameters applied at encode time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportOptions {
    /// Quality for jpeg output, 1-100.
    #[serde(default = "default_quality")]
    pub quality: u8,

    /// Audio bitrate such as `"128k"` or `"44100"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bitrate: Option<String>,

    /// Video compression preset.
    #[serde(default)]
    pub video_quality: VideoQuality,

    /// Also extract the audio track of a video as an additional artifact.
    #[serde(default)]
    pub extract_audio: bool,
}

fn default_quality() -> u8 {
    90
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            quality: default_quality(),
            bitrate: None,
            video_quality: VideoQuality::default(),
            extract_audio: false,
        }
    }
}

impl ExportOptions {
    /// Validates every present parameter.
    pub fn validate(&self) -> Result<(), TransformError> {
        if !(1..=100).contains(&self.quality) {
            return Err(TransformError::invalid(
                "Quality must be a number between 1 and 100",
            ));
        }
        if let Some(ref bitrate) = self.bitrate {
            let digits = bitrate.strip_suffix('k').unwrap_or(bitrate);
            if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
                return Err(TransformError::invalid(
                    "Bitrate must be in format like '128k' or '44100'",
                ));
            }
        }
        Ok(())
    }
}

/// One logical unit of conversion work: the target format plus the
/// validated transform and export parameters shared by a request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionRequest {
    /// Requested output format (extension, lowercase).
    pub output_format: String,

    #[serde(default)]
    pub transforms: TransformSpec,

    #[serde(default)]
    pub options: ExportOptions,
}

impl ConversionRequest {
    pub fn new(output_format: impl Into<String>) -> Self {
        Self {
            output_format: output_format.into().to_ascii_lowercase(),
            transforms: TransformSpec::default(),
            options: ExportOptions::default(),
        }
    }

    pub fn with_transforms(mut self, transforms: TransformSpec) -> Self {
        self.transforms = transforms;
        self
    }

    pub fn with_options(mut self, options: ExportOptions) -> Self {
        self.options = options;
        self
    }
}

/// Result of one successful conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionResult {
    /// Encoded output payload.
    pub output_bytes: Vec<u8>,

    /// Suggested output filename (input stem, new extension).
    pub output_filename: String,

    /// Labels of the features that were actually applied.
    pub applied_features: Vec<String>,

    /// Secondary artifacts (e.g. an extracted audio track), as
    /// (filename, bytes) pairs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub additional_outputs: Vec<(String, Vec<u8>)>,
}

/// Failure of one conversion, attributed to the input it came from.
///
/// Produced instead of (never alongside) a `ConversionResult`.
#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[error("Failed to process {entry_name}: {message}")]
pub struct ConversionError {
    pub entry_name: String,
    pub message: String,
}

impl ConversionError {
    pub fn new(entry_name: impl Into<String>, message: impl ToString) -> Self {
        Self {
            entry_name: entry_name.into(),
            message: message.to_string(),
        }
    }
}

/// An in-memory decoded media value, exclusively owned by the executing
/// request and dropped after encode.
pub enum MediaItem {
    Image(DynamicImage),
    Audio(AudioClip),
}

impl MediaItem {
    /// The media kind of this item.
    pub fn kind(&self) -> MediaKind {
        match self {
            Self::Image(_) => MediaKind::Image,
            Self::Audio(_) => MediaKind::Audio,
        }
    }
}

impl std::fmt::Debug for MediaItem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Image(img) => f
                .debug_struct("MediaItem::Image")
                .field("width", &img.width())
                .field("height", &img.height())
                .finish(),
            Self::Audio(clip) => f
                .debug_struct("MediaItem::Audio")
                .field("duration_ms", &clip.duration_ms())
                .field("channels", &clip.channels())
                .finish(),
        }
    }
}
