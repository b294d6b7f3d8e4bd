//! Transform specification types.

use serde::{Deserialize, Serialize};

use super::error::TransformError;

/// Resize request. With both dimensions the image is resized exactly
/// (aspect ratio not preserved); with one, the other is derived from the
/// original aspect ratio, rounded to the nearest pixel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
}

/// Crop rectangle. Coordinates are clamped into the image bounds; a
/// degenerate result is a no-op rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropSpec {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Trim window in seconds. Start defaults to 0, end to the item duration;
/// an out-of-range end is clamped and a start past the duration yields an
/// empty result.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrimSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_secs: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_secs: Option<f64>,
}

/// Named anchor positions for watermark placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WatermarkAnchor {
    Center,
    /// 45° through the center; text watermarks only.
    Diagonal,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Default for WatermarkAnchor {
    fn default() -> Self {
        Self::BottomRight
    }
}

/// Watermark payload: literal text or logo image bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WatermarkSource {
    Text(String),
    Logo(Vec<u8>),
}

/// Watermark request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatermarkSpec {
    pub source: WatermarkSource,
    #[serde(default)]
    pub anchor: WatermarkAnchor,
    /// Alpha in `[0, 255]`; 0 leaves the host untouched.
    #[serde(default = "default_opacity")]
    pub opacity: u8,
}

fn default_opacity() -> u8 {
    128
}

impl WatermarkSpec {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            source: WatermarkSource::Text(text.into()),
            anchor: WatermarkAnchor::default(),
            opacity: default_opacity(),
        }
    }

    pub fn logo(bytes: Vec<u8>) -> Self {
        Self {
            source: WatermarkSource::Logo(bytes),
            anchor: WatermarkAnchor::default(),
            opacity: default_opacity(),
        }
    }

    pub fn with_anchor(mut self, anchor: WatermarkAnchor) -> Self {
        self.anchor = anchor;
        self
    }

    pub fn with_opacity(mut self, opacity: u8) -> Self {
        self.opacity = opacity;
        self
    }
}

/// The validated, ordered set of requested transform operations for one
/// request. Built once from caller input, read-only thereafter; absent
/// operations are skipped, not defaulted to identity calls.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransformSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resize: Option<ResizeSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub crop: Option<CropSpec>,
    /// Rotation in degrees, clockwise. Multiples of 90 are lossless.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rotate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trim: Option<TrimSpec>,
    #[serde(default)]
    pub normalize: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub watermark: Option<WatermarkSpec>,
}

impl TransformSpec {
    /// Validates every present parameter, failing fast on the first bad one.
    pub fn validate(&self) -> Result<(), TransformError> {
        if let Some(ref resize) = self.resize {
            if resize.width.is_none() && resize.height.is_none() {
                return Err(TransformError::invalid(
                    "Resize requires a width or a height",
                ));
            }
            if resize.width == Some(0) || resize.height == Some(0) {
                return Err(TransformError::invalid(
                    "Width and height must be positive integers",
                ));
            }
        }
        if let Some(degrees) = self.rotate {
            if degrees > 360 {
                return Err(TransformError::invalid(
                    "Rotate must be a number between 0 and 360 degrees",
                ));
            }
        }
        if let Some(ref trim) = self.trim {
            for (name, value) in [("start", trim.start_secs), ("end", trim.end_secs)] {
                if let Some(secs) = value {
                    if !secs.is_finite() || secs < 0.0 {
                        return Err(TransformError::invalid(format!(
                            "Trim {name} time must be a non-negative number of seconds"
                        )));
                    }
                }
            }
        }
        if let Some(ref watermark) = self.watermark {
            match &watermark.source {
                WatermarkSource::Text(text) if text.is_empty() => {
                    return Err(TransformError::invalid("Watermark text must not be empty"));
                }
                WatermarkSource::Logo(bytes) if bytes.is_empty() => {
                    return Err(TransformError::invalid(
                        "Watermark image must not be empty",
                    ));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Whether no transform was requested at all.
    pub fn is_empty(&self) -> bool {
        self.resize.is_none()
            && self.crop.is_none()
            && self.rotate.is_none()
            && self.trim.is_none()
            && !self.normalize
            && self.watermark.is_none()
    }
}
