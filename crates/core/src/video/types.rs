//! Video quality presets and codec selection.

use serde::{Deserialize, Serialize};

/// Compression quality preset mapping to video/audio bitrate pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoQuality {
    Low,
    Medium,
    High,
    /// Keep the encoder defaults; no bitrate arguments.
    Original,
}

impl Default for VideoQuality {
    fn default() -> Self {
        Self::Medium
    }
}

impl VideoQuality {
    /// Returns `(video_bitrate, audio_bitrate)` arguments, if any.
    pub fn bitrates(&self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Low => Some(("500k", "64k")),
            Self::Medium => Some(("1000k", "128k")),
            Self::High => Some(("2000k", "192k")),
            Self::Original => None,
        }
    }
}

/// Maps an output container to its ffmpeg video codec.
pub fn video_codec_for(format: &str) -> &'static str {
    match format {
        "webm" => "libvpx",
        "flv" => "flv",
        "wmv" => "wmv2",
        "mpg" | "mpeg" => "mpeg2video",
        _ => "libx264",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quality_bitrates() {
        assert_eq!(VideoQuality::Low.bitrates(), Some(("500k", "64k")));
        assert_eq!(VideoQuality::Medium.bitrates(), Some(("1000k", "128k")));
        assert_eq!(VideoQuality::High.bitrates(), Some(("2000k", "192k")));
        assert_eq!(VideoQuality::Original.bitrates(), None);
    }

    #[test]
    fn test_codec_map() {
        assert_eq!(video_codec_for("mp4"), "libx264");
        assert_eq!(video_codec_for("webm"), "libvpx");
        assert_eq!(video_codec_for("mpeg"), "mpeg2video");
        assert_eq!(video_codec_for("unknown"), "libx264");
    }
}
