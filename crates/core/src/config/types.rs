//! Configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::codec::{CodecConfig, SpeechConfig};

/// Root configuration for the conversion gateway.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub codec: CodecConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub watermark: WatermarkConfig,
}

/// Watermark rendering configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatermarkConfig {
    /// Candidate font files tried in order for text watermarks. When none
    /// is usable the watermark degrades to the unmodified image.
    #[serde(default = "default_font_paths")]
    pub font_paths: Vec<PathBuf>,
}

fn default_font_paths() -> Vec<PathBuf> {
    vec![
        PathBuf::from("/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf"),
        PathBuf::from("/usr/share/fonts/TTF/DejaVuSans.ttf"),
        PathBuf::from("/Library/Fonts/Arial.ttf"),
        PathBuf::from("C:\\Windows\\Fonts\\arial.ttf"),
    ]
}

impl Default for WatermarkConfig {
    fn default() -> Self {
        Self {
            font_paths: default_font_paths(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_round_trips_through_json() {
        let config = GatewayConfig::default();
        let json = serde_json::to_string(&config).unwrap();
        let parsed: GatewayConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.codec.timeout_secs, config.codec.timeout_secs);
        assert_eq!(parsed.watermark.font_paths, config.watermark.font_paths);
    }

    #[test]
    fn test_font_candidates_present_by_default() {
        let config = WatermarkConfig::default();
        assert!(!config.font_paths.is_empty());
    }
}
