//! Configuration for codec collaborators.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the subprocess-backed codecs (ffmpeg, pandoc).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Path to the ffmpeg binary.
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: PathBuf,

    /// Path to the pandoc binary.
    #[serde(default = "default_pandoc_path")]
    pub pandoc_path: PathBuf,

    /// Directory for intermediate files.
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,

    /// Wall-clock budget for a single collaborator call in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// FFmpeg log level passed via `-loglevel`.
    #[serde(default = "default_log_level")]
    pub ffmpeg_log_level: String,
}

fn default_ffmpeg_path() -> PathBuf {
    PathBuf::from("ffmpeg")
}

fn default_pandoc_path() -> PathBuf {
    PathBuf::from("pandoc")
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir().join("frantoio")
}

fn default_timeout() -> u64 {
    300
}

fn default_log_level() -> String {
    "error".to_string()
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            pandoc_path: default_pandoc_path(),
            temp_dir: default_temp_dir(),
            timeout_secs: default_timeout(),
            ffmpeg_log_level: default_log_level(),
        }
    }
}

impl CodecConfig {
    /// Sets the temp directory.
    pub fn with_temp_dir(mut self, temp_dir: PathBuf) -> Self {
        self.temp_dir = temp_dir;
        self
    }

    /// Sets the per-call timeout in seconds.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Configuration for the HTTP text-to-speech collaborator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Synthesis endpoint; the text is passed as a query parameter.
    #[serde(default = "default_speech_endpoint")]
    pub endpoint: String,

    /// Language hint sent with each request.
    #[serde(default = "default_speech_language")]
    pub language: String,

    /// Request timeout in seconds.
    #[serde(default = "default_speech_timeout")]
    pub timeout_secs: u64,

    /// Attenuation applied to the synthesized clip before overlay, in dB.
    #[serde(default = "default_volume_reduction")]
    pub volume_reduction_db: f32,
}

fn default_speech_endpoint() -> String {
    "http://localhost:5002/api/tts".to_string()
}

fn default_speech_language() -> String {
    "en".to_string()
}

fn default_speech_timeout() -> u64 {
    30
}

fn default_volume_reduction() -> f32 {
    -6.0
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            endpoint: default_speech_endpoint(),
            language: default_speech_language(),
            timeout_secs: default_speech_timeout(),
            volume_reduction_db: default_volume_reduction(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_codec_config() {
        let config = CodecConfig::default();
        assert_eq!(config.ffmpeg_path, PathBuf::from("ffmpeg"));
        assert_eq!(config.pandoc_path, PathBuf::from("pandoc"));
        assert_eq!(config.timeout_secs, 300);
    }

    #[test]
    fn test_config_builder() {
        let config = CodecConfig::default()
            .with_temp_dir(PathBuf::from("/tmp/test"))
            .with_timeout(60);
        assert_eq!(config.temp_dir, PathBuf::from("/tmp/test"));
        assert_eq!(config.timeout_secs, 60);
    }

    #[test]
    fn test_speech_defaults() {
        let config = SpeechConfig::default();
        assert_eq!(config.language, "en");
        assert_eq!(config.volume_reduction_db, -6.0);
    }
}
