//! FFmpeg video transcoder.

use tracing::{debug, warn};
use uuid::Uuid;

use crate::codec::{CodecConfig, CodecError};
use crate::transform::{TransformSpec, WatermarkSource};

use super::types::{video_codec_for, VideoQuality};

/// Audio-only target formats: the video stream is dropped and the audio
/// track is extracted instead.
const AUDIO_TARGETS: &[&str] = &["mp3", "wav", "aac", "ogg"];

/// Subprocess-backed video transcoder.
pub struct VideoTranscoder {
    config: CodecConfig,
}

impl VideoTranscoder {
    /// Creates a transcoder with the given configuration.
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Converts a video, applying the requested filter-graph transforms.
    ///
    /// Returns the output bytes together with the applied-feature labels.
    pub async fn process(
        &self,
        bytes: &[u8],
        input_format: &str,
        output_format: &str,
        spec: &TransformSpec,
        quality: VideoQuality,
    ) -> Result<(Vec<u8>, Vec<String>), CodecError> {
        tokio::fs::create_dir_all(&self.config.temp_dir).await?;
        let input = tempfile::Builder::new()
            .prefix("video-in-")
            .suffix(&format!(".{}", sanitize(input_format)))
            .tempfile_in(&self.config.temp_dir)?;
        std::fs::write(input.path(), bytes)?;

        let output_path = self
            .config
            .temp_dir
            .join(format!("video-out-{}.{}", Uuid::new_v4(), sanitize(output_format)));

        let (args, applied) = self.build_args(
            &input.path().to_string_lossy(),
            &output_path.to_string_lossy(),
            output_format,
            spec,
            quality,
        );

        let output =
            crate::codec::run_tool(&self.config.ffmpeg_path, &args, self.config.timeout_secs)
                .await?;
        if !output.status.success() {
            let _ = tokio::fs::remove_file(&output_path).await;
            return Err(CodecError::encode_failed(
                format!("ffmpeg could not process video to {output_format}"),
                crate::codec::stderr_tail(&output),
            ));
        }

        let bytes = tokio::fs::read(&output_path).await?;
        let _ = tokio::fs::remove_file(&output_path).await;
        debug!(output_format, bytes = bytes.len(), "video processed");
        Ok((bytes, applied))
    }

    /// Extracts the audio track of a video as 128k mp3.
    pub async fn extract_audio(
        &self,
        bytes: &[u8],
        input_format: &str,
    ) -> Result<Vec<u8>, CodecError> {
        tokio::fs::create_dir_all(&self.config.temp_dir).await?;
        let input = tempfile::Builder::new()
            .prefix("video-in-")
            .suffix(&format!(".{}", sanitize(input_format)))
            .tempfile_in(&self.config.temp_dir)?;
        std::fs::write(input.path(), bytes)?;

        let output_path = self
            .config
            .temp_dir
            .join(format!("audio-track-{}.mp3", Uuid::new_v4()));

        let args = vec![
            "-y".to_string(),
            "-i".to_string(),
            input.path().to_string_lossy().to_string(),
            "-vn".to_string(),
            "-acodec".to_string(),
            "libmp3lame".to_string(),
            "-b:a".to_string(),
            "128k".to_string(),
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
            output_path.to_string_lossy().to_string(),
        ];

        let output =
            crate::codec::run_tool(&self.config.ffmpeg_path, &args, self.config.timeout_secs)
                .await?;
        if !output.status.success() {
            let _ = tokio::fs::remove_file(&output_path).await;
            return Err(CodecError::encode_failed(
                "ffmpeg could not extract the audio track",
                crate::codec::stderr_tail(&output),
            ));
        }

        let bytes = tokio::fs::read(&output_path).await?;
        let _ = tokio::fs::remove_file(&output_path).await;
        Ok(bytes)
    }

    /// Builds the ffmpeg invocation for one video request.
    fn build_args(
        &self,
        input: &str,
        output: &str,
        output_format: &str,
        spec: &TransformSpec,
        quality: VideoQuality,
    ) -> (Vec<String>, Vec<String>) {
        let mut args = vec!["-y".to_string(), "-i".to_string(), input.to_string()];
        let mut applied = Vec::new();
        let mut filters = Vec::new();

        if let Some(ref resize) = spec.resize {
            let filter = match (resize.width, resize.height) {
                (Some(w), Some(h)) => format!("scale={w}:{h}"),
                (Some(w), None) => format!("scale={w}:-2"),
                (None, Some(h)) => format!("scale=-2:{h}"),
                (None, None) => String::new(),
            };
            if !filter.is_empty() {
                filters.push(filter);
                applied.push("resolution_change".to_string());
            }
        }

        if let Some(ref watermark) = spec.watermark {
            match &watermark.source {
                WatermarkSource::Text(text) => {
                    filters.push(format!(
                        "drawtext=text='{}':fontsize=50:fontcolor=white:x=(w-text_w)/2:y=(h-text_h)/2",
                        escape_drawtext(text)
                    ));
                    applied.push("watermarking".to_string());
                }
                WatermarkSource::Logo(_) => {
                    warn!("logo watermarks are not supported for video, skipping");
                }
            }
        }

        let audio_target = AUDIO_TARGETS.contains(&output_format);
        if !filters.is_empty() && !audio_target {
            args.extend(["-vf".to_string(), filters.join(",")]);
        }

        if let Some(ref trim) = spec.trim {
            if let Some(start) = trim.start_secs {
                args.extend(["-ss".to_string(), format_secs(start)]);
            }
            if let Some(end) = trim.end_secs {
                args.extend(["-to".to_string(), format_secs(end)]);
            }
            applied.push("trimming".to_string());
        }

        if audio_target {
            args.push("-vn".to_string());
            if let Some((_, audio_bitrate)) = quality.bitrates() {
                args.extend(["-b:a".to_string(), audio_bitrate.to_string()]);
                applied.push("compression".to_string());
            }
            applied.push("audio_extraction".to_string());
        } else {
            args.extend([
                "-c:v".to_string(),
                video_codec_for(output_format).to_string(),
                "-c:a".to_string(),
                "aac".to_string(),
            ]);
            if let Some((video_bitrate, audio_bitrate)) = quality.bitrates() {
                args.extend([
                    "-b:v".to_string(),
                    video_bitrate.to_string(),
                    "-b:a".to_string(),
                    audio_bitrate.to_string(),
                ]);
                applied.push("compression".to_string());
            }
        }

        args.extend([
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
            output.to_string(),
        ]);

        (args, applied)
    }
}

fn sanitize(format: &str) -> String {
    format
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

fn format_secs(secs: f64) -> String {
    format!("{secs:.3}")
}

/// Escapes text for a drawtext filter argument.
fn escape_drawtext(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace(':', "\\:")
        .replace('\'', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::{ResizeSpec, TrimSpec, WatermarkSpec};

    fn transcoder() -> VideoTranscoder {
        VideoTranscoder::new(CodecConfig::default())
    }

    #[test]
    fn test_build_args_plain_conversion() {
        let (args, applied) = transcoder().build_args(
            "/in.avi",
            "/out.mp4",
            "mp4",
            &TransformSpec::default(),
            VideoQuality::Medium,
        );
        assert!(args.contains(&"-c:v".to_string()));
        assert!(args.contains(&"libx264".to_string()));
        assert!(args.contains(&"-b:v".to_string()));
        assert!(args.contains(&"1000k".to_string()));
        assert_eq!(applied, vec!["compression"]);
    }

    #[test]
    fn test_build_args_filters_combined() {
        let spec = TransformSpec {
            resize: Some(ResizeSpec {
                width: Some(1280),
                height: Some(720),
            }),
            watermark: Some(WatermarkSpec::text("sample: mark")),
            ..Default::default()
        };
        let (args, applied) =
            transcoder().build_args("/in.mkv", "/out.mp4", "mp4", &spec, VideoQuality::Original);

        let vf_index = args.iter().position(|a| a == "-vf").unwrap();
        let filter = &args[vf_index + 1];
        assert!(filter.contains("scale=1280:720"));
        assert!(filter.contains("drawtext=text='sample\\: mark'"));
        assert!(applied.contains(&"resolution_change".to_string()));
        assert!(applied.contains(&"watermarking".to_string()));
        // Original quality carries no bitrate arguments.
        assert!(!args.contains(&"-b:v".to_string()));
    }

    #[test]
    fn test_build_args_trim_window() {
        let spec = TransformSpec {
            trim: Some(TrimSpec {
                start_secs: Some(1.5),
                end_secs: Some(10.0),
            }),
            ..Default::default()
        };
        let (args, applied) =
            transcoder().build_args("/in.mp4", "/out.webm", "webm", &spec, VideoQuality::Low);
        assert!(args.contains(&"-ss".to_string()));
        assert!(args.contains(&"1.500".to_string()));
        assert!(args.contains(&"-to".to_string()));
        assert!(args.contains(&"10.000".to_string()));
        assert!(args.contains(&"libvpx".to_string()));
        assert!(applied.contains(&"trimming".to_string()));
    }

    #[test]
    fn test_build_args_audio_target_drops_video() {
        let (args, applied) = transcoder().build_args(
            "/in.mp4",
            "/out.mp3",
            "mp3",
            &TransformSpec::default(),
            VideoQuality::Medium,
        );
        assert!(args.contains(&"-vn".to_string()));
        assert!(!args.contains(&"-c:v".to_string()));
        assert!(applied.contains(&"audio_extraction".to_string()));
    }
}
