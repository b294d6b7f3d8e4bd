//! FFmpeg-backed audio codec.
//!
//! Bridges between arbitrary audio containers and `AudioClip` through a
//! 16-bit WAV intermediate: ffmpeg handles the container/codec work and the
//! WAV payload is parsed in-process.

use async_trait::async_trait;
use std::io::Cursor;
use tracing::debug;
use uuid::Uuid;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use super::config::CodecConfig;
use super::error::CodecError;
use super::process::{run_tool, stderr_tail};
use super::traits::AudioCodec;
use super::types::AudioClip;

/// FFmpeg subprocess implementation of [`AudioCodec`].
pub struct FfmpegAudioCodec {
    config: CodecConfig,
}

impl FfmpegAudioCodec {
    /// Creates a new codec with the given configuration.
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Creates a codec with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(CodecConfig::default())
    }

    async fn stage_input(&self, bytes: &[u8], format: &str) -> Result<tempfile::NamedTempFile, CodecError> {
        tokio::fs::create_dir_all(&self.config.temp_dir).await?;
        let file = tempfile::Builder::new()
            .prefix("audio-in-")
            .suffix(&format!(".{}", sanitize_extension(format)))
            .tempfile_in(&self.config.temp_dir)?;
        std::fs::write(file.path(), bytes)?;
        Ok(file)
    }
}

#[async_trait]
impl AudioCodec for FfmpegAudioCodec {
    fn name(&self) -> &str {
        "ffmpeg"
    }

    async fn decode(&self, bytes: &[u8], format: &str) -> Result<AudioClip, CodecError> {
        let input = self.stage_input(bytes, format).await?;

        let args = vec![
            "-y".to_string(),
            "-i".to_string(),
            input.path().to_string_lossy().to_string(),
            "-f".to_string(),
            "wav".to_string(),
            "-acodec".to_string(),
            "pcm_s16le".to_string(),
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
            "pipe:1".to_string(),
        ];

        let output = run_tool(&self.config.ffmpeg_path, &args, self.config.timeout_secs).await?;
        if !output.status.success() {
            return Err(CodecError::DecodeFailed {
                reason: format!(
                    "ffmpeg could not decode {} input: {}",
                    format,
                    stderr_tail(&output).unwrap_or_default()
                ),
            });
        }

        debug!(format, bytes = output.stdout.len(), "decoded audio to wav");
        clip_from_wav(&output.stdout)
    }

    async fn encode(
        &self,
        clip: &AudioClip,
        format: &str,
        bitrate: Option<&str>,
    ) -> Result<Vec<u8>, CodecError> {
        let wav = clip_to_wav(clip)?;
        let input = self.stage_input(&wav, "wav").await?;
        let output_path = self
            .config
            .temp_dir
            .join(format!("audio-out-{}.{}", Uuid::new_v4(), sanitize_extension(format)));

        let mut args = vec![
            "-y".to_string(),
            "-i".to_string(),
            input.path().to_string_lossy().to_string(),
        ];
        if let Some(bitrate) = bitrate {
            args.extend(["-b:a".to_string(), bitrate.to_string()]);
        }
        args.extend([
            "-loglevel".to_string(),
            self.config.ffmpeg_log_level.clone(),
            output_path.to_string_lossy().to_string(),
        ]);

        let output = run_tool(&self.config.ffmpeg_path, &args, self.config.timeout_secs).await?;
        if !output.status.success() {
            let _ = tokio::fs::remove_file(&output_path).await;
            return Err(CodecError::encode_failed(
                format!("ffmpeg could not encode to {}", format),
                stderr_tail(&output),
            ));
        }

        let bytes = tokio::fs::read(&output_path).await?;
        let _ = tokio::fs::remove_file(&output_path).await;
        Ok(bytes)
    }
}

fn sanitize_extension(format: &str) -> String {
    format
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

/// Parses WAV bytes into an `AudioClip`.
pub(crate) fn clip_from_wav(bytes: &[u8]) -> Result<AudioClip, CodecError> {
    let reader = WavReader::new(Cursor::new(bytes))
        .map_err(|e| CodecError::decode_failed(format!("invalid wav payload: {e}")))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<_, _>>()
            .map_err(|e| CodecError::decode_failed(format!("wav sample read failed: {e}")))?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<Result<_, _>>()
                .map_err(|e| CodecError::decode_failed(format!("wav sample read failed: {e}")))?
        }
    };

    Ok(AudioClip::new(spec.sample_rate, spec.channels, samples))
}

/// Serializes an `AudioClip` as 16-bit PCM WAV.
pub(crate) fn clip_to_wav(clip: &AudioClip) -> Result<Vec<u8>, CodecError> {
    let spec = WavSpec {
        channels: clip.channels(),
        sample_rate: clip.sample_rate(),
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = WavWriter::new(&mut cursor, spec)
        .map_err(|e| CodecError::encode_failed(format!("wav writer: {e}"), None))?;
    for sample in clip.samples() {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer
            .write_sample(value)
            .map_err(|e| CodecError::encode_failed(format!("wav write: {e}"), None))?;
    }
    writer
        .finalize()
        .map_err(|e| CodecError::encode_failed(format!("wav finalize: {e}"), None))?;

    Ok(cursor.into_inner())
}
