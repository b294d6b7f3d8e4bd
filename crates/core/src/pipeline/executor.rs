//! The pipeline executor.

use std::io::Cursor;
use std::sync::Arc;
use tracing::{debug, warn};

use image::DynamicImage;

use crate::codec::{
    AudioCodec, CodecError, FfmpegAudioCodec, HttpSynthesizer, PandocConverter, SpeechSynthesizer,
    UniversalConverter,
};
use crate::config::GatewayConfig;
use crate::document::{pdf_to_text, watermark_pdf};
use crate::family::{classify_extension, extension_of, validate_output, FormatError, MediaKind};
use crate::strategy::StrategySelector;
use crate::transform::{
    apply_audio_transforms, apply_image_transforms, WatermarkSource, WatermarkSpec,
};
use crate::video::VideoTranscoder;

use super::error::PipelineError;
use super::types::{ConversionError, ConversionRequest, ConversionResult, MediaItem};

/// Executes conversion requests over injected codec collaborators.
///
/// One executor serves many requests; it holds no per-request state, so
/// requests are independent and safe to run from separate tasks.
pub struct PipelineExecutor {
    config: GatewayConfig,
    audio_codec: Arc<dyn AudioCodec>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    universal: Arc<dyn UniversalConverter>,
    video: VideoTranscoder,
}

impl PipelineExecutor {
    /// Creates an executor over explicit collaborators.
    pub fn new(
        config: GatewayConfig,
        audio_codec: Arc<dyn AudioCodec>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        universal: Arc<dyn UniversalConverter>,
    ) -> Self {
        let video = VideoTranscoder::new(config.codec.clone());
        Self {
            config,
            audio_codec,
            synthesizer,
            universal,
            video,
        }
    }

    /// Creates an executor wired to the default tool-backed collaborators
    /// (ffmpeg, pandoc, HTTP speech synthesis).
    pub fn with_defaults(config: GatewayConfig) -> Result<Self, CodecError> {
        let audio_codec = Arc::new(FfmpegAudioCodec::new(config.codec.clone()));
        let synthesizer = Arc::new(HttpSynthesizer::new(config.speech.clone())?);
        let universal = Arc::new(PandocConverter::new(config.codec.clone()));
        Ok(Self::new(config, audio_codec, synthesizer, universal))
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// Converts one input. Any stage failure surfaces as a
    /// `ConversionError` attributed to the original filename.
    pub async fn execute(
        &self,
        bytes: &[u8],
        filename: &str,
        request: &ConversionRequest,
    ) -> Result<ConversionResult, ConversionError> {
        self.run(bytes, filename, request)
            .await
            .map_err(|e| ConversionError::new(filename, e))
    }

    async fn run(
        &self,
        bytes: &[u8],
        filename: &str,
        request: &ConversionRequest,
    ) -> Result<ConversionResult, PipelineError> {
        let input_format = extension_of(filename).ok_or_else(|| FormatError::UnknownInput {
            filename: filename.to_string(),
        })?;
        let family =
            classify_extension(&input_format).ok_or_else(|| FormatError::UnknownInput {
                filename: filename.to_string(),
            })?;
        let kind = family.kind();

        // Output validation happens before any decode work.
        let output_format = validate_video_aware(kind, &request.output_format)?;
        request.transforms.validate()?;
        request.options.validate()?;

        let stem = file_stem(filename);
        let output_filename = format!("{stem}.{output_format}");
        debug!(filename, %output_format, ?kind, "pipeline execution started");

        match kind {
            MediaKind::Image | MediaKind::Audio => {
                let item = self.decode(bytes, kind, &input_format).await?;
                let (output_bytes, applied) =
                    self.transform_and_encode(item, request, &output_format).await?;
                Ok(ConversionResult {
                    output_bytes,
                    output_filename,
                    applied_features: applied,
                    additional_outputs: Vec::new(),
                })
            }
            MediaKind::Video => {
                let (output_bytes, applied) = self
                    .video
                    .process(
                        bytes,
                        &input_format,
                        &output_format,
                        &request.transforms,
                        request.options.video_quality,
                    )
                    .await?;

                let mut additional_outputs = Vec::new();
                if request.options.extract_audio {
                    match self.video.extract_audio(bytes, &input_format).await {
                        Ok(track) => {
                            additional_outputs.push((format!("{stem}-audio.mp3"), track));
                        }
                        Err(e) => warn!(error = %e, "audio extraction failed, skipping artifact"),
                    }
                }

                Ok(ConversionResult {
                    output_bytes,
                    output_filename,
                    applied_features: applied,
                    additional_outputs,
                })
            }
            MediaKind::Document => {
                let selector = StrategySelector::new(self.universal.as_ref());
                let (output_bytes, method) = selector
                    .convert(bytes, &input_format, &output_format)
                    .await?;
                Ok(ConversionResult {
                    output_bytes,
                    output_filename,
                    applied_features: vec!["format_conversion".to_string(), method.to_string()],
                    additional_outputs: Vec::new(),
                })
            }
        }
    }

    async fn decode(
        &self,
        bytes: &[u8],
        kind: MediaKind,
        input_format: &str,
    ) -> Result<MediaItem, PipelineError> {
        match kind {
            MediaKind::Image => {
                let img = image::load_from_memory(bytes).map_err(PipelineError::decode)?;
                Ok(MediaItem::Image(img))
            }
            MediaKind::Audio => {
                let clip = self.audio_codec.decode(bytes, input_format).await?;
                Ok(MediaItem::Audio(clip))
            }
            _ => Err(PipelineError::decode(format!(
                "{kind:?} is not decoded in memory"
            ))),
        }
    }

    async fn transform_and_encode(
        &self,
        item: MediaItem,
        request: &ConversionRequest,
        output_format: &str,
    ) -> Result<(Vec<u8>, Vec<String>), PipelineError> {
        match item {
            MediaItem::Image(img) => {
                let (img, applied) = apply_image_transforms(
                    img,
                    &request.transforms,
                    &self.config.watermark.font_paths,
                );
                let bytes = encode_image(img, output_format, request.options.quality)?;
                Ok((bytes, applied))
            }
            MediaItem::Audio(clip) => {
                let (clip, applied) = apply_audio_transforms(
                    clip,
                    &request.transforms,
                    self.synthesizer.as_ref(),
                    self.audio_codec.as_ref(),
                    self.config.speech.volume_reduction_db,
                )
                .await;
                let bytes = self
                    .audio_codec
                    .encode(&clip, output_format, request.options.bitrate.as_deref())
                    .await?;
                Ok((bytes, applied))
            }
        }
    }

    /// Draws a text watermark onto a document.
    ///
    /// PDFs are watermarked in place; other documents are converted to PDF
    /// first, so the output is always a PDF.
    pub async fn watermark_document(
        &self,
        bytes: &[u8],
        filename: &str,
        spec: &WatermarkSpec,
    ) -> Result<ConversionResult, ConversionError> {
        self.watermark_document_inner(bytes, filename, spec)
            .await
            .map_err(|e| ConversionError::new(filename, e))
    }

    async fn watermark_document_inner(
        &self,
        bytes: &[u8],
        filename: &str,
        spec: &WatermarkSpec,
    ) -> Result<ConversionResult, PipelineError> {
        let text = match &spec.source {
            WatermarkSource::Text(text) => text.clone(),
            WatermarkSource::Logo(_) => {
                return Err(PipelineError::Validation(
                    crate::transform::TransformError::invalid(
                        "Document watermarks support text only",
                    ),
                ));
            }
        };

        let input_format = extension_of(filename).ok_or_else(|| FormatError::UnknownInput {
            filename: filename.to_string(),
        })?;

        let pdf_bytes = if input_format == "pdf" {
            bytes.to_vec()
        } else {
            let selector = StrategySelector::new(self.universal.as_ref());
            let (converted, _) = selector.convert(bytes, &input_format, "pdf").await?;
            converted
        };

        let opacity = spec.opacity as f32 / 255.0;
        let marked = watermark_pdf(&pdf_bytes, &text, spec.anchor, opacity)
            .map_err(PipelineError::encode)?;

        Ok(ConversionResult {
            output_bytes: marked,
            output_filename: format!("{}.pdf", file_stem(filename)),
            applied_features: vec!["watermarking".to_string()],
            additional_outputs: Vec::new(),
        })
    }

    /// Extracts readable text from a document, for callers that only need
    /// content.
    pub fn extract_document_text(&self, bytes: &[u8], filename: &str) -> String {
        let format = extension_of(filename).unwrap_or_else(|| "txt".to_string());
        crate::document::extract_text(bytes, &format)
    }

    /// Page text of a PDF (empty string when extraction fails).
    pub fn pdf_text(&self, bytes: &[u8]) -> String {
        pdf_to_text(bytes).unwrap_or_default()
    }
}

/// Output validation; video inputs additionally accept audio targets for
/// track extraction.
fn validate_video_aware(kind: MediaKind, format: &str) -> Result<String, FormatError> {
    match validate_output(kind, format) {
        Ok(normalized) => Ok(normalized),
        Err(e) => {
            if kind == MediaKind::Video {
                let normalized = format.to_ascii_lowercase();
                if MediaKind::Audio.accepts_extension(&normalized) {
                    return Ok(normalized);
                }
            }
            Err(e)
        }
    }
}

fn file_stem(filename: &str) -> &str {
    filename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .filter(|stem| !stem.is_empty())
        .unwrap_or(filename)
}

fn encode_image(img: DynamicImage, format: &str, quality: u8) -> Result<Vec<u8>, PipelineError> {
    let mut bytes = Vec::new();
    match format {
        "jpeg" | "jpg" => {
            // JPEG has no alpha channel.
            let rgb = img.to_rgb8();
            let mut cursor = Cursor::new(&mut bytes);
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                &mut cursor,
                quality,
            );
            rgb.write_with_encoder(encoder)
                .map_err(PipelineError::encode)?;
        }
        other => {
            let target = image_output_format(other)?;
            let rgba = DynamicImage::ImageRgba8(img.to_rgba8());
            rgba.write_to(&mut Cursor::new(&mut bytes), target)
                .map_err(PipelineError::encode)?;
        }
    }
    Ok(bytes)
}

fn image_output_format(format: &str) -> Result<image::ImageFormat, PipelineError> {
    match format {
        "png" => Ok(image::ImageFormat::Png),
        "webp" => Ok(image::ImageFormat::WebP),
        "bmp" => Ok(image::ImageFormat::Bmp),
        "gif" => Ok(image::ImageFormat::Gif),
        "jpeg" | "jpg" => Ok(image::ImageFormat::Jpeg),
        other => Err(PipelineError::encode(format!(
            "no image encoder for {other}"
        ))),
    }
}
