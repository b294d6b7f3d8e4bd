//! Pipeline execution integration tests.
//!
//! Exercise the executor end-to-end over the mock collaborators: image
//! transforms in their mandatory order, audio decode/transform/encode,
//! fail-fast validation, and the format round-trip property.

mod common;

use common::{png_image, TestHarness};
use frantoio_core::{
    classify, AudioClip, ConversionRequest, CropSpec, ExportOptions, MediaFamily, ResizeSpec,
    TransformSpec, TrimSpec, WatermarkSpec,
};

#[tokio::test]
async fn test_image_conversion_applies_transform_order() {
    let harness = TestHarness::new();
    let input = png_image(120, 80);

    let request = ConversionRequest::new("png").with_transforms(TransformSpec {
        resize: Some(ResizeSpec {
            width: Some(60),
            height: Some(60),
        }),
        crop: Some(CropSpec {
            x: 10,
            y: 10,
            width: 30,
            height: 30,
        }),
        rotate: Some(90),
        ..Default::default()
    });

    let result = harness
        .executor
        .execute(&input, "photo.png", &request)
        .await
        .unwrap();

    assert_eq!(result.output_filename, "photo.png");
    assert_eq!(result.applied_features, vec!["resizing", "cropping", "rotation"]);

    let output = image::load_from_memory(&result.output_bytes).unwrap();
    // 120x80 -> resize 60x60 -> crop 30x30 -> quarter turn keeps 30x30.
    assert_eq!((output.width(), output.height()), (30, 30));
}

#[tokio::test]
async fn test_image_format_round_trip_preserves_family() {
    let harness = TestHarness::new();
    let input = png_image(24, 24);

    let request = ConversionRequest::new("webp");
    let result = harness
        .executor
        .execute(&input, "photo.png", &request)
        .await
        .unwrap();

    assert_eq!(classify(&result.output_filename), Some(MediaFamily::Image));
    // The encoded artifact decodes again and stays in the image family.
    let reloaded = harness
        .executor
        .execute(&result.output_bytes, &result.output_filename, &ConversionRequest::new("bmp"))
        .await
        .unwrap();
    assert_eq!(classify(&reloaded.output_filename), Some(MediaFamily::Image));
}

#[tokio::test]
async fn test_unsupported_output_fails_before_decode() {
    let harness = TestHarness::new();

    // Garbage payload: validation must reject the format before decoding.
    let request = ConversionRequest::new("tiff");
    let error = harness
        .executor
        .execute(b"not an image at all", "photo.png", &request)
        .await
        .unwrap_err();

    assert_eq!(error.entry_name, "photo.png");
    assert!(error.message.contains("Unsupported output format"));
    assert!(error.message.contains("png"));
}

#[tokio::test]
async fn test_invalid_quality_rejected() {
    let harness = TestHarness::new();
    let request = ConversionRequest::new("jpeg").with_options(ExportOptions {
        quality: 0,
        ..Default::default()
    });

    let error = harness
        .executor
        .execute(&png_image(8, 8), "photo.png", &request)
        .await
        .unwrap_err();
    assert!(error.message.contains("Quality"));
}

#[tokio::test]
async fn test_audio_pipeline_trims_and_encodes() {
    let harness = TestHarness::new();
    harness
        .audio_codec
        .set_decode_result(AudioClip::silent(8000, 1, 4000))
        .await;

    let request = ConversionRequest::new("mp3")
        .with_transforms(TransformSpec {
            trim: Some(TrimSpec {
                start_secs: Some(1.0),
                end_secs: Some(2.0),
            }),
            normalize: true,
            ..Default::default()
        })
        .with_options(ExportOptions {
            bitrate: Some("128k".to_string()),
            ..Default::default()
        });

    let result = harness
        .executor
        .execute(b"opaque audio bytes", "song.flac", &request)
        .await
        .unwrap();

    assert_eq!(result.output_filename, "song.mp3");
    assert_eq!(result.applied_features, vec!["trimming", "normalization"]);

    let calls = harness.audio_codec.recorded_calls().await;
    assert_eq!(calls[0].operation, "decode");
    assert_eq!(calls[0].format, "flac");
    let encode = calls.iter().find(|c| c.operation == "encode").unwrap();
    assert_eq!(encode.format, "mp3");
    assert_eq!(encode.bitrate.as_deref(), Some("128k"));
}

#[tokio::test]
async fn test_audio_watermark_survives_synthesizer_outage() {
    let harness = TestHarness::new();
    harness.synthesizer.set_failing(true).await;
    harness
        .audio_codec
        .set_decode_result(AudioClip::silent(8000, 1, 2000))
        .await;

    let request = ConversionRequest::new("wav").with_transforms(TransformSpec {
        watermark: Some(WatermarkSpec::text("brand")),
        ..Default::default()
    });

    // Watermarking degrades silently; the conversion itself succeeds.
    let result = harness
        .executor
        .execute(b"audio", "voice.mp3", &request)
        .await
        .unwrap();
    assert_eq!(result.output_filename, "voice.wav");
    assert_eq!(harness.synthesizer.requests().await.len(), 1);
}

#[tokio::test]
async fn test_decode_failure_attributed_to_entry() {
    let harness = TestHarness::new();
    harness
        .audio_codec
        .set_next_error(frantoio_core::CodecError::decode_failed("corrupt stream"))
        .await;

    let request = ConversionRequest::new("wav");
    let error = harness
        .executor
        .execute(b"audio", "song.flac", &request)
        .await
        .unwrap_err();

    assert_eq!(error.entry_name, "song.flac");
    assert!(error.message.contains("corrupt stream"));
}

#[tokio::test]
async fn test_document_conversion_reports_method() {
    let harness = TestHarness::new();

    let request = ConversionRequest::new("pdf");
    let result = harness
        .executor
        .execute(b"plain text body", "notes.txt", &request)
        .await
        .unwrap();

    assert_eq!(result.output_filename, "notes.pdf");
    assert!(result
        .applied_features
        .contains(&"format_conversion".to_string()));
    // Publishing targets are produced natively, without the universal
    // converter.
    assert_eq!(harness.universal.conversion_count().await, 0);
    assert!(harness
        .executor
        .pdf_text(&result.output_bytes)
        .contains("plain text body"));
}
