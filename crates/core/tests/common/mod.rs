#![allow(dead_code)]

//! Shared harness for integration tests: a pipeline executor wired to the
//! mock collaborators, plus small payload builders.

use std::io::{Cursor, Write};
use std::sync::Arc;

use image::{DynamicImage, Rgba, RgbaImage};
use zip::write::FileOptions;
use zip::ZipWriter;

use frantoio_core::testing::{MockAudioCodec, MockSynthesizer, MockUniversalConverter};
use frantoio_core::{GatewayConfig, PipelineExecutor};

/// Executor over mock collaborators, with handles kept for assertions and
/// error injection.
pub struct TestHarness {
    pub executor: PipelineExecutor,
    pub audio_codec: MockAudioCodec,
    pub synthesizer: MockSynthesizer,
    pub universal: MockUniversalConverter,
}

impl TestHarness {
    pub fn new() -> Self {
        let audio_codec = MockAudioCodec::new();
        let synthesizer = MockSynthesizer::new();
        let universal = MockUniversalConverter::new();
        let executor = PipelineExecutor::new(
            GatewayConfig::default(),
            Arc::new(audio_codec.clone()),
            Arc::new(synthesizer.clone()),
            Arc::new(universal.clone()),
        );
        Self {
            executor,
            audio_codec,
            synthesizer,
            universal,
        }
    }
}

/// A small gradient test image encoded as PNG.
pub fn png_image(width: u32, height: u32) -> Vec<u8> {
    let buf = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 128, 255])
    });
    let mut bytes = Vec::new();
    DynamicImage::ImageRgba8(buf)
        .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
        .expect("png encoding");
    bytes
}

/// A zip archive built from (name, content) entries.
pub fn zip_archive(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        writer
            .start_file(*name, FileOptions::default())
            .expect("zip entry");
        writer.write_all(content).expect("zip write");
    }
    writer.finish().expect("zip finish").into_inner()
}
