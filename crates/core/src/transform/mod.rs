//! Transform primitives and the per-request transform specification.
//!
//! Each primitive consumes a decoded media value and returns a new one;
//! callers treat the input as consumed. When several transforms are
//! requested together they are applied in a fixed order: resize → crop →
//! rotate → watermark for images, trim → normalize → watermark for audio.
//! Reordering changes the semantic result and is not supported.

mod audio;
mod error;
mod image;
mod types;

pub use audio::{apply_audio_transforms, speech_watermark};
pub use error::TransformError;
pub use image::{apply_image_transforms, crop, resize, rotate, watermark};
pub use types::{
    CropSpec, ResizeSpec, TransformSpec, TrimSpec, WatermarkAnchor, WatermarkSource, WatermarkSpec,
};
