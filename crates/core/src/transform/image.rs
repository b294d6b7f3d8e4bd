//! Image transform primitives.
//!
//! All operations work on an owned `DynamicImage` and return a new image.
//! The mandatory application order is resize → crop → rotate → watermark.

use ab_glyph::{FontVec, PxScale};
use image::imageops::FilterType;
use image::{imageops, DynamicImage, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size, Blend};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};
use std::path::PathBuf;
use tracing::{debug, warn};

use super::types::{ResizeSpec, TransformSpec, WatermarkAnchor, WatermarkSource, WatermarkSpec};

const WATERMARK_MARGIN: i64 = 20;

/// Applies the requested image transforms in the mandatory order and
/// returns the transformed image together with the applied-feature labels.
pub fn apply_image_transforms(
    img: DynamicImage,
    spec: &TransformSpec,
    font_paths: &[PathBuf],
) -> (DynamicImage, Vec<String>) {
    let mut img = img;
    let mut applied = Vec::new();

    if let Some(ref resize_spec) = spec.resize {
        img = resize(img, resize_spec);
        applied.push("resizing".to_string());
    }

    if let Some(ref crop_spec) = spec.crop {
        let before = (img.width(), img.height());
        img = crop(img, crop_spec);
        if (img.width(), img.height()) != before {
            applied.push("cropping".to_string());
        }
    }

    if let Some(degrees) = spec.rotate {
        if degrees % 360 != 0 {
            img = rotate(img, degrees);
            applied.push("rotation".to_string());
        }
    }

    if let Some(ref watermark_spec) = spec.watermark {
        img = watermark(img, watermark_spec, font_paths);
        applied.push("watermarking".to_string());
    }

    (img, applied)
}

/// Resizes an image. Both dimensions resize exactly; a single dimension
/// preserves the aspect ratio, rounding to the nearest pixel.
pub fn resize(img: DynamicImage, spec: &ResizeSpec) -> DynamicImage {
    let (w, h) = (img.width(), img.height());
    match (spec.width, spec.height) {
        (Some(tw), Some(th)) => img.resize_exact(tw, th, FilterType::Lanczos3),
        (Some(tw), None) => {
            let th = (tw as f64 * h as f64 / w as f64).round().max(1.0) as u32;
            img.resize_exact(tw, th, FilterType::Lanczos3)
        }
        (None, Some(th)) => {
            let tw = (th as f64 * w as f64 / h as f64).round().max(1.0) as u32;
            img.resize_exact(tw, th, FilterType::Lanczos3)
        }
        (None, None) => img,
    }
}

/// Crops an image. Coordinates are clamped to `[0, dim-1]` and the
/// rectangle is clamped to the remaining span; a degenerate rectangle is a
/// no-op returning the original image.
pub fn crop(img: DynamicImage, spec: &super::types::CropSpec) -> DynamicImage {
    let (w, h) = (img.width(), img.height());
    if w == 0 || h == 0 {
        return img;
    }
    let x = spec.x.min(w - 1);
    let y = spec.y.min(h - 1);
    let crop_width = spec.width.min(w - x);
    let crop_height = spec.height.min(h - y);
    if crop_width == 0 || crop_height == 0 {
        return img;
    }
    img.crop_imm(x, y, crop_width, crop_height)
}

/// Rotates an image clockwise by the given degrees. Multiples of 90 use
/// lossless quarter turns; arbitrary angles expand the canvas so corners
/// are never clipped.
pub fn rotate(img: DynamicImage, degrees: u32) -> DynamicImage {
    if degrees % 90 == 0 {
        let mut img = img;
        for _ in 0..((degrees / 90) % 4) {
            img = img.rotate90();
        }
        img
    } else {
        rotate_expanding(&img, degrees as f32)
    }
}

fn rotate_expanding(img: &DynamicImage, degrees: f32) -> DynamicImage {
    let theta = degrees.to_radians();
    let (w, h) = (img.width() as f32, img.height() as f32);
    // The canvas never shrinks below the source, so the centering offsets
    // stay non-negative.
    let new_w = ((w * theta.cos().abs() + h * theta.sin().abs()).ceil() as u32).max(img.width());
    let new_h = ((w * theta.sin().abs() + h * theta.cos().abs()).ceil() as u32).max(img.height());

    let mut canvas = RgbaImage::from_pixel(new_w, new_h, Rgba([0, 0, 0, 0]));
    let offset_x = ((new_w - img.width()) / 2) as i64;
    let offset_y = ((new_h - img.height()) / 2) as i64;
    imageops::overlay(&mut canvas, &img.to_rgba8(), offset_x, offset_y);

    let rotated = rotate_about_center(&canvas, theta, Interpolation::Bilinear, Rgba([0, 0, 0, 0]));
    DynamicImage::ImageRgba8(rotated)
}

/// Overlays a text or logo watermark at the requested anchor.
///
/// Failures (unreadable logo, no usable font) degrade to the unmodified
/// image; watermarking never aborts a conversion.
pub fn watermark(img: DynamicImage, spec: &WatermarkSpec, font_paths: &[PathBuf]) -> DynamicImage {
    match &spec.source {
        WatermarkSource::Text(text) => watermark_text(img, text, spec, font_paths),
        WatermarkSource::Logo(bytes) => watermark_logo(img, bytes, spec),
    }
}

fn watermark_text(
    img: DynamicImage,
    text: &str,
    spec: &WatermarkSpec,
    font_paths: &[PathBuf],
) -> DynamicImage {
    let Some(font) = load_font(font_paths) else {
        warn!("no usable watermark font found, returning image unmodified");
        return img;
    };

    let (w, h) = (img.width(), img.height());
    let font_size = (w.min(h) / 20).max(8) as f32;
    let scale = PxScale::from(font_size);
    let color = Rgba([255u8, 255, 255, spec.opacity]);

    let (text_w, text_h) = text_size(scale, &font, text);
    let (text_w, text_h) = (text_w as i64, text_h as i64);

    if spec.anchor == WatermarkAnchor::Diagonal {
        // Render onto a transparent sprite, rotate it, composite centered.
        let side = (((text_w * text_w + text_h * text_h) as f64).sqrt().ceil() as u32).max(1);
        let mut sprite = RgbaImage::from_pixel(side, side, Rgba([0, 0, 0, 0]));
        let tx = ((side as i64 - text_w) / 2) as i32;
        let ty = ((side as i64 - text_h) / 2) as i32;
        draw_text_mut(&mut sprite, color, tx, ty, scale, &font, text);
        let rotated = rotate_about_center(
            &sprite,
            -std::f32::consts::FRAC_PI_4,
            Interpolation::Bilinear,
            Rgba([0, 0, 0, 0]),
        );

        let mut canvas = img.to_rgba8();
        let x = (w as i64 - side as i64) / 2;
        let y = (h as i64 - side as i64) / 2;
        imageops::overlay(&mut canvas, &rotated, x, y);
        return DynamicImage::ImageRgba8(canvas);
    }

    let (x, y) = anchor_position(spec.anchor, w as i64, h as i64, text_w, text_h);
    let mut canvas = Blend(img.to_rgba8());
    draw_text_mut(&mut canvas, color, x as i32, y as i32, scale, &font, text);
    DynamicImage::ImageRgba8(canvas.0)
}

fn watermark_logo(img: DynamicImage, logo_bytes: &[u8], spec: &WatermarkSpec) -> DynamicImage {
    let logo = match image::load_from_memory(logo_bytes) {
        Ok(logo) => logo,
        Err(e) => {
            warn!(error = %e, "watermark logo could not be decoded, returning image unmodified");
            return img;
        }
    };

    let (w, h) = (img.width(), img.height());
    // Logo scaled to 20% of the host width, aspect preserved.
    let logo_w = (w / 5).max(1);
    let logo_h = ((logo_w as f64 * logo.height() as f64 / logo.width() as f64).round().max(1.0))
        as u32;
    let mut logo = logo
        .resize_exact(logo_w, logo_h, FilterType::Lanczos3)
        .to_rgba8();

    if spec.opacity < 255 {
        for pixel in logo.pixels_mut() {
            pixel.0[3] = (pixel.0[3] as u16 * spec.opacity as u16 / 255) as u8;
        }
    }

    let (x, y) = anchor_position(spec.anchor, w as i64, h as i64, logo_w as i64, logo_h as i64);
    let mut canvas = img.to_rgba8();
    imageops::overlay(&mut canvas, &logo, x, y);
    DynamicImage::ImageRgba8(canvas)
}

fn anchor_position(
    anchor: WatermarkAnchor,
    host_w: i64,
    host_h: i64,
    item_w: i64,
    item_h: i64,
) -> (i64, i64) {
    let margin = WATERMARK_MARGIN;
    let (x, y) = match anchor {
        WatermarkAnchor::TopLeft => (margin, margin),
        WatermarkAnchor::TopRight => (host_w - item_w - margin, margin),
        WatermarkAnchor::BottomLeft => (margin, host_h - item_h - margin),
        WatermarkAnchor::Center | WatermarkAnchor::Diagonal => {
            ((host_w - item_w) / 2, (host_h - item_h) / 2)
        }
        WatermarkAnchor::BottomRight => (host_w - item_w - margin, host_h - item_h - margin),
    };
    (x.max(0), y.max(0))
}

fn load_font(font_paths: &[PathBuf]) -> Option<FontVec> {
    for path in font_paths {
        match std::fs::read(path) {
            Ok(bytes) => match FontVec::try_from_vec(bytes) {
                Ok(font) => return Some(font),
                Err(e) => debug!(path = %path.display(), error = %e, "font unusable"),
            },
            Err(_) => continue,
        }
    }
    None
}
