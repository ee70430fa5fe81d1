// src/app/posters.rs
use image::{imageops::FilterType, DynamicImage, GenericImageView};

use crate::app::error::Result;

pub const THUMBNAIL_QUALITY: u8 = 85;

/// Decode a downloaded poster, shrink it to `max_width` (keeping aspect) and
/// re-encode as JPEG. These bytes are what the favorites table stores.
pub fn encode_thumbnail(raw: &[u8], max_width: u32) -> Result<Vec<u8>> {
    let img = image::load_from_memory(raw)?;

    let (w, h) = img.dimensions();
    let out: DynamicImage = if w > max_width {
        let new_h = ((h as f32) * (max_width as f32 / w as f32))
            .round()
            .max(1.0) as u32;
        img.resize_exact(max_width, new_h, FilterType::CatmullRom)
    } else {
        img
    };

    // JPEG has no alpha channel.
    let rgb = DynamicImage::ImageRgb8(out.to_rgb8());
    let mut jpeg_bytes: Vec<u8> = Vec::new();
    {
        let mut encoder =
            image::codecs::jpeg::JpegEncoder::new_with_quality(&mut jpeg_bytes, THUMBNAIL_QUALITY);
        encoder.encode_image(&rgb)?;
    }
    Ok(jpeg_bytes)
}

/// Width/height of stored thumbnail bytes.
pub fn thumbnail_dimensions(bytes: &[u8]) -> Result<(u32, u32)> {
    Ok(image::load_from_memory(bytes)?.dimensions())
}
