//! I/O helpers for card images, masks and JSON reports.
//!
//! - `load_card_image`: read a PNG/JPEG/TIFF/BMP from disk into an RGB buffer.
//! - `decode_card_image`: same, from an in-memory encoded buffer.
//! - `save_mask_png`: write a binary stain mask as a black/white PNG.
//! - `write_json_file`: pretty-print a serializable value to disk.
use super::{BinaryMask, ImageView};
use crate::error::{DepositionError, Result};
use image::{GrayImage, Luma, RgbImage};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Decode a card image file into 8-bit RGB.
pub fn load_card_image(path: &Path) -> Result<RgbImage> {
    let img = image::open(path).map_err(|e| {
        DepositionError::image_decode(format!("failed to open {}", path.display()), e)
    })?;
    Ok(img.into_rgb8())
}

/// Decode an encoded card image held in memory into 8-bit RGB.
pub fn decode_card_image(bytes: &[u8]) -> Result<RgbImage> {
    let img = image::load_from_memory(bytes)
        .map_err(|e| DepositionError::image_decode("failed to decode in-memory image", e))?;
    Ok(img.into_rgb8())
}

/// Save a binary mask as a PNG (stain pixels white).
pub fn save_mask_png(mask: &BinaryMask, path: &Path) -> std::result::Result<(), String> {
    ensure_parent_dir(path)?;
    let mut out = GrayImage::new(mask.w as u32, mask.h as u32);
    for (y, row) in mask.rows().enumerate() {
        for (x, &px) in row.iter().enumerate() {
            let v = if px != 0 { 255 } else { 0 };
            out.put_pixel(x as u32, y as u32, Luma([v]));
        }
    }
    out.save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> std::result::Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> std::result::Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
