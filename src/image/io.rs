//! Output helpers for rasters and JSON sidecars.
//!
//! - `save_rgba_png`: write interleaved RGBA bytes to a PNG.
//! - `write_json_file`: pretty-print a serializable value to disk.

use image::{DynamicImage, ImageBuffer, Rgba};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Save interleaved RGBA bytes (`w * h * 4`) to a PNG.
pub fn save_rgba_png(path: &Path, w: usize, h: usize, rgba: Vec<u8>) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let buffer: ImageBuffer<Rgba<u8>, Vec<u8>> = ImageBuffer::from_raw(w as u32, h as u32, rgba)
        .ok_or_else(|| "RGBA buffer does not match the given dimensions".to_string())?;
    DynamicImage::ImageRgba8(buffer)
        .save(path)
        .map_err(|e| format!("Failed to save {}: {e}", path.display()))
}

/// Serialize a value as pretty JSON to `path`, creating parent directories.
pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
