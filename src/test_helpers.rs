//! Shared test utilities for the sleep-screen test suite.
//!
//! Synthetic images and on-disk fixtures so tests never depend on checked-in
//! binaries.

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use std::path::Path;

// =========================================================================
// Synthetic images
// =========================================================================

/// RGB image where every pixel encodes its own position.
///
/// Crops can then be checked by comparing individual pixels against the
/// source.
pub fn gradient_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x / 256 + y / 256) % 256) as u8])
    })
}

/// RGBA image filled with one color.
pub fn solid_rgba(width: u32, height: u32, rgba: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(width, height, Rgba(rgba))
}

// =========================================================================
// Fixture files
// =========================================================================

pub fn write_png(path: &Path, img: &RgbImage) {
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

pub fn write_rgba_png(path: &Path, img: &RgbaImage) {
    img.save_with_format(path, image::ImageFormat::Png).unwrap();
}

/// Write a `KEY=VALUE` device config with every required key filled in.
///
/// `overrides` replace or drop keys: `("KEY", None)` removes the line.
pub fn write_device_config(path: &Path, overrides: &[(&str, Option<&str>)]) {
    let mut entries: Vec<(String, String)> = [
        ("REMARKABLE_IP", "10.11.99.1"),
        ("REMARKABLE_PASSWORD", "hunter2"),
        ("SOURCE_PATH", "/tmp/staging"),
        ("DESTINATION_DIR", "/usr/share/remarkable"),
        ("PUTTY_PATH", "/opt/putty"),
        ("DESTINATION_FILE", "suspended.png"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();

    for (key, value) in overrides {
        match value {
            Some(v) => match entries.iter_mut().find(|(k, _)| k == key) {
                Some(entry) => entry.1 = v.to_string(),
                None => entries.push((key.to_string(), v.to_string())),
            },
            None => entries.retain(|(k, _)| k != key),
        }
    }

    let body: String = entries.iter().map(|(k, v)| format!("{k}={v}\n")).collect();
    std::fs::write(path, body).unwrap();
}
