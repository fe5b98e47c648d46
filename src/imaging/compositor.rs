//! Pixel operations for the sleep-screen pipeline.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` |
//! | Crop | `image::imageops::crop_imm` on a [`crop_rect`] |
//! | Resize | `image::imageops::resize` with `Lanczos3` filter |
//! | Border | white `RgbImage` canvas + `image::imageops::replace` |
//! | Overlay | per-pixel alpha blend at an [`overlay_origin`], clipped to the canvas |
//! | Encode | `ImageBuffer::write_to` into a `tempfile` beside the target, then persist |
//!
//! Base images are RGB8 throughout; any alpha in the source photo is dropped on
//! load. Overlays are RGBA8 so their alpha can act as the paste mask.

use super::geometry::{CropRect, crop_rect, inset_dimensions, overlay_origin};
use super::params::{BorderMode, CropAnchor, OverlayPosition, ProcessOptions};
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageFormat, ImageReader, Rgb, RgbImage, RgbaImage};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum CompositeError {
    #[error("invalid image: {width}x{height} has a zero dimension")]
    InvalidImage { width: u32, height: u32 },
    #[error("invalid target resolution {width}x{height}: both dimensions must be positive")]
    InvalidTarget { width: u32, height: u32 },
    #[error("a {thickness}px border does not fit around {width}x{height}")]
    BorderTooThick {
        thickness: u32,
        width: u32,
        height: u32,
    },
    #[error("failed to load image {}: {reason}", path.display())]
    ImageLoad { path: PathBuf, reason: String },
    #[error(
        "overlay {overlay_width}x{overlay_height} is larger than the {base_width}x{base_height} canvas"
    )]
    OverlayTooLarge {
        overlay_width: u32,
        overlay_height: u32,
        base_width: u32,
        base_height: u32,
    },
    #[error("failed to save image {}: {reason}", path.display())]
    Save { path: PathBuf, reason: String },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for compositor operations.
pub type Result<T> = std::result::Result<T, CompositeError>;

/// Load and decode an image from disk.
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    let load_err = |reason: String| CompositeError::ImageLoad {
        path: path.to_path_buf(),
        reason,
    };
    if !path.is_file() {
        return Err(load_err("file does not exist".into()));
    }
    ImageReader::open(path)
        .map_err(|e| load_err(e.to_string()))?
        .with_guessed_format()
        .map_err(|e| load_err(e.to_string()))?
        .decode()
        .map_err(|e| load_err(e.to_string()))
}

/// Crop `image` to the aspect ratio of `target_width`×`target_height`.
///
/// The anchor decides which side of the cropped axis survives. When the
/// ratios already match the image is returned unchanged.
pub fn crop_to_aspect(
    image: &RgbImage,
    target_width: u32,
    target_height: u32,
    anchor: CropAnchor,
) -> Result<RgbImage> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(CompositeError::InvalidImage { width, height });
    }
    check_target(target_width, target_height)?;

    let rect = crop_rect((width, height), (target_width, target_height), anchor);
    debug!(?rect, %anchor, width, height, "aspect crop");
    Ok(apply_crop(image, rect))
}

fn apply_crop(image: &RgbImage, rect: CropRect) -> RgbImage {
    if rect.is_full(image.dimensions()) {
        return image.clone();
    }
    imageops::crop_imm(image, rect.x, rect.y, rect.width, rect.height).to_image()
}

fn check_target(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(CompositeError::InvalidTarget { width, height });
    }
    Ok(())
}

/// Resize to exactly `target_width`×`target_height` with Lanczos3.
///
/// Callers crop to the target aspect first; this does not preserve ratio.
pub fn resize(image: &RgbImage, target_width: u32, target_height: u32) -> Result<RgbImage> {
    check_target(target_width, target_height)?;
    if image.dimensions() == (target_width, target_height) {
        return Ok(image.clone());
    }
    Ok(imageops::resize(
        image,
        target_width,
        target_height,
        FilterType::Lanczos3,
    ))
}

/// Pad every edge with `thickness` pixels of white.
///
/// Fails with [`CompositeError::BorderTooThick`] when the padded canvas
/// would not fit in `u32` dimensions.
pub fn add_border(image: &RgbImage, thickness: u32) -> Result<RgbImage> {
    let (w, h) = image.dimensions();
    let too_thick = || CompositeError::BorderTooThick {
        thickness,
        width: w,
        height: h,
    };
    let double = thickness.checked_mul(2).ok_or_else(too_thick)?;
    let canvas_w = w.checked_add(double).ok_or_else(too_thick)?;
    let canvas_h = h.checked_add(double).ok_or_else(too_thick)?;

    let mut canvas = RgbImage::from_pixel(canvas_w, canvas_h, Rgb([255; 3]));
    imageops::replace(&mut canvas, image, thickness as i64, thickness as i64);
    Ok(canvas)
}

/// Invert the color channels of an overlay, leaving alpha as-is.
pub fn invert(overlay: &RgbaImage) -> RgbaImage {
    let mut inverted = overlay.clone();
    for px in inverted.pixels_mut() {
        for c in &mut px.0[..3] {
            *c = 255 - *c;
        }
    }
    inverted
}

/// Paste `overlay` onto a copy of `base` at a 9-way `position`.
///
/// The overlay's alpha channel is the paste mask, so fully opaque overlays
/// replace base pixels outright. Anything pushed off-canvas by `buffer_px`
/// is clipped.
pub fn composite_overlay(
    base: &RgbImage,
    overlay: &RgbaImage,
    position: OverlayPosition,
    buffer_px: u32,
    invert_colors: bool,
) -> Result<RgbImage> {
    let (base_w, base_h) = base.dimensions();
    let (ov_w, ov_h) = overlay.dimensions();
    if ov_w > base_w || ov_h > base_h {
        return Err(CompositeError::OverlayTooLarge {
            overlay_width: ov_w,
            overlay_height: ov_h,
            base_width: base_w,
            base_height: base_h,
        });
    }

    let inverted;
    let overlay = if invert_colors {
        inverted = invert(overlay);
        &inverted
    } else {
        overlay
    };

    let (x0, y0) = overlay_origin((base_w, base_h), (ov_w, ov_h), position, buffer_px);
    debug!(%position, x0, y0, buffer_px, invert_colors, "overlay placement");

    let mut result = base.clone();
    for (ox, oy, src) in overlay.enumerate_pixels() {
        let (x, y) = (x0 + ox as i64, y0 + oy as i64);
        if x < 0 || y < 0 || x >= base_w as i64 || y >= base_h as i64 {
            continue;
        }
        let alpha = src.0[3] as u32;
        if alpha == 0 {
            continue;
        }
        let dst = result.get_pixel_mut(x as u32, y as u32);
        for c in 0..3 {
            let blended = src.0[c] as u32 * alpha + dst.0[c] as u32 * (255 - alpha);
            dst.0[c] = ((blended + 127) / 255) as u8;
        }
    }
    Ok(result)
}

/// A finished composite plus the geometry that produced it.
#[derive(Debug, Clone)]
pub struct Processed {
    pub image: RgbImage,
    pub source_dimensions: (u32, u32),
    pub crop: CropRect,
}

/// Run the full pipeline: load → crop → resize → border → overlay.
pub fn process(source: &Path, options: &ProcessOptions) -> Result<RgbImage> {
    process_detailed(source, options).map(|p| p.image)
}

/// [`process`], also reporting source size and crop region for display.
pub fn process_detailed(source: &Path, options: &ProcessOptions) -> Result<Processed> {
    let target = options.target;
    check_target(target.width, target.height)?;

    // An inset border shrinks the area the photo is fitted into.
    let fit = match options.border {
        Some(b) if b.mode == BorderMode::Inset => {
            inset_dimensions((target.width, target.height), b.thickness).ok_or(
                CompositeError::BorderTooThick {
                    thickness: b.thickness,
                    width: target.width,
                    height: target.height,
                },
            )?
        }
        _ => (target.width, target.height),
    };

    // Load the overlay up front so a bad path fails before any pixel work.
    let overlay = options
        .overlay
        .as_ref()
        .map(|spec| load_image(&spec.path).map(|img| (spec, img.to_rgba8())))
        .transpose()?;

    let photo = load_image(source)?.to_rgb8();
    let source_dimensions = photo.dimensions();
    info!(source = %source.display(), width = source_dimensions.0, height = source_dimensions.1, "loaded source");

    if source_dimensions.0 == 0 || source_dimensions.1 == 0 {
        return Err(CompositeError::InvalidImage {
            width: source_dimensions.0,
            height: source_dimensions.1,
        });
    }
    let crop = crop_rect(source_dimensions, fit, options.anchor);
    let cropped = crop_to_aspect(&photo, fit.0, fit.1, options.anchor)?;
    let mut image = resize(&cropped, fit.0, fit.1)?;

    if let Some(border) = options.border {
        image = add_border(&image, border.thickness)?;
    }

    if let Some((spec, overlay)) = overlay {
        image = composite_overlay(&image, &overlay, spec.position, spec.buffer_px, spec.invert)?;
    }

    info!(width = image.width(), height = image.height(), "composite ready");
    Ok(Processed {
        image,
        source_dimensions,
        crop,
    })
}

/// Default output path: `<dir>/<stem>_processed.png` beside the source.
///
/// Always PNG so the result can be staged as `suspended.png` without
/// renaming a JPEG stream into a `.png` file.
pub fn processed_output_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    source.with_file_name(format!("{stem}_processed.png"))
}

/// Encode `image` to `path`, inferring the format from the extension.
///
/// Encodes into a temporary file in the destination directory and renames it
/// into place, so a failed encode never leaves a truncated file at `path`.
pub fn save_image(image: &RgbImage, path: &Path) -> Result<()> {
    let save_err = |reason: String| CompositeError::Save {
        path: path.to_path_buf(),
        reason,
    };
    let format = ImageFormat::from_path(path).map_err(|e| save_err(e.to_string()))?;
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        image
            .write_to(&mut writer, format)
            .map_err(|e| save_err(e.to_string()))?;
        writer.flush()?;
    }
    tmp.persist(path).map_err(|e| save_err(e.error.to_string()))?;
    info!(path = %path.display(), "saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::params::{Border, OverlaySpec, TargetResolution};
    use crate::test_helpers::{gradient_rgb, solid_rgba, write_png, write_rgba_png};
    use image::Rgba;
    use proptest::prelude::*;

    const WHITE: Rgb<u8> = Rgb([255, 255, 255]);

    // =========================================================================
    // crop_to_aspect
    // =========================================================================

    #[test]
    fn crop_left_anchor_keeps_left_columns() {
        let img = gradient_rgb(300, 200);
        let cropped = crop_to_aspect(&img, 1620, 2160, CropAnchor::Left).unwrap();
        assert_eq!(cropped.dimensions(), (150, 200));
        assert_eq!(cropped.get_pixel(0, 0), img.get_pixel(0, 0));
        assert_eq!(cropped.get_pixel(149, 199), img.get_pixel(149, 199));
    }

    #[test]
    fn crop_right_anchor_keeps_right_columns() {
        let img = gradient_rgb(300, 200);
        let cropped = crop_to_aspect(&img, 1620, 2160, CropAnchor::Right).unwrap();
        assert_eq!(cropped.get_pixel(149, 0), img.get_pixel(299, 0));
    }

    #[test]
    fn crop_bottom_anchor_keeps_bottom_rows() {
        let img = gradient_rgb(300, 1000);
        let cropped = crop_to_aspect(&img, 1620, 2160, CropAnchor::Bottom).unwrap();
        assert_eq!(cropped.dimensions(), (300, 400));
        assert_eq!(cropped.get_pixel(0, 399), img.get_pixel(0, 999));
    }

    #[test]
    fn crop_equal_ratio_returns_identical_pixels() {
        let img = gradient_rgb(81, 108);
        let cropped = crop_to_aspect(&img, 1620, 2160, CropAnchor::Top).unwrap();
        assert_eq!(cropped, img);
    }

    #[test]
    fn crop_zero_sized_source_is_invalid() {
        let img = RgbImage::new(0, 10);
        let err = crop_to_aspect(&img, 1620, 2160, CropAnchor::Center).unwrap_err();
        assert!(matches!(
            err,
            CompositeError::InvalidImage {
                width: 0,
                height: 10
            }
        ));
    }

    #[test]
    fn crop_zero_target_is_invalid() {
        let img = gradient_rgb(10, 10);
        let err = crop_to_aspect(&img, 0, 10, CropAnchor::Center).unwrap_err();
        assert!(matches!(err, CompositeError::InvalidTarget { .. }));
    }

    // =========================================================================
    // resize / add_border
    // =========================================================================

    #[test]
    fn resize_hits_exact_dimensions() {
        let img = gradient_rgb(150, 200);
        let out = resize(&img, 81, 108).unwrap();
        assert_eq!(out.dimensions(), (81, 108));
    }

    #[test]
    fn border_grows_canvas_and_paints_ring_white() {
        let img = RgbImage::from_pixel(20, 10, Rgb([0, 0, 0]));
        let out = add_border(&img, 3).unwrap();
        assert_eq!(out.dimensions(), (26, 16));
        for (x, y, px) in out.enumerate_pixels() {
            let in_ring = x < 3 || y < 3 || x >= 23 || y >= 13;
            if in_ring {
                assert_eq!(*px, WHITE, "ring pixel ({x}, {y}) not white");
            } else {
                assert_eq!(*px, Rgb([0, 0, 0]), "inner pixel ({x}, {y}) changed");
            }
        }
    }

    #[test]
    fn border_of_zero_is_a_copy() {
        let img = gradient_rgb(12, 7);
        assert_eq!(add_border(&img, 0).unwrap(), img);
    }

    #[test]
    fn border_overflowing_u32_is_an_error() {
        let img = RgbImage::new(4, 4);
        let err = add_border(&img, u32::MAX / 2 + 1).unwrap_err();
        assert!(matches!(err, CompositeError::BorderTooThick { width: 4, .. }));

        let err = add_border(&img, u32::MAX / 2 - 1).unwrap_err();
        assert!(matches!(err, CompositeError::BorderTooThick { .. }));
    }

    // =========================================================================
    // invert / composite_overlay
    // =========================================================================

    #[test]
    fn invert_flips_color_and_keeps_alpha() {
        let ov = RgbaImage::from_pixel(2, 2, Rgba([10, 200, 255, 77]));
        let inv = invert(&ov);
        assert_eq!(*inv.get_pixel(1, 1), Rgba([245, 55, 0, 77]));
    }

    #[test]
    fn composite_middle_middle_centers_overlay() {
        let base = RgbImage::from_pixel(100, 80, WHITE);
        let ov = solid_rgba(20, 10, [0, 0, 0, 255]);
        let out =
            composite_overlay(&base, &ov, "middle_middle".parse().unwrap(), 0, false).unwrap();
        // x = (100-20)/2 = 40, y = (80-10)/2 = 35
        assert_eq!(*out.get_pixel(40, 35), Rgb([0, 0, 0]));
        assert_eq!(*out.get_pixel(59, 44), Rgb([0, 0, 0]));
        assert_eq!(*out.get_pixel(39, 35), WHITE);
        assert_eq!(*out.get_pixel(60, 44), WHITE);
        assert_eq!(*out.get_pixel(40, 45), WHITE);
    }

    #[test]
    fn composite_lower_right_with_buffer() {
        let base = RgbImage::from_pixel(100, 100, WHITE);
        let ov = solid_rgba(10, 10, [0, 0, 0, 255]);
        let out = composite_overlay(&base, &ov, "lower_right".parse().unwrap(), 5, false).unwrap();
        assert_eq!(*out.get_pixel(85, 85), Rgb([0, 0, 0]));
        assert_eq!(*out.get_pixel(94, 94), Rgb([0, 0, 0]));
        assert_eq!(*out.get_pixel(95, 95), WHITE);
    }

    #[test]
    fn composite_respects_alpha_mask() {
        let base = RgbImage::from_pixel(4, 4, Rgb([200, 200, 200]));
        let mut ov = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 0]));
        ov.put_pixel(1, 1, Rgba([0, 0, 0, 255]));
        ov.put_pixel(2, 2, Rgba([0, 0, 0, 128]));
        let out = composite_overlay(&base, &ov, "upper_left".parse().unwrap(), 0, false).unwrap();

        assert_eq!(*out.get_pixel(0, 0), Rgb([200, 200, 200]));
        assert_eq!(*out.get_pixel(1, 1), Rgb([0, 0, 0]));
        // 200 * 127 / 255 ≈ 100
        assert_eq!(*out.get_pixel(2, 2), Rgb([100, 100, 100]));
    }

    #[test]
    fn composite_invert_turns_black_text_white() {
        let base = RgbImage::from_pixel(10, 10, Rgb([0, 0, 0]));
        let ov = solid_rgba(2, 2, [0, 0, 0, 255]);
        let out = composite_overlay(&base, &ov, "upper_left".parse().unwrap(), 0, true).unwrap();
        assert_eq!(*out.get_pixel(0, 0), WHITE);
        assert_eq!(*out.get_pixel(2, 2), Rgb([0, 0, 0]));
    }

    #[test]
    fn composite_rejects_oversized_overlay() {
        let base = RgbImage::new(50, 50);
        let ov = solid_rgba(51, 10, [0, 0, 0, 255]);
        let err = composite_overlay(&base, &ov, OverlayPosition::default(), 0, false).unwrap_err();
        assert!(matches!(
            err,
            CompositeError::OverlayTooLarge {
                overlay_width: 51,
                ..
            }
        ));
    }

    #[test]
    fn composite_clips_overlay_pushed_off_canvas() {
        let base = RgbImage::from_pixel(10, 10, WHITE);
        let ov = solid_rgba(8, 2, [0, 0, 0, 255]);
        // x = 10 - 8 - 5 = -3 → columns 0..5 covered
        let out = composite_overlay(&base, &ov, "upper_right".parse().unwrap(), 5, false).unwrap();
        assert_eq!(*out.get_pixel(0, 0), WHITE);
        assert_eq!(*out.get_pixel(0, 5), Rgb([0, 0, 0]));
        assert_eq!(*out.get_pixel(4, 6), Rgb([0, 0, 0]));
        assert_eq!(*out.get_pixel(5, 5), WHITE);
    }

    // =========================================================================
    // process / save
    // =========================================================================

    fn small_options() -> ProcessOptions {
        ProcessOptions {
            target: TargetResolution::new(81, 108),
            ..ProcessOptions::default()
        }
    }

    #[test]
    fn process_wide_source_left_anchor() {
        let tmp = tempfile::TempDir::new().unwrap();
        let src = tmp.path().join("wide.png");
        write_png(&src, &gradient_rgb(300, 200));

        let opts = ProcessOptions {
            anchor: CropAnchor::Left,
            ..small_options()
        };
        let processed = process_detailed(&src, &opts).unwrap();
        assert_eq!(processed.image.dimensions(), (81, 108));
        assert_eq!(processed.source_dimensions, (300, 200));
        assert_eq!(processed.crop.x, 0);
        assert!(processed.crop.width < 300);
    }

    #[test]
    fn process_bare_border_adds_sixty_pixels() {
        let tmp = tempfile::TempDir::new().unwrap();
        let src = tmp.path().join("photo.png");
        write_png(&src, &gradient_rgb(120, 160));

        let opts = ProcessOptions {
            border: Some(Border::default()),
            ..small_options()
        };
        let out = process(&src, &opts).unwrap();
        assert_eq!(out.dimensions(), (81 + 60, 108 + 60));
        assert_eq!(*out.get_pixel(0, 0), WHITE);
        assert_eq!(*out.get_pixel(29, 100), WHITE);
    }

    #[test]
    fn process_inset_border_keeps_target() {
        let tmp = tempfile::TempDir::new().unwrap();
        let src = tmp.path().join("photo.png");
        write_png(&src, &RgbImage::from_pixel(120, 160, Rgb([0, 0, 0])));

        let opts = ProcessOptions {
            border: Some(Border::inset(10)),
            ..small_options()
        };
        let out = process(&src, &opts).unwrap();
        assert_eq!(out.dimensions(), (81, 108));
        assert_eq!(*out.get_pixel(9, 50), WHITE);
        assert_eq!(*out.get_pixel(40, 50), Rgb([0, 0, 0]));
    }

    #[test]
    fn process_inset_border_too_thick_errors() {
        let tmp = tempfile::TempDir::new().unwrap();
        let src = tmp.path().join("photo.png");
        write_png(&src, &gradient_rgb(20, 20));

        let opts = ProcessOptions {
            border: Some(Border::inset(50)),
            ..small_options()
        };
        let err = process(&src, &opts).unwrap_err();
        assert!(matches!(err, CompositeError::BorderTooThick { .. }));
    }

    #[test]
    fn process_huge_outset_border_errors_instead_of_overflowing() {
        let tmp = tempfile::TempDir::new().unwrap();
        let src = tmp.path().join("photo.png");
        write_png(&src, &gradient_rgb(20, 20));

        let opts = ProcessOptions {
            border: Some(Border::outset(u32::MAX / 2 + 1)),
            ..small_options()
        };
        let err = process(&src, &opts).unwrap_err();
        assert!(matches!(err, CompositeError::BorderTooThick { .. }));
    }

    #[test]
    fn process_with_overlay() {
        let tmp = tempfile::TempDir::new().unwrap();
        let src = tmp.path().join("photo.png");
        write_png(&src, &RgbImage::from_pixel(81, 108, WHITE));
        let ov_path = tmp.path().join("text.png");
        write_rgba_png(&ov_path, &solid_rgba(10, 10, [0, 0, 0, 255]));

        let opts = ProcessOptions {
            overlay: Some(OverlaySpec {
                path: ov_path,
                position: "upper_left".parse().unwrap(),
                buffer_px: 2,
                invert: false,
            }),
            ..small_options()
        };
        let out = process(&src, &opts).unwrap();
        assert_eq!(*out.get_pixel(2, 2), Rgb([0, 0, 0]));
        assert_eq!(*out.get_pixel(1, 1), WHITE);
    }

    #[test]
    fn process_missing_source_names_path() {
        let err = process(Path::new("/nonexistent/photo.jpg"), &small_options()).unwrap_err();
        assert!(matches!(err, CompositeError::ImageLoad { .. }));
        assert!(err.to_string().contains("/nonexistent/photo.jpg"));
    }

    #[test]
    fn process_undecodable_source_is_load_error() {
        let tmp = tempfile::TempDir::new().unwrap();
        let src = tmp.path().join("notes.png");
        std::fs::write(&src, b"definitely not a png").unwrap();
        let err = process(&src, &small_options()).unwrap_err();
        assert!(matches!(err, CompositeError::ImageLoad { .. }));
    }

    #[test]
    fn process_missing_overlay_fails_before_decode() {
        let opts = ProcessOptions {
            overlay: Some(OverlaySpec {
                path: "/nonexistent/text_overlay.png".into(),
                position: OverlayPosition::default(),
                buffer_px: 0,
                invert: false,
            }),
            ..small_options()
        };
        let err = process(Path::new("/nonexistent/photo.jpg"), &opts).unwrap_err();
        assert!(err.to_string().contains("text_overlay.png"));
    }

    #[test]
    fn processed_path_appends_suffix_as_png() {
        assert_eq!(
            processed_output_path(Path::new("/photos/dusk.jpg")),
            PathBuf::from("/photos/dusk_processed.png")
        );
    }

    #[test]
    fn save_writes_decodable_file_and_leaves_no_temp() {
        let tmp = tempfile::TempDir::new().unwrap();
        let out = tmp.path().join("out.png");
        save_image(&gradient_rgb(30, 40), &out).unwrap();

        assert_eq!(image::image_dimensions(&out).unwrap(), (30, 40));
        let entries = std::fs::read_dir(tmp.path()).unwrap().count();
        assert_eq!(entries, 1);
    }

    #[test]
    fn save_unknown_extension_errors_without_writing() {
        let tmp = tempfile::TempDir::new().unwrap();
        let out = tmp.path().join("out.xyz");
        let err = save_image(&gradient_rgb(4, 4), &out).unwrap_err();
        assert!(matches!(err, CompositeError::Save { .. }));
        assert!(!out.exists());
    }

    // =========================================================================
    // Properties
    // =========================================================================

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        /// Crop then resize always lands on the target.
        #[test]
        fn prop_crop_resize_hits_target(
            src in (1u32..64, 1u32..64),
            tgt in (1u32..48, 1u32..48),
            anchor in prop_oneof![
                Just(CropAnchor::Center),
                Just(CropAnchor::Left),
                Just(CropAnchor::Right),
                Just(CropAnchor::Top),
                Just(CropAnchor::Bottom),
            ],
        ) {
            let img = gradient_rgb(src.0, src.1);
            let cropped = crop_to_aspect(&img, tgt.0, tgt.1, anchor).unwrap();
            let out = resize(&cropped, tgt.0, tgt.1).unwrap();
            prop_assert_eq!(out.dimensions(), tgt);
        }

        /// Border output is `input + 2t` with an all-white ring.
        #[test]
        fn prop_border_dimensions_and_ring(w in 1u32..24, h in 1u32..24, t in 0u32..6) {
            let img = RgbImage::from_pixel(w, h, Rgb([1, 2, 3]));
            let out = add_border(&img, t).unwrap();
            prop_assert_eq!(out.dimensions(), (w + 2 * t, h + 2 * t));
            for (x, y, px) in out.enumerate_pixels() {
                if x < t || y < t || x >= w + t || y >= h + t {
                    prop_assert_eq!(*px, WHITE);
                }
            }
        }

        /// Inverting twice is the identity.
        #[test]
        fn prop_invert_is_involution(px in any::<[u8; 4]>(), w in 1u32..6, h in 1u32..6) {
            let ov = RgbaImage::from_pixel(w, h, Rgba(px));
            prop_assert_eq!(invert(&invert(&ov)), ov);
        }
    }
}
