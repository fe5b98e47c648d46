//! Pure geometry for the compositor.
//!
//! All functions here are pure and testable without any I/O or pixel buffers.

use super::params::{CropAnchor, HorizontalAlign, OverlayPosition, VerticalAlign};

/// Region of the source kept by an aspect-ratio crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl CropRect {
    /// Whether the rect covers the whole `(width, height)` source.
    pub fn is_full(&self, source: (u32, u32)) -> bool {
        self.x == 0 && self.y == 0 && (self.width, self.height) == source
    }
}

/// Calculate the largest region of `source` with the aspect ratio of `target`.
///
/// Ratios are compared by cross-multiplication so equal ratios are detected
/// exactly (e.g. 810×1080 against 1620×2160). The kept length is floored,
/// never below 1 pixel.
///
/// # Arguments
/// * `source` - Source dimensions (width, height), both non-zero
/// * `target` - Target dimensions (width, height), both non-zero
/// * `anchor` - Edge to keep on the cropped axis
///
/// # Examples
/// ```
/// # use sleep_screen::imaging::{crop_rect, CropAnchor, CropRect};
/// // 3000×2000 landscape into a 3:4 portrait, keeping the left edge
/// let rect = crop_rect((3000, 2000), (1620, 2160), CropAnchor::Left);
/// assert_eq!(rect, CropRect { x: 0, y: 0, width: 1500, height: 2000 });
/// ```
pub fn crop_rect(source: (u32, u32), target: (u32, u32), anchor: CropAnchor) -> CropRect {
    let (src_w, src_h) = source;
    let (tgt_w, tgt_h) = target;

    // src_w / src_h  vs  tgt_w / tgt_h
    let src_cross = src_w as u64 * tgt_h as u64;
    let tgt_cross = src_h as u64 * tgt_w as u64;

    if src_cross > tgt_cross {
        // Source is wider: keep full height, trim width
        let new_w = ((src_h as u64 * tgt_w as u64) / tgt_h as u64).max(1) as u32;
        let slack = src_w - new_w;
        let x = match anchor {
            CropAnchor::Left => 0,
            CropAnchor::Right => slack,
            CropAnchor::Center | CropAnchor::Top | CropAnchor::Bottom => slack / 2,
        };
        CropRect {
            x,
            y: 0,
            width: new_w,
            height: src_h,
        }
    } else if src_cross < tgt_cross {
        // Source is taller: keep full width, trim height
        let new_h = ((src_w as u64 * tgt_h as u64) / tgt_w as u64).max(1) as u32;
        let slack = src_h - new_h;
        let y = match anchor {
            CropAnchor::Top => 0,
            CropAnchor::Bottom => slack,
            CropAnchor::Center | CropAnchor::Left | CropAnchor::Right => slack / 2,
        };
        CropRect {
            x: 0,
            y,
            width: src_w,
            height: new_h,
        }
    } else {
        CropRect {
            x: 0,
            y: 0,
            width: src_w,
            height: src_h,
        }
    }
}

/// Calculate the top-left paste offset for an overlay.
///
/// Offsets are signed: a buffer larger than the free space pushes the
/// overlay past the opposite edge, and the compositor clips what falls off.
/// `buffer` has no effect on a `Middle` axis.
pub fn overlay_origin(
    base: (u32, u32),
    overlay: (u32, u32),
    position: OverlayPosition,
    buffer: u32,
) -> (i64, i64) {
    let (base_w, base_h) = (base.0 as i64, base.1 as i64);
    let (ov_w, ov_h) = (overlay.0 as i64, overlay.1 as i64);
    let buffer = buffer as i64;

    let x = match position.horizontal {
        HorizontalAlign::Left => buffer,
        HorizontalAlign::Right => base_w - ov_w - buffer,
        HorizontalAlign::Middle => (base_w - ov_w).div_euclid(2),
    };
    let y = match position.vertical {
        VerticalAlign::Upper => buffer,
        VerticalAlign::Lower => base_h - ov_h - buffer,
        VerticalAlign::Middle => (base_h - ov_h).div_euclid(2),
    };
    (x, y)
}

/// Dimensions to resize to before an inset border of `thickness` is added.
///
/// Returns `None` when the border would consume the whole target.
pub fn inset_dimensions(target: (u32, u32), thickness: u32) -> Option<(u32, u32)> {
    let double = thickness.checked_mul(2)?;
    let w = target.0.checked_sub(double)?;
    let h = target.1.checked_sub(double)?;
    (w > 0 && h > 0).then_some((w, h))
}
