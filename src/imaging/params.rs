//! Parameter types for the compositor.
//!
//! These describe *what* the pipeline should produce. The pure geometry in
//! [`geometry`](super::geometry) turns them into rectangles and offsets, and
//! [`compositor`](super::compositor) does the pixel work.
//!
//! ## Types
//!
//! - [`TargetResolution`]: Output panel size (default 1620×2160).
//! - [`CropAnchor`]: Which edge survives an aspect-ratio crop.
//! - [`Border`]: White border thickness and whether it grows the canvas or eats into it.
//! - [`OverlayPosition`]: 9-way placement, a vertical × horizontal pair.
//! - [`OverlaySpec`]: Overlay file, placement, edge buffer and inversion.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

/// Returned when a CLI or settings string does not name a known variant.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} '{value}' (expected one of: {expected})")]
pub struct ParseParamError {
    kind: &'static str,
    value: String,
    expected: String,
}

impl ParseParamError {
    fn new(kind: &'static str, value: &str, expected: &[&str]) -> Self {
        Self {
            kind,
            value: value.to_string(),
            expected: expected.join(", "),
        }
    }
}

/// Output pixel dimensions, matching the device panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetResolution {
    pub width: u32,
    pub height: u32,
}

impl TargetResolution {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl Default for TargetResolution {
    fn default() -> Self {
        Self {
            width: 1620,
            height: 2160,
        }
    }
}

impl fmt::Display for TargetResolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Which part of the source survives when its aspect ratio differs from the target.
///
/// Only the axis being cropped can be anchored: `Top`/`Bottom` on a too-wide
/// source and `Left`/`Right` on a too-tall source fall back to `Center`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CropAnchor {
    #[default]
    Center,
    Left,
    Right,
    Top,
    Bottom,
}

impl CropAnchor {
    pub const NAMES: &'static [&'static str] = &["center", "left", "right", "top", "bottom"];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Center => "center",
            Self::Left => "left",
            Self::Right => "right",
            Self::Top => "top",
            Self::Bottom => "bottom",
        }
    }
}

impl FromStr for CropAnchor {
    type Err = ParseParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "center" => Ok(Self::Center),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            _ => Err(ParseParamError::new("crop anchor", s, Self::NAMES)),
        }
    }
}

impl fmt::Display for CropAnchor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a border relates to the target resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderMode {
    /// Pad the already-resized image: final size is `target + 2 * thickness`.
    #[default]
    Outset,
    /// Resize to `target - 2 * thickness` first so the final size equals the target.
    Inset,
}

/// Solid white border.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Border {
    pub thickness: u32,
    pub mode: BorderMode,
}

impl Border {
    /// Thickness used when the border flag is passed without a value.
    pub const DEFAULT_THICKNESS: u32 = 30;

    pub fn outset(thickness: u32) -> Self {
        Self {
            thickness,
            mode: BorderMode::Outset,
        }
    }

    pub fn inset(thickness: u32) -> Self {
        Self {
            thickness,
            mode: BorderMode::Inset,
        }
    }
}

impl Default for Border {
    fn default() -> Self {
        Self::outset(Self::DEFAULT_THICKNESS)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalAlign {
    Upper,
    Middle,
    Lower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalAlign {
    Left,
    Middle,
    Right,
}

/// Overlay placement on the base canvas: one of nine cells.
///
/// Written as `<vertical>_<horizontal>`, e.g. `upper_left`, `middle_middle`,
/// `lower_right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OverlayPosition {
    pub vertical: VerticalAlign,
    pub horizontal: HorizontalAlign,
}

impl OverlayPosition {
    pub const NAMES: &'static [&'static str] = &[
        "upper_left",
        "upper_middle",
        "upper_right",
        "middle_left",
        "middle_middle",
        "middle_right",
        "lower_left",
        "lower_middle",
        "lower_right",
    ];

    pub const fn new(vertical: VerticalAlign, horizontal: HorizontalAlign) -> Self {
        Self {
            vertical,
            horizontal,
        }
    }

    /// Every position, row by row from the top left.
    pub fn all() -> impl Iterator<Item = Self> {
        use HorizontalAlign as H;
        use VerticalAlign as V;
        [V::Upper, V::Middle, V::Lower]
            .into_iter()
            .flat_map(|v| [H::Left, H::Middle, H::Right].map(move |h| Self::new(v, h)))
    }
}

impl Default for OverlayPosition {
    fn default() -> Self {
        Self::new(VerticalAlign::Lower, HorizontalAlign::Right)
    }
}

impl FromStr for OverlayPosition {
    type Err = ParseParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseParamError::new("overlay position", s, Self::NAMES);
        let lowered = s.trim().to_ascii_lowercase();
        let (v, h) = lowered.split_once('_').ok_or_else(err)?;
        let vertical = match v {
            "upper" => VerticalAlign::Upper,
            "middle" => VerticalAlign::Middle,
            "lower" => VerticalAlign::Lower,
            _ => return Err(err()),
        };
        let horizontal = match h {
            "left" => HorizontalAlign::Left,
            "middle" => HorizontalAlign::Middle,
            "right" => HorizontalAlign::Right,
            _ => return Err(err()),
        };
        Ok(Self::new(vertical, horizontal))
    }
}

impl TryFrom<String> for OverlayPosition {
    type Error = ParseParamError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<OverlayPosition> for String {
    fn from(value: OverlayPosition) -> Self {
        value.to_string()
    }
}

impl fmt::Display for OverlayPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let v = match self.vertical {
            VerticalAlign::Upper => "upper",
            VerticalAlign::Middle => "middle",
            VerticalAlign::Lower => "lower",
        };
        let h = match self.horizontal {
            HorizontalAlign::Left => "left",
            HorizontalAlign::Middle => "middle",
            HorizontalAlign::Right => "right",
        };
        write!(f, "{v}_{h}")
    }
}

/// Overlay composite request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlaySpec {
    pub path: PathBuf,
    pub position: OverlayPosition,
    /// Distance in pixels from the nearest edges. Ignored on a `Middle` axis.
    pub buffer_px: u32,
    pub invert: bool,
}

/// Everything [`process`](super::compositor::process) needs besides the source path.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOptions {
    pub target: TargetResolution,
    pub anchor: CropAnchor,
    pub border: Option<Border>,
    pub overlay: Option<OverlaySpec>,
}
