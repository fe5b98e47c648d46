//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.
//!
//! ```text
//! Processed dusk.jpg (3000x2000)
//!     Crop: left → 1500x2000 at (0, 0)
//!     Resize: 1620x2160
//!     Border: 30px outset
//!     Overlay: text_overlay.png at lower_right (buffer 150px, inverted)
//!     Output: dusk_processed.png (1680x2220)
//! ```

use crate::device::{DeviceConfig, KeyValueFile, REMARKABLE_PASSWORD};
use crate::imaging::{BorderMode, ProcessOptions, Processed};
use std::path::Path;

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

// ============================================================================
// process
// ============================================================================

pub fn format_process_output(
    source: &Path,
    output: &Path,
    processed: &Processed,
    options: &ProcessOptions,
) -> Vec<String> {
    let (src_w, src_h) = processed.source_dimensions;
    let crop = processed.crop;
    let mut lines = vec![format!("Processed {} ({src_w}x{src_h})", file_name(source))];

    if crop.is_full(processed.source_dimensions) {
        lines.push(format!("{}Crop: none (aspect already matches)", indent(1)));
    } else {
        lines.push(format!(
            "{}Crop: {} → {}x{} at ({}, {})",
            indent(1),
            options.anchor,
            crop.width,
            crop.height,
            crop.x,
            crop.y
        ));
    }

    let fit = match options.border {
        Some(b) if b.mode == BorderMode::Inset => {
            let t = 2 * b.thickness;
            format!(
                "{}x{}",
                options.target.width.saturating_sub(t),
                options.target.height.saturating_sub(t)
            )
        }
        _ => options.target.to_string(),
    };
    lines.push(format!("{}Resize: {fit}", indent(1)));

    if let Some(border) = options.border {
        let mode = match border.mode {
            BorderMode::Outset => "outset",
            BorderMode::Inset => "inset",
        };
        lines.push(format!("{}Border: {}px {mode}", indent(1), border.thickness));
    }

    if let Some(overlay) = &options.overlay {
        let mut detail = Vec::new();
        if overlay.buffer_px > 0 {
            detail.push(format!("buffer {}px", overlay.buffer_px));
        }
        if overlay.invert {
            detail.push("inverted".to_string());
        }
        let detail = if detail.is_empty() {
            String::new()
        } else {
            format!(" ({})", detail.join(", "))
        };
        lines.push(format!(
            "{}Overlay: {} at {}{detail}",
            indent(1),
            file_name(&overlay.path),
            overlay.position
        ));
    }

    lines.push(format!(
        "{}Output: {} ({}x{})",
        indent(1),
        output.display(),
        processed.image.width(),
        processed.image.height()
    ));
    lines
}

pub fn print_process_output(
    source: &Path,
    output: &Path,
    processed: &Processed,
    options: &ProcessOptions,
) {
    for line in format_process_output(source, output, processed, options) {
        println!("{line}");
    }
}

// ============================================================================
// move / push
// ============================================================================

pub fn format_move_output(from: &Path, to: &Path) -> Vec<String> {
    vec![
        format!("Staged {}", file_name(to)),
        format!("{}From: {}", indent(1), from.display()),
        format!("{}To: {}", indent(1), to.display()),
    ]
}

pub fn print_move_output(from: &Path, to: &Path) {
    for line in format_move_output(from, to) {
        println!("{line}");
    }
}

pub fn format_push_output(file: &Path, config: &DeviceConfig) -> Vec<String> {
    vec![
        format!("Pushed {} to {}", file_name(file), config.ip),
        format!("{}Remote: {}", indent(1), config.remote_path()),
        format!(
            "{}Reboot the tablet or restart xochitl to see the new sleep screen",
            indent(1)
        ),
    ]
}

pub fn print_push_output(file: &Path, config: &DeviceConfig) {
    for line in format_push_output(file, config) {
        println!("{line}");
    }
}

// ============================================================================
// check-config
// ============================================================================

/// List every key in a device config file, masking the password.
pub fn format_device_config(file: &KeyValueFile) -> Vec<String> {
    let mut lines = vec![format!("Device config {}", file.path().display())];
    for (key, value) in file.iter() {
        let shown = if key == REMARKABLE_PASSWORD {
            "***"
        } else {
            value
        };
        lines.push(format!("{}{key} = {shown}", indent(1)));
    }
    lines
}

pub fn print_device_config(file: &KeyValueFile) {
    for line in format_device_config(file) {
        println!("{line}");
    }
}
