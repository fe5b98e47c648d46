//! Image compositing in pure Rust.
//!
//! | Step | Function |
//! |---|---|
//! | **Crop** | [`crop_to_aspect`]: anchored crop to the target ratio |
//! | **Resize** | [`resize`]: Lanczos3 to exact target dimensions |
//! | **Border** | [`add_border`]: white padding on every edge |
//! | **Overlay** | [`composite_overlay`]: alpha paste at one of nine positions |
//!
//! The module is split into:
//! - **Geometry**: Pure functions for crop rectangles and paste offsets (unit testable)
//! - **Parameters**: Data structures describing what the pipeline should produce
//! - **Compositor**: Pixel operations on `image` buffers, plus load/save

pub mod compositor;
mod geometry;
mod params;

pub use compositor::{
    CompositeError, Processed, add_border, composite_overlay, crop_to_aspect, invert, load_image,
    process, process_detailed, processed_output_path, resize, save_image,
};
pub use geometry::{CropRect, crop_rect, inset_dimensions, overlay_origin};
pub use params::{
    Border, BorderMode, CropAnchor, HorizontalAlign, OverlayPosition, OverlaySpec,
    ParseParamError, ProcessOptions, TargetResolution, VerticalAlign,
};
