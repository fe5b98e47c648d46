//! # sleep-screen
//!
//! Turns any photo into a reMarkable sleep screen: crop to the panel's aspect
//! ratio, resize to its exact resolution, optionally frame it in white and
//! stamp a text overlay, then stage it as `suspended.png` and push it to the
//! tablet over SSH.
//!
//! # Architecture: Linear Pipeline
//!
//! ```text
//! 1. Process   photo.jpg       →  photo_processed.png   (crop → resize → border → overlay)
//! 2. Move      photo_processed →  SOURCE_PATH/suspended.png
//! 3. Push      suspended.png   →  root@tablet:DESTINATION_DIR/DESTINATION_FILE
//! ```
//!
//! Each stage is its own CLI subcommand and `install` chains all three. The
//! compositor never touches the network and the pusher never touches
//! pixels; the only thing passed between them is a file path.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Stage 1: anchored crop, Lanczos3 resize, border, overlay compositing |
//! | [`relocate`] | Stage 2: moves the composite into the staging directory, never clobbering by accident |
//! | [`push`] | Stage 3: [`push::DevicePusher`] trait and the `ping`/`plink`/`pscp` implementation |
//! | [`device`] | `KEY=VALUE` device config parsing and required-key validation |
//! | [`settings`] | Optional `sleep-screen.toml` defaults, merged over stock values |
//! | [`output`] | CLI summary formatting |
//! | [`logging`] | `tracing` subscriber setup |
//!
//! # Design Decisions
//!
//! ## Border Grows the Canvas
//!
//! A border is added *after* the resize, so a 30px border on a 1620×2160
//! target yields a 1680×2220 image. The tablet scales it down to fit. When
//! the exact panel size matters, `inset = true` (or `--inset-border`) fits
//! the photo into `target - 2 * thickness` first so the framed result lands
//! on the target exactly.
//!
//! ## Shelling Out for SSH
//!
//! The tablet already runs an SSH server and the desktop already has PuTTY.
//! Rather than link an SSH stack, the pusher runs the same tools a user
//! would type by hand, which keeps failures diagnosable by re-running the
//! logged command (with the password masked).
//!
//! ## Atomic Writes
//!
//! The composite is encoded into a temporary file next to its destination and
//! renamed into place. A failed encode or a full disk never leaves a
//! half-written `suspended.png` behind to be pushed.

pub mod device;
pub mod imaging;
pub mod logging;
pub mod output;
pub mod push;
pub mod relocate;
pub mod settings;

#[cfg(test)]
pub(crate) mod test_helpers;
