//! Staging the processed image.
//!
//! The composite is moved into the `SOURCE_PATH` staging directory under a
//! fixed name (`suspended.png` by default) before it is pushed. An existing
//! staged file is never replaced unless the caller opts in with `overwrite`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum MoveError {
    #[error("source file {} does not exist", .0.display())]
    SourceNotFound(PathBuf),
    #[error(
        "file path {} exists and is protected from being overwritten; move it away or pass --overwrite",
        .0.display()
    )]
    DestinationExists(PathBuf),
    #[error("failed to move {} to {}: {source}", from.display(), to.display())]
    Io {
        from: PathBuf,
        to: PathBuf,
        source: io::Error,
    },
}

/// Fail with [`MoveError::DestinationExists`] when `path` exists and `overwrite` is off.
pub fn ensure_writable(path: &Path, overwrite: bool) -> Result<(), MoveError> {
    if !overwrite && path.exists() {
        warn!(path = %path.display(), "refusing to overwrite");
        return Err(MoveError::DestinationExists(path.to_path_buf()));
    }
    Ok(())
}

/// Move `source` to `destination_dir/file_name`.
///
/// Creates `destination_dir` when missing. A plain rename is tried first;
/// when that fails (e.g. across filesystems) the file is copied and the
/// original removed. Returns the final path.
pub fn move_file(
    source: &Path,
    destination_dir: &Path,
    file_name: &str,
    overwrite: bool,
) -> Result<PathBuf, MoveError> {
    if !source.is_file() {
        return Err(MoveError::SourceNotFound(source.to_path_buf()));
    }
    let destination = destination_dir.join(file_name);
    ensure_writable(&destination, overwrite)?;

    let io_err = |source_err: io::Error| MoveError::Io {
        from: source.to_path_buf(),
        to: destination.clone(),
        source: source_err,
    };

    fs::create_dir_all(destination_dir).map_err(io_err)?;

    if let Err(e) = fs::rename(source, &destination) {
        debug!(error = %e, "rename failed, falling back to copy");
        copy_into_place(source, &destination).map_err(io_err)?;
        if let Err(e) = fs::remove_file(source) {
            warn!(path = %source.display(), error = %e, "staged a copy but could not remove the source");
        }
    }

    info!(from = %source.display(), to = %destination.display(), "staged");
    Ok(destination)
}

/// Copy `source` over `destination` via a temp file in the same directory.
///
/// `destination` is either left as it was or fully replaced; a failed copy
/// never leaves a truncated file behind.
fn copy_into_place(source: &Path, destination: &Path) -> io::Result<()> {
    let dir = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut reader = fs::File::open(source)?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    io::copy(&mut reader, tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(destination).map_err(|e| e.error)?;
    Ok(())
}
