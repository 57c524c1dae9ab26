//! Move implementation
//!
//! A move is a rename. When source and destination live on different
//! filesystems the rename fails with EXDEV and the entry is copied then removed.

use super::copy::copy_entry;
use std::fs;
use std::io;
use std::path::Path;

/// Relocate a file or directory from `src` to `dest`.
///
/// An existing destination file is replaced.
pub fn move_entry(src: &Path, dest: &Path) -> io::Result<()> {
    match fs::rename(src, dest) {
        Ok(()) => Ok(()),
        Err(e) if is_cross_device(&e) => {
            tracing::debug!(
                src = %src.display(),
                dest = %dest.display(),
                "rename crosses filesystems, falling back to copy + remove"
            );
            copy_entry(src, dest)?;
            remove_path_any(src)
        }
        Err(e) => Err(e),
    }
}

/// Remove any filesystem entry at `path`.
///
/// Directories are removed recursively; files and symlinks are removed as files.
pub fn remove_path_any(path: &Path) -> io::Result<()> {
    let metadata = fs::symlink_metadata(path)?;
    if metadata.file_type().is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    }
}

#[cfg(unix)]
fn is_cross_device(error: &io::Error) -> bool {
    // EXDEV
    matches!(error.raw_os_error(), Some(18))
}

#[cfg(windows)]
fn is_cross_device(error: &io::Error) -> bool {
    // ERROR_NOT_SAME_DEVICE
    matches!(error.raw_os_error(), Some(17))
}

#[cfg(not(any(unix, windows)))]
fn is_cross_device(_error: &io::Error) -> bool {
    false
}
