//! Size probes: byte size of a file or a whole tree
//!
//! The same probe instance is shared by the differ (to fill the transfer
//! total) and by the progress monitor (to measure the destination), so the
//! percentage is always a ratio of two numbers computed the same way.

use crate::types::SyncError;
use serde::{Deserialize, Serialize};
use std::fs::{self, Metadata};
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

/// Strategy used to count bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SizeMode {
    /// Sum of reported lengths, directories included (`du -bs`)
    #[default]
    Apparent,

    /// Sum of allocated blocks (`du -s --block-size=1`), Unix only
    Allocated,
}

/// Returns the byte size of a file or the recursive size of a directory.
pub trait SizeProbe: Send + Sync {
    /// Probe `path`; directories are summed recursively without following symlinks.
    fn size_of(&self, path: &Path) -> Result<u64, SyncError>;

    /// Strategy name for logs
    fn name(&self) -> &'static str;
}

/// Select the probe for `mode` on the running platform.
///
/// Fails with `SyncError::UnsupportedPlatform` when no strategy exists here,
/// so callers hit the error at startup instead of on the first probe.
pub fn probe_for(mode: SizeMode) -> Result<Arc<dyn SizeProbe>, SyncError> {
    match mode {
        SizeMode::Apparent => apparent_probe(),
        SizeMode::Allocated => allocated_probe(),
    }
}

#[cfg(any(unix, windows))]
fn apparent_probe() -> Result<Arc<dyn SizeProbe>, SyncError> {
    Ok(Arc::new(ApparentSize))
}

#[cfg(not(any(unix, windows)))]
fn apparent_probe() -> Result<Arc<dyn SizeProbe>, SyncError> {
    Err(SyncError::UnsupportedPlatform(format!(
        "no size probe for {}",
        std::env::consts::OS
    )))
}

#[cfg(unix)]
fn allocated_probe() -> Result<Arc<dyn SizeProbe>, SyncError> {
    Ok(Arc::new(AllocatedSize))
}

#[cfg(not(unix))]
fn allocated_probe() -> Result<Arc<dyn SizeProbe>, SyncError> {
    Err(SyncError::UnsupportedPlatform(format!(
        "allocated size probing is not available on {}",
        std::env::consts::OS
    )))
}

/// Apparent size: `metadata.len()` of every entry.
#[derive(Debug, Clone, Copy, Default)]
pub struct ApparentSize;

impl SizeProbe for ApparentSize {
    fn size_of(&self, path: &Path) -> Result<u64, SyncError> {
        sum_tree(path, |metadata| metadata.len())
    }

    fn name(&self) -> &'static str {
        "apparent"
    }
}

/// Allocated size: 512-byte blocks actually reserved on disk.
#[cfg(unix)]
#[derive(Debug, Clone, Copy, Default)]
pub struct AllocatedSize;

#[cfg(unix)]
impl SizeProbe for AllocatedSize {
    fn size_of(&self, path: &Path) -> Result<u64, SyncError> {
        use std::os::unix::fs::MetadataExt;
        sum_tree(path, |metadata| metadata.blocks() * 512)
    }

    fn name(&self) -> &'static str {
        "allocated"
    }
}

/// Walk `path` and add up `measure` over every entry, root included.
///
/// The probed root vanishing is an error. A child vanishing between listing
/// and stat is not: the destination tree is measured while it is being written.
fn sum_tree(path: &Path, measure: fn(&Metadata) -> u64) -> Result<u64, SyncError> {
    let root = fs::symlink_metadata(path).map_err(|e| probe_error(path, e.to_string()))?;
    if !root.is_dir() {
        return Ok(measure(&root));
    }

    let mut total = 0u64;
    let walker = jwalk::WalkDir::new(path)
        .skip_hidden(false)
        .follow_links(false)
        .sort(false);

    for result in walker {
        let entry = match result {
            Ok(entry) => entry,
            Err(e) if is_vanished(e.io_error()) => continue,
            Err(e) => return Err(probe_error(path, e.to_string())),
        };

        match entry.metadata() {
            Ok(metadata) => total = total.saturating_add(measure(&metadata)),
            Err(e) if is_vanished(e.io_error()) => continue,
            Err(e) => return Err(probe_error(&entry.path(), e.to_string())),
        }
    }

    // Vanished children were skipped above; the root itself must still exist.
    if fs::symlink_metadata(path).is_err() {
        return Err(probe_error(path, "path disappeared during probe".to_string()));
    }

    Ok(total)
}

fn is_vanished(error: Option<&std::io::Error>) -> bool {
    error.is_some_and(|e| e.kind() == ErrorKind::NotFound)
}

fn probe_error(path: &Path, message: String) -> SyncError {
    SyncError::Probe {
        path: path.to_path_buf(),
        message,
    }
}
