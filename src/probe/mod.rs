//! Filesystem probes: path validation and size measurement

mod size;
mod validate;

#[cfg(unix)]
pub use size::AllocatedSize;
pub use size::{probe_for, ApparentSize, SizeMode, SizeProbe};
pub use validate::{is_readable, validate_path};
