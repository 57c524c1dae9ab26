//! Sibling comparison logic

use crate::types::PlanReason;
use std::fs::Metadata;
use std::time::SystemTime;

/// Staleness policies applied to siblings present on both sides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiffOptions {
    /// Re-plan a file whose destination mtime is strictly older
    pub update_newer: bool,

    /// Re-plan a file whose destination is strictly smaller
    pub update_larger: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            update_newer: true,
            update_larger: false,
        }
    }
}

/// Decide whether an existing sibling must be transferred again
///
/// Only regular source files are candidates; directories are walked by the
/// caller instead. The mtime policy is checked first, so a file that is both
/// older and smaller is reported as `Stale`.
pub fn compare_siblings(
    src: &Metadata,
    dest: &Metadata,
    options: &DiffOptions,
) -> Option<PlanReason> {
    if !src.is_file() {
        return None;
    }

    if options.update_newer {
        if let (Ok(src_mtime), Ok(dest_mtime)) = (src.modified(), dest.modified()) {
            if is_older(dest_mtime, src_mtime) {
                return Some(PlanReason::Stale);
            }
        }
    }

    if options.update_larger && dest.len() < src.len() {
        return Some(PlanReason::Smaller);
    }

    None
}

fn is_older(candidate: SystemTime, reference: SystemTime) -> bool {
    candidate < reference
}
