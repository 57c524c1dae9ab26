//! PlannedEntry - One source → destination pair in a transfer plan

use super::PlanReason;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// A single pair scheduled for transfer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlannedEntry {
    /// Existing entry under the source root
    pub src: PathBuf,

    /// Sibling location under the destination root
    pub dst: PathBuf,

    /// Probed size of `src` at plan-build time
    pub bytes: u64,

    /// Why the differ planned it
    pub reason: PlanReason,
}

impl PlannedEntry {
    pub fn new(src: PathBuf, dst: PathBuf, bytes: u64, reason: PlanReason) -> Self {
        Self {
            src,
            dst,
            bytes,
            reason,
        }
    }
}
