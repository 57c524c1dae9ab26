//! Transfer plan types produced by the diff walk

use crate::types::{PlanReason, PlannedEntry};
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Running byte total of a plan.
///
/// Only grows, and only while the plan is being built. Once the differ hands
/// the plan back it is read by value (`bytes()`), never mutated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct TransferTotal(u64);

impl TransferTotal {
    pub fn bytes(self) -> u64 {
        self.0
    }

    fn add(&mut self, bytes: u64) {
        self.0 = self.0.saturating_add(bytes);
    }
}

/// Ordered source → destination mapping for one diff pass
#[derive(Debug, Clone, PartialEq)]
pub struct TransferPlan {
    src_root: PathBuf,
    dst_root: PathBuf,
    entries: Vec<PlannedEntry>,
    index: HashMap<PathBuf, usize>,
    total: TransferTotal,
    stats: PlanStats,
}

impl TransferPlan {
    /// Create an empty plan for one direction
    pub fn new(src_root: impl Into<PathBuf>, dst_root: impl Into<PathBuf>) -> Self {
        Self {
            src_root: src_root.into(),
            dst_root: dst_root.into(),
            entries: Vec::new(),
            index: HashMap::new(),
            total: TransferTotal::default(),
            stats: PlanStats::default(),
        }
    }

    /// Append an entry and add its bytes to the total.
    ///
    /// Returns `false` (and changes nothing) when `entry.src` is already planned;
    /// existing entries are never replaced or removed.
    pub fn add(&mut self, entry: PlannedEntry) -> bool {
        if self.index.contains_key(&entry.src) {
            return false;
        }

        match entry.reason {
            PlanReason::Missing => self.stats.missing_count += 1,
            PlanReason::Stale => self.stats.stale_count += 1,
            PlanReason::Smaller => self.stats.smaller_count += 1,
        }
        self.total.add(entry.bytes);
        self.index.insert(entry.src.clone(), self.entries.len());
        self.entries.push(entry);
        true
    }

    /// Destination planned for `src`, if any
    pub fn get(&self, src: &Path) -> Option<&Path> {
        self.index
            .get(src)
            .map(|&position| self.entries[position].dst.as_path())
    }

    /// Entries in discovery order
    pub fn iter(&self) -> impl Iterator<Item = &PlannedEntry> {
        self.entries.iter()
    }

    pub fn entries(&self) -> &[PlannedEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> TransferTotal {
        self.total
    }

    pub fn total_bytes(&self) -> u64 {
        self.total.bytes()
    }

    pub fn stats(&self) -> &PlanStats {
        &self.stats
    }

    pub fn src_root(&self) -> &Path {
        &self.src_root
    }

    pub fn dst_root(&self) -> &Path {
        &self.dst_root
    }
}

/// Per-reason counts for a plan
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PlanStats {
    /// Entries with no destination sibling
    pub missing_count: usize,

    /// Files whose destination sibling is older
    pub stale_count: usize,

    /// Files whose destination sibling is smaller
    pub smaller_count: usize,
}
