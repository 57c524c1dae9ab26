//! Run-wide modes: sync direction, transfer action, plan reasons

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Which root feeds which during a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SyncDirection {
    /// Left is the source, right the destination
    #[default]
    ToRight,

    /// Right is the source, left the destination
    ToLeft,

    /// Two independent passes, left→right then right→left
    Both,
}

impl SyncDirection {
    /// Ordered (source, destination) root pairs for this direction
    pub fn passes<'a>(&self, left: &'a Path, right: &'a Path) -> Vec<(&'a Path, &'a Path)> {
        match self {
            SyncDirection::ToRight => vec![(left, right)],
            SyncDirection::ToLeft => vec![(right, left)],
            SyncDirection::Both => vec![(left, right), (right, left)],
        }
    }
}

impl fmt::Display for SyncDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SyncDirection::ToRight => "to-right",
            SyncDirection::ToLeft => "to-left",
            SyncDirection::Both => "both",
        })
    }
}

/// What happens to each planned entry; one mode per run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum TransferAction {
    /// Duplicate the entry, source stays in place
    #[default]
    Copy,

    /// Relocate the entry, source disappears
    Move,
}

impl TransferAction {
    /// Progressive label used in transfer lines ("Copying x...")
    pub fn label(&self) -> &'static str {
        match self {
            TransferAction::Copy => "Copying",
            TransferAction::Move => "Moving",
        }
    }
}

impl fmt::Display for TransferAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransferAction::Copy => "copy",
            TransferAction::Move => "move",
        })
    }
}

/// Why the differ put an entry into a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanReason {
    /// Entry has no sibling on the destination side
    Missing,

    /// Destination file is older than the source file
    Stale,

    /// Destination file is smaller than the source file
    Smaller,
}
