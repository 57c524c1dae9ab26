//! SyncEvent - Everything the core reports to the outside world
//!
//! The core never prints. The binary renders these events through
//! `ui::ProgressReporter` and, optionally, appends them to a logfile.

use super::{PlanReason, SyncError, TransferAction};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Events emitted across a sync run, in the order phases occur
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SyncEvent {
    /// A one-directional diff pass began
    DiffStarted { src_root: PathBuf, dst_root: PathBuf },

    /// The differ added an entry to the plan
    EntryPlanned {
        src: PathBuf,
        dst: PathBuf,
        bytes: u64,
        reason: PlanReason,
    },

    /// A diff pass finished
    DiffCompleted { entries: usize, total_bytes: u64 },

    /// All plans are built; the shell should ask before transferring
    ConfirmationRequested { total_bytes: u64 },

    /// A plan started executing against `dst_root`
    TransferStarted { dst_root: PathBuf, total_bytes: u64 },

    /// One pair was copied or moved
    EntryTransferred {
        src: PathBuf,
        dst: PathBuf,
        action: TransferAction,
    },

    /// One pair was left alone because its source is unreadable
    EntrySkipped {
        src: PathBuf,
        dst: PathBuf,
        reason: String,
    },

    /// Periodic destination-size sample from the progress monitor
    ProgressSample {
        filled: u64,
        percent: u8,
        throughput: u64,
    },

    /// A plan finished executing
    TransferCompleted { bytes_moved: u64, elapsed: Duration },

    /// A phase aborted
    Error {
        kind: String,
        path: Option<PathBuf>,
        message: String,
    },
}

impl SyncEvent {
    /// Build an `Error` event from a core error
    pub fn from_error(error: &SyncError) -> Self {
        SyncEvent::Error {
            kind: error.kind_label().to_string(),
            path: error.path().cloned(),
            message: error.to_string(),
        }
    }
}

/// Callback used to receive events on the calling thread.
pub type EventCallback = dyn Fn(&SyncEvent) + Send + Sync;

/// Shared callback, for consumers that outlive a borrow (the progress monitor).
pub type SharedCallback = Arc<EventCallback>;

pub(crate) fn emit_event(on_event: Option<&EventCallback>, event: SyncEvent) {
    if let Some(callback) = on_event {
        callback(&event);
    }
}
