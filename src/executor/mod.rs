//! Executor module for file operations

pub mod copy;
pub mod relocate;

use crate::diff::TransferPlan;
use crate::probe::is_readable;
use crate::types::{emit_event, EventCallback, PlannedEntry, SyncError, SyncEvent, TransferAction};
use std::path::Path;
use std::time::{Duration, Instant};

pub use copy::{copy_entry, copy_file_atomic};
pub use relocate::move_entry;

/// Outcome of executing one plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferResult {
    /// Planned bytes of every entry actually transferred
    pub bytes_moved: u64,
    /// Wall time spent executing the plan
    pub elapsed: Duration,
    /// Number of entries copied or moved
    pub transferred: usize,
    /// Number of entries skipped because their source was unreadable
    pub skipped: usize,
}

impl TransferResult {
    /// Fold another plan's result into this one
    pub fn merge(&mut self, other: &TransferResult) {
        self.bytes_moved += other.bytes_moved;
        self.elapsed += other.elapsed;
        self.transferred += other.transferred;
        self.skipped += other.skipped;
    }
}

/// Execute a transfer plan
///
/// Entries run sequentially in plan order. An unreadable source is skipped
/// with an `EntrySkipped` event; any other failure stops the run with
/// `SyncError::Transfer` naming the pair. Entries transferred before the
/// failure stay where they are.
pub fn execute_plan(
    plan: &TransferPlan,
    action: TransferAction,
    on_event: Option<&EventCallback>,
) -> Result<TransferResult, SyncError> {
    execute_plan_with(plan, action, &is_readable, on_event)
}

/// Read-permission check applied to each source before it is transferred.
pub type ReadCheck = dyn Fn(&Path) -> bool;

/// `execute_plan` with a caller-supplied read-permission check.
///
/// The check only runs on sources that still exist.
pub fn execute_plan_with(
    plan: &TransferPlan,
    action: TransferAction,
    readable: &ReadCheck,
    on_event: Option<&EventCallback>,
) -> Result<TransferResult, SyncError> {
    let started = Instant::now();
    let mut result = TransferResult::default();

    emit_event(
        on_event,
        SyncEvent::TransferStarted {
            dst_root: plan.dst_root().to_path_buf(),
            total_bytes: plan.total_bytes(),
        },
    );

    for entry in plan.iter() {
        // A vanished source is not a permission problem; let the transfer fail on it.
        if entry.src.symlink_metadata().is_ok() && !readable(&entry.src) {
            tracing::warn!(src = %entry.src.display(), "no read permission, skipping");
            result.skipped += 1;
            emit_event(
                on_event,
                SyncEvent::EntrySkipped {
                    src: entry.src.clone(),
                    dst: entry.dst.clone(),
                    reason: "no read permission".to_string(),
                },
            );
            continue;
        }

        transfer_entry(entry, action)?;

        result.transferred += 1;
        result.bytes_moved += entry.bytes;
        emit_event(
            on_event,
            SyncEvent::EntryTransferred {
                src: entry.src.clone(),
                dst: entry.dst.clone(),
                action,
            },
        );
    }

    result.elapsed = started.elapsed();
    tracing::info!(
        dst = %plan.dst_root().display(),
        transferred = result.transferred,
        skipped = result.skipped,
        bytes = result.bytes_moved,
        "transfer complete"
    );
    emit_event(
        on_event,
        SyncEvent::TransferCompleted {
            bytes_moved: result.bytes_moved,
            elapsed: result.elapsed,
        },
    );

    Ok(result)
}

fn transfer_entry(entry: &PlannedEntry, action: TransferAction) -> Result<(), SyncError> {
    tracing::debug!(src = %entry.src.display(), dst = %entry.dst.display(), %action, "transfer");

    let outcome = match action {
        TransferAction::Copy => copy_entry(&entry.src, &entry.dst),
        TransferAction::Move => move_entry(&entry.src, &entry.dst),
    };

    outcome.map_err(|source| SyncError::Transfer {
        src: entry.src.clone(),
        dst: entry.dst.clone(),
        source,
    })
}
