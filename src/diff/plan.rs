//! Transfer plan generation: the source-driven tree walk

use crate::diff::{compare_siblings, DiffOptions, TransferPlan};
use crate::probe::SizeProbe;
use crate::types::{emit_event, EventCallback, PlanReason, PlannedEntry, SyncError, SyncEvent};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs::{self, Metadata};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// One directory pair on the walk stack
struct Frame {
    src: PathBuf,
    dst: PathBuf,
    names: std::vec::IntoIter<OsString>,
    dst_names: HashSet<OsString>,
}

/// Build the transfer plan for one direction (`src_root` → `dst_root`).
///
/// For every entry under `src_root`:
/// - no sibling in `dst_root`: planned as `Missing` with its whole probed size,
///   and not descended into
/// - sibling present: planned again when `compare_siblings` says so; directories
///   are always descended into, whatever the comparison said
///
/// Entries that exist only in `dst_root` are never looked at. The walk is
/// depth-first with an explicit stack; names inside a directory are visited in
/// sorted order so the same trees always produce the same plan.
///
/// Any entry that cannot be compared (symlink, permission denied, vanished
/// between listing and stat) aborts the walk with `SyncError::Diff`.
///
/// # Example
/// ```no_run
/// use dirsync::diff::{diff_trees, DiffOptions};
/// use dirsync::probe::ApparentSize;
/// use std::path::Path;
///
/// let plan = diff_trees(
///     Path::new("left"),
///     Path::new("right"),
///     &DiffOptions::default(),
///     &ApparentSize,
///     None,
/// )?;
/// println!("{} entries, {} bytes", plan.len(), plan.total_bytes());
/// # Ok::<(), dirsync::SyncError>(())
/// ```
pub fn diff_trees(
    src_root: &Path,
    dst_root: &Path,
    options: &DiffOptions,
    probe: &dyn SizeProbe,
    on_event: Option<&EventCallback>,
) -> Result<TransferPlan, SyncError> {
    emit_event(
        on_event,
        SyncEvent::DiffStarted {
            src_root: src_root.to_path_buf(),
            dst_root: dst_root.to_path_buf(),
        },
    );

    let mut plan = TransferPlan::new(src_root, dst_root);

    if !src_root.is_dir() {
        tracing::warn!(
            src = %src_root.display(),
            "source root is not a directory; nothing to compare"
        );
        finish(&plan, on_event);
        return Ok(plan);
    }

    let mut stack = vec![open_frame(src_root, dst_root)?];

    while let Some(frame) = stack.last_mut() {
        let Some(name) = frame.names.next() else {
            stack.pop();
            continue;
        };
        let has_sibling = frame.dst_names.contains(&name);
        let src = frame.src.join(&name);
        let dst = frame.dst.join(&name);

        let src_meta = entry_metadata(&src)?;

        if !has_sibling {
            let bytes = probe_entry(probe, &src)?;
            record(&mut plan, src, dst, bytes, PlanReason::Missing, on_event);
            continue;
        }

        let dst_meta = entry_metadata(&dst)?;

        if let Some(reason) = compare_siblings(&src_meta, &dst_meta, options) {
            let bytes = probe_entry(probe, &src)?;
            record(&mut plan, src.clone(), dst.clone(), bytes, reason, on_event);
        }

        if src_meta.is_dir() {
            stack.push(open_frame(&src, &dst)?);
        }
    }

    finish(&plan, on_event);
    Ok(plan)
}

fn record(
    plan: &mut TransferPlan,
    src: PathBuf,
    dst: PathBuf,
    bytes: u64,
    reason: PlanReason,
    on_event: Option<&EventCallback>,
) {
    tracing::debug!(src = %src.display(), dst = %dst.display(), bytes, ?reason, "planned");

    if plan.add(PlannedEntry::new(src.clone(), dst.clone(), bytes, reason)) {
        emit_event(
            on_event,
            SyncEvent::EntryPlanned {
                src,
                dst,
                bytes,
                reason,
            },
        );
    }
}

fn finish(plan: &TransferPlan, on_event: Option<&EventCallback>) {
    tracing::info!(
        src = %plan.src_root().display(),
        dst = %plan.dst_root().display(),
        entries = plan.len(),
        bytes = plan.total_bytes(),
        "diff complete"
    );
    emit_event(
        on_event,
        SyncEvent::DiffCompleted {
            entries: plan.len(),
            total_bytes: plan.total_bytes(),
        },
    );
}

fn open_frame(src: &Path, dst: &Path) -> Result<Frame, SyncError> {
    let mut names = list_names(src)?;
    names.sort();
    let dst_names = list_names(dst)?.into_iter().collect();

    Ok(Frame {
        src: src.to_path_buf(),
        dst: dst.to_path_buf(),
        names: names.into_iter(),
        dst_names,
    })
}

fn list_names(dir: &Path) -> Result<Vec<OsString>, SyncError> {
    let reader = fs::read_dir(dir).map_err(|e| diff_io_error(dir, e))?;
    reader
        .map(|entry| {
            entry
                .map(|entry| entry.file_name())
                .map_err(|e| diff_io_error(dir, e))
        })
        .collect()
}

/// Stat one compared entry without following links.
fn entry_metadata(path: &Path) -> Result<Metadata, SyncError> {
    let metadata = fs::symlink_metadata(path).map_err(|e| diff_io_error(path, e))?;
    if metadata.file_type().is_symlink() {
        return Err(SyncError::Diff {
            path: path.to_path_buf(),
            reason: "symbolic links are not compared".to_string(),
        });
    }
    Ok(metadata)
}

fn probe_entry(probe: &dyn SizeProbe, path: &Path) -> Result<u64, SyncError> {
    probe.size_of(path).map_err(|e| SyncError::Diff {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

fn diff_io_error(path: &Path, error: std::io::Error) -> SyncError {
    let reason = match error.kind() {
        ErrorKind::NotFound => "entry vanished during comparison".to_string(),
        ErrorKind::PermissionDenied => "permission denied".to_string(),
        _ => error.to_string(),
    };
    SyncError::Diff {
        path: path.to_path_buf(),
        reason,
    }
}
