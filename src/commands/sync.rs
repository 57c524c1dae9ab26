//! Main sync command

use crate::config::Config;
use crate::diff::{diff_trees, TransferPlan};
use crate::executor::{execute_plan, TransferResult};
use crate::monitor;
use crate::probe::{probe_for, SizeProbe};
use crate::types::{SharedCallback, SyncError, SyncEvent};
use crate::ui::{self, EventLog, ProgressReporter};
use std::sync::Arc;

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// Nothing to transfer
    UpToDate,
    /// `--test`: plans built, nothing executed
    DryRun,
    /// The user answered no at the prompt
    Declined,
    /// Every plan executed
    Completed,
}

/// Result of one sync run
#[derive(Debug, Clone)]
pub struct SyncSummary {
    /// One plan per direction pass, in execution order
    pub plans: Vec<TransferPlan>,
    pub planned_entries: usize,
    pub total_bytes: u64,
    pub status: RunStatus,
    /// Merged result of every executed plan
    pub transfer: TransferResult,
}

/// Asks the user whether to transfer `total_bytes`.
pub type ConfirmFn<'a> = &'a dyn Fn(u64) -> Result<bool, SyncError>;

/// Run the sync operation with terminal reporting.
pub fn run(config: Config) -> Result<SyncSummary, SyncError> {
    let reporter = Arc::new(ProgressReporter::new(config.bar_width, config.quiet));
    let log = match &config.logfile {
        Some(path) => Some(Arc::new(EventLog::create(path)?)),
        None => None,
    };

    let on_event: SharedCallback = {
        let reporter = Arc::clone(&reporter);
        let log = log.clone();
        Arc::new(move |event: &SyncEvent| {
            reporter.handle(event);
            if let Some(log) = &log {
                log.record(event);
            }
        })
    };

    let assume_yes = config.assume_yes;
    let confirm = move |_total_bytes: u64| {
        if assume_yes {
            Ok(true)
        } else {
            ui::confirm()
        }
    };

    let result = run_with(&config, &confirm, on_event);
    if let Some(log) = &log {
        log.flush();
    }
    if let Ok(summary) = &result {
        reporter.finish_run(summary);
    }
    result
}

/// Run the sync phases: diff every pass, confirm, then execute each plan
/// under its own progress monitor.
///
/// Any phase error is reported as a `SyncEvent::Error` before it is returned.
pub fn run_with(
    config: &Config,
    confirm: ConfirmFn<'_>,
    on_event: SharedCallback,
) -> Result<SyncSummary, SyncError> {
    let result = probe_for(config.size_mode).and_then(|probe| {
        tracing::info!(
            left = %config.left.display(),
            right = %config.right.display(),
            direction = %config.direction,
            action = %config.action,
            probe = probe.name(),
            "starting sync"
        );
        run_phases(config, confirm, &probe, &on_event)
    });

    if let Err(e) = &result {
        tracing::error!(kind = e.kind_label(), error = %e, "sync aborted");
        on_event(&SyncEvent::from_error(e));
    }
    result
}

fn run_phases(
    config: &Config,
    confirm: ConfirmFn<'_>,
    probe: &Arc<dyn SizeProbe>,
    on_event: &SharedCallback,
) -> Result<SyncSummary, SyncError> {
    let options = config.diff_options();

    // Every pass is diffed before anything moves.
    let mut plans = Vec::new();
    for (src, dst) in config.direction.passes(&config.left, &config.right) {
        plans.push(diff_trees(
            src,
            dst,
            &options,
            probe.as_ref(),
            Some(on_event.as_ref()),
        )?);
    }

    let mut summary = SyncSummary {
        planned_entries: plans.iter().map(TransferPlan::len).sum(),
        total_bytes: plans
            .iter()
            .fold(0u64, |acc, plan| acc.saturating_add(plan.total_bytes())),
        plans,
        status: RunStatus::UpToDate,
        transfer: TransferResult::default(),
    };

    if summary.planned_entries == 0 {
        tracing::info!("folders up to date");
        return Ok(summary);
    }

    if config.dry_run {
        summary.status = RunStatus::DryRun;
        return Ok(summary);
    }

    on_event(&SyncEvent::ConfirmationRequested {
        total_bytes: summary.total_bytes,
    });
    if !confirm(summary.total_bytes)? {
        tracing::info!("transfer declined");
        summary.status = RunStatus::Declined;
        return Ok(summary);
    }

    for plan in summary.plans.iter().filter(|plan| !plan.is_empty()) {
        let result = execute_monitored(plan, config, probe, on_event)?;
        summary.transfer.merge(&result);
    }

    summary.status = RunStatus::Completed;
    Ok(summary)
}

/// Execute one plan while a monitor samples its destination root.
///
/// The monitor is always stopped before this returns, including when the
/// executor fails. A monitor error only costs progress output.
fn execute_monitored(
    plan: &TransferPlan,
    config: &Config,
    probe: &Arc<dyn SizeProbe>,
    on_event: &SharedCallback,
) -> Result<TransferResult, SyncError> {
    let initial_size = probe.size_of(plan.dst_root())?;
    let handle = monitor::start(
        plan.dst_root(),
        initial_size,
        plan.total_bytes(),
        Arc::clone(probe),
        config.monitor_settings(),
        Some(Arc::clone(on_event)),
    )?;

    let result = execute_plan(plan, config.action, Some(on_event.as_ref()));

    if let Err(e) = handle.stop() {
        tracing::warn!(dst = %plan.dst_root().display(), error = %e, "progress monitor failed");
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{SyncDirection, TransferAction};
    use std::fs;
    use std::sync::Mutex;
    use std::time::Duration;
    use tempfile::TempDir;

    fn config(left: &TempDir, right: &TempDir) -> Config {
        let mut config = Config {
            left: left.path().to_path_buf(),
            right: right.path().to_path_buf(),
            assume_yes: true,
            quiet: true,
            sample_interval: Duration::from_millis(10),
            ..Config::default()
        };
        config.validate().expect("valid config");
        config
    }

    fn recorder() -> (SharedCallback, Arc<Mutex<Vec<SyncEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&events);
        let callback: SharedCallback = Arc::new(move |event: &SyncEvent| {
            sink.lock().expect("lock events").push(event.clone());
        });
        (callback, events)
    }

    fn always(answer: bool) -> impl Fn(u64) -> Result<bool, SyncError> {
        move |_| Ok(answer)
    }

    #[test]
    fn test_up_to_date_skips_confirmation() {
        let left = TempDir::new().expect("create left");
        let right = TempDir::new().expect("create right");
        let (callback, events) = recorder();
        let never = |_: u64| -> Result<bool, SyncError> { panic!("prompt must not run") };

        let summary = run_with(&config(&left, &right), &never, callback).expect("run");

        assert_eq!(summary.status, RunStatus::UpToDate);
        let events = events.lock().expect("lock events");
        assert!(!events
            .iter()
            .any(|e| matches!(e, SyncEvent::ConfirmationRequested { .. })));
    }

    #[test]
    fn test_dry_run_leaves_trees_alone() {
        let left = TempDir::new().expect("create left");
        let right = TempDir::new().expect("create right");
        fs::write(left.path().join("x.txt"), b"0123456789").expect("write x");
        let mut config = config(&left, &right);
        config.dry_run = true;
        let (callback, _) = recorder();

        let summary = run_with(&config, &always(true), callback).expect("run");

        assert_eq!(summary.status, RunStatus::DryRun);
        assert_eq!(summary.planned_entries, 1);
        assert_eq!(summary.total_bytes, 10);
        assert!(!right.path().join("x.txt").exists());
    }

    #[test]
    fn test_declined_transfers_nothing() {
        let left = TempDir::new().expect("create left");
        let right = TempDir::new().expect("create right");
        fs::write(left.path().join("x.txt"), b"0123456789").expect("write x");
        let (callback, _) = recorder();

        let summary = run_with(&config(&left, &right), &always(false), callback).expect("run");

        assert_eq!(summary.status, RunStatus::Declined);
        assert!(!right.path().join("x.txt").exists());
    }

    #[test]
    fn test_both_directions_copy() {
        let left = TempDir::new().expect("create left");
        let right = TempDir::new().expect("create right");
        fs::write(left.path().join("from_left.txt"), b"left").expect("write left");
        fs::write(right.path().join("from_right.txt"), b"right").expect("write right");
        let mut config = config(&left, &right);
        config.direction = SyncDirection::Both;
        let (callback, _) = recorder();

        let summary = run_with(&config, &always(true), callback).expect("run");

        assert_eq!(summary.status, RunStatus::Completed);
        assert_eq!(summary.plans.len(), 2);
        assert_eq!(summary.transfer.transferred, 2);
        assert_eq!(summary.transfer.bytes_moved, 9);
        assert!(right.path().join("from_left.txt").exists());
        assert!(left.path().join("from_right.txt").exists());
    }

    #[test]
    fn test_move_runs_monitor_and_empties_source() {
        let left = TempDir::new().expect("create left");
        let right = TempDir::new().expect("create right");
        fs::create_dir(left.path().join("d")).expect("create d");
        fs::write(left.path().join("d/inner.bin"), vec![7u8; 4096]).expect("write inner");
        let mut config = config(&left, &right);
        config.action = TransferAction::Move;
        let (callback, events) = recorder();

        let summary = run_with(&config, &always(true), callback).expect("run");

        assert_eq!(summary.status, RunStatus::Completed);
        assert!(!left.path().join("d").exists());
        assert!(right.path().join("d/inner.bin").exists());

        let events = events.lock().expect("lock events");
        let last_sample = events.iter().rev().find_map(|e| match e {
            SyncEvent::ProgressSample { percent, .. } => Some(*percent),
            _ => None,
        });
        assert!(last_sample.is_some(), "final sample taken after transfer");
    }

    #[test]
    fn test_confirm_error_is_reported() {
        let left = TempDir::new().expect("create left");
        let right = TempDir::new().expect("create right");
        fs::write(left.path().join("x.txt"), b"x").expect("write x");
        let (callback, events) = recorder();
        let invalid =
            |_: u64| -> Result<bool, SyncError> { Err(SyncError::Config("Invalid option.".to_string())) };

        let err = run_with(&config(&left, &right), &invalid, callback).expect_err("must fail");

        assert!(matches!(err, SyncError::Config(_)));
        let events = events.lock().expect("lock events");
        assert!(matches!(events.last(), Some(SyncEvent::Error { .. })));
    }
}
