//! Background progress monitor.
//!
//! The monitor never talks to the executor. It owns a small tokio runtime,
//! re-probes the destination root on a fixed interval and turns the growth
//! since start into `ProgressSample` events:
//! - `start()` spawns the sampling task and hands back a `MonitorHandle`
//! - `MonitorHandle::stop()` fires the oneshot cancel, waits for the task to
//!   emit its final sample and exit, then shuts the runtime down
//! - dropping the handle does the same, so the loop cannot outlive it

use crate::probe::SizeProbe;
use crate::types::{SharedCallback, SyncError, SyncEvent};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Default sampling interval
pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(100);

/// Default number of bar cells
pub const DEFAULT_BAR_WIDTH: u64 = 53;

/// Sampling knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorSettings {
    pub interval: Duration,
    pub bar_width: u64,
}

impl Default for MonitorSettings {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            bar_width: DEFAULT_BAR_WIDTH,
        }
    }
}

/// One progress reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProgressSample {
    /// Bar cells to fill, `round(bar_width * fraction)`
    pub filled: u64,
    /// Completion in [0, 100]
    pub percent: u8,
    /// Bytes per second grown since the previous sample
    pub throughput: u64,
}

impl ProgressSample {
    /// Turn raw destination sizes into a bounded sample.
    ///
    /// The fraction `(current - initial) / total` is clamped to [0, 1], so a
    /// shrinking destination reads 0% and an overshooting one reads 100%.
    /// A zero total reads as complete.
    pub fn compute(
        initial: u64,
        previous: u64,
        current: u64,
        total: u64,
        settings: &MonitorSettings,
    ) -> Self {
        let delta = current as i128 - initial as i128;
        let fraction = if total == 0 {
            1.0
        } else {
            (delta as f64 / total as f64).clamp(0.0, 1.0)
        };

        let secs = settings.interval.as_secs_f64();
        let throughput = if secs > 0.0 {
            (current.saturating_sub(previous) as f64 / secs) as u64
        } else {
            0
        };

        Self {
            filled: (settings.bar_width as f64 * fraction).round() as u64,
            percent: (fraction * 100.0).round() as u8,
            throughput,
        }
    }
}

/// What the monitor saw before it stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonitorSummary {
    pub samples: u64,
    pub last: Option<ProgressSample>,
}

/// Running monitor; stop it once the executor returns.
pub struct MonitorHandle {
    dest_root: PathBuf,
    runtime: Option<Runtime>,
    cancel_tx: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<Result<MonitorSummary, SyncError>>>,
}

/// Start sampling `dest_root`.
///
/// `initial_size` is the destination size measured before the executor
/// started; `total` is the plan total, fixed for the life of the monitor.
pub fn start(
    dest_root: &Path,
    initial_size: u64,
    total: u64,
    probe: Arc<dyn SizeProbe>,
    settings: MonitorSettings,
    on_event: Option<SharedCallback>,
) -> Result<MonitorHandle, SyncError> {
    let runtime = Builder::new_multi_thread()
        .worker_threads(1)
        .thread_name("dirsync-monitor")
        .enable_all()
        .build()?;

    let (cancel_tx, cancel_rx) = oneshot::channel();
    let task = runtime.spawn(sample_loop(
        dest_root.to_path_buf(),
        initial_size,
        total,
        probe,
        settings,
        on_event,
        cancel_rx,
    ));

    tracing::debug!(dest = %dest_root.display(), initial_size, total, "progress monitor started");

    Ok(MonitorHandle {
        dest_root: dest_root.to_path_buf(),
        runtime: Some(runtime),
        cancel_tx: Some(cancel_tx),
        task: Some(task),
    })
}

impl MonitorHandle {
    /// Cancel sampling and wait for the task to finish.
    ///
    /// Returns the probe error that ended the monitor early, if any.
    pub fn stop(mut self) -> Result<MonitorSummary, SyncError> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Result<MonitorSummary, SyncError> {
        if let Some(cancel_tx) = self.cancel_tx.take() {
            // The task may already be gone after a probe error.
            let _ = cancel_tx.send(());
        }

        let (Some(runtime), Some(task)) = (self.runtime.take(), self.task.take()) else {
            return Ok(MonitorSummary::default());
        };

        let joined = runtime.block_on(task);
        runtime.shutdown_background();

        let summary = joined.map_err(|e| SyncError::Probe {
            path: self.dest_root.clone(),
            message: format!("progress monitor task failed: {e}"),
        })??;

        tracing::debug!(samples = summary.samples, "progress monitor stopped");
        Ok(summary)
    }
}

impl Drop for MonitorHandle {
    fn drop(&mut self) {
        if let Err(e) = self.shutdown() {
            tracing::warn!(error = %e, "progress monitor ended with an error");
        }
    }
}

async fn sample_loop(
    dest_root: PathBuf,
    initial: u64,
    total: u64,
    probe: Arc<dyn SizeProbe>,
    settings: MonitorSettings,
    on_event: Option<SharedCallback>,
    mut cancel_rx: oneshot::Receiver<()>,
) -> Result<MonitorSummary, SyncError> {
    let mut ticker = tokio::time::interval(settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // First tick completes immediately.
    ticker.tick().await;

    let mut previous = initial;
    let mut summary = MonitorSummary::default();

    loop {
        let cancelled = tokio::select! {
            _ = &mut cancel_rx => true,
            _ = ticker.tick() => false,
        };

        let current = probe_blocking(&probe, &dest_root).await?;
        let sample = ProgressSample::compute(initial, previous, current, total, &settings);
        previous = current;

        summary.samples += 1;
        summary.last = Some(sample);
        if let Some(callback) = &on_event {
            callback(&SyncEvent::ProgressSample {
                filled: sample.filled,
                percent: sample.percent,
                throughput: sample.throughput,
            });
        }

        if cancelled {
            return Ok(summary);
        }
    }
}

async fn probe_blocking(probe: &Arc<dyn SizeProbe>, path: &Path) -> Result<u64, SyncError> {
    let probe = Arc::clone(probe);
    let target = path.to_path_buf();
    tokio::task::spawn_blocking(move || probe.size_of(&target))
        .await
        .map_err(|e| SyncError::Probe {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
}
