//! Progress reporting

use crate::commands::sync::{RunStatus, SyncSummary};
use crate::types::{SyncError, SyncEvent, TransferAction};
use console::style;
use indicatif::{HumanBytes, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::Mutex;
use std::time::Duration;

/// Renders `SyncEvent`s on the terminal.
///
/// Safe to call from the executor thread and the monitor thread at once.
pub struct ProgressReporter {
    scan_bar: ProgressBar,
    transfer_bar: Mutex<ProgressBar>,
    bar_width: u64,
    quiet: bool,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new(bar_width: u64, quiet: bool) -> Self {
        let scan_bar = if quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new_spinner();
            bar.enable_steady_tick(Duration::from_millis(120));
            bar
        };
        if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
            scan_bar.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ "));
        }

        Self {
            scan_bar,
            transfer_bar: Mutex::new(ProgressBar::hidden()),
            bar_width,
            quiet,
        }
    }

    /// Route one event to the right bar.
    pub fn handle(&self, event: &SyncEvent) {
        match event {
            SyncEvent::DiffStarted { src_root, dst_root } => {
                self.scan_bar.set_message(format!(
                    "Comparing {} → {}...",
                    src_root.display(),
                    dst_root.display()
                ));
            }
            SyncEvent::EntryPlanned { src, .. } => {
                self.scan_bar.inc(1);
                self.scan_bar.set_message(format!(
                    "Comparing... {} planned | {}",
                    self.scan_bar.position(),
                    src.display()
                ));
            }
            SyncEvent::DiffCompleted {
                entries,
                total_bytes,
            } => {
                self.scan_bar.println(format!(
                    "Compared: {} entries | {}",
                    entries,
                    HumanBytes(*total_bytes)
                ));
            }
            SyncEvent::ConfirmationRequested { total_bytes } => {
                self.scan_bar.finish_and_clear();
                if !self.quiet {
                    println!("{}", confirmation_line(*total_bytes));
                }
            }
            SyncEvent::TransferStarted { .. } => self.start_transfer(),
            SyncEvent::EntryTransferred { src, action, .. } => {
                self.with_transfer_bar(|bar| bar.println(transfer_line(*action, src)));
            }
            SyncEvent::EntrySkipped { src, reason, .. } => {
                self.with_transfer_bar(|bar| {
                    bar.println(format!(
                        "{} {}: {}",
                        style("SKIP").yellow(),
                        src.display(),
                        reason
                    ))
                });
            }
            SyncEvent::ProgressSample {
                filled,
                percent,
                throughput,
            } => {
                self.with_transfer_bar(|bar| {
                    // The monitor's closing sample lands after the bar is done.
                    if bar.is_finished() {
                        return;
                    }
                    bar.set_position(*filled);
                    bar.set_message(format!(
                        "{}% complete | Transfer rate: {}/s",
                        percent,
                        HumanBytes(*throughput)
                    ));
                });
            }
            SyncEvent::TransferCompleted { .. } => {
                self.with_transfer_bar(|bar| bar.finish());
            }
            // The binary prints the error itself once the run returns.
            SyncEvent::Error { .. } => {
                self.scan_bar.finish_and_clear();
                self.with_transfer_bar(|bar| bar.abandon());
            }
        }
    }

    /// Print the closing lines for a run.
    pub fn finish_run(&self, summary: &SyncSummary) {
        self.scan_bar.finish_and_clear();
        if self.quiet {
            return;
        }
        println!("{}", format_summary(summary));
    }

    fn start_transfer(&self) {
        let bar = if self.quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::with_draw_target(Some(self.bar_width), ProgressDrawTarget::stderr())
        };
        let template = format!("Progress: [{{bar:{}.cyan/blue}}] {{msg}}", self.bar_width);
        if let Ok(style) = ProgressStyle::with_template(&template) {
            bar.set_style(style.progress_chars("#>-"));
        }
        bar.set_message("0% complete");

        if let Ok(mut current) = self.transfer_bar.lock() {
            *current = bar;
        }
    }

    fn with_transfer_bar(&self, f: impl FnOnce(&ProgressBar)) {
        if let Ok(bar) = self.transfer_bar.lock() {
            f(&bar);
        }
    }
}

fn transfer_line(action: TransferAction, src: &std::path::Path) -> String {
    format!("{} {}...", action.label(), src.display())
}

/// Human-readable closing summary
pub fn format_summary(summary: &SyncSummary) -> String {
    match summary.status {
        RunStatus::UpToDate => "Folders up to date!".to_string(),
        RunStatus::Declined => "Nothing transferred.".to_string(),
        RunStatus::DryRun => format_dry_run(summary),
        RunStatus::Completed => {
            let transfer = &summary.transfer;
            let secs = transfer.elapsed.as_secs_f64();
            let average = if secs > 0.0 {
                (transfer.bytes_moved as f64 / secs) as u64
            } else {
                transfer.bytes_moved
            };
            let mut lines = vec![
                format!("Total size transferred: {}", HumanBytes(transfer.bytes_moved)),
                format!(
                    "{} transferred in {:.1} seconds (average: {}/s)",
                    HumanBytes(transfer.bytes_moved),
                    secs,
                    HumanBytes(average)
                ),
            ];
            if transfer.skipped > 0 {
                lines.push(format!(
                    "{} entr{} skipped (no read permission)",
                    transfer.skipped,
                    if transfer.skipped == 1 { "y" } else { "ies" }
                ));
            }
            lines.join("\n")
        }
    }
}

fn format_dry_run(summary: &SyncSummary) -> String {
    let mut lines = Vec::with_capacity(summary.planned_entries + 2);
    lines.push("Test run, nothing transferred:".to_string());
    for plan in &summary.plans {
        for entry in plan.iter() {
            lines.push(format!(
                "  {:<8} {} -> {}",
                format!("{:?}", entry.reason).to_uppercase(),
                entry.src.display(),
                entry.dst.display()
            ));
        }
    }
    for plan in summary.plans.iter().filter(|plan| !plan.is_empty()) {
        let stats = plan.stats();
        lines.push(format!(
            "{} -> {}: {} missing, {} stale, {} smaller",
            plan.src_root().display(),
            plan.dst_root().display(),
            stats.missing_count,
            stats.stale_count,
            stats.smaller_count
        ));
    }
    lines.push(confirmation_line(summary.total_bytes));
    lines.join("\n")
}

fn confirmation_line(total_bytes: u64) -> String {
    format!("Total size to transfer: {}", HumanBytes(total_bytes))
}

/// Error text for the terminal, with a hint for common causes.
pub fn format_error(error: &SyncError) -> String {
    let mut text = format!("{} {}", style("Error:").red().bold(), error);
    if error.is_disk_space_error() {
        text.push_str("\n  hint: the destination filesystem is full; free space and run again");
    } else if error.is_permission_error() {
        text.push_str("\n  hint: check read permission on the source and write permission on the destination");
    }
    text
}
