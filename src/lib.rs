//! # dirsync - Two-way directory synchronizer
//!
//! Compares two directory trees, plans which entries are missing or stale
//! on the destination side, then copies or moves them while a background
//! monitor reports progress from the growth of the destination.

// Module declarations
pub mod commands;
pub mod config;
pub mod diff;
pub mod executor;
pub mod logging;
pub mod monitor;
pub mod probe;
pub mod types;
pub mod ui;

// Re-export commonly used types
pub use config::{Cli, Config};
pub use diff::{diff_trees, DiffOptions, TransferPlan};
pub use executor::{execute_plan, execute_plan_with, TransferResult};
pub use probe::{SizeMode, SizeProbe};
pub use types::{PlanReason, PlannedEntry, SyncDirection, SyncError, SyncEvent, TransferAction};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
