//! Configuration management
//!
//! Three layers, last one wins: built-in defaults, an optional TOML file
//! (`--config`), then command-line flags. `Config::try_from(Cli)` merges them
//! and validates both roots before anything touches the trees.

mod file;

pub use file::{FileSettings, SyncSection};

use crate::monitor::{MonitorSettings, DEFAULT_BAR_WIDTH, DEFAULT_INTERVAL};
use crate::probe::{validate_path, SizeMode};
use crate::types::{SyncDirection, SyncError, TransferAction};
use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Synchronize two directories (in one or both directions), moving or copying files.
#[derive(Debug, Parser)]
#[command(name = "dirsync", version, about)]
pub struct Cli {
    /// Left path of synchronization
    pub left_path: PathBuf,

    /// Right path of synchronization
    pub right_path: PathBuf,

    /// Direction of synchronization [default: to-right]
    #[arg(short, long, value_enum)]
    pub direction: Option<SyncDirection>,

    /// Action to be performed [default: copy]
    #[arg(short, long, value_enum)]
    pub action: Option<TransferAction>,

    /// Run a test synchronization: diff and report, transfer nothing
    #[arg(short = 't', long = "test")]
    pub dry_run: bool,

    /// Don't update files whose destination is older than the source
    #[arg(short = 'n', long = "no-mtime")]
    pub no_mtime: bool,

    /// Update files whose destination is smaller than the source
    #[arg(short = 'b', long = "bigger")]
    pub bigger: bool,

    /// Save a log of the transfer (JSON lines)
    #[arg(short, long, value_name = "FILE")]
    pub logfile: Option<PathBuf>,

    /// Don't ask for confirmation
    #[arg(short = 'y', long = "yes")]
    pub assume_yes: bool,

    /// Hide progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// How sizes are measured [default: apparent]
    #[arg(long, value_enum)]
    pub size_mode: Option<SizeMode>,

    /// TOML file with default settings
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Validated run configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Left root
    pub left: PathBuf,

    /// Right root
    pub right: PathBuf,

    /// Which way(s) to sync
    pub direction: SyncDirection,

    /// Copy or move, for every entry
    pub action: TransferAction,

    /// Re-plan files whose destination is older
    pub update_newer: bool,

    /// Re-plan files whose destination is smaller
    pub update_larger: bool,

    /// Dry run (show plan, don't execute)
    pub dry_run: bool,

    /// Skip the confirmation prompt
    pub assume_yes: bool,

    /// Hide progress rendering
    pub quiet: bool,

    /// Event log destination
    pub logfile: Option<PathBuf>,

    /// Size probe strategy
    pub size_mode: SizeMode,

    /// Progress sampling interval
    pub sample_interval: Duration,

    /// Progress bar cells
    pub bar_width: u64,

    /// `-v` count
    pub verbosity: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            left: PathBuf::new(),
            right: PathBuf::new(),
            direction: SyncDirection::default(),
            action: TransferAction::default(),
            update_newer: true,
            update_larger: false,
            dry_run: false,
            assume_yes: false,
            quiet: false,
            logfile: None,
            size_mode: SizeMode::default(),
            sample_interval: DEFAULT_INTERVAL,
            bar_width: DEFAULT_BAR_WIDTH,
            verbosity: 0,
        }
    }
}

impl Config {
    /// Validate configuration
    ///
    /// Normalizes both roots in place; fails on a missing or unreadable root,
    /// on identical or nested roots, and on zero sampling settings.
    pub fn validate(&mut self) -> Result<(), SyncError> {
        self.left = validate_path(&self.left)?;
        self.right = validate_path(&self.right)?;

        // Compare resolved paths so `a/../b`, symlinks and nesting are caught.
        let left = fs::canonicalize(&self.left)?;
        let right = fs::canonicalize(&self.right)?;
        if left == right {
            return Err(SyncError::Config(
                "Left and right paths cannot be the same".to_string(),
            ));
        }
        if left.starts_with(&right) || right.starts_with(&left) {
            return Err(SyncError::Config(format!(
                "Left and right paths cannot be nested: {} and {}",
                self.left.display(),
                self.right.display()
            )));
        }

        if self.sample_interval.is_zero() {
            return Err(SyncError::Config(
                "Sampling interval must be greater than zero".to_string(),
            ));
        }

        if self.bar_width == 0 {
            return Err(SyncError::Config(
                "Progress bar width must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Monitor knobs derived from this configuration
    pub fn monitor_settings(&self) -> MonitorSettings {
        MonitorSettings {
            interval: self.sample_interval,
            bar_width: self.bar_width,
        }
    }

    /// Diff policies derived from this configuration
    pub fn diff_options(&self) -> crate::diff::DiffOptions {
        crate::diff::DiffOptions {
            update_newer: self.update_newer,
            update_larger: self.update_larger,
        }
    }

    fn apply_file(&mut self, section: &SyncSection) {
        if let Some(direction) = section.direction {
            self.direction = direction;
        }
        if let Some(action) = section.action {
            self.action = action;
        }
        if let Some(update_newer) = section.update_newer {
            self.update_newer = update_newer;
        }
        if let Some(update_larger) = section.update_larger {
            self.update_larger = update_larger;
        }
        if let Some(size_mode) = section.size_mode {
            self.size_mode = size_mode;
        }
        if let Some(ms) = section.sample_interval_ms {
            self.sample_interval = Duration::from_millis(ms);
        }
        if let Some(width) = section.bar_width {
            self.bar_width = width;
        }
    }
}

impl TryFrom<Cli> for Config {
    type Error = SyncError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let mut config = Config {
            left: cli.left_path,
            right: cli.right_path,
            ..Config::default()
        };

        if let Some(path) = &cli.config {
            let settings = FileSettings::load(path)?;
            config.apply_file(&settings.sync);
        }

        if let Some(direction) = cli.direction {
            config.direction = direction;
        }
        if let Some(action) = cli.action {
            config.action = action;
        }
        if let Some(size_mode) = cli.size_mode {
            config.size_mode = size_mode;
        }
        if cli.no_mtime {
            config.update_newer = false;
        }
        if cli.bigger {
            config.update_larger = true;
        }
        config.dry_run = cli.dry_run;
        config.assume_yes = cli.assume_yes;
        config.quiet = cli.quiet;
        config.logfile = cli.logfile;
        config.verbosity = cli.verbose;

        config.validate()?;
        Ok(config)
    }
}
