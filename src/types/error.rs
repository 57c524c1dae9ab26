//! Error types for dirsync

use std::io::ErrorKind;
use std::path::PathBuf;
use thiserror::Error;

/// Error types for dirsync operations
#[derive(Debug, Error)]
pub enum SyncError {
    /// Standard IO error (automatically converted via #[from])
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input path does not exist
    #[error("Invalid path: {path}")]
    InvalidPath { path: PathBuf },

    /// Path exists but cannot be read
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// No size probe strategy for the running platform
    #[error("Platform not supported: {0}")]
    UnsupportedPlatform(String),

    /// Size query failed
    #[error("Size probe failed for {path}: {message}")]
    Probe { path: PathBuf, message: String },

    /// A tree-walk entry could not be compared
    #[error("Cannot compare {path}: {reason}")]
    Diff { path: PathBuf, reason: String },

    /// A copy or move failed
    #[error("Transfer failed {src} -> {dst}: {source}")]
    Transfer {
        src: PathBuf,
        dst: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SyncError {
    /// Short label used in event logs and error summaries
    pub fn kind_label(&self) -> &'static str {
        match self {
            SyncError::Io(_) => "io",
            SyncError::Config(_) => "config",
            SyncError::InvalidPath { .. } => "invalid_path",
            SyncError::PermissionDenied { .. } => "permission_denied",
            SyncError::UnsupportedPlatform(_) => "unsupported_platform",
            SyncError::Probe { .. } => "probe",
            SyncError::Diff { .. } => "diff",
            SyncError::Transfer { .. } => "transfer",
        }
    }

    /// Offending path, when the error is tied to one
    pub fn path(&self) -> Option<&PathBuf> {
        match self {
            SyncError::InvalidPath { path }
            | SyncError::PermissionDenied { path }
            | SyncError::Probe { path, .. }
            | SyncError::Diff { path, .. } => Some(path),
            SyncError::Transfer { src, .. } => Some(src),
            _ => None,
        }
    }

    /// Check if this error is a validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            SyncError::Config(_) | SyncError::InvalidPath { .. }
        )
    }

    /// Check if this error is related to permissions
    pub fn is_permission_error(&self) -> bool {
        match self {
            SyncError::PermissionDenied { .. } => true,
            SyncError::Transfer { source, .. } => source.kind() == ErrorKind::PermissionDenied,
            _ => false,
        }
    }

    /// Check if this error is related to disk space
    pub fn is_disk_space_error(&self) -> bool {
        match self {
            SyncError::Transfer { source, .. } | SyncError::Io(source) => {
                source.kind() == ErrorKind::StorageFull
                    || matches!(source.raw_os_error(), Some(28 | 122))
            }
            _ => false,
        }
    }

    /// Process exit code for the binary
    pub fn exit_code(&self) -> i32 {
        if self.is_validation_error() {
            2
        } else {
            1
        }
    }
}
