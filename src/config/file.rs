//! TOML settings file

use crate::probe::SizeMode;
use crate::types::{SyncDirection, SyncError, TransferAction};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Contents of a `--config` file
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileSettings {
    #[serde(default)]
    pub sync: SyncSection,
}

/// `[sync]` table; every key optional
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SyncSection {
    pub direction: Option<SyncDirection>,
    pub action: Option<TransferAction>,
    pub update_newer: Option<bool>,
    pub update_larger: Option<bool>,
    pub size_mode: Option<SizeMode>,
    pub sample_interval_ms: Option<u64>,
    pub bar_width: Option<u64>,
}

impl FileSettings {
    /// Read and parse a settings file
    pub fn load(path: &Path) -> Result<Self, SyncError> {
        let content = fs::read_to_string(path).map_err(|e| {
            SyncError::Config(format!("Cannot read settings file {}: {}", path.display(), e))
        })?;
        Self::parse(&content).map_err(|e| {
            SyncError::Config(format!("Invalid settings file {}: {}", path.display(), e))
        })
    }

    /// Parse settings from TOML text
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_all_defaults() {
        let settings = FileSettings::parse("").expect("parse empty");
        assert_eq!(settings, FileSettings::default());
    }

    #[test]
    fn test_full_section() {
        let settings = FileSettings::parse(
            r#"
            [sync]
            direction = "both"
            action = "move"
            update_newer = false
            update_larger = true
            size_mode = "apparent"
            sample_interval_ms = 500
            bar_width = 20
            "#,
        )
        .expect("parse full");

        let sync = settings.sync;
        assert_eq!(sync.direction, Some(SyncDirection::Both));
        assert_eq!(sync.action, Some(TransferAction::Move));
        assert_eq!(sync.update_newer, Some(false));
        assert_eq!(sync.update_larger, Some(true));
        assert_eq!(sync.size_mode, Some(SizeMode::Apparent));
        assert_eq!(sync.sample_interval_ms, Some(500));
        assert_eq!(sync.bar_width, Some(20));
    }

    #[test]
    fn test_unknown_key_rejected() {
        assert!(FileSettings::parse("[sync]\nthreads = 4\n").is_err());
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let err = FileSettings::load(Path::new("/no/such/dirsync.toml")).expect_err("missing");
        assert!(matches!(err, SyncError::Config(_)));
    }
}
