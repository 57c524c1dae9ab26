//! JSON-lines event log (`--logfile`)

use crate::types::{SyncError, SyncEvent};
use serde_json::Value;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Appends one JSON object per event to a file.
///
/// Each line carries the event's own fields plus `timestamp` (local time,
/// RFC 3339). Write failures are logged and otherwise ignored so a full
/// disk under the log never aborts a transfer.
#[derive(Debug)]
pub struct EventLog {
    path: PathBuf,
    writer: Mutex<BufWriter<File>>,
}

impl EventLog {
    /// Open `path` for appending, creating it if needed.
    pub fn create(path: &Path) -> Result<Self, SyncError> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| {
                SyncError::Config(format!("Cannot open log file {}: {}", path.display(), e))
            })?;

        Ok(Self {
            path: path.to_path_buf(),
            writer: Mutex::new(BufWriter::new(file)),
        })
    }

    /// Append one event.
    pub fn record(&self, event: &SyncEvent) {
        let line = match render_line(event, &chrono::Local::now().to_rfc3339()) {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!(error = %e, "cannot serialize event for log file");
                return;
            }
        };

        let Ok(mut writer) = self.writer.lock() else {
            return;
        };
        if let Err(e) = writeln!(writer, "{line}") {
            tracing::warn!(path = %self.path.display(), error = %e, "log file write failed");
        }
    }

    /// Flush buffered lines to disk.
    pub fn flush(&self) {
        if let Ok(mut writer) = self.writer.lock() {
            if let Err(e) = writer.flush() {
                tracing::warn!(path = %self.path.display(), error = %e, "log file flush failed");
            }
        }
    }
}

impl Drop for EventLog {
    fn drop(&mut self) {
        self.flush();
    }
}

fn render_line(event: &SyncEvent, timestamp: &str) -> Result<String, serde_json::Error> {
    let mut value = serde_json::to_value(event)?;
    if let Value::Object(map) = &mut value {
        map.insert("timestamp".to_string(), Value::String(timestamp.to_string()));
    }
    serde_json::to_string(&value)
}
