//! Terminal and log-file output

mod logfile;
mod progress;
mod prompt;

pub use logfile::EventLog;
pub use progress::{format_error, format_summary, ProgressReporter};
pub use prompt::{confirm, parse_answer};
