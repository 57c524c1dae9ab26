//! Interactive confirmation

use crate::types::SyncError;
use console::Term;
use std::io::{self, BufRead};

/// Ask whether to go ahead with the transfer.
///
/// The reporter has already printed the total size by the time this runs.
/// An empty answer accepts and a closed stdin declines. Anything other than
/// yes/no is a `SyncError::Config("Invalid option.")`.
pub fn confirm() -> Result<bool, SyncError> {
    let term = Term::stdout();
    term.write_str("Do you want to continue? [Y/n] ")?;
    // Read stdin directly: `Term::read_line` answers "" when stdin is not a tty.
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer)? == 0 {
        return Ok(false);
    }

    parse_answer(&answer).ok_or_else(|| SyncError::Config("Invalid option.".to_string()))
}

/// Interpret a prompt answer, case-insensitively.
pub fn parse_answer(answer: &str) -> Option<bool> {
    match answer.trim().to_ascii_lowercase().as_str() {
        "" | "y" | "yes" => Some(true),
        "n" | "no" => Some(false),
        _ => None,
    }
}
