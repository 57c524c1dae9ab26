//! Core type definitions for dirsync

mod action;
mod entry;
mod error;
mod event;

pub use action::{PlanReason, SyncDirection, TransferAction};
pub use entry::PlannedEntry;
pub use error::SyncError;
pub(crate) use event::emit_event;
pub use event::{EventCallback, SharedCallback, SyncEvent};
