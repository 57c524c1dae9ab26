//! Diff engine - Comparison logic and plan generation

mod compare;
mod engine;
mod plan;

pub use compare::{compare_siblings, DiffOptions};
pub use engine::{PlanStats, TransferPlan, TransferTotal};
pub use plan::diff_trees;
