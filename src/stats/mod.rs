//! Stats module - Descriptive summaries of the comparison table

mod summary;

pub use summary::{summarize, values_for_group, GroupSummary};
