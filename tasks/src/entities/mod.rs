//! Core data structures for task management.

mod config;
mod task;
mod view;

pub use config::{DEFAULT_ARCHIVE_INTERVAL_SECS, TasksConfig};
pub use task::{Task, TaskPriority, TimeNeeded};
pub use view::{SortMode, ViewState};
