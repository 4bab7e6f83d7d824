//! Deadline-aware task list.
//!
//! Tasks carry a deadline, a priority and an effort estimate. The list can
//! be ordered by due date, by importance, or by an urgency score that
//! weighs all three. Pending tasks live in a plain text log; tasks whose
//! deadline has passed are moved to an append-only archive log by a
//! periodic [`domain::Archiver`].

pub mod domain;
pub mod entities;
pub mod errors;
pub mod storage;
pub mod ui;

pub use domain::{Archiver, ConfigDomain, TaskStore};
pub use entities::{SortMode, Task, TaskPriority, TimeNeeded, ViewState};
pub use errors::{TasksError, TasksResult};
