//! Persistence for tasks, the archive and view state.

mod file;
pub mod format;
mod traits;

pub use file::{FileStorage, TASKS_DIR};
pub use format::{ParseIssue, ParsedLog};
pub use traits::Storage;
