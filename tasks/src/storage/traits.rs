//! Storage trait definitions.

use async_trait::async_trait;

use crate::entities::{Task, ViewState};
use crate::errors::TasksResult;

use super::format::ParsedLog;

/// Storage interface for task persistence
#[async_trait]
pub trait Storage: Send + Sync {
    /// Get storage type identifier
    fn storage_type(&self) -> &'static str;

    // === Active Log ===

    /// Load all pending tasks. A missing log yields no tasks; unreadable
    /// lines are reported in [`ParsedLog::issues`].
    async fn load_tasks(&self) -> TasksResult<ParsedLog>;

    /// Overwrite the active log with `tasks`
    async fn save_tasks(&self, tasks: &[Task]) -> TasksResult<()>;

    // === Archive Log ===

    /// Append tasks to the archive log
    async fn append_archived(&self, tasks: &[Task]) -> TasksResult<()>;

    /// Raw archive content, `None` when nothing was ever archived
    async fn read_archive(&self) -> TasksResult<Option<String>>;

    /// Archived tasks parsed back into entities
    async fn load_archived(&self) -> TasksResult<ParsedLog>;

    // === State Operations ===

    /// Get the persisted view state
    async fn load_view_state(&self) -> TasksResult<ViewState>;

    /// Persist the view state
    async fn save_view_state(&self, state: ViewState) -> TasksResult<()>;
}
