//! Project configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default interval between passed-deadline checks, in seconds
pub const DEFAULT_ARCHIVE_INTERVAL_SECS: u64 = 60;

/// Configuration stored in `.tasks/config.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Log of pending tasks, rewritten on every change
    #[serde(default = "default_active_log", rename = "activeLog")]
    pub active_log: PathBuf,

    /// Append-only log of tasks whose deadline has passed
    #[serde(default = "default_archive_log", rename = "archiveLog")]
    pub archive_log: PathBuf,

    /// Seconds between passed-deadline checks in watch mode
    #[serde(
        default = "default_archive_interval",
        rename = "archiveIntervalSecs"
    )]
    pub archive_interval_secs: u64,
}

fn default_active_log() -> PathBuf {
    PathBuf::from("logs/task_log.txt")
}

fn default_archive_log() -> PathBuf {
    PathBuf::from("logs/passed_tasks_log.txt")
}

fn default_archive_interval() -> u64 {
    DEFAULT_ARCHIVE_INTERVAL_SECS
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            active_log: default_active_log(),
            archive_log: default_archive_log(),
            archive_interval_secs: default_archive_interval(),
        }
    }
}

impl TasksConfig {
    /// Active log location, resolved against the project root when relative
    pub fn active_log_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.active_log)
    }

    /// Archive log location, resolved against the project root when relative
    pub fn archive_log_path(&self, project_root: &Path) -> PathBuf {
        project_root.join(&self.archive_log)
    }

    pub fn archive_interval(&self) -> Duration {
        Duration::from_secs(self.archive_interval_secs)
    }
}
