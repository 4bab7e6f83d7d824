//! Text-log storage backed by the local filesystem.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

use crate::entities::{Task, TasksConfig, ViewState};
use crate::errors::{TasksError, TasksResult};

use super::format::{self, ParsedLog};
use super::traits::Storage;

/// Directory under the project root holding config and state
pub const TASKS_DIR: &str = ".tasks";

const STATE_FILE: &str = "state.json";

/// File-based storage: two flat text logs plus a JSON state file
#[derive(Debug, Clone)]
pub struct FileStorage {
    active_log: PathBuf,
    archive_log: PathBuf,
    state_path: PathBuf,
}

impl FileStorage {
    /// Storage for `project_root` using the default log locations
    pub fn new(project_root: impl AsRef<Path>) -> Self {
        Self::with_config(project_root, &TasksConfig::default())
    }

    /// Storage for `project_root` using the log locations from `config`
    pub fn with_config(project_root: impl AsRef<Path>, config: &TasksConfig) -> Self {
        let root = project_root.as_ref();
        Self {
            active_log: config.active_log_path(root),
            archive_log: config.archive_log_path(root),
            state_path: root.join(TASKS_DIR).join(STATE_FILE),
        }
    }

    pub fn active_log(&self) -> &Path {
        &self.active_log
    }

    async fn read_optional(path: &Path) -> TasksResult<Option<String>> {
        match fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(TasksError::FileReadError {
                path: path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    async fn ensure_parent(path: &Path) -> TasksResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| write_error(parent, &e))?;
        }
        Ok(())
    }

    async fn load_log(path: &Path) -> TasksResult<ParsedLog> {
        let Some(content) = Self::read_optional(path).await? else {
            debug!(path = %path.display(), "log not found, starting empty");
            return Ok(ParsedLog::default());
        };

        let parsed = format::parse_log(&content);
        for issue in &parsed.issues {
            warn!(path = %path.display(), line = issue.line_number, reason = %issue.reason, "skipping unreadable task line");
        }
        debug!(path = %path.display(), tasks = parsed.tasks.len(), skipped = parsed.issues.len(), "loaded log");
        Ok(parsed)
    }
}

fn write_error(path: &Path, err: &std::io::Error) -> TasksError {
    TasksError::FileWriteError {
        path: path.display().to_string(),
        reason: err.to_string(),
    }
}

#[async_trait]
impl Storage for FileStorage {
    fn storage_type(&self) -> &'static str {
        "file"
    }

    async fn load_tasks(&self) -> TasksResult<ParsedLog> {
        Self::load_log(&self.active_log).await
    }

    async fn save_tasks(&self, tasks: &[Task]) -> TasksResult<()> {
        Self::ensure_parent(&self.active_log).await?;

        let content = format::render_lines(tasks, format::format_active_line);
        fs::write(&self.active_log, content)
            .await
            .map_err(|e| write_error(&self.active_log, &e))?;

        debug!(path = %self.active_log.display(), tasks = tasks.len(), "saved active log");
        Ok(())
    }

    async fn append_archived(&self, tasks: &[Task]) -> TasksResult<()> {
        if tasks.is_empty() {
            return Ok(());
        }
        Self::ensure_parent(&self.archive_log).await?;

        let content = format::render_lines(tasks, format::format_archive_line);
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.archive_log)
            .await
            .map_err(|e| write_error(&self.archive_log, &e))?;
        file.write_all(content.as_bytes())
            .await
            .map_err(|e| write_error(&self.archive_log, &e))?;
        file.flush()
            .await
            .map_err(|e| write_error(&self.archive_log, &e))?;

        debug!(path = %self.archive_log.display(), tasks = tasks.len(), "appended to archive log");
        Ok(())
    }

    async fn read_archive(&self) -> TasksResult<Option<String>> {
        Self::read_optional(&self.archive_log).await
    }

    async fn load_archived(&self) -> TasksResult<ParsedLog> {
        Self::load_log(&self.archive_log).await
    }

    async fn load_view_state(&self) -> TasksResult<ViewState> {
        match Self::read_optional(&self.state_path).await? {
            Some(content) => Ok(serde_json::from_str(&content)?),
            None => Ok(ViewState::default()),
        }
    }

    async fn save_view_state(&self, state: ViewState) -> TasksResult<()> {
        Self::ensure_parent(&self.state_path).await?;

        let content = serde_json::to_string_pretty(&state)?;
        fs::write(&self.state_path, content)
            .await
            .map_err(|e| write_error(&self.state_path, &e))
    }
}
