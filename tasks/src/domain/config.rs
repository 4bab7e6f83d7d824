//! Configuration domain facade.

use std::path::{Path, PathBuf};

use tokio::fs;

use crate::entities::TasksConfig;
use crate::errors::{TasksError, TasksResult};
use crate::storage::TASKS_DIR;

/// Configuration domain facade
pub struct ConfigDomain {
    config_path: PathBuf,
}

impl ConfigDomain {
    /// Create a new config domain
    pub fn new(project_path: impl AsRef<Path>) -> Self {
        Self {
            config_path: project_path.as_ref().join(TASKS_DIR).join("config.json"),
        }
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Load configuration
    pub async fn load(&self) -> TasksResult<TasksConfig> {
        match fs::read_to_string(&self.config_path).await {
            Ok(content) => {
                let config: TasksConfig = serde_json::from_str(&content)?;
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(TasksConfig::default()),
            Err(e) => Err(TasksError::FileReadError {
                path: self.config_path.display().to_string(),
                reason: e.to_string(),
            }),
        }
    }

    /// Save configuration
    pub async fn save(&self, config: &TasksConfig) -> TasksResult<()> {
        // Ensure directory exists
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(config)?;
        fs::write(&self.config_path, content).await.map_err(|e| {
            TasksError::FileWriteError {
                path: self.config_path.display().to_string(),
                reason: e.to_string(),
            }
        })
    }

    /// Set seconds between passed-deadline checks
    pub async fn set_archive_interval(&self, secs: u64) -> TasksResult<()> {
        if secs == 0 {
            return Err(TasksError::ConfigError {
                reason: "archive interval must be at least one second".to_string(),
            });
        }
        let mut config = self.load().await?;
        config.archive_interval_secs = secs;
        self.save(&config).await
    }

    /// Set the active log location
    pub async fn set_active_log(&self, path: impl Into<PathBuf>) -> TasksResult<()> {
        let mut config = self.load().await?;
        config.active_log = path.into();
        self.check_distinct(&config)?;
        self.save(&config).await
    }

    /// Set the archive log location
    pub async fn set_archive_log(&self, path: impl Into<PathBuf>) -> TasksResult<()> {
        let mut config = self.load().await?;
        config.archive_log = path.into();
        self.check_distinct(&config)?;
        self.save(&config).await
    }

    fn check_distinct(&self, config: &TasksConfig) -> TasksResult<()> {
        if config.active_log == config.archive_log {
            return Err(TasksError::ConfigError {
                reason: format!(
                    "active and archive logs must differ (both '{}')",
                    config.active_log.display()
                ),
            });
        }
        Ok(())
    }
}
