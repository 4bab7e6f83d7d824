//! Sort mode and the view state that remembers it.

use serde::{Deserialize, Serialize};

use crate::errors::TasksError;

/// How the task list is ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// Earliest deadline first
    #[default]
    ByDueDate,
    /// High priority first
    ByImportance,
    /// Highest urgency score first
    ToDoOrder,
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ByDueDate => write!(f, "due date"),
            Self::ByImportance => write!(f, "importance"),
            Self::ToDoOrder => write!(f, "to-do order"),
        }
    }
}

impl std::str::FromStr for SortMode {
    type Err = TasksError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "due" | "due-date" | "by-due-date" => Ok(Self::ByDueDate),
            "importance" | "by-importance" => Ok(Self::ByImportance),
            "todo" | "to-do" | "to-do-order" => Ok(Self::ToDoOrder),
            _ => Err(TasksError::InvalidSortMode {
                mode: s.to_string(),
            }),
        }
    }
}

/// Selection state carried between store operations.
///
/// Sorting updates `active_sort_mode`; mutations that reorder the store
/// afterwards re-apply whatever mode is recorded here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ViewState {
    #[serde(default, rename = "activeSortMode")]
    pub active_sort_mode: SortMode,
}

impl ViewState {
    pub fn new(active_sort_mode: SortMode) -> Self {
        Self { active_sort_mode }
    }
}
