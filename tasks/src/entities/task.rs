//! Task entity and related types.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::errors::{TasksError, TasksResult};

/// Task priority levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum TaskPriority {
    Low,
    #[default]
    Medium,
    High,
}

impl TaskPriority {
    /// Weight used by the urgency score (Low=1, Medium=2, High=3).
    pub fn weight(self) -> f64 {
        match self {
            Self::Low => 1.0,
            Self::Medium => 2.0,
            Self::High => 3.0,
        }
    }

    /// Sort rank for importance ordering; High sorts first.
    pub fn severity_rank(self) -> u8 {
        match self {
            Self::High => 1,
            Self::Medium => 2,
            Self::Low => 3,
        }
    }
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "Low"),
            Self::Medium => write!(f, "Medium"),
            Self::High => write!(f, "High"),
        }
    }
}

impl std::str::FromStr for TaskPriority {
    type Err = TasksError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" | "med" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            _ => Err(TasksError::InvalidPriority {
                priority: s.to_string(),
            }),
        }
    }
}

/// Estimated effort, in whole hours plus minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct TimeNeeded {
    hours: u32,
    minutes: u32,
}

impl TimeNeeded {
    /// Build a duration from signed components, rejecting negatives and
    /// minutes outside `0..=59`.
    pub fn new(hours: i64, minutes: i64) -> TasksResult<Self> {
        let value = format!("{hours:02}:{minutes:02}");
        if hours < 0 || minutes < 0 {
            return Err(TasksError::InvalidTimeNeeded {
                value,
                reason: "time needed cannot be negative".to_string(),
            });
        }
        if minutes > 59 {
            return Err(TasksError::InvalidTimeNeeded {
                value,
                reason: "minutes must be between 0 and 59".to_string(),
            });
        }
        let out_of_range = || TasksError::InvalidTimeNeeded {
            value: value.clone(),
            reason: "hours out of range".to_string(),
        };
        let hours = u32::try_from(hours).map_err(|_| out_of_range())?;
        let minutes = u32::try_from(minutes).map_err(|_| out_of_range())?;

        Ok(Self { hours, minutes })
    }

    pub fn hours(self) -> u32 {
        self.hours
    }

    pub fn minutes(self) -> u32 {
        self.minutes
    }

    /// Total duration as fractional hours.
    pub fn as_hours(self) -> f64 {
        f64::from(self.hours) + f64::from(self.minutes) / 60.0
    }
}

impl std::fmt::Display for TimeNeeded {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02}", self.hours, self.minutes)
    }
}

impl std::str::FromStr for TimeNeeded {
    type Err = TasksError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || TasksError::InvalidTimeNeeded {
            value: s.to_string(),
            reason: "expected HH:MM".to_string(),
        };

        let (hours, minutes) = s.trim().split_once(':').ok_or_else(malformed)?;
        let hours: i64 = hours.trim().parse().map_err(|_| malformed())?;
        let minutes: i64 = minutes.trim().parse().map_err(|_| malformed())?;
        Self::new(hours, minutes)
    }
}

/// A single task with a deadline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// What needs doing
    pub name: String,

    /// Local date and time the task is due, second precision
    pub deadline: NaiveDateTime,

    /// Task priority level
    #[serde(default)]
    pub priority: TaskPriority,

    /// Estimated effort
    #[serde(rename = "timeNeeded")]
    pub time_needed: TimeNeeded,
}

impl Task {
    /// Create a new task. Nothing is validated until [`Task::validate`].
    pub fn new(
        name: impl Into<String>,
        deadline: NaiveDateTime,
        priority: TaskPriority,
        time_needed: TimeNeeded,
    ) -> Self {
        Self {
            name: name.into(),
            deadline,
            priority,
            time_needed,
        }
    }

    /// Check the creation-time invariants against `now`.
    pub fn validate(&self, now: NaiveDateTime) -> TasksResult<()> {
        if self.name.trim().is_empty() {
            return Err(TasksError::EmptyName);
        }
        if self.name.contains(['\n', '\r']) {
            return Err(TasksError::InvalidName {
                name: self.name.clone(),
                reason: "name must fit on a single line".to_string(),
            });
        }
        if self.deadline <= now {
            return Err(TasksError::DeadlinePassed {
                deadline: self.deadline.format("%m/%d/%y %H:%M").to_string(),
            });
        }
        Ok(())
    }

    /// Whether the deadline lies strictly before `now`.
    pub fn is_passed(&self, now: NaiveDateTime) -> bool {
        self.deadline < now
    }
}
