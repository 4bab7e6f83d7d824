//! Line layout of the active and archive logs.
//!
//! Each task occupies one line:
//!
//! ```text
//! {name} - Deadline: {MM/DD/YY HH:MM:SS}, Priority: {Low|Medium|High}, Time Needed: {HH:MM}
//! ```
//!
//! The archive log uses the same layout without seconds in the deadline.

use chrono::{NaiveDate, NaiveDateTime};

use crate::entities::{Task, TaskPriority, TimeNeeded};
use crate::errors::{TasksError, TasksResult};

/// Deadline layout written to the active log
pub const ACTIVE_DEADLINE_FORMAT: &str = "%m/%d/%y %H:%M:%S";

/// Deadline layout written to the archive log and shown to users
pub const ARCHIVE_DEADLINE_FORMAT: &str = "%m/%d/%y %H:%M";

/// Date-only layout, read as midnight
const DATE_ONLY_FORMAT: &str = "%m/%d/%y";

const DEADLINE_SEP: &str = " - Deadline: ";
const PRIORITY_SEP: &str = ", Priority: ";
const TIME_NEEDED_SEP: &str = ", Time Needed: ";

/// A log line that could not be turned into a task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// 1-based line number in the log
    pub line_number: usize,
    pub line: String,
    pub reason: String,
}

impl std::fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "line {}: {} ({})", self.line_number, self.reason, self.line)
    }
}

/// Tasks read from a log, plus the lines that were skipped
#[derive(Debug, Clone, Default)]
pub struct ParsedLog {
    pub tasks: Vec<Task>,
    pub issues: Vec<ParseIssue>,
}

/// Render a task for the active log.
pub fn format_active_line(task: &Task) -> String {
    format_line(task, ACTIVE_DEADLINE_FORMAT)
}

/// Render a task for the archive log.
pub fn format_archive_line(task: &Task) -> String {
    format_line(task, ARCHIVE_DEADLINE_FORMAT)
}

fn format_line(task: &Task, deadline_format: &str) -> String {
    format!(
        "{}{DEADLINE_SEP}{}{PRIORITY_SEP}{}{TIME_NEEDED_SEP}{}",
        task.name,
        task.deadline.format(deadline_format),
        task.priority,
        task.time_needed
    )
}

/// Parse a deadline, trying the full, minute and date-only layouts in turn.
pub fn parse_deadline(value: &str) -> TasksResult<NaiveDateTime> {
    let value = value.trim();

    for format in [ACTIVE_DEADLINE_FORMAT, ARCHIVE_DEADLINE_FORMAT] {
        if let Ok(deadline) = NaiveDateTime::parse_from_str(value, format) {
            return Ok(deadline);
        }
    }

    NaiveDate::parse_from_str(value, DATE_ONLY_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| TasksError::InvalidDeadline {
            value: value.to_string(),
        })
}

/// Parse a single log line into a task.
pub fn parse_line(line: &str) -> TasksResult<Task> {
    let line = line.trim_end_matches(['\r', '\n']);

    let (name, rest) = line
        .rsplit_once(DEADLINE_SEP)
        .ok_or_else(|| missing_field("Deadline"))?;
    let (deadline, rest) = rest
        .split_once(PRIORITY_SEP)
        .ok_or_else(|| missing_field("Priority"))?;
    let (priority, time_needed) = rest
        .split_once(TIME_NEEDED_SEP)
        .ok_or_else(|| missing_field("Time Needed"))?;

    if name.trim().is_empty() {
        return Err(TasksError::LineParse {
            reason: "empty task name".to_string(),
        });
    }

    let deadline = parse_deadline(deadline).map_err(as_line_error)?;
    let priority: TaskPriority = priority.parse().map_err(as_line_error)?;
    let time_needed: TimeNeeded = time_needed.parse().map_err(as_line_error)?;

    Ok(Task::new(name, deadline, priority, time_needed))
}

/// Parse a whole log, skipping blank lines and collecting bad ones.
pub fn parse_log(content: &str) -> ParsedLog {
    let mut parsed = ParsedLog::default();

    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(line) {
            Ok(task) => parsed.tasks.push(task),
            Err(e) => parsed.issues.push(ParseIssue {
                line_number: idx + 1,
                line: line.to_string(),
                reason: e.to_string(),
            }),
        }
    }

    parsed
}

/// Render tasks as log content, one line each with a trailing newline.
pub fn render_lines(tasks: &[Task], format: fn(&Task) -> String) -> String {
    tasks.iter().fold(String::new(), |mut out, task| {
        out.push_str(&format(task));
        out.push('\n');
        out
    })
}

fn missing_field(field: &str) -> TasksError {
    TasksError::LineParse {
        reason: format!("missing '{field}' field"),
    }
}

fn as_line_error(err: TasksError) -> TasksError {
    TasksError::LineParse {
        reason: err.to_string(),
    }
}
