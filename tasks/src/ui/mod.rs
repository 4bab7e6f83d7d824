//! Terminal UI helpers for task display.
//!
//! This module uses println! for CLI output, which is appropriate
//! for terminal user interfaces.

#![allow(clippy::disallowed_macros)]

use chrono::NaiveDateTime;
use colored::Colorize;
use comfy_table::{Cell, Color, ContentArrangement, Table};

use crate::domain::scorer;
use crate::entities::{SortMode, Task, TaskPriority};
use crate::storage::ParseIssue;
use crate::storage::format::ARCHIVE_DEADLINE_FORMAT;

fn priority_color(priority: TaskPriority) -> Color {
    match priority {
        TaskPriority::Low => Color::DarkGrey,
        TaskPriority::Medium => Color::White,
        TaskPriority::High => Color::Red,
    }
}

/// Human-readable time left until `deadline`, e.g. `2d 3h`, `45m`, `overdue`
pub fn time_left(deadline: NaiveDateTime, now: NaiveDateTime) -> String {
    let left = deadline - now;
    if left <= chrono::TimeDelta::zero() {
        return "overdue".to_string();
    }

    let days = left.num_days();
    let hours = left.num_hours() % 24;
    let minutes = left.num_minutes() % 60;
    match (days, hours) {
        (0, 0) => format!("{minutes}m"),
        (0, h) => format!("{h}h {minutes}m"),
        (d, h) => format!("{d}d {h}h"),
    }
}

/// Create a table for displaying tasks.
///
/// In to-do order an extra column carries each task's urgency score.
pub fn task_table(tasks: &[Task], mode: SortMode, now: NaiveDateTime) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    let mut header = vec![
        Cell::new("#").fg(Color::Cyan),
        Cell::new("Task").fg(Color::Cyan),
        Cell::new("Deadline").fg(Color::Cyan),
        Cell::new("Left").fg(Color::Cyan),
        Cell::new("Priority").fg(Color::Cyan),
        Cell::new("Time Needed").fg(Color::Cyan),
    ];
    if mode == SortMode::ToDoOrder {
        header.push(Cell::new("Score").fg(Color::Cyan));
    }
    table.set_header(header);

    for (idx, task) in tasks.iter().enumerate() {
        let mut row = vec![
            Cell::new(idx + 1),
            Cell::new(&task.name),
            Cell::new(task.deadline.format(ARCHIVE_DEADLINE_FORMAT)),
            Cell::new(time_left(task.deadline, now)),
            Cell::new(task.priority).fg(priority_color(task.priority)),
            Cell::new(task.time_needed),
        ];
        if mode == SortMode::ToDoOrder {
            row.push(Cell::new(format!("{:.1}", scorer::score(task, now))));
        }
        table.add_row(row);
    }

    table
}

/// Create a table for displaying archived tasks
pub fn archive_table(tasks: &[Task]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Task").fg(Color::Cyan),
        Cell::new("Deadline").fg(Color::Cyan),
        Cell::new("Priority").fg(Color::Cyan),
        Cell::new("Time Needed").fg(Color::Cyan),
    ]);

    for task in tasks {
        table.add_row(vec![
            Cell::new(&task.name).fg(Color::DarkGrey),
            Cell::new(task.deadline.format(ARCHIVE_DEADLINE_FORMAT)),
            Cell::new(task.priority).fg(priority_color(task.priority)),
            Cell::new(task.time_needed),
        ]);
    }

    table
}

/// Print the task list with a heading naming the sort mode
pub fn display_tasks(tasks: &[Task], mode: SortMode, now: NaiveDateTime) {
    if tasks.is_empty() {
        print_info("No tasks found");
        return;
    }

    println!(
        "{} {}",
        "Tasks by".bold(),
        mode.to_string().cyan().bold()
    );
    println!("{}", task_table(tasks, mode, now));
    println!();
    print_info(&format!("{} task(s) total", tasks.len()));
}

/// Warnings for log lines that were skipped while loading.
///
/// `rewritten` marks a log that is overwritten on save, where skipped lines
/// do not survive the next write.
pub fn parse_issue_messages(issues: &[ParseIssue], rewritten: bool) -> Vec<String> {
    let mut messages: Vec<String> = issues
        .iter()
        .map(|issue| format!("Skipped unreadable task on {issue}"))
        .collect();
    if rewritten && !issues.is_empty() {
        messages.push(
            "Skipped lines are dropped from the task log the next time it is saved".to_string(),
        );
    }
    messages
}

/// Report log lines that were skipped while loading
pub fn report_parse_issues(issues: &[ParseIssue], rewritten: bool) {
    for message in parse_issue_messages(issues, rewritten) {
        print_warning(&message);
    }
}

/// Print success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print error message
pub fn print_error(message: &str) {
    eprintln!("{} {}", "✗".red().bold(), message);
}

/// Print info message
pub fn print_info(message: &str) {
    println!("{} {}", "ℹ".blue().bold(), message);
}

/// Print warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}
