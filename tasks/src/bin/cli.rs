//! Stress Tasks CLI - deadline-aware task list.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::disallowed_macros)]
#![allow(clippy::uninlined_format_args)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use dialoguer::{Input, Select, theme::ColorfulTheme};
use serde::Serialize;

use stress_tasks::domain::{
    Archiver, Clock, ConfigDomain, IntervalTicker, SystemClock, TaskStore,
};
use stress_tasks::entities::{SortMode, Task, TaskPriority, TimeNeeded, ViewState};
use stress_tasks::errors::{TasksError, TasksResult};
use stress_tasks::storage::{FileStorage, Storage, format};
use stress_tasks::ui;

#[derive(Parser)]
#[command(name = "stress-tasks")]
#[command(about = "Deadline-aware task list", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Project root directory
    #[arg(long, global = true)]
    project: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(flatten)]
    Task(TaskCommand),

    /// Show or change configuration
    Config {
        /// Seconds between passed-deadline checks
        #[arg(long)]
        interval: Option<u64>,

        /// Active log path
        #[arg(long)]
        active_log: Option<PathBuf>,

        /// Archive log path
        #[arg(long)]
        archive_log: Option<PathBuf>,
    },
}

/// Commands that work on the loaded task list
#[derive(Subcommand)]
enum TaskCommand {
    /// Add a new task
    Add {
        /// Task name
        #[arg(short, long)]
        name: Option<String>,

        /// Deadline (MM/DD/YY HH:MM)
        #[arg(short, long)]
        deadline: Option<String>,

        /// Priority (low, medium, high)
        #[arg(short, long)]
        priority: Option<String>,

        /// Time needed (HH:MM)
        #[arg(short, long)]
        time_needed: Option<String>,

        /// Skip interactive prompts
        #[arg(short, long)]
        yes: bool,
    },

    /// List tasks in the current sort order
    List {
        /// Switch sort order first (due, importance, todo)
        #[arg(short, long)]
        sort: Option<String>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sort tasks by due date
    Due {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Sort tasks by importance
    Importance {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show tasks in to-do order (highest urgency first)
    Todo {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// View tasks whose deadline has passed
    Archived {
        /// Print the archive log as written
        #[arg(long)]
        raw: bool,
    },

    /// Keep checking for passed deadlines until interrupted
    Watch {
        /// Seconds between checks (defaults to the configured interval)
        #[arg(short, long)]
        interval: Option<u64>,
    },
}

#[derive(Serialize)]
struct ScoredTask<'a> {
    #[serde(flatten)]
    task: &'a Task,
    score: f64,
}

fn get_project_path(cli_path: Option<PathBuf>) -> PathBuf {
    cli_path.unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        if e.is_validation() {
            ui::print_warning(&e.to_string());
        } else {
            ui::print_error(&e.to_string());
        }
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> TasksResult<()> {
    let project_path = get_project_path(cli.project);
    let config_domain = ConfigDomain::new(&project_path);

    match cli.command {
        Commands::Config {
            interval,
            active_log,
            archive_log,
        } => configure(&config_domain, interval, active_log, archive_log).await,
        Commands::Task(command) => run_task_command(&project_path, &config_domain, command).await,
    }
}

async fn run_task_command(
    project_path: &Path,
    config_domain: &ConfigDomain,
    command: TaskCommand,
) -> TasksResult<()> {
    let config = config_domain.load().await?;
    let storage = Arc::new(FileStorage::with_config(project_path, &config));
    let clock = SystemClock;

    let mut view = storage.load_view_state().await?;
    let (mut store, issues) = TaskStore::open(
        Arc::clone(&storage) as Arc<dyn Storage>,
        &mut view,
        clock.now(),
    )
    .await?;
    ui::report_parse_issues(&issues, true);

    match command {
        TaskCommand::Add {
            name,
            deadline,
            priority,
            time_needed,
            yes,
        } => {
            let task = collect_task(name, deadline, priority, time_needed, yes)?;
            let summary = format!(
                "Added '{}' due {}",
                task.name,
                task.deadline.format(format::ARCHIVE_DEADLINE_FORMAT)
            );
            store.add(task, clock.now(), &mut view).await?;
            ui::print_success(&summary);
        }

        TaskCommand::List { sort, json } => {
            if let Some(mode) = sort {
                view.active_sort_mode = mode.parse::<SortMode>()?;
            }
            archive_now(&mut store, &mut view, &clock).await;
            show(&store, view.active_sort_mode, &clock, json)?;
        }

        TaskCommand::Due { json } => {
            archive_now(&mut store, &mut view, &clock).await;
            store.sort_by_due_date(&mut view);
            show(&store, view.active_sort_mode, &clock, json)?;
        }

        TaskCommand::Importance { json } => {
            archive_now(&mut store, &mut view, &clock).await;
            store.sort_by_importance(&mut view);
            show(&store, view.active_sort_mode, &clock, json)?;
        }

        TaskCommand::Todo { json } => {
            archive_now(&mut store, &mut view, &clock).await;
            store.sort_by_urgency(&mut view, clock.now());
            show(&store, view.active_sort_mode, &clock, json)?;
        }

        TaskCommand::Archived { raw } => {
            archive_now(&mut store, &mut view, &clock).await;
            if raw {
                match storage.read_archive().await? {
                    Some(content) => print!("{content}"),
                    None => ui::print_info("No passed tasks found."),
                }
            } else {
                let archived = storage.load_archived().await?;
                ui::report_parse_issues(&archived.issues, false);
                if archived.tasks.is_empty() {
                    ui::print_info("No passed tasks found.");
                } else {
                    println!("{}", "Passed Tasks".bold());
                    println!("{}", ui::archive_table(&archived.tasks));
                }
            }
        }

        TaskCommand::Watch { interval } => {
            let period = interval.map_or_else(|| config.archive_interval(), Duration::from_secs);
            ui::print_info(&format!(
                "Checking for passed deadlines every {}s (Ctrl-C to stop)",
                period.as_secs().max(1)
            ));

            let archiver = Archiver::new(SystemClock);
            let mut ticker = IntervalTicker::new(period);
            let mut first = true;

            tokio::select! {
                _ = archiver.run(&mut store, &mut view, &mut ticker, |store, view, report| {
                    for task in &report.archived {
                        ui::print_warning(&format!("Deadline passed: {}", task.name));
                    }
                    if first || !report.is_empty() {
                        first = false;
                        ui::display_tasks(store.tasks(), view.active_sort_mode, SystemClock.now());
                    }
                }) => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Received SIGINT, stopping watch");
                }
            }
        }
    }

    if let Err(e) = storage.save_view_state(view).await {
        ui::print_warning(&format!("Could not remember sort order: {e}"));
    }

    Ok(())
}

/// Move passed tasks to the archive, reporting rather than failing
async fn archive_now(store: &mut TaskStore, view: &mut ViewState, clock: &SystemClock) {
    let archiver = Archiver::new(*clock);
    match archiver.check(store, view).await {
        Ok(report) if !report.is_empty() => ui::print_info(&format!(
            "Moved {} passed task(s) to the archive",
            report.archived.len()
        )),
        Ok(_) => {}
        Err(e) => ui::print_warning(&format!("Could not archive passed tasks: {e}")),
    }
}

fn show(store: &TaskStore, mode: SortMode, clock: &SystemClock, json: bool) -> TasksResult<()> {
    let now = clock.now();
    if !json {
        ui::display_tasks(store.tasks(), mode, now);
        return Ok(());
    }

    let out = if mode == SortMode::ToDoOrder {
        let scored = store.scored(now);
        let rows: Vec<ScoredTask> = scored
            .iter()
            .map(|(task, score)| ScoredTask {
                task,
                score: *score,
            })
            .collect();
        serde_json::to_string_pretty(&rows)?
    } else {
        serde_json::to_string_pretty(store.tasks())?
    };
    println!("{out}");
    Ok(())
}

fn collect_task(
    name: Option<String>,
    deadline: Option<String>,
    priority: Option<String>,
    time_needed: Option<String>,
    non_interactive: bool,
) -> TasksResult<Task> {
    let theme = ColorfulTheme::default();

    let name = match name {
        Some(name) => name,
        None if non_interactive => return Err(TasksError::EmptyName),
        None => Input::<String>::with_theme(&theme)
            .with_prompt("Task name")
            .allow_empty(true)
            .interact_text()
            .map_err(|_| TasksError::Cancelled)?,
    };
    if name.trim().is_empty() {
        return Err(TasksError::EmptyName);
    }

    let deadline = match deadline {
        Some(value) => value,
        None if non_interactive => {
            return Err(TasksError::InvalidDeadline {
                value: String::new(),
            });
        }
        None => Input::<String>::with_theme(&theme)
            .with_prompt("Deadline (MM/DD/YY HH:MM)")
            .interact_text()
            .map_err(|_| TasksError::Cancelled)?,
    };
    let deadline = format::parse_deadline(&deadline)?;

    let priority = match priority {
        Some(value) => value.parse::<TaskPriority>()?,
        None if non_interactive => TaskPriority::default(),
        None => {
            let options = [TaskPriority::Low, TaskPriority::Medium, TaskPriority::High];
            let idx = Select::with_theme(&theme)
                .with_prompt("Priority")
                .default(1)
                .items(&options)
                .interact()
                .map_err(|_| TasksError::Cancelled)?;
            options[idx]
        }
    };

    let time_needed = match time_needed {
        Some(value) => value,
        None if non_interactive => "01:00".to_string(),
        None => Input::<String>::with_theme(&theme)
            .with_prompt("Time needed (HH:MM)")
            .default("01:00".to_string())
            .interact_text()
            .map_err(|_| TasksError::Cancelled)?,
    };
    let time_needed: TimeNeeded = time_needed.parse()?;

    Ok(Task::new(name, deadline, priority, time_needed))
}

async fn configure(
    domain: &ConfigDomain,
    interval: Option<u64>,
    active_log: Option<PathBuf>,
    archive_log: Option<PathBuf>,
) -> TasksResult<()> {
    let changed = interval.is_some() || active_log.is_some() || archive_log.is_some();

    if let Some(secs) = interval {
        domain.set_archive_interval(secs).await?;
    }
    if let Some(path) = active_log {
        domain.set_active_log(path).await?;
    }
    if let Some(path) = archive_log {
        domain.set_archive_log(path).await?;
    }
    if changed {
        ui::print_success(&format!("Configuration saved to {}", domain.path().display()));
    }

    let config = domain.load().await?;
    println!("{}: {}", "Active log".bold(), config.active_log.display());
    println!("{}: {}", "Archive log".bold(), config.archive_log.display());
    println!(
        "{}: {}s",
        "Archive interval".bold(),
        config.archive_interval_secs
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_and_task_commands_parse() {
        let cli = Cli::try_parse_from(["stress-tasks", "config", "--interval", "30"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                interval: Some(30),
                ..
            }
        ));

        let cli = Cli::try_parse_from(["stress-tasks", "todo", "--json"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Task(TaskCommand::Todo { json: true })
        ));

        let cli = Cli::try_parse_from(["stress-tasks", "list", "--sort", "importance"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Task(TaskCommand::List { sort: Some(_), json: false })
        ));
    }
}
