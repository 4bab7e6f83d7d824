//! Task store: the ordered list of pending tasks and its persistence.

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use super::scorer;
use crate::entities::{SortMode, Task, ViewState};
use crate::errors::TasksResult;
use crate::storage::{ParseIssue, Storage};

/// Outcome of moving passed tasks to the archive
#[derive(Debug, Clone, Default)]
pub struct ArchiveReport {
    /// Tasks moved to the archive log, in store order
    pub archived: Vec<Task>,
    /// Tasks still pending afterwards
    pub kept: usize,
}

impl ArchiveReport {
    pub fn is_empty(&self) -> bool {
        self.archived.is_empty()
    }
}

/// In-memory ordered task list backed by a [`Storage`]
pub struct TaskStore {
    storage: Arc<dyn Storage>,
    tasks: Vec<Task>,
    /// Set when tasks were archived but the active log still lists them
    unsaved: bool,
}

impl TaskStore {
    /// Create an empty store
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            tasks: Vec::new(),
            unsaved: false,
        }
    }

    /// Load the active log and order it by the view's active mode.
    ///
    /// Lines that cannot be parsed are skipped and returned so the caller
    /// can report them.
    pub async fn open(
        storage: Arc<dyn Storage>,
        view: &mut ViewState,
        now: NaiveDateTime,
    ) -> TasksResult<(Self, Vec<ParseIssue>)> {
        let mut store = Self::new(storage);
        let issues = store.reload(view, now).await?;
        Ok((store, issues))
    }

    /// Replace the in-memory list with the contents of the active log
    pub async fn reload(
        &mut self,
        view: &mut ViewState,
        now: NaiveDateTime,
    ) -> TasksResult<Vec<ParseIssue>> {
        let parsed = self.storage.load_tasks().await?;
        self.tasks = parsed.tasks;
        self.unsaved = false;
        self.reapply_active_mode(view, now);

        debug!(
            storage = self.storage.storage_type(),
            tasks = self.tasks.len(),
            skipped = parsed.issues.len(),
            "loaded tasks"
        );
        Ok(parsed.issues)
    }

    /// Tasks in their current order
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Tasks paired with their urgency score at `now`, highest first
    pub fn scored(&self, now: NaiveDateTime) -> Vec<(Task, f64)> {
        scorer::scored(self.tasks.clone(), now)
    }

    /// Validate and add a task, then rewrite the active log.
    ///
    /// The list is re-sorted by due date afterwards. If the log cannot be
    /// written the store and view are left as they were.
    pub async fn add(
        &mut self,
        task: Task,
        now: NaiveDateTime,
        view: &mut ViewState,
    ) -> TasksResult<()> {
        task.validate(now)?;

        let previous = self.tasks.clone();
        let previous_view = *view;
        let name = task.name.clone();

        self.tasks.push(task);
        self.sort_by_due_date(view);

        if let Err(e) = self.storage.save_tasks(&self.tasks).await {
            self.tasks = previous;
            *view = previous_view;
            return Err(e);
        }
        self.unsaved = false;

        info!(task = %name, total = self.tasks.len(), "added task");
        Ok(())
    }

    /// Earliest deadline first
    pub fn sort_by_due_date(&mut self, view: &mut ViewState) {
        self.tasks.sort_by_key(|t| t.deadline);
        view.active_sort_mode = SortMode::ByDueDate;
    }

    /// High, then Medium, then Low
    pub fn sort_by_importance(&mut self, view: &mut ViewState) {
        self.tasks.sort_by_key(|t| t.priority.severity_rank());
        view.active_sort_mode = SortMode::ByImportance;
    }

    /// Highest urgency score first. The ranked order replaces the stored
    /// order.
    pub fn sort_by_urgency(&mut self, view: &mut ViewState, now: NaiveDateTime) {
        let tasks = std::mem::take(&mut self.tasks);
        self.tasks = scorer::rank(tasks, now);
        view.active_sort_mode = SortMode::ToDoOrder;
    }

    /// Sort by whichever mode `view` currently records
    pub fn reapply_active_mode(&mut self, view: &mut ViewState, now: NaiveDateTime) {
        match view.active_sort_mode {
            SortMode::ByDueDate => self.sort_by_due_date(view),
            SortMode::ByImportance => self.sort_by_importance(view),
            SortMode::ToDoOrder => self.sort_by_urgency(view, now),
        }
    }

    /// Move every task whose deadline is before `now` to the archive log.
    ///
    /// Tasks due exactly at `now` are kept. If the archive cannot be
    /// written nothing is removed. If the archive was written but the
    /// active log was not, the rewrite is retried on the next call before
    /// anything else is archived. The active sort mode is re-applied in
    /// every case.
    pub async fn archive_passed(
        &mut self,
        view: &mut ViewState,
        now: NaiveDateTime,
    ) -> TasksResult<ArchiveReport> {
        if self.unsaved {
            self.reapply_active_mode(view, now);
            self.storage.save_tasks(&self.tasks).await?;
            self.unsaved = false;
            debug!(tasks = self.tasks.len(), "rewrote active log after earlier failure");
        }

        let (passed, kept): (Vec<Task>, Vec<Task>) =
            self.tasks.iter().cloned().partition(|t| t.is_passed(now));

        if passed.is_empty() {
            self.reapply_active_mode(view, now);
            return Ok(ArchiveReport {
                archived: Vec::new(),
                kept: kept.len(),
            });
        }

        if let Err(e) = self.storage.append_archived(&passed).await {
            self.reapply_active_mode(view, now);
            return Err(e);
        }

        self.tasks = kept;
        self.reapply_active_mode(view, now);
        if let Err(e) = self.storage.save_tasks(&self.tasks).await {
            self.unsaved = true;
            return Err(e);
        }

        info!(
            archived = passed.len(),
            kept = self.tasks.len(),
            "archived passed tasks"
        );
        Ok(ArchiveReport {
            kept: self.tasks.len(),
            archived: passed,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{TaskPriority, TasksConfig, TimeNeeded};
    use crate::errors::TasksError;
    use crate::storage::FileStorage;
    use crate::storage::ParsedLog;
    use async_trait::async_trait;
    use chrono::{NaiveDate, TimeDelta};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// File storage whose next `failing_saves` active-log writes fail
    struct FailingSaves {
        inner: FileStorage,
        failing_saves: AtomicUsize,
    }

    impl FailingSaves {
        fn fail_next(&self, count: usize) {
            self.failing_saves.store(count, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl Storage for FailingSaves {
        fn storage_type(&self) -> &'static str {
            "failing"
        }

        async fn load_tasks(&self) -> TasksResult<ParsedLog> {
            self.inner.load_tasks().await
        }

        async fn save_tasks(&self, tasks: &[Task]) -> TasksResult<()> {
            let remaining = self.failing_saves.load(Ordering::SeqCst);
            if remaining > 0 {
                self.failing_saves.store(remaining - 1, Ordering::SeqCst);
                return Err(TasksError::FileWriteError {
                    path: "task_log.txt".to_string(),
                    reason: "disk full".to_string(),
                });
            }
            self.inner.save_tasks(tasks).await
        }

        async fn append_archived(&self, tasks: &[Task]) -> TasksResult<()> {
            self.inner.append_archived(tasks).await
        }

        async fn read_archive(&self) -> TasksResult<Option<String>> {
            self.inner.read_archive().await
        }

        async fn load_archived(&self) -> TasksResult<ParsedLog> {
            self.inner.load_archived().await
        }

        async fn load_view_state(&self) -> TasksResult<ViewState> {
            self.inner.load_view_state().await
        }

        async fn save_view_state(&self, state: ViewState) -> TasksResult<()> {
            self.inner.save_view_state(state).await
        }
    }

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn task(name: &str, deadline: NaiveDateTime, priority: TaskPriority) -> Task {
        Task::new(name, deadline, priority, TimeNeeded::new(1, 0).unwrap())
    }

    fn names(store: &TaskStore) -> Vec<&str> {
        store.tasks().iter().map(|t| t.name.as_str()).collect()
    }

    fn setup() -> (TempDir, Arc<FileStorage>, TaskStore) {
        let temp_dir = TempDir::new().unwrap();
        let storage = Arc::new(FileStorage::new(temp_dir.path()));
        let store = TaskStore::new(Arc::clone(&storage) as Arc<dyn Storage>);
        (temp_dir, storage, store)
    }

    #[tokio::test]
    async fn test_add_accepts_future_deadline() {
        let (_temp, _storage, mut store) = setup();
        let mut view = ViewState::default();

        let report = Task::new(
            "Write report",
            at(1, 9),
            TaskPriority::High,
            "02:00".parse().unwrap(),
        );
        store.add(report, at(1, 8), &mut view).await.unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_add_rejects_passed_deadline() {
        let (_temp, storage, mut store) = setup();
        let mut view = ViewState::new(SortMode::ByImportance);

        let report = task("Write report", at(1, 9), TaskPriority::High);
        let err = store.add(report, at(2, 0), &mut view).await.unwrap_err();

        assert!(matches!(err, TasksError::DeadlinePassed { .. }));
        assert!(store.is_empty());
        assert_eq!(view.active_sort_mode, SortMode::ByImportance);
        assert!(storage.load_tasks().await.unwrap().tasks.is_empty());
    }

    #[tokio::test]
    async fn test_add_sorts_by_due_date_and_persists() {
        let (_temp, storage, mut store) = setup();
        let mut view = ViewState::new(SortMode::ToDoOrder);
        let now = at(1, 0);

        store
            .add(task("later", at(5, 9), TaskPriority::High), now, &mut view)
            .await
            .unwrap();
        store
            .add(task("sooner", at(3, 9), TaskPriority::Low), now, &mut view)
            .await
            .unwrap();

        assert_eq!(names(&store), vec!["sooner", "later"]);
        assert_eq!(view.active_sort_mode, SortMode::ByDueDate);

        let persisted = storage.load_tasks().await.unwrap().tasks;
        assert_eq!(persisted, store.tasks());
    }

    #[tokio::test]
    async fn test_add_rolls_back_on_write_failure() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("blocked")).unwrap();
        let config = TasksConfig {
            active_log: PathBuf::from("blocked"),
            ..TasksConfig::default()
        };
        let storage = Arc::new(FileStorage::with_config(temp_dir.path(), &config));
        let mut store = TaskStore::new(storage);
        let mut view = ViewState::new(SortMode::ByImportance);

        let err = store
            .add(task("a", at(3, 9), TaskPriority::Low), at(1, 0), &mut view)
            .await
            .unwrap_err();

        assert!(matches!(err, TasksError::FileWriteError { .. }));
        assert!(store.is_empty());
        assert_eq!(view.active_sort_mode, SortMode::ByImportance);
    }

    #[tokio::test]
    async fn test_roundtrip_through_log() {
        let (_temp, storage, mut store) = setup();
        let mut view = ViewState::default();
        let deadline = NaiveDate::from_ymd_opt(2024, 3, 14)
            .unwrap()
            .and_hms_opt(15, 9, 26)
            .unwrap();
        let original = Task::new(
            "Pi day",
            deadline,
            TaskPriority::Medium,
            "03:14".parse().unwrap(),
        );

        store.add(original.clone(), at(1, 0), &mut view).await.unwrap();

        let (reloaded, issues) = TaskStore::open(storage, &mut view, at(1, 0)).await.unwrap();
        assert!(issues.is_empty());
        assert_eq!(reloaded.tasks(), &[original]);
    }

    #[tokio::test]
    async fn test_importance_order() {
        let (_temp, _storage, mut store) = setup();
        let mut view = ViewState::default();
        let now = at(1, 0);
        for (name, priority) in [
            ("low", TaskPriority::Low),
            ("high", TaskPriority::High),
            ("medium", TaskPriority::Medium),
        ] {
            store
                .add(task(name, at(4, 12), priority), now, &mut view)
                .await
                .unwrap();
        }

        store.sort_by_importance(&mut view);
        assert_eq!(names(&store), vec!["high", "medium", "low"]);
        assert_eq!(view.active_sort_mode, SortMode::ByImportance);
    }

    #[tokio::test]
    async fn test_resorting_is_idempotent() {
        let (_temp, _storage, mut store) = setup();
        let mut view = ViewState::default();
        let now = at(1, 0);
        for (name, day, priority) in [
            ("a", 6, TaskPriority::Low),
            ("b", 2, TaskPriority::High),
            ("c", 4, TaskPriority::Medium),
            ("d", 5, TaskPriority::High),
        ] {
            store
                .add(task(name, at(day, 9), priority), now, &mut view)
                .await
                .unwrap();
        }

        store.sort_by_due_date(&mut view);
        let by_due = store.tasks().to_vec();
        store.sort_by_due_date(&mut view);
        assert_eq!(store.tasks(), by_due.as_slice());

        store.sort_by_importance(&mut view);
        let by_importance = store.tasks().to_vec();
        store.sort_by_importance(&mut view);
        assert_eq!(store.tasks(), by_importance.as_slice());

        store.sort_by_due_date(&mut view);
        assert_eq!(store.tasks(), by_due.as_slice());
    }

    #[tokio::test]
    async fn test_equal_keys_keep_previous_order() {
        let (_temp, _storage, mut store) = setup();
        let mut view = ViewState::default();
        let now = at(1, 0);
        for (name, day, priority) in [
            ("b", 2, TaskPriority::High),
            ("c", 4, TaskPriority::Medium),
            ("d", 4, TaskPriority::High),
        ] {
            store
                .add(task(name, at(day, 9), priority), now, &mut view)
                .await
                .unwrap();
        }
        assert_eq!(names(&store), vec!["b", "c", "d"]);

        store.sort_by_importance(&mut view);
        assert_eq!(names(&store), vec!["b", "d", "c"]);

        // c and d share a deadline, so they stay as importance left them
        store.sort_by_due_date(&mut view);
        assert_eq!(names(&store), vec!["b", "d", "c"]);
        store.sort_by_due_date(&mut view);
        assert_eq!(names(&store), vec!["b", "d", "c"]);
    }

    #[tokio::test]
    async fn test_sort_by_urgency_replaces_order() {
        let (_temp, _storage, mut store) = setup();
        let mut view = ViewState::default();
        let now = at(1, 0);
        store
            .add(task("relaxed", at(9, 9), TaskPriority::High), now, &mut view)
            .await
            .unwrap();
        store
            .add(task("pressing", at(1, 2), TaskPriority::Low), now, &mut view)
            .await
            .unwrap();
        store.sort_by_importance(&mut view);
        assert_eq!(names(&store), vec!["relaxed", "pressing"]);

        store.sort_by_urgency(&mut view, now);
        assert_eq!(names(&store), vec!["pressing", "relaxed"]);
        assert_eq!(view.active_sort_mode, SortMode::ToDoOrder);
    }

    #[tokio::test]
    async fn test_archive_partitions_completely() {
        let (_temp, storage, mut store) = setup();
        let mut view = ViewState::new(SortMode::ByImportance);
        let created = at(1, 0);
        for (name, day, priority) in [
            ("past-low", 2, TaskPriority::Low),
            ("future-low", 5, TaskPriority::Low),
            ("past-high", 3, TaskPriority::High),
            ("due-now", 4, TaskPriority::Medium),
            ("future-high", 6, TaskPriority::High),
        ] {
            store
                .add(task(name, at(day, 9), priority), created, &mut view)
                .await
                .unwrap();
        }
        store.sort_by_importance(&mut view);
        let before = store.tasks().to_vec();

        let report = store.archive_passed(&mut view, at(4, 9)).await.unwrap();

        let archived: Vec<&str> = report.archived.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(archived, vec!["past-high", "past-low"]);
        assert_eq!(names(&store), vec!["future-high", "due-now", "future-low"]);
        assert_eq!(report.kept, 3);
        assert_eq!(view.active_sort_mode, SortMode::ByImportance);

        let mut all: Vec<Task> = store.tasks().to_vec();
        all.extend(report.archived.iter().cloned());
        assert_eq!(all.len(), before.len());
        for t in &before {
            assert_eq!(all.iter().filter(|x| *x == t).count(), 1);
        }

        let archived_log = storage.load_archived().await.unwrap().tasks;
        assert_eq!(archived_log.len(), 2);
        let active_log = storage.load_tasks().await.unwrap().tasks;
        assert_eq!(active_log.len(), 3);
    }

    #[tokio::test]
    async fn test_archive_with_nothing_passed_reapplies_mode() {
        let (_temp, storage, mut store) = setup();
        let mut view = ViewState::default();
        let now = at(1, 0);
        store
            .add(task("far", at(9, 9), TaskPriority::High), now, &mut view)
            .await
            .unwrap();
        store
            .add(task("near", at(1, 1), TaskPriority::Low), now, &mut view)
            .await
            .unwrap();
        view.active_sort_mode = SortMode::ToDoOrder;

        let report = store
            .archive_passed(&mut view, now + TimeDelta::minutes(1))
            .await
            .unwrap();

        assert!(report.is_empty());
        assert_eq!(report.kept, 2);
        assert_eq!(names(&store), vec!["near", "far"]);
        assert!(storage.read_archive().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_archive_failure_keeps_tasks() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::create_dir_all(temp_dir.path().join("blocked")).unwrap();
        let config = TasksConfig {
            archive_log: PathBuf::from("blocked"),
            ..TasksConfig::default()
        };
        let storage = Arc::new(FileStorage::with_config(temp_dir.path(), &config));
        let mut store = TaskStore::new(storage);
        let mut view = ViewState::default();
        store
            .add(task("a", at(2, 9), TaskPriority::Low), at(1, 0), &mut view)
            .await
            .unwrap();

        let err = store.archive_passed(&mut view, at(3, 0)).await.unwrap_err();
        assert!(matches!(err, TasksError::FileWriteError { .. }));
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_failed_rewrite_is_retried_without_archiving_twice() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Arc::new(FailingSaves {
            inner: FileStorage::new(temp_dir.path()),
            failing_saves: AtomicUsize::new(0),
        });
        let mut store = TaskStore::new(Arc::clone(&storage) as Arc<dyn Storage>);
        let mut view = ViewState::default();
        store
            .add(task("a", at(2, 9), TaskPriority::Low), at(1, 0), &mut view)
            .await
            .unwrap();
        store
            .add(task("b", at(9, 9), TaskPriority::High), at(1, 0), &mut view)
            .await
            .unwrap();

        storage.fail_next(1);
        let err = store.archive_passed(&mut view, at(3, 0)).await.unwrap_err();
        assert!(matches!(err, TasksError::FileWriteError { .. }));
        assert_eq!(names(&store), vec!["b"]);

        let report = store.archive_passed(&mut view, at(3, 1)).await.unwrap();
        assert!(report.is_empty());

        let (reopened, _) = TaskStore::open(
            Arc::clone(&storage) as Arc<dyn Storage>,
            &mut ViewState::default(),
            at(3, 1),
        )
        .await
        .unwrap();
        assert_eq!(names(&reopened), vec!["b"]);

        let archived = storage.load_archived().await.unwrap().tasks;
        assert_eq!(archived.len(), 1);
        assert_eq!(archived[0].name, "a");
    }

    #[tokio::test]
    async fn test_failed_retry_keeps_waiting() {
        let temp_dir = TempDir::new().unwrap();
        let storage = Arc::new(FailingSaves {
            inner: FileStorage::new(temp_dir.path()),
            failing_saves: AtomicUsize::new(0),
        });
        let mut store = TaskStore::new(Arc::clone(&storage) as Arc<dyn Storage>);
        let mut view = ViewState::default();
        store
            .add(task("a", at(2, 9), TaskPriority::Low), at(1, 0), &mut view)
            .await
            .unwrap();

        storage.fail_next(2);
        assert!(store.archive_passed(&mut view, at(3, 0)).await.is_err());
        assert!(store.archive_passed(&mut view, at(3, 1)).await.is_err());

        store.archive_passed(&mut view, at(3, 2)).await.unwrap();
        assert!(storage.load_tasks().await.unwrap().tasks.is_empty());
        assert_eq!(storage.load_archived().await.unwrap().tasks.len(), 1);
    }
}
