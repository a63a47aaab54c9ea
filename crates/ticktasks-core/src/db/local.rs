//! Local SQLite database for durable task storage.
//!
//! This module provides `LocalDb`, a wrapper around a SQLite connection pool
//! that handles CRUD operations for tasks, the retention delete, the undo
//! buffer used by the CLI, and the persisted cleanup schedule. Every task
//! mutation republishes the full list to [`TaskListWatcher`] subscribers
//! before it returns.

use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tokio::sync::watch;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::db::watch::TaskListWatcher;
use crate::error::{Result, TickTasksError};
use crate::models::{RunStatus, Schedule, Task};

/// Helper struct for mapping task rows from SQLite.
#[derive(Debug, FromRow)]
struct TaskRow {
    id: i64,
    title: String,
    description: String,
    checked: i32,
    checked_at: Option<i64>,
}

impl TryFrom<TaskRow> for Task {
    type Error = TickTasksError;

    fn try_from(row: TaskRow) -> Result<Self> {
        let checked = row.checked != 0;
        if checked != row.checked_at.is_some() {
            return Err(TickTasksError::CorruptRow(format!(
                "task {} has checked={} but checked_at={:?}",
                row.id, checked, row.checked_at
            )));
        }

        Ok(Task {
            id: row.id,
            title: row.title,
            description: row.description,
            checked,
            checked_at: row.checked_at,
        })
    }
}

/// Helper struct for mapping schedule rows from SQLite.
#[derive(Debug, FromRow)]
struct ScheduleRow {
    name: String,
    request_id: String,
    interval_secs: i64,
    next_run_at: i64,
    last_run_at: Option<i64>,
    last_status: Option<String>,
    last_message: Option<String>,
}

impl TryFrom<ScheduleRow> for Schedule {
    type Error = TickTasksError;

    fn try_from(row: ScheduleRow) -> Result<Self> {
        let request_id = Uuid::parse_str(&row.request_id).map_err(|e| {
            TickTasksError::CorruptRow(format!("schedule {}: invalid request_id: {}", row.name, e))
        })?;
        let last_status = row
            .last_status
            .map(|s| RunStatus::from_str(&s))
            .transpose()
            .map_err(|e| TickTasksError::CorruptRow(format!("schedule {}: {}", row.name, e)))?;

        Ok(Schedule {
            name: row.name,
            request_id,
            interval_secs: row.interval_secs,
            next_run_at: row.next_run_at,
            last_run_at: row.last_run_at,
            last_status,
            last_message: row.last_message,
        })
    }
}

/// Local SQLite database for task storage.
///
/// Cheap to clone; clones share the pool and the task list publisher.
#[derive(Debug, Clone)]
pub struct LocalDb {
    pool: SqlitePool,
    tasks_tx: Arc<watch::Sender<Arc<Vec<Task>>>>,
}

impl LocalDb {
    /// Get a reference to the connection pool (for testing).
    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create an in-memory database for testing.
    pub async fn new_in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str(":memory:")?.create_if_missing(true);

        // A single connection that is never recycled, or the data goes with it.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        Ok(Self::with_pool(pool))
    }

    /// Create a file-based database at the specified path.
    pub async fn new(path: &Path) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;

        Ok(Self::with_pool(pool))
    }

    fn with_pool(pool: SqlitePool) -> Self {
        let (tasks_tx, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            pool,
            tasks_tx: Arc::new(tasks_tx),
        }
    }

    /// Close every connection. Later calls fail with a storage error.
    pub async fn close(&self) {
        self.pool.close().await;
    }

    /// Run database migrations to create tables and indexes, then publish
    /// the initial task list.
    pub async fn run_migrations(&self) -> Result<()> {
        // AUTOINCREMENT keeps ids of deleted rows from being handed out again.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                checked INTEGER NOT NULL DEFAULT 0,
                checked_at INTEGER,
                CHECK ((checked = 0 AND checked_at IS NULL) OR (checked = 1 AND checked_at IS NOT NULL))
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_tasks_checked_at ON tasks(checked, checked_at)")
            .execute(&self.pool)
            .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS undo_buffer (
                position INTEGER PRIMARY KEY,
                task_json TEXT NOT NULL,
                saved_at INTEGER NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS schedules (
                name TEXT PRIMARY KEY,
                request_id TEXT NOT NULL,
                interval_secs INTEGER NOT NULL,
                next_run_at INTEGER NOT NULL,
                last_run_at INTEGER,
                last_status TEXT,
                last_message TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        self.publish().await
    }

    // ==================== Task Subscription ====================

    /// Subscribe to the task list, newest first.
    pub fn watch(&self) -> TaskListWatcher {
        TaskListWatcher::new(self.tasks_tx.subscribe())
    }

    async fn publish(&self) -> Result<()> {
        let tasks = self.list_tasks().await?;
        self.tasks_tx.send_replace(Arc::new(tasks));
        Ok(())
    }

    /// Republish after a committed write. The write stands even if the list
    /// cannot be re-read, so failure here is logged rather than returned and
    /// subscribers keep the previous snapshot until the next publish.
    async fn publish_after_write(&self) {
        if let Err(e) = self.publish().await {
            warn!("task list not republished after write: {e}");
        }
    }

    // ==================== Task CRUD Operations ====================

    /// List every task, most recently inserted first.
    pub async fn list_tasks(&self) -> Result<Vec<Task>> {
        let rows: Vec<TaskRow> = sqlx::query_as("SELECT * FROM tasks ORDER BY id DESC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    /// Get a task by its ID.
    pub async fn get_task(&self, id: i64) -> Result<Option<Task>> {
        let row: Option<TaskRow> = sqlx::query_as("SELECT * FROM tasks WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.try_into()).transpose()
    }

    pub async fn count_tasks(&self) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM tasks")
            .fetch_one(&self.pool)
            .await?;

        Ok(count as u64)
    }

    /// Insert a task as a new row and return the id the store assigned.
    /// Any id already on `task` is ignored.
    pub async fn insert_task(&self, task: &Task) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO tasks (title, description, checked, checked_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(if task.checked { 1 } else { 0 })
        .bind(task.checked_at)
        .execute(&self.pool)
        .await?;

        let id = result.last_insert_rowid();
        debug!(id, "inserted task");

        self.publish_after_write().await;
        Ok(id)
    }

    /// Overwrite a task's fields. Returns 0 if the row no longer exists.
    pub async fn update_task(&self, task: &Task) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE tasks SET
                title = ?1,
                description = ?2,
                checked = ?3,
                checked_at = ?4
            WHERE id = ?5
            "#,
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(if task.checked { 1 } else { 0 })
        .bind(task.checked_at)
        .bind(task.id)
        .execute(&self.pool)
        .await?;

        let affected = result.rows_affected();
        debug!(id = task.id, affected, "updated task");

        if affected > 0 {
            self.publish_after_write().await;
        }
        Ok(affected)
    }

    /// Delete a task by its ID. Returns 0 if it was already gone.
    pub async fn delete_task(&self, task: &Task) -> Result<u64> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ?1")
            .bind(task.id)
            .execute(&self.pool)
            .await?;

        let affected = result.rows_affected();
        debug!(id = task.id, affected, "deleted task");

        if affected > 0 {
            self.publish_after_write().await;
        }
        Ok(affected)
    }

    /// Delete every checked task whose `checked_at` is at or before `cutoff_millis`.
    /// Unchecked tasks are never touched.
    pub async fn delete_checked_before(&self, cutoff_millis: i64) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM tasks WHERE checked = 1 AND checked_at IS NOT NULL AND checked_at <= ?1",
        )
        .bind(cutoff_millis)
        .execute(&self.pool)
        .await?;

        let deleted = result.rows_affected();
        debug!(cutoff_millis, deleted, "deleted checked tasks before cutoff");

        if deleted > 0 {
            self.publish_after_write().await;
        }
        Ok(deleted)
    }

    /// How many tasks [`LocalDb::delete_checked_before`] would remove.
    pub async fn count_checked_before(&self, cutoff_millis: i64) -> Result<u64> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM tasks WHERE checked = 1 AND checked_at IS NOT NULL AND checked_at <= ?1",
        )
        .bind(cutoff_millis)
        .fetch_one(&self.pool)
        .await?;

        Ok(count as u64)
    }

    // ==================== Undo Buffer ====================

    /// Replace the undo buffer with the tasks removed by the latest delete.
    pub async fn save_undo_batch(&self, tasks: &[Task]) -> Result<()> {
        let saved_at = crate::models::now_millis();
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM undo_buffer")
            .execute(&mut *tx)
            .await?;

        for (position, task) in tasks.iter().enumerate() {
            sqlx::query("INSERT INTO undo_buffer (position, task_json, saved_at) VALUES (?1, ?2, ?3)")
                .bind(position as i64)
                .bind(serde_json::to_string(task)?)
                .bind(saved_at)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        debug!(count = tasks.len(), "saved undo batch");
        Ok(())
    }

    /// Return the saved batch in its original order and empty the buffer.
    pub async fn take_undo_batch(&self) -> Result<Vec<Task>> {
        let mut tx = self.pool.begin().await?;

        let rows: Vec<(String,)> =
            sqlx::query_as("SELECT task_json FROM undo_buffer ORDER BY position ASC")
                .fetch_all(&mut *tx)
                .await?;

        sqlx::query("DELETE FROM undo_buffer")
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        rows.into_iter()
            .map(|(json,)| serde_json::from_str(&json).map_err(TickTasksError::from))
            .collect()
    }

    // ==================== Schedule Operations ====================

    /// Register a periodic schedule, replacing any existing one with the same
    /// name. The replacement gets a new request id and is due immediately.
    pub async fn upsert_schedule(&self, name: &str, interval_secs: i64, now_millis: i64) -> Result<Schedule> {
        let request_id = Uuid::new_v4();

        sqlx::query(
            r#"
            INSERT INTO schedules (name, request_id, interval_secs, next_run_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(name) DO UPDATE SET
                request_id = excluded.request_id,
                interval_secs = excluded.interval_secs,
                next_run_at = excluded.next_run_at
            "#,
        )
        .bind(name)
        .bind(request_id.to_string())
        .bind(interval_secs)
        .bind(now_millis)
        .execute(&self.pool)
        .await?;

        debug!(name, %request_id, interval_secs, "schedule enqueued");

        self.get_schedule(name)
            .await?
            .ok_or_else(|| TickTasksError::NotFound(format!("schedule '{}'", name)))
    }

    /// Get a schedule by name.
    pub async fn get_schedule(&self, name: &str) -> Result<Option<Schedule>> {
        let row: Option<ScheduleRow> = sqlx::query_as("SELECT * FROM schedules WHERE name = ?1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.try_into()).transpose()
    }

    /// List all schedules.
    pub async fn list_schedules(&self) -> Result<Vec<Schedule>> {
        let rows: Vec<ScheduleRow> = sqlx::query_as("SELECT * FROM schedules ORDER BY name ASC")
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(|r| r.try_into()).collect()
    }

    /// Record the outcome of a run and push the next run one interval past
    /// `started_at`. Only applies to the request that ran; returns 0 if the
    /// schedule was replaced or removed in the meantime.
    pub async fn record_schedule_run(
        &self,
        name: &str,
        request_id: Uuid,
        started_at: i64,
        status: RunStatus,
        message: Option<&str>,
    ) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE schedules SET
                last_run_at = ?1,
                last_status = ?2,
                last_message = ?3,
                next_run_at = ?1 + interval_secs * 1000
            WHERE name = ?4 AND request_id = ?5
            "#,
        )
        .bind(started_at)
        .bind(status.to_string())
        .bind(message)
        .bind(name)
        .bind(request_id.to_string())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Remove a schedule. Returns 0 if there was none.
    pub async fn remove_schedule(&self, name: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM schedules WHERE name = ?1")
            .bind(name)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_db() -> LocalDb {
        let db = LocalDb::new_in_memory().await.unwrap();
        db.run_migrations().await.unwrap();
        db
    }

    fn checked_task(title: &str, at: i64) -> Task {
        let mut task = Task::new(title.to_string(), String::new());
        task.mark_checked(at);
        task
    }

    #[tokio::test]
    async fn test_insert_and_get_task() {
        let db = setup_db().await;

        let id = db
            .insert_task(&Task::new("Buy groceries".to_string(), "milk".to_string()))
            .await
            .unwrap();
        assert!(id > 0);

        let retrieved = db.get_task(id).await.unwrap().unwrap();
        assert_eq!(retrieved.id, id);
        assert_eq!(retrieved.title, "Buy groceries");
        assert_eq!(retrieved.description, "milk");
        assert!(!retrieved.checked);
        assert!(retrieved.checked_at.is_none());
    }

    #[tokio::test]
    async fn test_insert_ignores_caller_id() {
        let db = setup_db().await;

        let mut task = Task::new("Preset id".to_string(), String::new());
        task.id = 999;
        let id = db.insert_task(&task).await.unwrap();

        assert_ne!(id, 999);
        assert!(db.get_task(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_tasks_newest_first() {
        let db = setup_db().await;

        let first = db.insert_task(&Task::new("Task 1".to_string(), String::new())).await.unwrap();
        let second = db.insert_task(&Task::new("Task 2".to_string(), String::new())).await.unwrap();
        let third = db.insert_task(&Task::new("Task 3".to_string(), String::new())).await.unwrap();

        let ids: Vec<i64> = db.list_tasks().await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![third, second, first]);
    }

    #[tokio::test]
    async fn test_update_task_counts_rows() {
        let db = setup_db().await;

        let id = db.insert_task(&Task::new("Original".to_string(), String::new())).await.unwrap();
        let mut task = db.get_task(id).await.unwrap().unwrap();
        task.title = "Updated".to_string();
        task.mark_checked(1_234);

        assert_eq!(db.update_task(&task).await.unwrap(), 1);
        let retrieved = db.get_task(id).await.unwrap().unwrap();
        assert_eq!(retrieved.title, "Updated");
        assert_eq!(retrieved.checked_at, Some(1_234));

        db.delete_task(&task).await.unwrap();
        assert_eq!(db.update_task(&task).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_task_counts_rows() {
        let db = setup_db().await;

        let id = db.insert_task(&Task::new("To be deleted".to_string(), String::new())).await.unwrap();
        let task = db.get_task(id).await.unwrap().unwrap();

        assert_eq!(db.delete_task(&task).await.unwrap(), 1);
        assert!(db.get_task(id).await.unwrap().is_none());
        assert_eq!(db.delete_task(&task).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_ids_are_not_reused_after_delete() {
        let db = setup_db().await;

        let id = db.insert_task(&Task::new("Last".to_string(), String::new())).await.unwrap();
        let task = db.get_task(id).await.unwrap().unwrap();
        db.delete_task(&task).await.unwrap();

        let next = db.insert_task(&task).await.unwrap();
        assert!(next > id);
    }

    #[tokio::test]
    async fn test_delete_checked_before_removes_only_expired() {
        let db = setup_db().await;

        let a = db.insert_task(&checked_task("A", 100)).await.unwrap();
        let b = db.insert_task(&checked_task("B", 200)).await.unwrap();
        let c = db.insert_task(&Task::new("C".to_string(), String::new())).await.unwrap();

        assert_eq!(db.count_checked_before(150).await.unwrap(), 1);
        assert_eq!(db.delete_checked_before(150).await.unwrap(), 1);

        assert!(db.get_task(a).await.unwrap().is_none());
        assert!(db.get_task(b).await.unwrap().is_some());
        assert!(db.get_task(c).await.unwrap().is_some());
        assert_eq!(db.count_tasks().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_delete_checked_before_is_inclusive_and_idempotent() {
        let db = setup_db().await;

        db.insert_task(&checked_task("Exactly at cutoff", 200)).await.unwrap();
        db.insert_task(&Task::new("Never checked".to_string(), String::new())).await.unwrap();

        assert_eq!(db.delete_checked_before(200).await.unwrap(), 1);
        assert_eq!(db.delete_checked_before(200).await.unwrap(), 0);
        assert_eq!(db.delete_checked_before(i64::MAX).await.unwrap(), 0);
        assert_eq!(db.count_tasks().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_schema_rejects_checked_without_timestamp() {
        let db = setup_db().await;

        let mut task = Task::new("Broken".to_string(), String::new());
        task.checked = true;

        let err = db.insert_task(&task).await.unwrap_err();
        assert!(err.is_storage());
        assert_eq!(db.count_tasks().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_write_stands_when_list_cannot_be_republished() {
        let db = setup_db().await;
        let mut watcher = db.watch();

        // A row that fails to decode makes every re-read of the list fail.
        sqlx::query("PRAGMA ignore_check_constraints = ON")
            .execute(db.pool())
            .await
            .unwrap();
        sqlx::query(
            "INSERT INTO tasks (title, description, checked, checked_at) VALUES ('Corrupt', '', 1, NULL)",
        )
        .execute(db.pool())
        .await
        .unwrap();
        assert!(db.list_tasks().await.unwrap_err().is_storage());

        let id = db.insert_task(&Task::new("Kept".to_string(), String::new())).await.unwrap();
        assert_eq!(db.count_tasks().await.unwrap(), 2);
        assert_eq!(db.get_task(id).await.unwrap().unwrap().title, "Kept");

        let kept = db.get_task(id).await.unwrap().unwrap();
        assert_eq!(db.delete_task(&kept).await.unwrap(), 1);
        assert_eq!(db.count_tasks().await.unwrap(), 1);

        // Subscribers keep the last snapshot that could be read.
        assert!(watcher.current().is_empty());
    }

    #[tokio::test]
    async fn test_watch_delivers_snapshots() {
        let db = setup_db().await;
        let mut watcher = db.watch();
        assert!(watcher.current().is_empty());

        let id = db.insert_task(&Task::new("Observed".to_string(), String::new())).await.unwrap();

        // The mutation is visible before insert_task returned.
        let snapshot = watcher.changed().await.unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, id);

        // Late subscribers get the current list immediately.
        let mut late = db.watch();
        assert_eq!(late.current().len(), 1);
    }

    #[tokio::test]
    async fn test_watch_sees_existing_rows_after_migrations() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let path = temp_dir.path().join("tasks.db");

        let db = LocalDb::new(&path).await.unwrap();
        db.run_migrations().await.unwrap();
        db.insert_task(&Task::new("Persisted".to_string(), String::new())).await.unwrap();
        db.close().await;

        let reopened = LocalDb::new(&path).await.unwrap();
        reopened.run_migrations().await.unwrap();
        let mut watcher = reopened.watch();
        assert_eq!(watcher.current()[0].title, "Persisted");
    }

    #[tokio::test]
    async fn test_undo_buffer_take_clears() {
        let db = setup_db().await;

        let batch = vec![
            Task::new("One".to_string(), String::new()),
            checked_task("Two", 50),
        ];
        db.save_undo_batch(&batch).await.unwrap();

        let taken = db.take_undo_batch().await.unwrap();
        assert_eq!(taken, batch);
        assert!(db.take_undo_batch().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_undo_buffer_keeps_latest_batch_only() {
        let db = setup_db().await;

        db.save_undo_batch(&[Task::new("Old".to_string(), String::new())]).await.unwrap();
        db.save_undo_batch(&[Task::new("New".to_string(), String::new())]).await.unwrap();

        let taken = db.take_undo_batch().await.unwrap();
        assert_eq!(taken.len(), 1);
        assert_eq!(taken[0].title, "New");
    }

    #[tokio::test]
    async fn test_upsert_schedule_replaces_by_name() {
        let db = setup_db().await;

        let first = db.upsert_schedule("cleanup", 86_400, 1_000).await.unwrap();
        let second = db.upsert_schedule("cleanup", 3_600, 2_000).await.unwrap();

        assert_ne!(first.request_id, second.request_id);
        assert_eq!(second.interval_secs, 3_600);
        assert_eq!(second.next_run_at, 2_000);

        let schedules = db.list_schedules().await.unwrap();
        assert_eq!(schedules.len(), 1);
        assert_eq!(schedules[0], second);
    }

    #[tokio::test]
    async fn test_record_schedule_run_advances_next_run() {
        let db = setup_db().await;

        let schedule = db.upsert_schedule("cleanup", 60, 0).await.unwrap();
        let updated = db
            .record_schedule_run("cleanup", schedule.request_id, 5_000, RunStatus::Failed, Some("disk full"))
            .await
            .unwrap();
        assert_eq!(updated, 1);

        let schedule = db.get_schedule("cleanup").await.unwrap().unwrap();
        assert_eq!(schedule.last_run_at, Some(5_000));
        assert_eq!(schedule.last_status, Some(RunStatus::Failed));
        assert_eq!(schedule.last_message.as_deref(), Some("disk full"));
        assert_eq!(schedule.next_run_at, 65_000);
    }

    #[tokio::test]
    async fn test_record_schedule_run_ignores_superseded_request() {
        let db = setup_db().await;

        let stale = db.upsert_schedule("cleanup", 60, 0).await.unwrap();
        let current = db.upsert_schedule("cleanup", 60, 10).await.unwrap();

        let updated = db
            .record_schedule_run("cleanup", stale.request_id, 5_000, RunStatus::Succeeded, None)
            .await
            .unwrap();
        assert_eq!(updated, 0);
        assert_eq!(db.get_schedule("cleanup").await.unwrap().unwrap(), current);
    }

    #[tokio::test]
    async fn test_remove_schedule() {
        let db = setup_db().await;

        db.upsert_schedule("cleanup", 60, 0).await.unwrap();
        assert_eq!(db.remove_schedule("cleanup").await.unwrap(), 1);
        assert_eq!(db.remove_schedule("cleanup").await.unwrap(), 0);
        assert!(db.get_schedule("cleanup").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_closed_pool_is_storage_error() {
        let db = setup_db().await;
        db.close().await;

        let err = db.list_tasks().await.unwrap_err();
        assert!(matches!(err, TickTasksError::Storage(_)));
    }

    #[tokio::test]
    async fn test_schedules_table_exists() {
        let db = setup_db().await;

        let result = sqlx::query("SELECT name FROM sqlite_master WHERE type='table' AND name='schedules'")
            .fetch_optional(db.pool())
            .await
            .unwrap();

        assert!(result.is_some(), "schedules table should exist");
    }
}
