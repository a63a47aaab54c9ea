//! Task service: the business rules on top of [`LocalDb`].
//!
//! This is the only layer that stamps or clears `checked_at` and decides
//! what "restore" means. Restoring a deleted task inserts its field values as
//! a brand-new row with a fresh id; the original identity is not revived.

use std::sync::Arc;

use tracing::{debug, info};

use crate::db::{LocalDb, TaskListWatcher};
use crate::error::{Result, TickTasksError};
use crate::models::{Task, now_millis, retention_cutoff};

/// Service orchestrating task operations against the local store.
#[derive(Debug, Clone)]
pub struct TaskService {
    store: LocalDb,
}

impl TaskService {
    pub fn new(store: LocalDb) -> Self {
        Self { store }
    }

    /// Get a reference to the underlying store.
    pub fn store(&self) -> &LocalDb {
        &self.store
    }

    /// Subscribe to the live task list.
    pub fn tasks(&self) -> TaskListWatcher {
        self.store.watch()
    }

    /// Get a task by id.
    ///
    /// # Errors
    ///
    /// Returns [`TickTasksError::NotFound`] if no such task exists.
    pub async fn get(&self, id: i64) -> Result<Task> {
        self.store
            .get_task(id)
            .await?
            .ok_or_else(|| TickTasksError::NotFound(format!("task {}", id)))
    }

    /// Create a new unchecked task from trimmed input.
    ///
    /// # Errors
    ///
    /// Returns [`TickTasksError::InvalidInput`] without touching the store
    /// if the trimmed title is empty.
    pub async fn add(&self, title: &str, description: &str) -> Result<Task> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TickTasksError::InvalidInput(
                "Title cannot be empty".to_string(),
            ));
        }

        let mut task = Task::new(title.to_string(), description.trim().to_string());
        task.id = self.store.insert_task(&task).await?;
        debug!(id = task.id, "added task");
        Ok(task)
    }

    /// Delete a task by id and hand back what was removed so the caller can
    /// offer undo. Returns `None` if the task was already gone.
    pub async fn delete(&self, task: &Task) -> Result<Option<Task>> {
        let affected = self.store.delete_task(task).await?;
        Ok((affected > 0).then(|| task.clone()))
    }

    /// Re-insert a deleted task's values as a new task with a new id.
    pub async fn restore(&self, task: &Task) -> Result<Task> {
        let mut restored = task.detached();
        restored.id = self.store.insert_task(&restored).await?;
        debug!(old_id = task.id, new_id = restored.id, "restored task");
        Ok(restored)
    }

    /// Restore a whole batch, e.g. the result of [`TaskService::bulk_delete`].
    pub async fn restore_all(&self, tasks: &[Task]) -> Result<Vec<Task>> {
        let mut restored = Vec::with_capacity(tasks.len());
        for task in tasks {
            restored.push(self.restore(task).await?);
        }
        Ok(restored)
    }

    /// Set a task's checked state, stamping `checked_at` on check and
    /// clearing it on uncheck. Nothing is written when the state is unchanged.
    pub async fn check(&self, task: &Task, is_checked: bool) -> Result<Task> {
        if task.checked == is_checked {
            return Ok(task.clone());
        }

        let mut updated = task.clone();
        if is_checked {
            updated.mark_checked(now_millis());
        } else {
            updated.mark_unchecked();
        }

        let affected = self.store.update_task(&updated).await?;
        if affected == 0 {
            return Err(TickTasksError::NotFound(format!("task {}", task.id)));
        }
        Ok(updated)
    }

    /// Delete every task in the current snapshot whose id is listed, one by
    /// one. Unknown ids are skipped. Returns the removed tasks in `ids` order.
    pub async fn bulk_delete(&self, ids: &[i64]) -> Result<Vec<Task>> {
        let snapshot: Arc<Vec<Task>> = self.store.watch().peek();

        let to_delete: Vec<Task> = ids
            .iter()
            .filter_map(|id| snapshot.iter().find(|t| t.id == *id).cloned())
            .collect();

        let mut removed = Vec::with_capacity(to_delete.len());
        for task in to_delete {
            if let Some(task) = self.delete(&task).await? {
                removed.push(task);
            }
        }

        debug!(requested = ids.len(), removed = removed.len(), "bulk delete");
        Ok(removed)
    }

    /// Delete checked tasks whose `checked_at` is at or before `cutoff_millis`.
    pub async fn cleanup(&self, cutoff_millis: i64) -> Result<u64> {
        let deleted = self.store.delete_checked_before(cutoff_millis).await?;
        info!(cutoff_millis, deleted, "cleanup finished");
        Ok(deleted)
    }

    /// [`TaskService::cleanup`] with a cutoff of now minus `days` days.
    pub async fn cleanup_older_than(&self, days: u32) -> Result<u64> {
        self.cleanup(retention_cutoff(now_millis(), days)).await
    }
}
