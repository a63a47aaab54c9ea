//! Push-based view of the task list.

use std::sync::Arc;

use tokio::sync::watch;

use crate::models::Task;

/// Subscriber to the store's task list.
///
/// Every subscriber sees the latest full snapshot (newest task first), never
/// a diff. A subscriber created late still gets the current list from
/// [`TaskListWatcher::current`] without waiting for the next mutation.
#[derive(Debug, Clone)]
pub struct TaskListWatcher {
    rx: watch::Receiver<Arc<Vec<Task>>>,
}

impl TaskListWatcher {
    pub(crate) fn new(rx: watch::Receiver<Arc<Vec<Task>>>) -> Self {
        Self { rx }
    }

    /// The latest snapshot, marking it as seen.
    pub fn current(&mut self) -> Arc<Vec<Task>> {
        self.rx.borrow_and_update().clone()
    }

    /// The latest snapshot without touching the seen marker.
    pub fn peek(&self) -> Arc<Vec<Task>> {
        self.rx.borrow().clone()
    }

    /// Wait for the next snapshot. Returns `None` once the store is dropped.
    pub async fn changed(&mut self) -> Option<Arc<Vec<Task>>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }
}
