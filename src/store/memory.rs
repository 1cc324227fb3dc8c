//! In-process task backend: a `Vec` behind one `RwLock`.
//!
//! Used for tests and for `DAILY_TASKS_DB_PATH=:memory:` runs. All
//! mutations take the write lock, so the whole store is serialized.

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::DatabaseError;
use crate::store::traits::TaskBackend;
use crate::tasks::model::{NewTask, Task, TaskUpdate};

#[derive(Default)]
struct Inner {
    /// Last id handed out. Ids are never reused.
    last_id: i64,
    tasks: Vec<Task>,
}

/// In-memory task storage.
#[derive(Default)]
pub struct MemoryBackend {
    inner: RwLock<Inner>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `f` to the task with `id` under the write lock.
    async fn modify(&self, id: i64, f: impl FnOnce(&mut Task)) -> Option<Task> {
        let mut inner = self.inner.write().await;
        let task = inner.tasks.iter_mut().find(|t| t.id == id)?;
        f(task);
        Some(task.clone())
    }
}

#[async_trait]
impl TaskBackend for MemoryBackend {
    async fn insert_task(&self, task: &NewTask) -> Result<Task, DatabaseError> {
        let mut inner = self.inner.write().await;
        inner.last_id += 1;
        let stored = Task {
            id: inner.last_id,
            title: task.title.clone(),
            date: task.date,
            completed: false,
        };
        inner.tasks.push(stored.clone());
        debug!(id = stored.id, "Task inserted");
        Ok(stored)
    }

    async fn get_task(&self, id: i64) -> Result<Option<Task>, DatabaseError> {
        let inner = self.inner.read().await;
        Ok(inner.tasks.iter().find(|t| t.id == id).cloned())
    }

    async fn list_tasks(&self, date: Option<NaiveDate>) -> Result<Vec<Task>, DatabaseError> {
        let inner = self.inner.read().await;
        Ok(inner
            .tasks
            .iter()
            .filter(|t| date.is_none_or(|d| t.date == d))
            .cloned()
            .collect())
    }

    async fn toggle_task(&self, id: i64) -> Result<Option<Task>, DatabaseError> {
        Ok(self.modify(id, |t| t.completed = !t.completed).await)
    }

    async fn set_task_completed(
        &self,
        id: i64,
        completed: bool,
    ) -> Result<Option<Task>, DatabaseError> {
        Ok(self.modify(id, |t| t.completed = completed).await)
    }

    async fn update_task(
        &self,
        id: i64,
        update: &TaskUpdate,
    ) -> Result<Option<Task>, DatabaseError> {
        Ok(self
            .modify(id, |t| {
                t.title = update.title.clone();
                t.date = update.date;
                t.completed = update.completed;
            })
            .await)
    }

    async fn delete_task(&self, id: i64) -> Result<bool, DatabaseError> {
        let mut inner = self.inner.write().await;
        let before = inner.tasks.len();
        inner.tasks.retain(|t| t.id != id);
        Ok(inner.tasks.len() < before)
    }
}
