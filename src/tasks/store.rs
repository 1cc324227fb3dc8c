//! TaskStore — the shared task service used by the API, the chat handler,
//! and the reminder ticker.
//!
//! Constructed once at startup and shared as `Arc<TaskStore>`. It owns the
//! business rules; row atomicity is the backend's job.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info};

use super::clock::Clock;
use super::model::{NewTask, Task, TaskUpdate};
use crate::error::TaskError;
use crate::store::TaskBackend;

pub struct TaskStore {
    backend: Arc<dyn TaskBackend>,
    clock: Arc<dyn Clock>,
}

impl TaskStore {
    pub fn new(backend: Arc<dyn TaskBackend>, clock: Arc<dyn Clock>) -> Self {
        Self { backend, clock }
    }

    /// The current calendar date according to the store's clock.
    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    /// Create a task. Rejects dates strictly before today and blank titles.
    pub async fn create(&self, title: &str, date: NaiveDate) -> Result<Task, TaskError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(TaskError::EmptyTitle);
        }
        let today = self.today();
        if date < today {
            return Err(TaskError::InvalidDate { date, today });
        }

        let task = self.backend.insert_task(&NewTask::new(title, date)).await?;
        info!(id = task.id, date = %task.date, "Task created");
        Ok(task)
    }

    pub async fn get(&self, id: i64) -> Result<Task, TaskError> {
        self.backend
            .get_task(id)
            .await?
            .ok_or(TaskError::NotFound { id })
    }

    /// All tasks on `date`, or every task when `date` is `None`.
    pub async fn list_by_date(&self, date: Option<NaiveDate>) -> Result<Vec<Task>, TaskError> {
        let tasks = self.backend.list_tasks(date).await?;
        debug!(date = ?date, count = tasks.len(), "Tasks listed");
        Ok(tasks)
    }

    /// Tasks dated today.
    pub async fn list_today(&self) -> Result<Vec<Task>, TaskError> {
        self.list_by_date(Some(self.today())).await
    }

    /// Flip the completion flag.
    pub async fn toggle_completion(&self, id: i64) -> Result<Task, TaskError> {
        let task = self
            .backend
            .toggle_task(id)
            .await?
            .ok_or(TaskError::NotFound { id })?;
        info!(id, completed = task.completed, "Task toggled");
        Ok(task)
    }

    pub async fn set_completion(&self, id: i64, completed: bool) -> Result<Task, TaskError> {
        let task = self
            .backend
            .set_task_completed(id, completed)
            .await?
            .ok_or(TaskError::NotFound { id })?;
        info!(id, completed, "Task completion set");
        Ok(task)
    }

    /// Replace title, date and completion. Past dates are allowed here so
    /// overdue tasks stay editable.
    pub async fn update(&self, id: i64, update: TaskUpdate) -> Result<Task, TaskError> {
        let title = update.title.trim();
        if title.is_empty() {
            return Err(TaskError::EmptyTitle);
        }
        let update = TaskUpdate {
            title: title.to_string(),
            ..update
        };
        let task = self
            .backend
            .update_task(id, &update)
            .await?
            .ok_or(TaskError::NotFound { id })?;
        info!(id, "Task updated");
        Ok(task)
    }

    pub async fn delete(&self, id: i64) -> Result<(), TaskError> {
        if self.backend.delete_task(id).await? {
            info!(id, "Task deleted");
            Ok(())
        } else {
            Err(TaskError::NotFound { id })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{LibSqlBackend, MemoryBackend};
    use crate::tasks::clock::FixedClock;

    const TODAY: &str = "2026-10-19";

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn memory_store() -> TaskStore {
        TaskStore::new(
            Arc::new(MemoryBackend::new()),
            Arc::new(FixedClock(date(TODAY))),
        )
    }

    async fn libsql_store() -> TaskStore {
        TaskStore::new(
            Arc::new(LibSqlBackend::new_memory().await.unwrap()),
            Arc::new(FixedClock(date(TODAY))),
        )
    }

    /// Walks the "Buy milk" lifecycle against any backend.
    async fn buy_milk_lifecycle(store: &TaskStore) {
        let today = store.today();
        let task = store.create("Buy milk", today).await.unwrap();

        let listed = store.list_by_date(Some(today)).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Buy milk");
        assert!(!listed[0].completed);

        assert!(store.toggle_completion(task.id).await.unwrap().completed);
        assert!(!store.toggle_completion(task.id).await.unwrap().completed);

        store.delete(task.id).await.unwrap();
        assert!(store.list_by_date(Some(today)).await.unwrap().is_empty());
        assert!(matches!(
            store.toggle_completion(task.id).await,
            Err(TaskError::NotFound { id }) if id == task.id
        ));
    }

    #[tokio::test]
    async fn lifecycle_memory() {
        buy_milk_lifecycle(&memory_store()).await;
    }

    #[tokio::test]
    async fn lifecycle_libsql() {
        buy_milk_lifecycle(&libsql_store().await).await;
    }

    #[tokio::test]
    async fn future_task_only_listed_on_its_date() {
        let store = memory_store();
        let trip = date("2026-11-03");
        store.create("Plan trip", trip).await.unwrap();

        assert!(store.list_today().await.unwrap().is_empty());
        let on_trip = store.list_by_date(Some(trip)).await.unwrap();
        assert_eq!(on_trip.len(), 1);
        assert_eq!(on_trip[0].title, "Plan trip");
    }

    #[tokio::test]
    async fn past_date_rejected_and_nothing_stored() {
        let store = memory_store();
        let yesterday = date("2026-10-18");

        let err = store.create("Too late", yesterday).await.unwrap_err();
        assert!(matches!(err, TaskError::InvalidDate { date, .. } if date == yesterday));
        assert!(store.list_by_date(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_title_rejected() {
        let store = memory_store();
        assert!(matches!(
            store.create("   ", store.today()).await,
            Err(TaskError::EmptyTitle)
        ));
    }

    #[tokio::test]
    async fn title_is_trimmed() {
        let store = memory_store();
        let task = store.create("  Water plants ", store.today()).await.unwrap();
        assert_eq!(task.title, "Water plants");
    }

    #[tokio::test]
    async fn missing_ids_are_not_found() {
        let store = libsql_store().await;
        let update = TaskUpdate {
            title: "x".into(),
            date: store.today(),
            completed: true,
        };

        assert!(matches!(store.get(5).await, Err(TaskError::NotFound { id: 5 })));
        assert!(matches!(store.toggle_completion(5).await, Err(TaskError::NotFound { .. })));
        assert!(matches!(store.set_completion(5, true).await, Err(TaskError::NotFound { .. })));
        assert!(matches!(store.update(5, update).await, Err(TaskError::NotFound { .. })));
        assert!(matches!(store.delete(5).await, Err(TaskError::NotFound { .. })));
        assert!(store.list_by_date(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn update_allows_past_date() {
        let store = memory_store();
        let task = store.create("Report", store.today()).await.unwrap();
        let updated = store
            .update(
                task.id,
                TaskUpdate {
                    title: "Report v2".into(),
                    date: date("2026-10-01"),
                    completed: true,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.date, date("2026-10-01"));
        assert!(updated.completed);
    }

    #[tokio::test]
    async fn set_completion_is_not_a_toggle() {
        let store = memory_store();
        let task = store.create("t", store.today()).await.unwrap();
        assert!(store.set_completion(task.id, true).await.unwrap().completed);
        assert!(store.set_completion(task.id, true).await.unwrap().completed);
    }

    #[tokio::test]
    async fn concurrent_toggles_serialize() {
        for store in [Arc::new(memory_store()), Arc::new(libsql_store().await)] {
            let task = store.create("contended", store.today()).await.unwrap();
            let other = store.create("bystander", store.today()).await.unwrap();

            let mut handles = Vec::new();
            for _ in 0..25 {
                let store = Arc::clone(&store);
                handles.push(tokio::spawn(async move {
                    store.toggle_completion(task.id).await.unwrap();
                }));
            }
            for handle in handles {
                handle.await.unwrap();
            }

            // Odd number of flips from false.
            assert!(store.get(task.id).await.unwrap().completed);
            assert!(!store.get(other.id).await.unwrap().completed);
        }
    }
}
