//! `TaskBackend` trait — the single async interface for task persistence.
//!
//! Backends only store rows. Business rules (past dates, empty titles,
//! mapping a missing row to `NotFound`) live in [`crate::tasks::TaskStore`].

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::DatabaseError;
use crate::tasks::model::{NewTask, Task, TaskUpdate};

/// Backend-agnostic task persistence.
///
/// Every mutating method must be atomic for the row it touches. `None` and
/// `false` mean the id does not exist.
#[async_trait]
pub trait TaskBackend: Send + Sync {
    /// Insert a task with `completed = false` and a fresh id.
    async fn insert_task(&self, task: &NewTask) -> Result<Task, DatabaseError>;

    /// Get a task by id.
    async fn get_task(&self, id: i64) -> Result<Option<Task>, DatabaseError>;

    /// List tasks in insertion order, optionally only those on `date`.
    async fn list_tasks(&self, date: Option<NaiveDate>) -> Result<Vec<Task>, DatabaseError>;

    /// Flip the completion flag and return the updated row.
    async fn toggle_task(&self, id: i64) -> Result<Option<Task>, DatabaseError>;

    /// Set the completion flag to `completed`.
    async fn set_task_completed(
        &self,
        id: i64,
        completed: bool,
    ) -> Result<Option<Task>, DatabaseError>;

    /// Replace title, date and completion flag.
    async fn update_task(
        &self,
        id: i64,
        update: &TaskUpdate,
    ) -> Result<Option<Task>, DatabaseError>;

    /// Delete a task. Returns whether a row was removed.
    async fn delete_task(&self, id: i64) -> Result<bool, DatabaseError>;
}
