//! libSQL backend — async `TaskBackend` implementation.
//!
//! Supports local file and in-memory databases. Every mutation is a single
//! SQL statement with `RETURNING`, so a row is never observed half-updated.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use libsql::{Connection, Database as LibSqlDatabase, params};
use tracing::{debug, info};

use crate::error::DatabaseError;
use crate::store::migrations;
use crate::store::traits::TaskBackend;
use crate::tasks::model::{NewTask, Task, TaskUpdate};

const TASK_COLUMNS: &str = "id, title, date, done";

/// libSQL database backend.
///
/// Stores a single connection that is reused for all operations.
/// `libsql::Connection` is `Send + Sync` and safe for concurrent async use.
pub struct LibSqlBackend {
    #[allow(dead_code)]
    db: Arc<LibSqlDatabase>,
    conn: Connection,
}

impl LibSqlBackend {
    /// Open (or create) a local database file and run migrations.
    pub async fn new_local(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                DatabaseError::Pool(format!("Failed to create database directory: {e}"))
            })?;
        }

        let db = libsql::Builder::new_local(path)
            .build()
            .await
            .map_err(|e| DatabaseError::Pool(format!("Failed to open libSQL database: {e}")))?;

        let backend = Self::from_database(db)?;
        migrations::run_migrations(backend.conn()).await?;
        info!(path = %path.display(), "Database opened");
        Ok(backend)
    }

    /// Create an in-memory database (for tests).
    pub async fn new_memory() -> Result<Self, DatabaseError> {
        let db = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .map_err(|e| {
                DatabaseError::Pool(format!("Failed to create in-memory database: {e}"))
            })?;

        let backend = Self::from_database(db)?;
        migrations::run_migrations(backend.conn()).await?;
        Ok(backend)
    }

    fn from_database(db: LibSqlDatabase) -> Result<Self, DatabaseError> {
        let conn = db
            .connect()
            .map_err(|e| DatabaseError::Pool(format!("Failed to create connection: {e}")))?;
        Ok(Self {
            db: Arc::new(db),
            conn,
        })
    }

    /// Get the connection.
    fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Run a statement expected to yield at most one task row.
    async fn query_one(
        &self,
        op: &str,
        sql: &str,
        params: impl libsql::params::IntoParams,
    ) -> Result<Option<Task>, DatabaseError> {
        let mut rows = self
            .conn()
            .query(sql, params)
            .await
            .map_err(|e| DatabaseError::Query(format!("{op}: {e}")))?;

        match rows.next().await {
            Ok(Some(row)) => Ok(Some(row_to_task(&row)?)),
            Ok(None) => Ok(None),
            Err(e) => Err(DatabaseError::Query(format!("{op} row: {e}"))),
        }
    }
}

// ── Helper functions ────────────────────────────────────────────────

/// Map a libsql Row to a Task. Column order matches TASK_COLUMNS.
fn row_to_task(row: &libsql::Row) -> Result<Task, DatabaseError> {
    let id: i64 = row
        .get(0)
        .map_err(|e| DatabaseError::Query(format!("task.id: {e}")))?;
    let title: String = row
        .get(1)
        .map_err(|e| DatabaseError::Query(format!("task.title: {e}")))?;
    let date_str: String = row
        .get(2)
        .map_err(|e| DatabaseError::Query(format!("task.date: {e}")))?;
    let date = NaiveDate::parse_from_str(&date_str, "%Y-%m-%d")
        .map_err(|e| DatabaseError::Query(format!("task.date parse {date_str:?}: {e}")))?;
    // Rows from the first release may carry NULL here.
    let done: i64 = row.get(3).unwrap_or(0);

    Ok(Task {
        id,
        title,
        date,
        completed: done != 0,
    })
}

fn date_to_str(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

#[async_trait]
impl TaskBackend for LibSqlBackend {
    async fn insert_task(&self, task: &NewTask) -> Result<Task, DatabaseError> {
        let inserted = self
            .query_one(
                "insert_task",
                &format!(
                    "INSERT INTO tasks (title, date, done) VALUES (?1, ?2, 0) RETURNING {TASK_COLUMNS}"
                ),
                params![task.title.as_str(), date_to_str(task.date)],
            )
            .await?
            .ok_or_else(|| DatabaseError::Query("insert_task: no row returned".into()))?;
        debug!(id = inserted.id, "Task inserted");
        Ok(inserted)
    }

    async fn get_task(&self, id: i64) -> Result<Option<Task>, DatabaseError> {
        self.query_one(
            "get_task",
            &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
            params![id],
        )
        .await
    }

    async fn list_tasks(&self, date: Option<NaiveDate>) -> Result<Vec<Task>, DatabaseError> {
        let conn = self.conn();
        let mut rows = match date {
            Some(date) => conn
                .query(
                    &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE date = ?1 ORDER BY id ASC"),
                    params![date_to_str(date)],
                )
                .await,
            None => conn
                .query(
                    &format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY id ASC"),
                    (),
                )
                .await,
        }
        .map_err(|e| DatabaseError::Query(format!("list_tasks: {e}")))?;

        let mut tasks = Vec::new();
        loop {
            match rows.next().await {
                Ok(Some(row)) => tasks.push(row_to_task(&row)?),
                Ok(None) => break,
                Err(e) => return Err(DatabaseError::Query(format!("list_tasks row: {e}"))),
            }
        }
        Ok(tasks)
    }

    async fn toggle_task(&self, id: i64) -> Result<Option<Task>, DatabaseError> {
        self.query_one(
            "toggle_task",
            &format!(
                "UPDATE tasks SET done = CASE WHEN done THEN 0 ELSE 1 END WHERE id = ?1 RETURNING {TASK_COLUMNS}"
            ),
            params![id],
        )
        .await
    }

    async fn set_task_completed(
        &self,
        id: i64,
        completed: bool,
    ) -> Result<Option<Task>, DatabaseError> {
        self.query_one(
            "set_task_completed",
            &format!("UPDATE tasks SET done = ?1 WHERE id = ?2 RETURNING {TASK_COLUMNS}"),
            params![completed as i64, id],
        )
        .await
    }

    async fn update_task(
        &self,
        id: i64,
        update: &TaskUpdate,
    ) -> Result<Option<Task>, DatabaseError> {
        self.query_one(
            "update_task",
            &format!(
                "UPDATE tasks SET title = ?1, date = ?2, done = ?3 WHERE id = ?4 RETURNING {TASK_COLUMNS}"
            ),
            params![
                update.title.as_str(),
                date_to_str(update.date),
                update.completed as i64,
                id,
            ],
        )
        .await
    }

    async fn delete_task(&self, id: i64) -> Result<bool, DatabaseError> {
        let count = self
            .conn()
            .execute("DELETE FROM tasks WHERE id = ?1", params![id])
            .await
            .map_err(|e| DatabaseError::Query(format!("delete_task: {e}")))?;
        Ok(count > 0)
    }
}
