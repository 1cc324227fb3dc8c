//! Error types for Daily Tasks.

use chrono::NaiveDate;

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Storage-medium errors. These never encode business rules.
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[error("Connection pool error: {0}")]
    Pool(String),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),
}

/// Errors returned by task store operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("Cannot add tasks in the past: {date} is before {today}")]
    InvalidDate { date: NaiveDate, today: NaiveDate },

    #[error("Task {id} not found")]
    NotFound { id: i64 },

    #[error("Task title must not be empty")]
    EmptyTitle,

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// An interaction callback string that does not decode to a task id.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("Malformed interaction token: {0:?}")]
    MalformedToken(String),
}

/// An explicit date argument to a chat command that is not `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateArgError {
    #[error("Malformed date argument: {0:?} (expected YYYY-MM-DD)")]
    MalformedDateArgument(String),
}

/// A `PUT /tasks/{id}` body that is neither a full replacement nor a
/// completion-only update.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UpdateBodyError {
    #[error("Missing field `{0}` in update body")]
    MissingField(&'static str),

    #[error(transparent)]
    MalformedDate(#[from] DateArgError),
}

/// Chat transport errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("Channel {name} failed to start: {reason}")]
    StartupFailed { name: String, reason: String },

    #[error("Failed to send on channel {name}: {reason}")]
    SendFailed { name: String, reason: String },
}
