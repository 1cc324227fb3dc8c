//! ChatHandler turns chat commands and button presses into store calls
//! and renders the reply.
//!
//! There is no per-conversation memory: every call is answered from the
//! command text (or token) and the current store contents alone.

use std::sync::Arc;

use tracing::{info, warn};

use super::command::Command;
use crate::channels::Reply;
use crate::error::TaskError;
use crate::tasks::model::parse_date;
use crate::tasks::{TaskStore, render, token};

pub const WELCOME: &str = "👋 Welcome! Use /add <task> <YYYY-MM-DD> or /today";
pub const ADD_USAGE: &str = "Usage: /add <task> [YYYY-MM-DD]";
pub const PAST_DATE: &str = "❌ Cannot add tasks in the past.";
pub const HELP: &str = "Commands:\n/add <task> [YYYY-MM-DD]\n/list [YYYY-MM-DD]\n/today";
pub const STORE_FAILURE: &str = "⚠️ Something went wrong. Please try again.";
pub const UNKNOWN_CONTROL: &str = "⚠️ That button is no longer valid.";
pub const TASK_GONE: &str = "❌ Task not found. It may have been deleted.";

/// Result of a button press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionOutcome {
    /// The toggle happened; replace the pressed message with this view.
    Refreshed(Reply),
    /// Nothing changed; show this notice on the press.
    Rejected(String),
}

pub struct ChatHandler {
    store: Arc<TaskStore>,
}

impl ChatHandler {
    pub fn new(store: Arc<TaskStore>) -> Self {
        Self { store }
    }

    /// Answer a command.
    pub async fn handle_command(&self, command: Command) -> Reply {
        match command {
            Command::Greet => Reply::Text(WELCOME.to_string()),
            Command::Create(args) => Reply::Text(self.create(&args).await),
            Command::List(arg) => Reply::Text(self.list(arg.as_deref()).await),
            Command::Today => self.today_view().await,
            Command::Unknown(name) => {
                Reply::Text(format!("🤔 Unknown command /{name}\n\n{HELP}"))
            }
        }
    }

    /// Decode a toggle token, flip that task, and re-read today's tasks.
    pub async fn handle_interaction(&self, token: &str) -> InteractionOutcome {
        let id = match token::decode(token) {
            Ok(id) => id,
            Err(e) => {
                warn!(error = %e, "Rejected interaction");
                return InteractionOutcome::Rejected(UNKNOWN_CONTROL.to_string());
            }
        };

        match self.store.toggle_completion(id).await {
            Ok(_) => {}
            Err(TaskError::NotFound { .. }) => {
                return InteractionOutcome::Rejected(TASK_GONE.to_string());
            }
            Err(e) => {
                warn!(id, error = %e, "Toggle from chat failed");
                return InteractionOutcome::Rejected(STORE_FAILURE.to_string());
            }
        }

        match self.store.list_today().await {
            Ok(tasks) => InteractionOutcome::Refreshed(render::today_view(&tasks)),
            Err(e) => {
                warn!(id, error = %e, "Refreshing today view failed");
                InteractionOutcome::Rejected(STORE_FAILURE.to_string())
            }
        }
    }

    /// `/add`: a trailing `YYYY-MM-DD` word is the date, otherwise today.
    ///
    /// A title whose last word is itself a valid date cannot be entered
    /// as-is: that word is always taken as the date.
    async fn create(&self, args: &[String]) -> String {
        let Some((last, rest)) = args.split_last() else {
            return ADD_USAGE.to_string();
        };

        let (title, date) = match parse_date(last) {
            Ok(date) => (rest.join(" "), date),
            Err(_) => (args.join(" "), self.store.today()),
        };

        match self.store.create(&title, date).await {
            Ok(task) => {
                info!(id = task.id, "Task created from chat");
                format!("✅ Task '{}' added for {}", task.title, task.date)
            }
            Err(TaskError::InvalidDate { .. }) => PAST_DATE.to_string(),
            Err(TaskError::EmptyTitle) => ADD_USAGE.to_string(),
            Err(e) => {
                warn!(error = %e, "Create from chat failed");
                STORE_FAILURE.to_string()
            }
        }
    }

    /// `/list`: defaults to today; a malformed explicit date is reported.
    async fn list(&self, arg: Option<&str>) -> String {
        let date = match arg {
            None => self.store.today(),
            Some(raw) => match parse_date(raw) {
                Ok(date) => date,
                Err(_) => return format!("❌ Invalid date '{raw}'. Use YYYY-MM-DD."),
            },
        };

        match self.store.list_by_date(Some(date)).await {
            Ok(tasks) => render::list_view(date, &tasks),
            Err(e) => {
                warn!(error = %e, "List from chat failed");
                STORE_FAILURE.to_string()
            }
        }
    }

    async fn today_view(&self) -> Reply {
        match self.store.list_today().await {
            Ok(tasks) => render::today_view(&tasks),
            Err(e) => {
                warn!(error = %e, "Today view failed");
                Reply::Text(STORE_FAILURE.to_string())
            }
        }
    }
}
