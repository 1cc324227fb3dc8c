//! Reminder scheduler. Periodically pushes today's open and done tasks to
//! the configured chat.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::channels::Notifier;
use crate::tasks::{TaskStore, render};

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// No tasks today; nothing sent.
    Skipped,
    /// One reminder covering `count` tasks was delivered.
    Sent { count: usize },
    /// Reading the store or delivering failed. Logged, not propagated.
    Failed,
}

/// Read-only consumer of the task store that feeds a [`Notifier`].
pub struct ReminderScheduler {
    store: Arc<TaskStore>,
    notifier: Arc<dyn Notifier>,
}

impl ReminderScheduler {
    pub fn new(store: Arc<TaskStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, notifier }
    }

    /// Run one reminder cycle.
    pub async fn tick(&self) -> TickOutcome {
        let tasks = match self.store.list_today().await {
            Ok(tasks) => tasks,
            Err(e) => {
                warn!(error = %e, "Reminder skipped: could not read today's tasks");
                return TickOutcome::Failed;
            }
        };

        let Some(text) = render::reminder(&tasks) else {
            debug!("No tasks today, reminder not sent");
            return TickOutcome::Skipped;
        };

        match self.notifier.notify(&text).await {
            Ok(()) => {
                info!(count = tasks.len(), "Reminder sent");
                TickOutcome::Sent { count: tasks.len() }
            }
            Err(e) => {
                warn!(error = %e, "Reminder delivery failed");
                TickOutcome::Failed
            }
        }
    }
}

/// Spawn the reminder ticker. The first tick fires one `interval` after
/// start; a slow delivery delays the following tick instead of stacking up.
pub fn spawn_reminder_ticker(
    scheduler: Arc<ReminderScheduler>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // Skip immediate first tick
        ticker.tick().await;

        loop {
            ticker.tick().await;
            scheduler.tick().await;
        }
    })
}
