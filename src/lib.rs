//! Daily Tasks: a per-day task list served over HTTP and a Telegram bot.

pub mod api;
pub mod channels;
pub mod chat;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod store;
pub mod tasks;
