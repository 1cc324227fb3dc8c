//! Configuration types.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use tracing::warn;

use crate::error::ConfigError;

/// Database path that selects the in-memory backend.
pub const MEMORY_DB_PATH: &str = ":memory:";

const DEFAULT_DB_PATH: &str = "./data/tasks.db";
const DEFAULT_API_PORT: u16 = 8000;
const DEFAULT_CORS_ORIGIN: &str = "http://localhost:5173";
const DEFAULT_REMINDER_INTERVAL_SECS: u64 = 2 * 60 * 60;

/// Service configuration, read once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SQLite file path, or `:memory:` for a non-persistent store.
    pub db_path: PathBuf,
    /// Port the HTTP API listens on.
    pub api_port: u16,
    /// Origins allowed by CORS. `*` allows any.
    pub cors_origins: Vec<String>,
    /// Delay between reminder ticks.
    pub reminder_interval: Duration,
    /// Chat front end; `None` when no bot token is set.
    pub telegram: Option<TelegramConfig>,
}

/// Telegram bot settings.
#[derive(Debug, Clone)]
pub struct TelegramConfig {
    pub bot_token: SecretString,
    /// Chat that receives reminders. Reminders are off when unset.
    pub reminder_chat_id: Option<String>,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        // Empty values count as unset.
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let db_path = var("DAILY_TASKS_DB_PATH")
            .unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
            .into();

        let api_port = match var("DAILY_TASKS_API_PORT") {
            Some(raw) => raw.parse().map_err(|_| ConfigError::InvalidValue {
                key: "DAILY_TASKS_API_PORT".into(),
                message: format!("'{raw}' is not a valid port"),
            })?,
            None => DEFAULT_API_PORT,
        };

        let cors_origins: Vec<String> = var("DAILY_TASKS_CORS_ORIGINS")
            .unwrap_or_else(|| DEFAULT_CORS_ORIGIN.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let reminder_secs = match var("DAILY_TASKS_REMINDER_INTERVAL_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => secs,
                _ => {
                    warn!(
                        value = %raw,
                        default = DEFAULT_REMINDER_INTERVAL_SECS,
                        "Invalid reminder interval, using default"
                    );
                    DEFAULT_REMINDER_INTERVAL_SECS
                }
            },
            None => DEFAULT_REMINDER_INTERVAL_SECS,
        };

        let reminder_chat_id = var("TELEGRAM_REMINDER_CHAT_ID");
        let telegram = match var("TELEGRAM_BOT_TOKEN") {
            Some(token) => Some(TelegramConfig {
                bot_token: SecretString::from(token),
                reminder_chat_id,
            }),
            None if reminder_chat_id.is_some() => {
                return Err(ConfigError::MissingEnvVar("TELEGRAM_BOT_TOKEN".into()));
            }
            None => None,
        };

        Ok(Self {
            db_path,
            api_port,
            cors_origins,
            reminder_interval: Duration::from_secs(reminder_secs),
            telegram,
        })
    }

    /// Whether the configured path selects the in-memory backend.
    pub fn uses_memory_db(&self) -> bool {
        self.db_path.as_os_str() == MEMORY_DB_PATH
    }
}
