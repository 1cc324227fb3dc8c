use std::sync::Arc;

use daily_tasks::api::task_routes;
use daily_tasks::channels::{ChatTransport, TelegramChannel, TelegramNotifier, bot};
use daily_tasks::chat::ChatHandler;
use daily_tasks::config::AppConfig;
use daily_tasks::scheduler::{self, ReminderScheduler};
use daily_tasks::store::{LibSqlBackend, MemoryBackend, TaskBackend};
use daily_tasks::tasks::{SystemClock, TaskStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = AppConfig::from_env()?;

    eprintln!("📋 Daily Tasks v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Database: {}", config.db_path.display());
    eprintln!("   Task API: http://0.0.0.0:{}/tasks", config.api_port);
    eprintln!("   CORS origins: {}", config.cors_origins.join(", "));

    let backend: Arc<dyn TaskBackend> = if config.uses_memory_db() {
        eprintln!("   Storage: in-memory (tasks are lost on exit)");
        Arc::new(MemoryBackend::new())
    } else {
        Arc::new(LibSqlBackend::new_local(&config.db_path).await?)
    };
    let store = Arc::new(TaskStore::new(backend, Arc::new(SystemClock)));

    // Spawn Axum REST server
    let app = task_routes(Arc::clone(&store), &config.cors_origins);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", config.api_port)).await?;
    tokio::spawn(async move {
        tracing::info!("Task API server started");
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!(error = %e, "Task API server stopped");
        }
    });

    match &config.telegram {
        Some(tg) => {
            let channel = Arc::new(TelegramChannel::new(tg.bot_token.clone()));
            let handler = Arc::new(ChatHandler::new(Arc::clone(&store)));

            let transport: Arc<dyn ChatTransport> = channel.clone();
            tokio::spawn(async move {
                if let Err(e) = bot::run(transport, handler).await {
                    tracing::error!(error = %e, "Telegram bot stopped");
                }
            });
            eprintln!("   Telegram: enabled");

            match &tg.reminder_chat_id {
                Some(chat_id) => {
                    let notifier = Arc::new(TelegramNotifier::new(channel, chat_id.clone()));
                    let reminders = Arc::new(ReminderScheduler::new(Arc::clone(&store), notifier));
                    let _reminder_handle =
                        scheduler::spawn_reminder_ticker(reminders, config.reminder_interval);
                    eprintln!(
                        "   Reminders: every {}s to chat {}",
                        config.reminder_interval.as_secs(),
                        chat_id
                    );
                }
                None => eprintln!("   Reminders: disabled (TELEGRAM_REMINDER_CHAT_ID not set)"),
            }
        }
        None => eprintln!("   Telegram: disabled (TELEGRAM_BOT_TOKEN not set)"),
    }

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutting down");

    Ok(())
}
