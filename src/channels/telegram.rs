//! Telegram channel — long-polls the Bot API for messages and button presses.
//!
//! Native Rust Telegram Bot API implementation of [`ChatTransport`], plus a
//! [`TelegramNotifier`] bound to the single reminder chat.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::channels::{ChatEvent, ChatTransport, EventStream, Notifier, Reply};
use crate::error::ChannelError;

/// Maximum message length for Telegram's sendMessage API.
const TELEGRAM_MAX_MESSAGE_LENGTH: usize = 4096;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

/// Long-poll timeout passed to getUpdates, in seconds.
const POLL_TIMEOUT_SECS: u64 = 30;

/// Delay before retrying after a failed poll.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

/// Telegram channel — connects to the Bot API via long-polling.
pub struct TelegramChannel {
    bot_token: SecretString,
    api_base: String,
    client: reqwest::Client,
}

impl TelegramChannel {
    pub fn new(bot_token: SecretString) -> Self {
        Self {
            bot_token,
            api_base: DEFAULT_API_BASE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the channel at a different Bot API server.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    fn api_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{method}",
            self.api_base,
            self.bot_token.expose_secret()
        )
    }

    /// POST a Bot API method and fail unless the HTTP status is a success.
    async fn call(&self, method: &str, body: &Value) -> Result<(), ChannelError> {
        let resp = self
            .client
            .post(self.api_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| send_failed(format!("{method}: {e}")))?;

        if resp.status().is_success() {
            return Ok(());
        }

        let status = resp.status();
        let err = resp.text().await.unwrap_or_default();
        Err(send_failed(format!("{method} returned {status}: {err}")))
    }

    /// Send plain text, split to fit Telegram's 4096 char limit. No
    /// `parse_mode` is set, so task titles are shown exactly as written.
    async fn send_text(&self, chat_id: &str, text: &str) -> Result<(), ChannelError> {
        for chunk in split_message(text, TELEGRAM_MAX_MESSAGE_LENGTH) {
            let body = serde_json::json!({
                "chat_id": chat_id,
                "text": chunk,
            });
            self.call("sendMessage", &body).await?;
        }
        Ok(())
    }
}

fn send_failed(reason: String) -> ChannelError {
    ChannelError::SendFailed {
        name: "telegram".into(),
        reason,
    }
}

/// Inline keyboard with one button per row.
fn inline_keyboard(reply: &Reply) -> Option<Value> {
    match reply {
        Reply::Text(_) => None,
        Reply::Controls { controls, .. } => {
            let rows: Vec<Value> = controls
                .iter()
                .map(|c| serde_json::json!([{ "text": c.label, "callback_data": c.token }]))
                .collect();
            Some(serde_json::json!({ "inline_keyboard": rows }))
        }
    }
}

fn reply_text(reply: &Reply) -> &str {
    match reply {
        Reply::Text(text) => text,
        Reply::Controls { text, .. } => text,
    }
}

// ── ChatTransport implementation ────────────────────────────────────

#[async_trait]
impl ChatTransport for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    async fn start(&self) -> Result<EventStream, ChannelError> {
        if self.bot_token.expose_secret().trim().is_empty() {
            return Err(ChannelError::StartupFailed {
                name: "telegram".into(),
                reason: "bot token is empty".into(),
            });
        }

        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        let url = self.api_url("getUpdates");
        let client = self.client.clone();

        tokio::spawn(async move {
            let mut offset: i64 = 0;

            tracing::info!("Telegram channel listening for messages...");

            loop {
                let body = serde_json::json!({
                    "offset": offset,
                    "timeout": POLL_TIMEOUT_SECS,
                    "allowed_updates": ["message", "callback_query"]
                });

                let resp = match client.post(&url).json(&body).send().await {
                    Ok(r) => r,
                    Err(e) => {
                        tracing::warn!("Telegram poll error: {e}");
                        tokio::time::sleep(POLL_RETRY_DELAY).await;
                        continue;
                    }
                };

                let data: Value = match resp.json().await {
                    Ok(d) => d,
                    Err(e) => {
                        tracing::warn!("Telegram parse error: {e}");
                        tokio::time::sleep(POLL_RETRY_DELAY).await;
                        continue;
                    }
                };

                let Some(results) = data.get("result").and_then(Value::as_array) else {
                    tracing::warn!(response = %data, "Telegram getUpdates returned no result");
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                    continue;
                };

                for update in results {
                    // Advance offset past this update
                    if let Some(uid) = update.get("update_id").and_then(Value::as_i64) {
                        offset = uid + 1;
                    }

                    let Some(event) = parse_update(update) else {
                        continue;
                    };

                    if tx.send(event).is_err() {
                        tracing::info!("Telegram listener channel closed");
                        return;
                    }
                }
            }
        });

        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|event| (event, rx))
        });

        Ok(Box::pin(stream))
    }

    async fn send(&self, chat_id: &str, reply: &Reply) -> Result<(), ChannelError> {
        match inline_keyboard(reply) {
            None => self.send_text(chat_id, reply_text(reply)).await,
            Some(keyboard) => {
                let body = serde_json::json!({
                    "chat_id": chat_id,
                    "text": reply_text(reply),
                    "reply_markup": keyboard,
                });
                self.call("sendMessage", &body).await
            }
        }
    }

    async fn edit(
        &self,
        chat_id: &str,
        message_id: i64,
        reply: &Reply,
    ) -> Result<(), ChannelError> {
        let mut body = serde_json::json!({
            "chat_id": chat_id,
            "message_id": message_id,
            "text": reply_text(reply),
        });
        // Omitting reply_markup removes the old keyboard.
        if let Some(keyboard) = inline_keyboard(reply) {
            body["reply_markup"] = keyboard;
        }
        self.call("editMessageText", &body).await
    }

    async fn acknowledge(
        &self,
        interaction_id: &str,
        notice: Option<&str>,
    ) -> Result<(), ChannelError> {
        let mut body = serde_json::json!({ "callback_query_id": interaction_id });
        if let Some(text) = notice {
            body["text"] = Value::String(text.to_string());
            body["show_alert"] = Value::Bool(true);
        }
        self.call("answerCallbackQuery", &body).await
    }
}

// ── Reminder sink ───────────────────────────────────────────────────

/// Sends reminder text to one fixed Telegram chat.
pub struct TelegramNotifier {
    channel: Arc<TelegramChannel>,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(channel: Arc<TelegramChannel>, chat_id: impl Into<String>) -> Self {
        Self {
            channel,
            chat_id: chat_id.into(),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, text: &str) -> Result<(), ChannelError> {
        self.channel.send_text(&self.chat_id, text).await
    }
}

// ── Helpers ─────────────────────────────────────────────────────────

/// Turn one getUpdates entry into a chat event. Updates without text or
/// callback data are skipped.
fn parse_update(update: &Value) -> Option<ChatEvent> {
    if let Some(message) = update.get("message") {
        let text = message.get("text").and_then(Value::as_str)?;
        let chat_id = message
            .get("chat")
            .and_then(|c| c.get("id"))
            .and_then(Value::as_i64)?;
        return Some(ChatEvent::Message {
            chat_id: chat_id.to_string(),
            text: text.to_string(),
        });
    }

    let query = update.get("callback_query")?;
    let interaction_id = query.get("id").and_then(Value::as_str)?;
    let token = query.get("data").and_then(Value::as_str)?;
    let message = query.get("message")?;
    let message_id = message.get("message_id").and_then(Value::as_i64)?;
    let chat_id = message
        .get("chat")
        .and_then(|c| c.get("id"))
        .and_then(Value::as_i64)?;

    Some(ChatEvent::Interaction {
        chat_id: chat_id.to_string(),
        message_id,
        interaction_id: interaction_id.to_string(),
        token: token.to_string(),
    })
}

/// Split a message into chunks that fit Telegram's character limit.
/// Tries to split on newlines, then spaces, then hard-cuts on a char boundary.
fn split_message(text: &str, max_len: usize) -> Vec<String> {
    if text.len() <= max_len {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        if remaining.len() <= max_len {
            chunks.push(remaining.to_string());
            break;
        }

        let mut limit = max_len;
        while !remaining.is_char_boundary(limit) {
            limit -= 1;
        }

        // Find a good split point
        let chunk = &remaining[..limit];
        let split_at = chunk
            .rfind('\n')
            .or_else(|| chunk.rfind(' '))
            .unwrap_or(limit);

        // Don't split at position 0 (infinite loop guard)
        let split_at = if split_at == 0 { limit } else { split_at };

        chunks.push(remaining[..split_at].to_string());
        remaining = remaining[split_at..].trim_start();
    }

    chunks
}

// ── Tests ───────────────────────────────────────────────────────────
