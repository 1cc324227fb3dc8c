//! Chat transport abstraction — inbound events, outbound replies, and the
//! single-destination reminder sink.

pub mod bot;
pub mod telegram;

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;

use crate::error::ChannelError;

pub use telegram::{TelegramChannel, TelegramNotifier};

/// An interactive button: visible label plus the token sent back when pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Control {
    pub label: String,
    pub token: String,
}

/// What the chat handler wants shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    /// Plain text.
    Text(String),
    /// Text with one control per row underneath.
    Controls { text: String, controls: Vec<Control> },
}

/// Something that arrived from the chat transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    /// A text message in `chat_id`.
    Message { chat_id: String, text: String },
    /// A control was pressed on message `message_id`.
    Interaction {
        chat_id: String,
        message_id: i64,
        /// Transport handle used to acknowledge the press.
        interaction_id: String,
        token: String,
    },
}

/// Stream of inbound chat events.
pub type EventStream = Pin<Box<dyn Stream<Item = ChatEvent> + Send>>;

/// Two-way chat transport.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    fn name(&self) -> &str;

    /// Begin listening. The stream ends when the transport shuts down.
    async fn start(&self) -> Result<EventStream, ChannelError>;

    /// Post a new message.
    async fn send(&self, chat_id: &str, reply: &Reply) -> Result<(), ChannelError>;

    /// Replace the content (and controls) of an existing message.
    async fn edit(&self, chat_id: &str, message_id: i64, reply: &Reply)
    -> Result<(), ChannelError>;

    /// Acknowledge a control press, optionally with a short notice.
    async fn acknowledge(
        &self,
        interaction_id: &str,
        notice: Option<&str>,
    ) -> Result<(), ChannelError>;
}

/// Outbound-only sink bound to one pre-configured destination.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, text: &str) -> Result<(), ChannelError>;
}
