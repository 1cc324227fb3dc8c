//! Chat listener loop. Pulls events off a transport and answers each one on
//! its own task, so slow replies never hold up later messages.

use std::sync::Arc;

use futures::StreamExt;
use tracing::{debug, info, warn};

use crate::channels::{ChatEvent, ChatTransport};
use crate::chat::{ChatHandler, Command, InteractionOutcome};
use crate::error::ChannelError;

/// Run until the transport's event stream ends.
pub async fn run(
    transport: Arc<dyn ChatTransport>,
    handler: Arc<ChatHandler>,
) -> Result<(), ChannelError> {
    let mut events = transport.start().await?;
    info!(channel = transport.name(), "Chat listener started");

    while let Some(event) = events.next().await {
        let transport = Arc::clone(&transport);
        let handler = Arc::clone(&handler);
        tokio::spawn(async move {
            if let Err(e) = dispatch(transport.as_ref(), &handler, event).await {
                warn!(error = %e, "Failed to answer chat event");
            }
        });
    }

    info!(channel = transport.name(), "Chat listener stopped");
    Ok(())
}

/// Answer a single inbound event.
pub async fn dispatch(
    transport: &dyn ChatTransport,
    handler: &ChatHandler,
    event: ChatEvent,
) -> Result<(), ChannelError> {
    match event {
        ChatEvent::Message { chat_id, text } => {
            let Some(command) = Command::parse(&text) else {
                debug!(chat_id = %chat_id, "Ignoring non-command message");
                return Ok(());
            };
            let reply = handler.handle_command(command).await;
            transport.send(&chat_id, &reply).await
        }
        ChatEvent::Interaction {
            chat_id,
            message_id,
            interaction_id,
            token,
        } => match handler.handle_interaction(&token).await {
            InteractionOutcome::Refreshed(view) => {
                transport.acknowledge(&interaction_id, None).await?;
                transport.edit(&chat_id, message_id, &view).await
            }
            InteractionOutcome::Rejected(notice) => {
                transport.acknowledge(&interaction_id, Some(&notice)).await
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::channels::{EventStream, Reply};
    use crate::store::MemoryBackend;
    use crate::tasks::clock::FixedClock;
    use crate::tasks::{TaskStore, render, token};

    #[derive(Debug, Clone, PartialEq)]
    enum Sent {
        Send(String, Reply),
        Edit(String, i64, Reply),
        Ack(String, Option<String>),
    }

    /// Records outbound calls and replays a fixed list of inbound events.
    #[derive(Default)]
    struct RecordingTransport {
        inbound: Mutex<Vec<ChatEvent>>,
        sent: Mutex<Vec<Sent>>,
    }

    impl RecordingTransport {
        fn sent(&self) -> Vec<Sent> {
            self.sent.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatTransport for RecordingTransport {
        fn name(&self) -> &str {
            "recording"
        }

        async fn start(&self) -> Result<EventStream, ChannelError> {
            let events = std::mem::take(&mut *self.inbound.lock().unwrap());
            Ok(Box::pin(futures::stream::iter(events)))
        }

        async fn send(&self, chat_id: &str, reply: &Reply) -> Result<(), ChannelError> {
            self.sent
                .lock()
                .unwrap()
                .push(Sent::Send(chat_id.into(), reply.clone()));
            Ok(())
        }

        async fn edit(
            &self,
            chat_id: &str,
            message_id: i64,
            reply: &Reply,
        ) -> Result<(), ChannelError> {
            self.sent
                .lock()
                .unwrap()
                .push(Sent::Edit(chat_id.into(), message_id, reply.clone()));
            Ok(())
        }

        async fn acknowledge(
            &self,
            interaction_id: &str,
            notice: Option<&str>,
        ) -> Result<(), ChannelError> {
            self.sent
                .lock()
                .unwrap()
                .push(Sent::Ack(interaction_id.into(), notice.map(str::to_string)));
            Ok(())
        }
    }

    fn setup() -> (Arc<TaskStore>, Arc<ChatHandler>) {
        let store = Arc::new(TaskStore::new(
            Arc::new(MemoryBackend::new()),
            Arc::new(FixedClock("2026-10-19".parse().unwrap())),
        ));
        let handler = Arc::new(ChatHandler::new(Arc::clone(&store)));
        (store, handler)
    }

    fn message(text: &str) -> ChatEvent {
        ChatEvent::Message {
            chat_id: "42".into(),
            text: text.into(),
        }
    }

    #[tokio::test]
    async fn command_reply_goes_to_same_chat() {
        let (_, handler) = setup();
        let transport = RecordingTransport::default();

        dispatch(&transport, &handler, message("/start")).await.unwrap();

        assert_eq!(
            transport.sent(),
            vec![Sent::Send(
                "42".into(),
                Reply::Text(crate::chat::handler::WELCOME.into())
            )]
        );
    }

    #[tokio::test]
    async fn plain_text_is_ignored() {
        let (_, handler) = setup();
        let transport = RecordingTransport::default();
        dispatch(&transport, &handler, message("hi bot")).await.unwrap();
        assert!(transport.sent().is_empty());
    }

    #[tokio::test]
    async fn interaction_acknowledges_then_edits() {
        let (store, handler) = setup();
        let task = store.create("Stretch", store.today()).await.unwrap();
        let transport = RecordingTransport::default();

        let event = ChatEvent::Interaction {
            chat_id: "42".into(),
            message_id: 9,
            interaction_id: "cb".into(),
            token: token::encode(task.id),
        };
        dispatch(&transport, &handler, event).await.unwrap();

        let sent = transport.sent();
        assert_eq!(sent[0], Sent::Ack("cb".into(), None));
        match &sent[1] {
            Sent::Edit(chat, 9, Reply::Controls { text, controls }) => {
                assert_eq!(chat, "42");
                assert_eq!(text, render::TODAY_HEADER);
                assert_eq!(controls[0].label, "✅ Stretch");
            }
            other => panic!("Expected edit, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejected_interaction_only_acknowledges() {
        let (_, handler) = setup();
        let transport = RecordingTransport::default();

        let event = ChatEvent::Interaction {
            chat_id: "42".into(),
            message_id: 9,
            interaction_id: "cb".into(),
            token: "garbage".into(),
        };
        dispatch(&transport, &handler, event).await.unwrap();

        assert_eq!(
            transport.sent(),
            vec![Sent::Ack(
                "cb".into(),
                Some(crate::chat::handler::UNKNOWN_CONTROL.into())
            )]
        );
    }

    #[tokio::test]
    async fn run_answers_every_event() {
        let (store, handler) = setup();
        let transport = Arc::new(RecordingTransport::default());
        *transport.inbound.lock().unwrap() = vec![
            message("/add Buy milk"),
            message("/add Plan trip 2026-11-03"),
            message("/list 2026-11-03"),
        ];

        run(transport.clone(), handler).await.unwrap();

        // Replies are produced on spawned tasks.
        for _ in 0..100 {
            if transport.sent().len() == 3 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(transport.sent().len(), 3);
        assert_eq!(store.list_by_date(None).await.unwrap().len(), 2);
    }
}
