//! Chat session handling: command parsing and the stateless interaction
//! state machine behind the chat front end.

pub mod command;
pub mod handler;

pub use command::Command;
pub use handler::{ChatHandler, InteractionOutcome};
