//! Streaming chat client for a portfolio assistant.
//!
//! A question goes to a hosted conversational-agent API; the streamed answer
//! is parsed frame by frame and accumulated into a [`ConversationStore`].

pub mod agent;
pub mod cli;
pub mod config;
pub mod conversation;
pub mod errors;
pub mod logging;
pub mod models;
pub mod session;

#[cfg(test)]
mod config_tests;
#[cfg(test)]
mod errors_tests;

pub use agent::{ChatEvent, ClientState, ExchangeOutcome, RejectReason, StreamingClient};
pub use config::AppConfig;
pub use conversation::ConversationStore;
pub use errors::*;
pub use models::{Message, MessageId, Role};
