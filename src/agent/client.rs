//! Streaming response client
//!
//! Drives one request/response exchange per submission:
//!
//! ```text
//! Idle -> Requesting -> Streaming -> Completed -> Idle
//!              |            |
//!              +------------+-----> Failed ----> Idle
//! ```
//!
//! Answer fragments are accumulated and the whole accumulated text is written
//! to the assistant message on every fragment, never a diff. Malformed frames
//! are dropped without leaving `Streaming`. Every failure ends in a canned
//! assistant reply, so a turn never ends on silence.

use std::cell::Cell;

use futures::StreamExt;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::frames::excerpt;
use super::frames::parse_line;
use super::frames::LineDecoder;
use super::frames::StreamEvent;
use super::transport::AgentTransport;
use super::transport::ChatRequest;
use super::transport::HttpTransport;
use crate::config::AssistantConfig;
use crate::conversation::ConversationStore;
use crate::errors::Result;
use crate::models::Message;
use crate::models::MessageId;
use crate::session::FileKeyValueStore;
use crate::session::KeyValueStore;
use crate::session::SessionIdentity;
use crate::AppConfig;

/// Malformed frames per exchange logged at warn level; the rest go to debug
const MALFORMED_FRAME_WARN_LIMIT: usize = 8;

/// Longest slice of a bad line quoted in the log
const LOGGED_LINE_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Idle,
    Requesting,
    Streaming,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    EmptyInput,
    Busy,
}

/// How a submission ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeOutcome {
    /// Nothing was sent and the conversation is unchanged
    Rejected(RejectReason),
    Completed { fragments: usize },
    /// The stream ended cleanly without an answer; the apology was sent instead
    NoContent,
    /// The exchange broke; the error reply with the fact sheet was sent instead
    Failed { error: String },
}

/// Progress notifications for a presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    StateChanged(ClientState),
    /// Latest full content of an assistant message
    AssistantUpdated(Message),
}

/// Per-request accumulation state
#[derive(Debug)]
struct StreamCursor {
    assistant_id: MessageId,
    accumulated: String,
    fragments: usize,
    malformed: usize,
}

impl StreamCursor {
    fn new() -> Self {
        Self {
            assistant_id: MessageId::generate(),
            accumulated: String::new(),
            fragments: 0,
            malformed: 0,
        }
    }
}

/// Clears the busy flag however the exchange ends, including the future being dropped
struct ExchangeGuard<'a> {
    store: &'a ConversationStore,
    state: &'a Cell<ClientState>,
}

impl Drop for ExchangeGuard<'_> {
    fn drop(&mut self) {
        self.store.finish_exchange();
        self.state.set(ClientState::Idle);
    }
}

pub struct StreamingClient<T, K> {
    transport: T,
    identity: SessionIdentity<K>,
    store: ConversationStore,
    bot_id: String,
    texts: AssistantConfig,
    state: Cell<ClientState>,
}

impl StreamingClient<HttpTransport, FileKeyValueStore> {
    /// Build the HTTP-backed client, starting a conversation with the configured greeting
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let transport = HttpTransport::from_config(config)?;
        let identity = SessionIdentity::new(
            FileKeyValueStore::new(config.session_store_path()),
            config.storage_key(),
        );
        let store = ConversationStore::with_greeting(config.assistant.greeting.clone());

        Ok(Self::new(
            transport,
            identity,
            store,
            config.bot_id(),
            config.assistant.clone(),
        ))
    }
}

impl<T: AgentTransport, K: KeyValueStore> StreamingClient<T, K> {
    pub fn new(
        transport: T,
        identity: SessionIdentity<K>,
        store: ConversationStore,
        bot_id: impl Into<String>,
        texts: AssistantConfig,
    ) -> Self {
        Self {
            transport,
            identity,
            store,
            bot_id: bot_id.into(),
            texts,
            state: Cell::new(ClientState::Idle),
        }
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn texts(&self) -> &AssistantConfig {
        &self.texts
    }

    pub fn state(&self) -> ClientState {
        self.state.get()
    }

    pub async fn submit(&self, input: &str) -> ExchangeOutcome {
        self.submit_with(input, |_| {}).await
    }

    /// Run one exchange, reporting progress to `on_event`
    pub async fn submit_with<F>(&self, input: &str, mut on_event: F) -> ExchangeOutcome
    where
        F: FnMut(&ChatEvent),
    {
        let query = input.trim();
        if query.is_empty() {
            debug!("Ignoring empty submission");
            return ExchangeOutcome::Rejected(RejectReason::EmptyInput);
        }
        if !self.store.try_begin_exchange() {
            debug!("Ignoring submission while an exchange is in flight");
            return ExchangeOutcome::Rejected(RejectReason::Busy);
        }
        let guard = ExchangeGuard {
            store: &self.store,
            state: &self.state,
        };

        self.store.append(Message::user(query));
        self.transition(ClientState::Requesting, &mut on_event);

        let mut cursor = StreamCursor::new();
        let result = self.run_exchange(query, &mut cursor, &mut on_event).await;

        if cursor.malformed > MALFORMED_FRAME_WARN_LIMIT {
            warn!(
                "Dropped {} malformed stream frames in this exchange",
                cursor.malformed
            );
        }

        let outcome = match result {
            Ok(()) if cursor.fragments > 0 => {
                info!(
                    fragments = cursor.fragments,
                    chars = cursor.accumulated.chars().count(),
                    "Exchange completed"
                );
                self.transition(ClientState::Completed, &mut on_event);
                ExchangeOutcome::Completed {
                    fragments: cursor.fragments,
                }
            }
            Ok(()) => {
                warn!("Stream ended without any answer fragment");
                self.reply(Message::assistant(self.texts.apology.clone()), &mut on_event);
                self.transition(ClientState::Completed, &mut on_event);
                ExchangeOutcome::NoContent
            }
            Err(err) => {
                warn!(error = %err, "Exchange failed");
                let error = err.to_string();
                self.reply(
                    Message::assistant(self.texts.failure_message(&error)),
                    &mut on_event,
                );
                self.transition(ClientState::Failed, &mut on_event);
                ExchangeOutcome::Failed { error }
            }
        };

        drop(guard);
        on_event(&ChatEvent::StateChanged(ClientState::Idle));
        outcome
    }

    async fn run_exchange<F>(
        &self,
        query: &str,
        cursor: &mut StreamCursor,
        on_event: &mut F,
    ) -> Result<()>
    where
        F: FnMut(&ChatEvent),
    {
        let user = self.identity.user_id()?;
        let request = ChatRequest::streaming(self.bot_id.as_str(), user, query);
        let mut stream = self.transport.open(&request).await?;
        self.transition(ClientState::Streaming, on_event);

        let mut decoder = LineDecoder::new();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            for line in decoder.push(&chunk) {
                self.handle_line(&line, cursor, on_event);
            }
        }
        if let Some(line) = decoder.finish() {
            self.handle_line(&line, cursor, on_event);
        }
        Ok(())
    }

    fn handle_line<F>(&self, line: &str, cursor: &mut StreamCursor, on_event: &mut F)
    where
        F: FnMut(&ChatEvent),
    {
        match parse_line(line) {
            Ok(Some(event)) => self.apply_event(&event, cursor, on_event),
            Ok(None) => {}
            Err(err) => {
                cursor.malformed += 1;
                let line = excerpt(line, LOGGED_LINE_CHARS);
                if cursor.malformed <= MALFORMED_FRAME_WARN_LIMIT {
                    warn!(error = %err, line = %line, "Failed to parse stream frame");
                } else {
                    debug!(error = %err, line = %line, "Failed to parse stream frame");
                }
            }
        }
    }

    fn apply_event<F>(&self, event: &StreamEvent, cursor: &mut StreamCursor, on_event: &mut F)
    where
        F: FnMut(&ChatEvent),
    {
        if let Some(fragment) = event.answer_fragment() {
            cursor.accumulated.push_str(fragment);
            cursor.fragments += 1;
            self.store
                .upsert_assistant_content(&cursor.assistant_id, &cursor.accumulated);
            if let Some(message) = self.store.last() {
                on_event(&ChatEvent::AssistantUpdated(message));
            }
            return;
        }

        match event {
            StreamEvent::Message { message } => {
                debug!(role = ?message.role, kind = ?message.kind, "Skipping non-answer message");
            }
            StreamEvent::Done => debug!("Agent signalled done"),
            StreamEvent::Error { error_information } => {
                let (code, msg) = error_information
                    .as_ref()
                    .map(|info| (info.code, info.msg.clone()))
                    .unwrap_or_default();
                warn!(code = ?code, message = ?msg, "Agent reported an error event");
            }
            StreamEvent::Unknown => debug!("Ignoring unknown stream event"),
        }
    }

    fn reply<F>(&self, message: Message, on_event: &mut F)
    where
        F: FnMut(&ChatEvent),
    {
        self.store.append(message.clone());
        on_event(&ChatEvent::AssistantUpdated(message));
    }

    fn transition<F>(&self, state: ClientState, on_event: &mut F)
    where
        F: FnMut(&ChatEvent),
    {
        debug!(from = ?self.state.get(), to = ?state, "Client state change");
        self.state.set(state);
        on_event(&ChatEvent::StateChanged(state));
    }
}
