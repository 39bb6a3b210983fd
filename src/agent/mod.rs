//! Client side of the hosted conversational agent

pub mod client;
pub mod frames;
pub mod transport;

pub use client::{ChatEvent, ClientState, ExchangeOutcome, RejectReason, StreamingClient};
pub use frames::{parse_line, LineDecoder, StreamEvent};
pub use transport::{AgentTransport, ByteStream, ChatRequest, HttpTransport};
