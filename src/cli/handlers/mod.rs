//! CLI command handlers module
//!
//! - chat: one-shot questions and the interactive chat loop
//! - info: session identifier and configuration display

pub mod chat;
pub mod info;

pub use chat::*;
pub use info::*;
