//! CLI output formatting utilities
//!
//! This module provides consistent output formatting for the `foliochat` CLI

use std::io::Write;

use crate::agent::ChatEvent;
use crate::agent::ClientState;
use crate::models::MessageId;

pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_prompt(msg: &str) {
    print!("{msg}");
    std::io::stdout().flush().ok();
}

/// Show only the first few characters of a secret
#[must_use]
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}

/// Renders streamed assistant messages as they grow
///
/// Each update carries the full content, so only the part past what is
/// already on screen is written.
#[derive(Debug, Default)]
pub struct AnswerPrinter {
    current: Option<MessageId>,
    printed: usize,
    thinking: bool,
}

impl AnswerPrinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn handle(&mut self, event: &ChatEvent) {
        let mut out = std::io::stdout();
        let text = self.render(event);
        if !text.is_empty() {
            out.write_all(text.as_bytes()).ok();
            out.flush().ok();
        }
    }

    /// End the current line once the exchange is over
    pub fn finish(&mut self) {
        if self.current.take().is_some() {
            println!();
        }
        self.printed = 0;
    }

    fn render(&mut self, event: &ChatEvent) -> String {
        match event {
            ChatEvent::StateChanged(ClientState::Requesting) => {
                self.thinking = true;
                "⏳ Thinking...".to_string()
            }
            ChatEvent::StateChanged(_) => String::new(),
            ChatEvent::AssistantUpdated(message) => {
                let mut text = String::new();
                if self.thinking {
                    self.thinking = false;
                    text.push_str("\r\x1b[2K");
                }
                if self.current.as_ref() != Some(&message.id) {
                    if self.current.is_some() {
                        text.push('\n');
                    }
                    text.push_str("🤖 ");
                    self.current = Some(message.id.clone());
                    self.printed = 0;
                }
                match message.content.get(self.printed..) {
                    Some(rest) => text.push_str(rest),
                    // Content was rewritten rather than extended; print it whole
                    None => {
                        text.push('\n');
                        text.push_str(&message.content);
                    }
                }
                self.printed = message.content.len();
                text
            }
        }
    }
}
