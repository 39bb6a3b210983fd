//! Incremental decoding of the agent's event stream
//!
//! The transport hands over bytes at arbitrary boundaries. [`LineDecoder`]
//! turns them into complete text lines, holding back a split UTF-8 sequence
//! or an unterminated line until more bytes arrive. [`parse_line`] turns a
//! `data:` line into a [`StreamEvent`].

use serde::Deserialize;

/// Marker in front of every payload line
pub const DATA_PREFIX: &str = "data:";

/// Bytes in, complete lines out
#[derive(Debug, Default)]
pub struct LineDecoder {
    /// Undecoded tail of a multi-byte sequence cut by a chunk boundary
    pending: Vec<u8>,
    /// Decoded text not yet terminated by a newline
    buffer: String,
}

impl LineDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next chunk and take every line it completes
    pub fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.decode(bytes);

        let Some(last_newline) = self.buffer.rfind('\n') else {
            return Vec::new();
        };
        let rest = self.buffer.split_off(last_newline + 1);
        let complete = std::mem::replace(&mut self.buffer, rest);
        complete.lines().map(str::to_string).collect()
    }

    /// Flush whatever is left once the transport has ended
    pub fn finish(&mut self) -> Option<String> {
        if !self.pending.is_empty() {
            let pending = std::mem::take(&mut self.pending);
            self.buffer.push_str(&String::from_utf8_lossy(&pending));
        }
        if self.buffer.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buffer))
        }
    }

    fn decode(&mut self, bytes: &[u8]) {
        let mut input = std::mem::take(&mut self.pending);
        input.extend_from_slice(bytes);

        let mut rest: &[u8] = &input;
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    self.buffer.push_str(text);
                    return;
                }
                Err(err) => {
                    let (valid, tail) = rest.split_at(err.valid_up_to());
                    self.buffer.push_str(&String::from_utf8_lossy(valid));
                    match err.error_len() {
                        Some(bad) => {
                            self.buffer.push(char::REPLACEMENT_CHARACTER);
                            rest = &tail[bad..];
                        }
                        None => {
                            // Incomplete sequence at the end: wait for the next chunk
                            self.pending = tail.to_vec();
                            return;
                        }
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakerRole {
    User,
    Assistant,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    Answer,
    FollowUp,
    Verbose,
    FunctionCall,
    ToolResponse,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AgentMessage {
    #[serde(default)]
    pub role: SpeakerRole,
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ErrorInformation {
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub msg: Option<String>,
}

/// Payload of one `data:` line, keyed by its `event` field
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum StreamEvent {
    Message {
        message: AgentMessage,
    },
    Done,
    Error {
        #[serde(default)]
        error_information: Option<ErrorInformation>,
    },
    #[serde(other)]
    Unknown,
}

impl StreamEvent {
    /// Text appended to the answer, for assistant answer messages only
    pub fn answer_fragment(&self) -> Option<&str> {
        match self {
            Self::Message { message, .. }
                if message.role == SpeakerRole::Assistant
                    && message.kind == MessageKind::Answer =>
            {
                Some(message.content.as_deref().unwrap_or(""))
            }
            _ => None,
        }
    }
}

/// At most `max_chars` characters of `text`, for quoting in logs
pub(crate) fn excerpt(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text.to_string(),
    }
}

/// Parse one stream line. `Ok(None)` for lines that carry no payload.
pub fn parse_line(line: &str) -> Result<Option<StreamEvent>, serde_json::Error> {
    let Some(payload) = line.trim().strip_prefix(DATA_PREFIX) else {
        return Ok(None);
    };
    serde_json::from_str(payload.trim()).map(Some)
}
