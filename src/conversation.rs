//! Conversation state store
//!
//! Holds the ordered message list and the busy flag for the single chat
//! thread. Handles are cheap clones of one shared store. Every mutation
//! goes through [`Rc::make_mut`], so a snapshot handed out earlier keeps
//! showing the state it was taken from while the store moves on.

use std::cell::RefCell;
use std::rc::Rc;

use crate::models::Message;
use crate::models::MessageId;
use crate::models::Role;

/// Immutable view of the conversation at one point in time
pub type Snapshot = Rc<Vec<Message>>;

#[derive(Debug, Default)]
struct StoreState {
    messages: Snapshot,
    busy: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ConversationStore {
    state: Rc<RefCell<StoreState>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a conversation that opens with an assistant greeting
    pub fn with_greeting(greeting: impl Into<String>) -> Self {
        let store = Self::new();
        store.append(Message::assistant(greeting));
        store
    }

    pub fn snapshot(&self) -> Snapshot {
        Rc::clone(&self.state.borrow().messages)
    }

    pub fn append(&self, message: Message) {
        let mut state = self.state.borrow_mut();
        Rc::make_mut(&mut state.messages).push(message);
    }

    /// Replace the content of message `id`, or append it as a new assistant message
    pub fn upsert_assistant_content(&self, id: &MessageId, content: &str) {
        let mut state = self.state.borrow_mut();
        let messages = Rc::make_mut(&mut state.messages);

        // The message under construction is normally the tail, so search backwards
        match messages.iter_mut().rev().find(|m| &m.id == id) {
            Some(message) => {
                message.content.clear();
                message.content.push_str(content);
            }
            None => messages.push(Message::new(id.clone(), Role::Assistant, content)),
        }
    }

    pub fn len(&self) -> usize {
        self.state.borrow().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last(&self) -> Option<Message> {
        self.state.borrow().messages.last().cloned()
    }

    /// True while nothing but the opening greeting has been exchanged
    pub fn only_greeting(&self) -> bool {
        let state = self.state.borrow();
        state.messages.len() == 1 && state.messages[0].is_assistant()
    }

    pub fn is_busy(&self) -> bool {
        self.state.borrow().busy
    }

    /// Mark an exchange as in flight. Returns false if one already is.
    pub fn try_begin_exchange(&self) -> bool {
        let mut state = self.state.borrow_mut();
        if state.busy {
            return false;
        }
        state.busy = true;
        true
    }

    pub fn finish_exchange(&self) {
        self.state.borrow_mut().busy = false;
    }
}
