//! Client-side conversation state.
//!
//! The session owns the rendered message list; the relay keeps nothing
//! between requests, so the full history is sent with every turn.

use relaychat_contracts::{ChatRequest, ChatTurn, Role};

/// Shown when a turn fails.
pub const APOLOGY_TEXT: &str = "Sorry, something went wrong. Please try again.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    pub id: String,
    pub role: Role,
    pub content: String,
}

/// A submitted turn waiting for its assistant reply.
#[derive(Debug, Clone)]
pub struct PendingTurn {
    pub request: ChatRequest,
    pub user_id: String,
    pub assistant_id: String,
}

/// Where the apology ended up after a failed turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApologyPlacement {
    /// The still-empty assistant message was filled in.
    Filled(String),
    /// Partial output was kept and a separate message was appended.
    Appended(String),
}

#[derive(Debug, Default)]
pub struct ChatSession {
    messages: Vec<RenderedMessage>,
    next_id: u64,
    is_loading: bool,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> &[RenderedMessage] {
        &self.messages
    }

    pub fn message(&self, id: &str) -> Option<&RenderedMessage> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Start a turn: append the user message and an empty assistant message.
    ///
    /// Returns `None` for blank input or while a turn is in flight.
    pub fn begin_turn(&mut self, input: &str) -> Option<PendingTurn> {
        if input.trim().is_empty() || self.is_loading {
            return None;
        }

        let history = self
            .messages
            .iter()
            .map(|m| ChatTurn {
                role: m.role,
                content: m.content.clone(),
            })
            .collect();

        let user_id = self.push(Role::User, input.to_string());
        let assistant_id = self.push(Role::Assistant, String::new());
        self.is_loading = true;

        Some(PendingTurn {
            request: ChatRequest::new(input, history),
            user_id,
            assistant_id,
        })
    }

    /// Append a delta to a message; returns the updated message.
    pub fn append_delta(&mut self, id: &str, delta: &str) -> Option<&RenderedMessage> {
        let message = self.messages.iter_mut().find(|m| m.id == id)?;
        message.content.push_str(delta);
        Some(message)
    }

    pub fn fail_turn(&mut self, assistant_id: &str) -> ApologyPlacement {
        if let Some(message) = self
            .messages
            .iter_mut()
            .find(|m| m.id == assistant_id && m.content.is_empty())
        {
            message.content = APOLOGY_TEXT.to_string();
            return ApologyPlacement::Filled(message.id.clone());
        }

        ApologyPlacement::Appended(self.push(Role::Assistant, APOLOGY_TEXT.to_string()))
    }

    pub fn finish_turn(&mut self) {
        self.is_loading = false;
    }

    /// Drop all messages. Ids keep counting up.
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    fn push(&mut self, role: Role, content: String) -> String {
        let id = format!("msg-{}", self.next_id);
        self.next_id += 1;
        self.messages.push(RenderedMessage {
            id: id.clone(),
            role,
            content,
        });
        id
    }
}
