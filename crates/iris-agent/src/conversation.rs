//! Conversation history owned by the turn processor.

use iris_ai::{ChatMessage, Role};

/// Number of trailing entries sent to the model as context
pub const CONTEXT_WINDOW: usize = 5;

/// Ordered user/assistant turns for the current session.
///
/// Only ever appended to, or cleared in full.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a user turn
    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(ChatMessage::user(text));
    }

    /// Append an assistant turn
    pub fn push_assistant(&mut self, text: impl Into<String>) {
        self.turns.push(ChatMessage::assistant(text));
    }

    /// The last `n` turns, oldest first
    pub fn recent(&self, n: usize) -> &[ChatMessage] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    /// All turns, oldest first
    pub fn turns(&self) -> &[ChatMessage] {
        &self.turns
    }

    /// The most recent turn
    pub fn last(&self) -> Option<&ChatMessage> {
        self.turns.last()
    }

    /// Count turns with the given role
    pub fn count_role(&self, role: Role) -> usize {
        self.turns.iter().filter(|m| m.role == role).count()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
