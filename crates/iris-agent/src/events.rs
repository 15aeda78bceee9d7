//! Events sent from the turn processor to the presentation layer

use serde::{Deserialize, Serialize};

use crate::analysis::AnalysisResult;
use crate::error::ErrorKind;

/// Who a displayed message came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sender {
    User,
    Assistant,
}

impl Sender {
    /// Name shown next to the message
    pub fn display_name(&self) -> &'static str {
        match self {
            Sender::User => "You",
            Sender::Assistant => "Iris",
        }
    }
}

/// Events emitted while processing turns
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A message to show in the conversation view
    Message { sender: Sender, text: String },

    /// Response pending indicator
    Typing { active: bool },

    /// Voice capture indicator
    Listening { active: bool },

    /// Fresh analysis of the latest user input
    Analysis { result: AnalysisResult },

    /// Text recognised from the microphone
    VoiceTranscript { text: String },

    /// An operation failed; `message` is user-facing
    Error { kind: ErrorKind, message: String },

    /// Informational line for the conversation view
    Notice { text: String },

    /// Conversation history was cleared
    HistoryCleared,

    /// The user asked to quit
    Shutdown,
}

impl ChatEvent {
    /// Check if this event ends the session
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatEvent::Shutdown)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = ChatEvent::Message {
            sender: Sender::Assistant,
            text: "Hello".into(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "message");
        assert_eq!(json["sender"], "assistant");
    }

    #[test]
    fn test_only_shutdown_is_terminal() {
        assert!(ChatEvent::Shutdown.is_terminal());
        assert!(!ChatEvent::Typing { active: false }.is_terminal());
    }
}
