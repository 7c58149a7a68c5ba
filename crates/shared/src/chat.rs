//! Chat messages and the per-session conversation store.
//!
//! Messages are immutable once created and owned by the [`Conversation`],
//! which only ever grows. Nothing here is persisted — a conversation lives
//! and dies with its session.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opening message shown in every fresh session.
pub const GREETING: &str = "Hello! I'm **StudyAI**. \n\nI can help you with Math, Science, History, Languages, and more. \n\nAsk me a question or upload an image of your homework!";

/// Who authored a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One turn in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub role: Role,
    /// May be empty when an image accompanies the message.
    pub text: String,
    /// Inline image as a `data:<mime>;base64,<payload>` URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(text: impl Into<String>, image: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::User,
            text: text.into(),
            image,
            timestamp: Utc::now(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role: Role::Model,
            text: text.into(),
            image: None,
            timestamp: Utc::now(),
        }
    }

    /// Timestamp formatted for the bubble footer.
    pub fn formatted_time(&self) -> String {
        self.timestamp.format("%H:%M").to_string()
    }
}

/// Append-only, chronologically ordered message sequence.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<ChatMessage>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, msg: ChatMessage) {
        self.messages.push(msg);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_preserves_order() {
        let mut convo = Conversation::new();
        convo.append(ChatMessage::user("first", None));
        convo.append(ChatMessage::model("second"));
        convo.append(ChatMessage::user("third", None));

        let texts: Vec<&str> = convo.messages().iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
        assert_eq!(convo.len(), 3);
    }

    #[test]
    fn test_user_message_carries_image() {
        let msg = ChatMessage::user("", Some("data:image/png;base64,AAAA".to_string()));
        assert_eq!(msg.role, Role::User);
        assert!(msg.text.is_empty());
        assert!(msg.image.is_some());
    }

    #[test]
    fn test_model_message_has_no_image() {
        let msg = ChatMessage::model("answer");
        assert_eq!(msg.role, Role::Model);
        assert!(msg.image.is_none());
    }

    #[test]
    fn test_message_ids_are_unique() {
        let a = ChatMessage::model("a");
        let b = ChatMessage::model("b");
        assert_ne!(a.id, b.id);
    }
}
