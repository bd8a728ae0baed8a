//! Message history primitives.
//!
//! A `MessageLog` is the append-only record of one session's turns.
//! Messages are immutable once appended; the log is cleared only by an
//! explicit reset, which preserves the session itself.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// Tag distinguishing rendered product payloads from ordinary replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageKind {
    ProductResults,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<MessageKind>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
            kind: None,
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            kind: None,
        }
    }

    /// Assistant message carrying a rendered product-search payload.
    pub fn product_results(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
            kind: Some(MessageKind::ProductResults),
        }
    }
}

/// Append-only ordered record of a session's messages.
#[derive(Debug, Default)]
pub struct MessageLog {
    messages: Vec<Message>,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Full ordered history.
    pub fn snapshot(&self) -> Vec<Message> {
        self.messages.clone()
    }

    pub fn clear(&mut self) {
        self.messages.clear();
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
        let mut log = MessageLog::new();
        log.append(Message::user("I want running shoes"));
        log.append(Message::assistant("What size do you need?"));
        log.append(Message::user("size 10"));

        let history = log.snapshot();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].content, "I want running shoes");
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[2].content, "size 10");
    }

    #[test]
    fn test_product_results_are_tagged() {
        let mut log = MessageLog::new();
        log.append(Message::assistant("Searching now"));
        log.append(Message::product_results("<div>results</div>"));

        let history = log.snapshot();
        assert_eq!(history[0].kind, None);
        assert_eq!(history[1].kind, Some(MessageKind::ProductResults));
        assert_eq!(history[1].role, Role::Assistant);
    }

    #[test]
    fn test_clear_empties_in_place() {
        let mut log = MessageLog::new();
        log.append(Message::user("hello"));
        assert!(!log.is_empty());

        log.clear();
        assert!(log.is_empty());
        assert_eq!(log.snapshot().len(), 0);
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut log = MessageLog::new();
        log.append(Message::user("hello"));

        let snapshot = log.snapshot();
        log.append(Message::assistant("hi"));
        assert_eq!(snapshot.len(), 1);
        assert_eq!(log.len(), 2);
    }
}
