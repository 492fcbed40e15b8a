use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque message identifier.
///
/// Ids of optimistic entries are generated locally and never assumed to match
/// a server-assigned id.
pub type MessageId = String;

/// Role of a message in a conversation
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl MessageRole {
    /// Lowercase role name, as serialized
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
            MessageRole::System => "system",
        }
    }
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single transcript entry
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Message id (locally generated for optimistic entries)
    #[serde(deserialize_with = "super::deserialize_id")]
    pub id: MessageId,
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message; grows in place while an assistant reply streams
    #[serde(default)]
    pub content: String,
    /// When the message was created
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Create a message stamped with the current time
    pub fn new(id: impl Into<MessageId>, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Append a streamed delta to the content
    pub fn append_token(&mut self, token: &str) {
        self.content.push_str(token);
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    pub fn is_assistant(&self) -> bool {
        self.role == MessageRole::Assistant
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_new() {
        let msg = Message::new("m-1", MessageRole::User, "hello");
        assert_eq!(msg.id, "m-1");
        assert!(msg.is_user());
        assert!(!msg.is_assistant());
        assert_eq!(msg.content, "hello");
    }

    #[test]
    fn test_append_token() {
        let mut msg = Message::new("m-2", MessageRole::Assistant, "");
        msg.append_token("The");
        msg.append_token(" crankshaft");
        assert_eq!(msg.content, "The crankshaft");
    }

    #[test]
    fn test_role_display() {
        assert_eq!(MessageRole::Assistant.to_string(), "assistant");
        assert_eq!(MessageRole::System.as_str(), "system");
    }

    #[test]
    fn test_serialize_camel_case() {
        let msg = Message::new("m-3", MessageRole::Assistant, "hi");
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("created_at").is_none());
    }

    #[test]
    fn test_deserialize_numeric_id() {
        let json = r#"{"id": 42, "role": "user", "content": "hey", "createdAt": "2024-01-01T00:00:00Z"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.id, "42");
        assert_eq!(msg.role, MessageRole::User);
    }

    #[test]
    fn test_deserialize_missing_content() {
        let json = r#"{"id": "a", "role": "assistant", "createdAt": "2024-01-01T00:00:00Z"}"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.content, "");
    }
}
