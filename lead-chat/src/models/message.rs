use chrono::{DateTime, Utc};
use mention_protocol::{MentionToken, Segments};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque message identifier.
///
/// The API sends ids as integers or strings depending on the endpoint; both
/// normalize to the same string so dedup works across history and stream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawMessageId", into = "String")]
pub struct MessageId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMessageId {
    Signed(i64),
    Unsigned(u64),
    Text(String),
}

impl From<RawMessageId> for MessageId {
    fn from(raw: RawMessageId) -> Self {
        match raw {
            RawMessageId::Signed(n) => MessageId(n.to_string()),
            RawMessageId::Unsigned(n) => MessageId(n.to_string()),
            RawMessageId::Text(s) => MessageId(s),
        }
    }
}

impl From<MessageId> for String {
    fn from(id: MessageId) -> Self {
        id.0
    }
}

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<i64> for MessageId {
    fn from(n: i64) -> Self {
        MessageId(n.to_string())
    }
}

impl From<&str> for MessageId {
    fn from(s: &str) -> Self {
        MessageId(s.to_string())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SenderType {
    #[serde(alias = "business")]
    Business,
    #[serde(alias = "freelancer")]
    Freelancer,
}

/// A chat message as delivered by history and by the live stream.
/// Immutable once received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatMessage {
    pub id: MessageId,
    #[serde(alias = "sender_type")]
    pub sender_type: SenderType,
    /// May embed `@[leadId:leadName]` mention tokens
    #[serde(alias = "message")]
    pub body: String,
    #[serde(alias = "created_at")]
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn segments(&self) -> Segments<'_> {
        mention_protocol::parse(&self.body)
    }

    pub fn mentions(&self) -> Vec<MentionToken> {
        mention_protocol::mentions(&self.body)
    }

    /// Body with mentions rendered as `@leadName`
    pub fn preview(&self) -> String {
        mention_protocol::render_display(&self.body)
    }
}
