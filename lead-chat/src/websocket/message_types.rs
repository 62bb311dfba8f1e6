use serde::{Deserialize, Serialize};

use crate::models::ChatMessage;

/// Inbound WebSocket frames from server to client
///
/// Outbound frames are the raw message text, no envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum InboundFrame {
    #[serde(rename = "chat_message")]
    ChatMessage { data: ChatMessage },

    /// Server-side failure; surfaced to the user, connection stays open
    #[serde(rename = "error")]
    Error { message: String },
}

impl InboundFrame {
    pub fn decode(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}
