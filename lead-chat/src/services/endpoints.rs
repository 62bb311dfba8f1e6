//! URL construction for the chat backend
//!
//! Every role-scoped route goes through [`ChatEndpoints`] so the
//! business/freelancer split lives in one place.

use crate::error::{ChatError, ChatResult};
use crate::models::ConversationKey;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatEndpoints {
    api_base: String,
    ws_base: String,
}

impl ChatEndpoints {
    pub fn new(api_base: &str, ws_base: &str) -> Self {
        Self {
            api_base: api_base.trim_end_matches('/').to_string(),
            ws_base: ws_base.trim_end_matches('/').to_string(),
        }
    }

    /// Derive the stream base from the REST base (`http` → `ws`, `https` → `wss`)
    pub fn from_api_base(api_base: &str) -> ChatResult<Self> {
        let ws_base = Self::derive_ws_base(api_base)?;
        Ok(Self::new(api_base, &ws_base))
    }

    pub fn derive_ws_base(api_base: &str) -> ChatResult<String> {
        if let Some(rest) = api_base.strip_prefix("https://") {
            Ok(format!("wss://{rest}"))
        } else if let Some(rest) = api_base.strip_prefix("http://") {
            Ok(format!("ws://{rest}"))
        } else {
            Err(ChatError::Config(format!(
                "API base must start with http:// or https://: {api_base}"
            )))
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn ws_base(&self) -> &str {
        &self.ws_base
    }

    pub fn history_url(&self, key: &ConversationKey, limit: usize) -> String {
        format!(
            "{}/chat/{}/{}/messages?limit={}",
            self.api_base,
            key.role.path_segment(),
            urlencoding::encode(&key.counterpart_id),
            limit
        )
    }

    /// Stream URL carrying the bearer credential as `token`
    pub fn stream_url(&self, key: &ConversationKey, token: &str) -> String {
        format!(
            "{}/ws/chat/{}/{}?token={}",
            self.ws_base,
            key.role.path_segment(),
            urlencoding::encode(&key.counterpart_id),
            urlencoding::encode(token)
        )
    }

    pub fn shared_leads_url(&self, key: &ConversationKey) -> String {
        format!(
            "{}/leads/shared/{}/{}",
            self.api_base,
            key.role.path_segment(),
            urlencoding::encode(&key.counterpart_id)
        )
    }
}
