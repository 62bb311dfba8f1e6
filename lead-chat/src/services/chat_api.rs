//! REST client for conversation history and shared-lead lookup

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::credentials::CredentialProvider;
use super::endpoints::ChatEndpoints;
use crate::error::{ChatError, ChatResult};
use crate::models::{CandidateLead, ChatMessage, ConversationKey};

/// One-shot fetch of the most recent messages of a conversation
#[async_trait]
pub trait HistoryFetcher: Send + Sync {
    async fn fetch_history(
        &self,
        key: &ConversationKey,
        limit: usize,
    ) -> ChatResult<Vec<ChatMessage>>;
}

/// Lookup of leads visible to both participants of a conversation
#[async_trait]
pub trait LeadDirectory: Send + Sync {
    async fn shared_leads(&self, key: &ConversationKey) -> ChatResult<Vec<CandidateLead>>;
}

/// List endpoints answer either with a bare array or `{ "data": [...] }`
#[derive(Deserialize)]
#[serde(untagged)]
enum ListResponse<T> {
    Bare(Vec<T>),
    Wrapped { data: Vec<T> },
}

impl<T> ListResponse<T> {
    fn into_items(self) -> Vec<T> {
        match self {
            ListResponse::Bare(items) | ListResponse::Wrapped { data: items } => items,
        }
    }
}

/// HTTP implementation of [`HistoryFetcher`] and [`LeadDirectory`]
pub struct HttpChatApi {
    client: Client,
    endpoints: ChatEndpoints,
    credentials: Arc<dyn CredentialProvider>,
}

impl HttpChatApi {
    pub fn new(
        endpoints: ChatEndpoints,
        credentials: Arc<dyn CredentialProvider>,
        timeout: Duration,
    ) -> ChatResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChatError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoints,
            credentials,
        })
    }

    async fn get_list<T>(&self, url: &str) -> ChatResult<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let token = self
            .credentials
            .bearer_token()
            .ok_or(ChatError::MissingCredential)?;

        debug!("GET {}", url);

        let response = self.client.get(url).bearer_auth(token).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            warn!("GET {} failed with status {}", url, status);
            return Err(ChatError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let list = response.json::<ListResponse<T>>().await?;
        Ok(list.into_items())
    }
}

#[async_trait]
impl HistoryFetcher for HttpChatApi {
    async fn fetch_history(
        &self,
        key: &ConversationKey,
        limit: usize,
    ) -> ChatResult<Vec<ChatMessage>> {
        let url = self.endpoints.history_url(key, limit);
        self.get_list(&url).await
    }
}

#[async_trait]
impl LeadDirectory for HttpChatApi {
    async fn shared_leads(&self, key: &ConversationKey) -> ChatResult<Vec<CandidateLead>> {
        let url = self.endpoints.shared_leads_url(key);
        self.get_list(&url).await
    }
}
