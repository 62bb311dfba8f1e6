//! Hand-written fakes for the session seams
#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use futures::channel::mpsc as fmpsc;
use futures::{SinkExt, StreamExt};
use lead_chat::models::{ChatMessage, ConversationKey, MessageId, Role, SenderType};
use lead_chat::services::{ChatEndpoints, HistoryFetcher, StaticCredentials};
use lead_chat::websocket::{
    ChatSession, Connection, Connector, InboundFrame, SessionConfig, SessionSnapshot,
};
use lead_chat::{ChatError, ChatResult};
use parking_lot::Mutex;
use resilience::ReconnectPolicy;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

pub fn at(second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, second).unwrap()
}

pub fn message(id: i64, body: &str, second: u32) -> ChatMessage {
    ChatMessage {
        id: MessageId::from(id),
        sender_type: SenderType::Freelancer,
        body: body.to_string(),
        created_at: at(second),
    }
}

pub fn chat_frame(message: &ChatMessage) -> String {
    serde_json::to_string(&InboundFrame::ChatMessage {
        data: message.clone(),
    })
    .unwrap()
}

pub fn ids(snapshot: &SessionSnapshot) -> Vec<String> {
    snapshot
        .messages
        .iter()
        .map(|m| m.id.as_str().to_string())
        .collect()
}

#[derive(Debug, Clone, Copy)]
pub enum Step {
    Refuse,
    Accept,
    /// Handshake never completes
    Hang,
}

/// Server half of an accepted fake connection. Dropping it closes the stream.
pub struct ServerSide {
    pub to_client: fmpsc::UnboundedSender<ChatResult<String>>,
    pub from_client: fmpsc::UnboundedReceiver<String>,
}

impl ServerSide {
    pub fn push(&self, frame: String) {
        self.to_client.unbounded_send(Ok(frame)).unwrap();
    }
}

/// Plays a script of handshake outcomes; once exhausted every attempt is refused.
pub struct FakeConnector {
    script: Mutex<VecDeque<Step>>,
    accepted: mpsc::UnboundedSender<ServerSide>,
    urls: Mutex<Vec<String>>,
}

impl FakeConnector {
    pub fn new(script: Vec<Step>) -> (Arc<Self>, mpsc::UnboundedReceiver<ServerSide>) {
        let (accepted, rx) = mpsc::unbounded_channel();
        let connector = Arc::new(Self {
            script: Mutex::new(script.into()),
            accepted,
            urls: Mutex::new(Vec::new()),
        });
        (connector, rx)
    }

    pub fn attempts(&self) -> usize {
        self.urls.lock().len()
    }

    pub fn urls(&self) -> Vec<String> {
        self.urls.lock().clone()
    }
}

#[async_trait]
impl Connector for FakeConnector {
    async fn connect(&self, url: &str) -> ChatResult<Connection> {
        self.urls.lock().push(url.to_string());
        let step = self.script.lock().pop_front().unwrap_or(Step::Refuse);

        match step {
            Step::Refuse => Err(ChatError::Transport("connection refused".into())),
            Step::Hang => futures::future::pending().await,
            Step::Accept => {
                let (to_client, inbound) = fmpsc::unbounded();
                let (outbound, from_client) = fmpsc::unbounded::<String>();
                let _ = self.accepted.send(ServerSide {
                    to_client,
                    from_client,
                });
                Ok(Connection {
                    sink: Box::pin(
                        outbound.sink_map_err(|e| ChatError::Transport(e.to_string())),
                    ),
                    stream: inbound.boxed(),
                })
            }
        }
    }
}

/// Serves queued responses; the last one repeats
pub struct FakeHistory {
    responses: Mutex<VecDeque<ChatResult<Vec<ChatMessage>>>>,
    delay: Duration,
    calls: AtomicUsize,
}

impl FakeHistory {
    pub fn new(responses: Vec<ChatResult<Vec<ChatMessage>>>) -> Arc<Self> {
        Self::with_delay(responses, Duration::ZERO)
    }

    pub fn with_delay(responses: Vec<ChatResult<Vec<ChatMessage>>>, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            responses: Mutex::new(responses.into()),
            delay,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn empty() -> Arc<Self> {
        Self::new(vec![Ok(Vec::new())])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl HistoryFetcher for FakeHistory {
    async fn fetch_history(
        &self,
        _key: &ConversationKey,
        _limit: usize,
    ) -> ChatResult<Vec<ChatMessage>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let mut responses = self.responses.lock();
        if responses.len() > 1 {
            responses.pop_front().unwrap_or_else(|| Ok(Vec::new()))
        } else {
            responses.front().cloned().unwrap_or_else(|| Ok(Vec::new()))
        }
    }
}

pub fn conversation() -> ConversationKey {
    ConversationKey::new(Role::Business, "77")
}

pub fn session_config(
    connector: Arc<FakeConnector>,
    history: Arc<FakeHistory>,
    token: Option<&str>,
) -> SessionConfig {
    SessionConfig {
        key: conversation(),
        endpoints: ChatEndpoints::new("http://chat.test/api", "ws://chat.test"),
        credentials: Arc::new(StaticCredentials::new(token.map(str::to_string))),
        history,
        connector,
        reconnect: ReconnectPolicy::fixed_default(),
        history_page_size: 50,
        connect_timeout: Duration::from_secs(10),
    }
}

/// Poll the session until `check` holds
pub async fn wait_for<F>(session: &ChatSession, what: &str, mut check: F)
where
    F: FnMut(&SessionSnapshot) -> bool,
{
    for _ in 0..10_000 {
        if check(&session.snapshot()) {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("timed out waiting for {what}");
}

pub async fn next_outbound(server: &mut ServerSide) -> Option<String> {
    server.from_client.next().await
}
