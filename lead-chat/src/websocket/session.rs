//! Async driver for one conversation
//!
//! Owns two tokio tasks: the connection task (connect, serve, reconnect timer)
//! and the history task. All state lives in [`SessionMachine`] behind a lock;
//! the tasks only feed it events and publish what it returns.

use futures_util::{SinkExt, StreamExt};
use parking_lot::{Mutex, RwLock};
use resilience::{with_timeout_result, ReconnectPolicy, TimeoutError};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::machine::{
    CloseOutcome, ConnectionState, FrameOutcome, HistoryOutcome, HistoryTicket, SessionMachine,
    SessionSnapshot,
};
use super::message_types::InboundFrame;
use super::transport::{Connection, Connector};
use crate::error::{ChatError, ChatResult};
use crate::models::{ChatMessage, ConversationKey};
use crate::services::{ChatEndpoints, CredentialProvider, HistoryFetcher};

const EVENT_CAPACITY: usize = 256;
const DISCONNECTED_NOTICE: &str = "Disconnected from chat. Re-open the conversation to retry.";

pub struct SessionConfig {
    pub key: ConversationKey,
    pub endpoints: ChatEndpoints,
    pub credentials: Arc<dyn CredentialProvider>,
    pub history: Arc<dyn HistoryFetcher>,
    pub connector: Arc<dyn Connector>,
    pub reconnect: ReconnectPolicy,
    pub history_page_size: usize,
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// User-facing status line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StateChanged(ConnectionState),
    MessageAppended(ChatMessage),
    HistoryLoaded { count: usize },
    Notice(Notice),
}

struct Shared {
    machine: RwLock<SessionMachine>,
    events: broadcast::Sender<SessionEvent>,
    /// Present only while the stream is OPEN
    outbound: Mutex<Option<mpsc::UnboundedSender<String>>>,
}

impl Shared {
    fn emit(&self, event: SessionEvent) {
        // no subscribers is fine
        let _ = self.events.send(event);
    }

    fn notice(&self, level: NoticeLevel, message: impl Into<String>) {
        self.emit(SessionEvent::Notice(Notice {
            level,
            message: message.into(),
        }));
    }

    fn handle_frame(&self, text: &str) {
        let frame = match InboundFrame::decode(text) {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Ignoring undecodable frame: {}", e);
                return;
            }
        };

        let outcome = self.machine.write().on_frame(frame);
        match outcome {
            FrameOutcome::Appended(message) => {
                debug!("Appended message {}", message.id);
                self.emit(SessionEvent::MessageAppended(message));
            }
            FrameOutcome::ServerError(message) => self.notice(NoticeLevel::Error, message),
            FrameOutcome::Duplicate | FrameOutcome::Ignored => {}
        }
    }
}

/// Live chat with one counterpart
///
/// Must be started inside a tokio runtime. Dropping the session tears it
/// down the same way [`ChatSession::shutdown`] does.
pub struct ChatSession {
    session_id: Uuid,
    config: Arc<SessionConfig>,
    shared: Arc<Shared>,
    shutdown_tx: watch::Sender<bool>,
    connection_task: Mutex<Option<JoinHandle<()>>>,
    history_task: Mutex<Option<JoinHandle<()>>>,
}

impl ChatSession {
    /// Start the history load and the connection concurrently
    pub fn start(config: SessionConfig) -> Self {
        let session_id = Uuid::new_v4();
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let shared = Arc::new(Shared {
            machine: RwLock::new(SessionMachine::new(config.reconnect.clone())),
            events,
            outbound: Mutex::new(None),
        });
        let config = Arc::new(config);

        info!("Starting chat session {} for {}", session_id, config.key);

        let span = info_span!("chat_session", session = %session_id, conversation = %config.key);
        let connection_task = tokio::spawn(
            run_connection(shared.clone(), config.clone(), shutdown_rx).instrument(span),
        );

        let session = Self {
            session_id,
            config,
            shared,
            shutdown_tx,
            connection_task: Mutex::new(Some(connection_task)),
            history_task: Mutex::new(None),
        };
        // Cannot fail: the machine is fresh
        let _ = session.reload_history();
        session
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.shared.machine.read().snapshot()
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.shared.machine.read().connection_state()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.shared.events.subscribe()
    }

    /// Queue raw text for transmission on the open stream.
    ///
    /// The message list is not touched; the server echo appends it.
    pub fn send(&self, text: &str) -> ChatResult<()> {
        let machine = self.shared.machine.read();
        let text = machine.check_send(text)?;

        let outbound = self.shared.outbound.lock();
        match outbound.as_ref() {
            Some(tx) => tx.send(text.to_string()).map_err(|_| ChatError::NotConnected),
            None => Err(ChatError::NotConnected),
        }
    }

    /// Fetch the latest history page again, superseding any load in flight
    pub fn reload_history(&self) -> ChatResult<()> {
        let ticket = self
            .shared
            .machine
            .write()
            .begin_history_load()
            .ok_or(ChatError::Terminated)?;

        let span = info_span!("chat_history", session = %self.session_id);
        let handle = tokio::spawn(
            run_history_load(self.shared.clone(), self.config.clone(), ticket).instrument(span),
        );

        if let Some(previous) = self.history_task.lock().replace(handle) {
            previous.abort();
        }
        // shutdown may have raced the spawn
        if self.shared.machine.read().is_terminated() {
            if let Some(handle) = self.history_task.lock().take() {
                handle.abort();
            }
        }
        Ok(())
    }

    /// Stop everything. Idempotent.
    pub fn shutdown(&self) {
        {
            let mut machine = self.shared.machine.write();
            if machine.is_terminated() {
                return;
            }
            machine.terminate();
        }

        let _ = self.shutdown_tx.send(true);
        if let Some(handle) = self.connection_task.lock().take() {
            handle.abort();
        }
        if let Some(handle) = self.history_task.lock().take() {
            handle.abort();
        }
        self.shared.outbound.lock().take();

        info!("Chat session {} shut down", self.session_id);
        self.shared.emit(SessionEvent::StateChanged(ConnectionState::Terminated));
    }
}

impl Drop for ChatSession {
    fn drop(&mut self) {
        self.shutdown();
    }
}

async fn run_history_load(shared: Arc<Shared>, config: Arc<SessionConfig>, ticket: HistoryTicket) {
    let result = config
        .history
        .fetch_history(&config.key, config.history_page_size)
        .await;

    let outcome = shared.machine.write().finish_history_load(ticket, result);
    match outcome {
        HistoryOutcome::Applied { count } => shared.emit(SessionEvent::HistoryLoaded { count }),
        HistoryOutcome::Failed(reason) => shared.notice(
            NoticeLevel::Warning,
            format!("Could not load chat history: {}", reason),
        ),
        HistoryOutcome::Stale => debug!("Discarding superseded history result"),
    }
}

async fn connect_once(config: &SessionConfig) -> ChatResult<Connection> {
    let token = config
        .credentials
        .bearer_token()
        .ok_or(ChatError::MissingCredential)?;
    // URL carries the token; never log it
    let url = config.endpoints.stream_url(&config.key, &token);

    with_timeout_result(config.connect_timeout, config.connector.connect(&url))
        .await
        .map_err(|e| match e {
            TimeoutError::Elapsed(after) => ChatError::ConnectTimeout(after),
            TimeoutError::OperationFailed(e) => e,
        })
}

enum ServeEnd {
    Closed,
    Shutdown,
}

async fn run_connection(
    shared: Arc<Shared>,
    config: Arc<SessionConfig>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        if !shared.machine.write().begin_connect() {
            return;
        }
        shared.emit(SessionEvent::StateChanged(ConnectionState::Connecting));

        let connected = tokio::select! {
            _ = shutdown.changed() => return,
            result = connect_once(&config) => result,
        };

        match connected {
            Ok(connection) => {
                if let ServeEnd::Shutdown = serve(&shared, connection, &mut shutdown).await {
                    return;
                }
            }
            Err(e) if !e.is_retryable() => {
                warn!("Chat connect failed permanently: {}", e);
                if shared.machine.write().give_up() {
                    shared.emit(SessionEvent::StateChanged(ConnectionState::Closed));
                    shared.notice(NoticeLevel::Error, e.user_message());
                }
                return;
            }
            Err(e) => warn!("Chat connect failed: {}", e),
        }

        let outcome = shared.machine.write().on_close();
        match outcome {
            Some(CloseOutcome::Reconnect { attempt, delay }) => {
                shared.emit(SessionEvent::StateChanged(ConnectionState::Reconnecting));
                debug!("Reconnect attempt {} scheduled in {:?}", attempt, delay);
                tokio::select! {
                    _ = shutdown.changed() => return,
                    _ = sleep(delay) => {}
                }
            }
            Some(CloseOutcome::GiveUp) => {
                shared.emit(SessionEvent::StateChanged(ConnectionState::Closed));
                shared.notice(NoticeLevel::Error, DISCONNECTED_NOTICE);
                return;
            }
            None => return,
        }
    }
}

async fn serve(
    shared: &Shared,
    connection: Connection,
    shutdown: &mut watch::Receiver<bool>,
) -> ServeEnd {
    let Connection {
        mut sink,
        mut stream,
    } = connection;

    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    if !shared.machine.write().on_open() {
        return ServeEnd::Shutdown;
    }
    *shared.outbound.lock() = Some(tx);
    shared.emit(SessionEvent::StateChanged(ConnectionState::Open));

    let end = loop {
        tokio::select! {
            _ = shutdown.changed() => break ServeEnd::Shutdown,
            Some(text) = rx.recv() => {
                if let Err(e) = sink.send(text).await {
                    warn!("Failed to send chat message: {}", e);
                    shared.notice(NoticeLevel::Warning, "Message could not be sent");
                    break ServeEnd::Closed;
                }
            }
            frame = stream.next() => match frame {
                Some(Ok(text)) => shared.handle_frame(&text),
                Some(Err(e)) => {
                    warn!("Chat stream error: {}", e);
                    break ServeEnd::Closed;
                }
                None => {
                    info!("Chat stream closed by server");
                    break ServeEnd::Closed;
                }
            },
        }
    };

    shared.outbound.lock().take();
    end
}
