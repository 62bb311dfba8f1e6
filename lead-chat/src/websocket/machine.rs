//! Pure chat session state machine
//!
//! ```text
//! IDLE -> CONNECTING -> OPEN -> (CLOSED | RECONNECTING -> CONNECTING) -> TERMINATED
//!      \-> history LOADING -> LOADED | FAILED        (independent of the above)
//! ```
//!
//! No I/O happens here; the async driver in `session.rs` feeds events in and
//! acts on the returned outcomes. Once terminated, every input is ignored.

use resilience::{ReconnectBudget, ReconnectPolicy};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::message_log::MessageLog;
use super::message_types::InboundFrame;
use crate::error::{ChatError, ChatResult};
use crate::models::ChatMessage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConnectionState {
    Idle,
    Connecting,
    Open,
    Reconnecting,
    Closed,
    Terminated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryState {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameOutcome {
    Appended(ChatMessage),
    Duplicate,
    ServerError(String),
    Ignored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Reconnect { attempt: u32, delay: Duration },
    GiveUp,
}

#[derive(Debug, Clone, PartialEq)]
pub enum HistoryOutcome {
    Applied { count: usize },
    Failed(String),
    Stale,
}

/// Token identifying one history load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryTicket(u64);

/// Point-in-time copy of the session for rendering
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub messages: Vec<ChatMessage>,
    pub connection_state: ConnectionState,
    pub reconnect_attempt: u32,
    pub history: HistoryState,
}

#[derive(Debug)]
pub struct SessionMachine {
    log: MessageLog,
    connection: ConnectionState,
    budget: ReconnectBudget,
    history: HistoryState,
    history_generation: u64,
}

impl SessionMachine {
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            log: MessageLog::new(),
            connection: ConnectionState::Idle,
            budget: ReconnectBudget::new(policy),
            history: HistoryState::Idle,
            history_generation: 0,
        }
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.connection
    }

    pub fn history_state(&self) -> &HistoryState {
        &self.history
    }

    pub fn reconnect_attempt(&self) -> u32 {
        self.budget.attempts()
    }

    pub fn is_terminated(&self) -> bool {
        self.connection == ConnectionState::Terminated
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.log.messages()
    }

    /// Enter CONNECTING. Returns false when the session is terminated.
    pub fn begin_connect(&mut self) -> bool {
        if self.is_terminated() {
            return false;
        }
        debug!(
            "Connecting (attempt {}/{})",
            self.budget.attempts(),
            self.budget.policy().max_attempts
        );
        self.connection = ConnectionState::Connecting;
        true
    }

    /// Handshake succeeded: OPEN and a fresh reconnect budget
    pub fn on_open(&mut self) -> bool {
        if self.is_terminated() {
            return false;
        }
        info!("Chat stream open");
        self.connection = ConnectionState::Open;
        self.budget.reset();
        true
    }

    pub fn on_frame(&mut self, frame: InboundFrame) -> FrameOutcome {
        if self.is_terminated() {
            return FrameOutcome::Ignored;
        }
        match frame {
            InboundFrame::ChatMessage { data } => {
                if self.log.append(data.clone()) {
                    FrameOutcome::Appended(data)
                } else {
                    debug!("Dropping duplicate message {}", data.id);
                    FrameOutcome::Duplicate
                }
            }
            InboundFrame::Error { message } => {
                warn!("Server reported error: {}", message);
                FrameOutcome::ServerError(message)
            }
        }
    }

    /// Connection dropped or a connect attempt failed.
    ///
    /// Returns `None` when terminated (nothing to do).
    pub fn on_close(&mut self) -> Option<CloseOutcome> {
        if self.is_terminated() {
            return None;
        }
        match self.budget.next_delay() {
            Some(delay) => {
                self.connection = ConnectionState::Reconnecting;
                let attempt = self.budget.attempts();
                info!("Chat stream closed, reconnect {} in {:?}", attempt, delay);
                Some(CloseOutcome::Reconnect { attempt, delay })
            }
            None => {
                self.connection = ConnectionState::Closed;
                warn!("Chat stream closed, reconnect budget exhausted");
                Some(CloseOutcome::GiveUp)
            }
        }
    }

    /// Stop reconnecting after an error no retry can fix
    pub fn give_up(&mut self) -> bool {
        if self.is_terminated() {
            return false;
        }
        self.connection = ConnectionState::Closed;
        true
    }

    pub fn begin_history_load(&mut self) -> Option<HistoryTicket> {
        if self.is_terminated() {
            return None;
        }
        self.history_generation += 1;
        self.history = HistoryState::Loading;
        Some(HistoryTicket(self.history_generation))
    }

    pub fn finish_history_load(
        &mut self,
        ticket: HistoryTicket,
        result: ChatResult<Vec<ChatMessage>>,
    ) -> HistoryOutcome {
        if self.is_terminated() || ticket.0 != self.history_generation {
            return HistoryOutcome::Stale;
        }
        match result {
            Ok(history) => {
                let fetched = history.len();
                self.log.seed_history(history);
                self.history = HistoryState::Loaded;
                info!("Loaded {} history messages", fetched);
                HistoryOutcome::Applied { count: fetched }
            }
            Err(e) => {
                warn!("History load failed: {}", e);
                let reason = e.user_message();
                self.history = HistoryState::Failed(reason.clone());
                HistoryOutcome::Failed(reason)
            }
        }
    }

    /// Validate an outgoing message. Returns the text to transmit.
    pub fn check_send<'a>(&self, text: &'a str) -> ChatResult<&'a str> {
        if self.is_terminated() {
            return Err(ChatError::Terminated);
        }
        if text.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if self.connection != ConnectionState::Open {
            return Err(ChatError::NotConnected);
        }
        Ok(text)
    }

    /// Enter TERMINATED; attempt counter resets and later inputs are ignored
    pub fn terminate(&mut self) {
        if self.is_terminated() {
            return;
        }
        info!("Chat session terminated");
        self.connection = ConnectionState::Terminated;
        self.budget.reset();
        self.history_generation += 1;
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            messages: self.log.messages().to_vec(),
            connection_state: self.connection,
            reconnect_attempt: self.budget.attempts(),
            history: self.history.clone(),
        }
    }
}
