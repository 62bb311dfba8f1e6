use std::time::Duration;
use thiserror::Error;

pub type ChatResult<T> = Result<T, ChatError>;

#[derive(Debug, Error, Clone)]
pub enum ChatError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("http error: {0}")]
    Http(String),

    #[error("api error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("decode error: {0}")]
    Decode(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),

    #[error("not connected")]
    NotConnected,

    #[error("message cannot be empty")]
    EmptyMessage,

    #[error("missing credential")]
    MissingCredential,

    #[error("session terminated")]
    Terminated,
}

impl From<reqwest::Error> for ChatError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ChatError::Decode(e.to_string())
        } else {
            ChatError::Http(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ChatError {
    fn from(e: serde_json::Error) -> Self {
        ChatError::Decode(e.to_string())
    }
}

impl From<tokio_tungstenite::tungstenite::Error> for ChatError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        ChatError::Transport(e.to_string())
    }
}

impl ChatError {
    /// Returns whether retrying the same operation can succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            ChatError::Http(_) | ChatError::Transport(_) | ChatError::ConnectTimeout(_) => true,
            ChatError::Api { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// Short text suitable for a toast or status line
    pub fn user_message(&self) -> String {
        match self {
            ChatError::EmptyMessage => "Message cannot be empty".to_string(),
            ChatError::NotConnected => "Not connected to chat".to_string(),
            ChatError::MissingCredential => "You are not signed in".to_string(),
            ChatError::Api { status: 401, .. } | ChatError::Api { status: 403, .. } => {
                "You do not have access to this conversation".to_string()
            }
            ChatError::Http(_) | ChatError::ConnectTimeout(_) | ChatError::Transport(_) => {
                "Network problem, please try again".to_string()
            }
            ChatError::Terminated => "Conversation closed".to_string(),
            ChatError::Config(_) | ChatError::Api { .. } | ChatError::Decode(_) => {
                "Something went wrong, please try again".to_string()
            }
        }
    }
}
