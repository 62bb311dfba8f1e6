use parking_lot::RwLock;

/// Supplies the bearer credential for REST calls and the stream handshake.
///
/// Injected into sessions and clients; nothing reads tokens from ambient
/// global state.
pub trait CredentialProvider: Send + Sync {
    fn bearer_token(&self) -> Option<String>;
}

/// Token held in memory, replaceable after a refresh
#[derive(Debug, Default)]
pub struct StaticCredentials {
    token: RwLock<Option<String>>,
}

impl StaticCredentials {
    pub fn new(token: Option<String>) -> Self {
        Self {
            token: RwLock::new(token.filter(|t| !t.trim().is_empty())),
        }
    }

    pub fn set_token(&self, token: Option<String>) {
        *self.token.write() = token.filter(|t| !t.trim().is_empty());
    }
}

impl CredentialProvider for StaticCredentials {
    fn bearer_token(&self) -> Option<String> {
        self.token.read().clone()
    }
}
