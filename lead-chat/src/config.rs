use dotenvy::dotenv;
use resilience::ReconnectPolicy;
use std::env;
use std::time::Duration;

use crate::error::{ChatError, ChatResult};
use crate::models::{ConversationKey, Role};
use crate::services::ChatEndpoints;

#[derive(Debug, Clone)]
pub struct ReconnectConfig {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub ws_url: String,
    pub token: Option<String>,
    pub role: Role,
    pub counterpart_id: Option<String>,
    pub history_limit: usize,
    pub reconnect: ReconnectConfig,
    pub connect_timeout_ms: u64,
    pub http_timeout_ms: u64,
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl ClientConfig {
    pub fn from_env() -> ChatResult<Self> {
        dotenv().ok();

        let api_url = env::var("LEAD_CHAT_API_URL")
            .map_err(|_| ChatError::Config("LEAD_CHAT_API_URL missing".into()))?;
        let ws_url = match env::var("LEAD_CHAT_WS_URL") {
            Ok(url) if !url.trim().is_empty() => url,
            _ => ChatEndpoints::derive_ws_base(&api_url)?,
        };

        let token = env::var("LEAD_CHAT_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());

        let role = match env::var("LEAD_CHAT_ROLE") {
            Ok(value) => value.parse()?,
            Err(_) => Role::Business,
        };
        let counterpart_id = env::var("LEAD_CHAT_COUNTERPART_ID")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let history_limit = parse_or("LEAD_CHAT_HISTORY_LIMIT", 50);

        // Reconnect: 5 attempts spaced 3s apart unless overridden
        let reconnect = ReconnectConfig {
            max_attempts: parse_or(
                "LEAD_CHAT_RECONNECT_MAX_ATTEMPTS",
                ReconnectPolicy::DEFAULT_MAX_ATTEMPTS,
            ),
            delay_ms: parse_or(
                "LEAD_CHAT_RECONNECT_DELAY_MS",
                ReconnectPolicy::DEFAULT_DELAY.as_millis() as u64,
            ),
        };

        let connect_timeout_ms = parse_or("LEAD_CHAT_CONNECT_TIMEOUT_MS", 10_000);
        let http_timeout_ms = parse_or("LEAD_CHAT_HTTP_TIMEOUT_MS", 15_000);

        Ok(Self {
            api_url,
            ws_url,
            token,
            role,
            counterpart_id,
            history_limit,
            reconnect,
            connect_timeout_ms,
            http_timeout_ms,
        })
    }

    pub fn endpoints(&self) -> ChatEndpoints {
        ChatEndpoints::new(&self.api_url, &self.ws_url)
    }

    pub fn reconnect_policy(&self) -> ReconnectPolicy {
        ReconnectPolicy::fixed(
            self.reconnect.max_attempts,
            Duration::from_millis(self.reconnect.delay_ms),
        )
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_millis(self.http_timeout_ms)
    }

    /// Conversation to open, when a counterpart is configured
    pub fn conversation_key(&self) -> Option<ConversationKey> {
        self.counterpart_id
            .as_ref()
            .map(|id| ConversationKey::new(self.role, id.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "LEAD_CHAT_API_URL",
        "LEAD_CHAT_WS_URL",
        "LEAD_CHAT_TOKEN",
        "LEAD_CHAT_ROLE",
        "LEAD_CHAT_COUNTERPART_ID",
        "LEAD_CHAT_HISTORY_LIMIT",
        "LEAD_CHAT_RECONNECT_MAX_ATTEMPTS",
        "LEAD_CHAT_RECONNECT_DELAY_MS",
        "LEAD_CHAT_CONNECT_TIMEOUT_MS",
        "LEAD_CHAT_HTTP_TIMEOUT_MS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    #[serial]
    fn test_defaults() {
        clear_env();
        env::set_var("LEAD_CHAT_API_URL", "https://api.example.com/api");

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.ws_url, "wss://api.example.com/api");
        assert_eq!(config.role, Role::Business);
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.reconnect.max_attempts, 5);
        assert_eq!(config.reconnect_policy().base_delay, Duration::from_secs(3));
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
        assert!(config.token.is_none());
        assert!(config.conversation_key().is_none());
        clear_env();
    }

    #[test]
    #[serial]
    fn test_overrides_and_invalid_numbers() {
        clear_env();
        env::set_var("LEAD_CHAT_API_URL", "http://localhost:8080");
        env::set_var("LEAD_CHAT_WS_URL", "ws://localhost:9090");
        env::set_var("LEAD_CHAT_ROLE", "Freelancer");
        env::set_var("LEAD_CHAT_COUNTERPART_ID", "77");
        env::set_var("LEAD_CHAT_HISTORY_LIMIT", "twenty");
        env::set_var("LEAD_CHAT_RECONNECT_MAX_ATTEMPTS", "2");

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.ws_url, "ws://localhost:9090");
        assert_eq!(config.history_limit, 50);
        assert_eq!(config.reconnect.max_attempts, 2);
        assert_eq!(
            config.conversation_key(),
            Some(ConversationKey::new(Role::Freelancer, "77"))
        );
        clear_env();
    }

    #[test]
    #[serial]
    fn test_missing_api_url_and_bad_role() {
        clear_env();
        assert!(matches!(ClientConfig::from_env(), Err(ChatError::Config(_))));

        env::set_var("LEAD_CHAT_API_URL", "http://localhost:8080");
        env::set_var("LEAD_CHAT_ROLE", "admin");
        assert!(matches!(ClientConfig::from_env(), Err(ChatError::Config(_))));
        clear_env();
    }
}
