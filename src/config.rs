//! Runtime configuration
//!
//! Read from environment variables. The bind address can also be given as
//! the first command line argument (see `main.rs`).

use std::time::Duration;

use secrecy::SecretString;

use crate::error::AppError;

/// Default server address
pub const DEFAULT_ADDR: &str = "127.0.0.1:8080";

/// Default chatbot service base URL
pub const DEFAULT_CHATBOT_ENDPOINT: &str = "https://api.api.ai/v1";

/// Default chatbot request timeout in seconds
pub const DEFAULT_CHATBOT_TIMEOUT_SECS: u64 = 10;

/// Hub configuration
#[derive(Debug)]
pub struct Config {
    /// Address the WebSocket listener binds to
    pub bind_addr: String,
    /// External chatbot service settings
    pub chatbot: ChatbotConfig,
}

/// External chatbot service settings
#[derive(Debug)]
pub struct ChatbotConfig {
    /// Base URL, without the `/query` path
    pub endpoint: String,
    /// Bearer token; without one every query gets the fallback reply
    pub api_key: Option<SecretString>,
    /// Upper bound on a single request
    pub timeout: Duration,
    /// Timezone sent with each query; local UTC offset when unset
    pub timezone: Option<String>,
}

impl Default for ChatbotConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CHATBOT_ENDPOINT.to_string(),
            api_key: None,
            timeout: Duration::from_secs(DEFAULT_CHATBOT_TIMEOUT_SECS),
            timezone: None,
        }
    }
}

impl Config {
    /// Load configuration from the process environment
    ///
    /// - `CHAT_HUB_ADDR`: bind address
    /// - `CHATBOT_ENDPOINT`: chatbot service base URL
    /// - `CHATBOT_API_KEY`: chatbot bearer token
    /// - `CHATBOT_TIMEOUT_SECS`: request timeout, positive integer
    /// - `CHATBOT_TIMEZONE`: timezone descriptor sent with queries
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let timeout = match non_empty("CHATBOT_TIMEOUT_SECS") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => {
                    return Err(AppError::Config(format!(
                        "CHATBOT_TIMEOUT_SECS must be a positive integer, got '{}'",
                        raw
                    )))
                }
            },
            None => Duration::from_secs(DEFAULT_CHATBOT_TIMEOUT_SECS),
        };

        Ok(Self {
            bind_addr: non_empty("CHAT_HUB_ADDR").unwrap_or_else(|| DEFAULT_ADDR.to_string()),
            chatbot: ChatbotConfig {
                endpoint: non_empty("CHATBOT_ENDPOINT")
                    .map(|url| url.trim_end_matches('/').to_string())
                    .unwrap_or_else(|| DEFAULT_CHATBOT_ENDPOINT.to_string()),
                api_key: non_empty("CHATBOT_API_KEY").map(SecretString::from),
                timeout,
                timezone: non_empty("CHATBOT_TIMEZONE"),
            },
        })
    }
}
