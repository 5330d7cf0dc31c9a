//! Chatbot gateway
//!
//! Forwards a text query to an external natural-language service and
//! extracts the reply. Any failure (transport, timeout, bad status, missing
//! field) degrades to [`FALLBACK_REPLY`]; chat continuity wins over error
//! reporting.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::ChatbotConfig;
use crate::error::AppError;

/// Reply used whenever the service yields nothing usable
pub const FALLBACK_REPLY: &str = "I have no response to that. Sorry...";

/// Protocol version marker sent with every query
pub const PROTOCOL_VERSION: &str = "20150910";

/// Locale sent with every query
pub const LOCALE: &str = "en";

/// Something that answers chat messages
///
/// Implementations must never fail: errors are folded into a reply.
#[async_trait]
pub trait Chatbot: Send + Sync {
    /// Produce a reply for `text`
    async fn get_response(&self, text: &str) -> String;
}

/// Query body sent to the service
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    query: &'a str,
    lang: &'a str,
    session_id: &'a str,
    timezone: &'a str,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    result: Option<QueryResult>,
}

#[derive(Debug, Deserialize)]
struct QueryResult {
    fulfillment: Option<Fulfillment>,
}

#[derive(Debug, Deserialize)]
struct Fulfillment {
    speech: Option<String>,
}

impl QueryResponse {
    fn into_speech(self) -> Option<String> {
        self.result
            .and_then(|r| r.fulfillment)
            .and_then(|f| f.speech)
            .filter(|s| !s.trim().is_empty())
    }
}

/// Shared HTTP client and service settings
///
/// Built once per hub; each session gets its own [`ChatbotGateway`] from it.
#[derive(Clone)]
pub struct GatewaySettings {
    client: reqwest::Client,
    config: Arc<ChatbotConfig>,
    timezone: String,
}

impl GatewaySettings {
    /// Build the HTTP client with the configured request timeout
    pub fn new(config: ChatbotConfig) -> Result<Self, AppError> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        let timezone = config.timezone.clone().unwrap_or_else(local_timezone);
        Ok(Self {
            client,
            config: Arc::new(config),
            timezone,
        })
    }

    /// Create a gateway with a fresh service session identifier
    pub fn gateway(&self) -> ChatbotGateway {
        ChatbotGateway {
            settings: self.clone(),
            session_id: Uuid::new_v4().to_string(),
        }
    }
}

/// Adapter to the external chatbot service
///
/// Holds one session identifier for its whole life so the service can keep
/// conversational context across a session's messages.
pub struct ChatbotGateway {
    settings: GatewaySettings,
    session_id: String,
}

impl ChatbotGateway {
    /// Identifier sent as `sessionId`
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    async fn query(&self, text: &str) -> Result<Option<String>, reqwest::Error> {
        let config = &self.settings.config;
        let Some(api_key) = config.api_key.as_ref() else {
            debug!("No chatbot API key configured, skipping query");
            return Ok(None);
        };

        let body = QueryRequest {
            query: text,
            lang: LOCALE,
            session_id: &self.session_id,
            timezone: &self.settings.timezone,
        };

        let response = self
            .settings
            .client
            .post(format!("{}/query", config.endpoint))
            .query(&[("v", PROTOCOL_VERSION)])
            .bearer_auth(api_key.expose_secret())
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let parsed: QueryResponse = response.json().await?;
        Ok(parsed.into_speech())
    }
}

#[async_trait]
impl Chatbot for ChatbotGateway {
    async fn get_response(&self, text: &str) -> String {
        match self.query(text).await {
            Ok(Some(speech)) => speech,
            Ok(None) => {
                debug!("Chatbot returned no answer for session {}", self.session_id);
                FALLBACK_REPLY.to_string()
            }
            Err(e) => {
                warn!("Chatbot request failed: {}", e);
                FALLBACK_REPLY.to_string()
            }
        }
    }
}

/// Local UTC offset, e.g. `+02:00`
fn local_timezone() -> String {
    chrono::Local::now().format("%:z").to_string()
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn settings(endpoint: String, api_key: Option<&str>) -> GatewaySettings {
        GatewaySettings::new(ChatbotConfig {
            endpoint,
            api_key: api_key.map(|k| SecretString::from(k.to_string())),
            timeout: Duration::from_millis(500),
            timezone: Some("Europe/Stockholm".to_string()),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_reply_extracted_from_nested_field() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/query"))
            .and(query_param("v", PROTOCOL_VERSION))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(json!({
                "query": "hello",
                "lang": "en",
                "timezone": "Europe/Stockholm"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": { "fulfillment": { "speech": "Hi there!" } }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let gateway = settings(server.uri(), Some("test-key")).gateway();
        assert_eq!(gateway.get_response("hello").await, "Hi there!");
    }

    #[tokio::test]
    async fn test_session_id_is_stable_per_gateway() {
        let server = MockServer::start().await;
        let settings = settings(server.uri(), Some("test-key"));
        let gateway = settings.gateway();

        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "sessionId": gateway.session_id() })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": { "fulfillment": { "speech": "again" } }
            })))
            .expect(2)
            .mount(&server)
            .await;

        assert_eq!(gateway.get_response("one").await, "again");
        assert_eq!(gateway.get_response("two").await, "again");
        assert_ne!(settings.gateway().session_id(), gateway.session_id());
    }

    #[tokio::test]
    async fn test_missing_or_empty_field_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "query": "empty" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "result": { "fulfillment": { "speech": "" } }
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(json!({ "query": "absent" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": {} })))
            .mount(&server)
            .await;

        let gateway = settings(server.uri(), Some("test-key")).gateway();
        assert_eq!(gateway.get_response("empty").await, FALLBACK_REPLY);
        assert_eq!(gateway.get_response("absent").await, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_error_status_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("Unauthorized"))
            .mount(&server)
            .await;

        let gateway = settings(server.uri(), Some("bad-key")).gateway();
        assert_eq!(gateway.get_response("hello").await, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "result": { "fulfillment": { "speech": "late" } } }))
                    .set_delay(Duration::from_secs(3)),
            )
            .mount(&server)
            .await;

        let gateway = settings(server.uri(), Some("test-key")).gateway();
        assert_eq!(gateway.get_response("hello").await, FALLBACK_REPLY);
    }

    #[tokio::test]
    async fn test_no_api_key_skips_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let gateway = settings(server.uri(), None).gateway();
        assert_eq!(gateway.get_response("hello").await, FALLBACK_REPLY);
    }

    #[test]
    fn test_local_timezone_format() {
        let tz = local_timezone();
        assert_eq!(tz.len(), 6);
        assert!(tz.starts_with('+') || tz.starts_with('-'));
    }
}
