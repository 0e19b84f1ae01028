//! HTTP binding for the three chat endpoints.
//!
//! Every request disables caching. Any 2xx status is success; everything
//! else is [`ChatError::Status`]. A 2xx body that parses as JSON but has the
//! wrong shape degrades to an empty collection.

use reqwest::header::{CACHE_CONTROL, HeaderMap, HeaderValue, PRAGMA};
use serde_json::Value;

use crate::common::{ChatMessage, SendRequest, Sender};
use crate::config::ClientConfig;
use crate::error::{ChatError, Result};

const SESSIONS_ENDPOINT: &str = "/chat/sessions";
const HISTORY_ENDPOINT: &str = "/chat/history";
const SEND_ENDPOINT: &str = "/chat/send";

#[derive(Debug, Clone)]
pub struct ChatApi {
    base: String,
    http: reqwest::Client,
}

impl ChatApi {
    pub fn new(base: &str) -> Result<Self> {
        Self::build(base, reqwest::Client::builder())
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        Self::build(&config.api_base, builder)
    }

    fn build(base: &str, builder: reqwest::ClientBuilder) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));

        let http = builder
            .default_headers(headers)
            .build()
            .map_err(|source| ChatError::Transport {
                endpoint: "client",
                source,
            })?;

        Ok(Self {
            base: normalize_base(base),
            http,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base, path)
        } else {
            format!("{}/{}", self.base, path)
        }
    }

    /// `GET /chat/sessions`, in server order.
    pub async fn list_sessions(&self) -> Result<Vec<String>> {
        let body = self
            .get_json(SESSIONS_ENDPOINT, self.http.get(self.url(SESSIONS_ENDPOINT)))
            .await?;
        Ok(sessions_from_body(&body))
    }

    /// `GET /chat/history?session_id=…`.
    pub async fn history(&self, session_id: &str) -> Result<Vec<ChatMessage>> {
        let request = self
            .http
            .get(self.url(HISTORY_ENDPOINT))
            .query(&[("session_id", session_id)]);
        let body = self.get_json(HISTORY_ENDPOINT, request).await?;
        Ok(messages_from_body(body))
    }

    /// `POST /chat/send`. The response body is ignored.
    pub async fn send(&self, session_id: &str, message: &str, sender: &Sender) -> Result<()> {
        let payload = SendRequest {
            session_id,
            message,
            sender: sender.as_str(),
        };
        let response = self
            .http
            .post(self.url(SEND_ENDPOINT))
            .json(&payload)
            .send()
            .await
            .map_err(|source| ChatError::Transport {
                endpoint: SEND_ENDPOINT,
                source,
            })?;

        check_status(SEND_ENDPOINT, &response)?;
        Ok(())
    }

    async fn get_json(
        &self,
        endpoint: &'static str,
        request: reqwest::RequestBuilder,
    ) -> Result<Value> {
        let response = request
            .send()
            .await
            .map_err(|source| ChatError::Transport { endpoint, source })?;
        check_status(endpoint, &response)?;

        let bytes = response
            .bytes()
            .await
            .map_err(|source| ChatError::Transport { endpoint, source })?;
        serde_json::from_slice(&bytes).map_err(|source| ChatError::Decode { endpoint, source })
    }
}

/// Strips trailing slashes from the configured base URL.
pub fn normalize_base(base: &str) -> String {
    base.trim().trim_end_matches('/').to_string()
}

fn check_status(endpoint: &'static str, response: &reqwest::Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(ChatError::Status {
            endpoint,
            status: status.as_u16(),
        })
    }
}

/// Session ids in server order. Numeric ids are kept as their text.
fn sessions_from_body(body: &Value) -> Vec<String> {
    let Some(entries) = body.get("sessions").and_then(Value::as_array) else {
        return Vec::new();
    };

    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            other => {
                log::debug!("Skipping session entry that is not an id: {other}");
                None
            }
        })
        .collect()
}

fn messages_from_body(mut body: Value) -> Vec<ChatMessage> {
    let Some(Value::Array(entries)) = body.get_mut("messages").map(Value::take) else {
        return Vec::new();
    };

    entries
        .into_iter()
        .filter_map(|entry| {
            if !entry.is_object() {
                log::debug!("Skipping history entry that is not an object: {entry}");
                return None;
            }
            match serde_json::from_value::<ChatMessage>(entry) {
                Ok(message) => Some(message),
                Err(err) => {
                    log::debug!("Skipping malformed history entry: {err}");
                    None
                }
            }
        })
        .collect()
}
