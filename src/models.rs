//! Client for an OpenAI-compatible `GET /models` endpoint.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ProviderConfig;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

/// One entry of the provider's model list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ModelRecord {
    pub id: String,
    #[serde(default)]
    pub owned_by: String,
    /// Groq marks retired models inactive; other providers omit the field.
    #[serde(default)]
    pub active: Option<bool>,
}

impl ModelRecord {
    /// A model counts as active unless the provider says otherwise.
    pub fn is_active(&self) -> bool {
        self.active.unwrap_or(true)
    }
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<ModelRecord>,
}

/// Source of model records.
pub trait ModelLister {
    fn list_models(&self) -> Result<Vec<ModelRecord>, ProviderError>;
}

pub struct ProviderClient {
    client: reqwest::blocking::Client,
    base_url: String,
    api_key: String,
}

impl ProviderClient {
    pub fn new(
        base_url: &str,
        api_key: String,
        timeout: Option<Duration>,
    ) -> Result<Self, ProviderError> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        })
    }

    pub fn from_config(config: &ProviderConfig, api_key: String) -> Result<Self, ProviderError> {
        Self::new(&config.base_url, api_key, config.timeout())
    }

    fn models_url(&self) -> String {
        format!("{}/models", self.base_url)
    }
}

impl ModelLister for ProviderClient {
    fn list_models(&self) -> Result<Vec<ModelRecord>, ProviderError> {
        let url = self.models_url();
        debug!(url = %url, "list_models_request");

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text()?;
        let list = parse_model_list(&body)?;
        info!(count = list.len(), "list_models_ok");
        Ok(list)
    }
}

/// Parses a `{"data": [...]}` model list body.
pub fn parse_model_list(body: &str) -> Result<Vec<ModelRecord>, ProviderError> {
    serde_json::from_str::<ModelList>(body)
        .map(|list| list.data)
        .map_err(|e| ProviderError::InvalidResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    const GROQ_BODY: &str = r#"{
        "object": "list",
        "data": [
            {
                "id": "llama-3.3-70b-versatile",
                "object": "model",
                "created": 1733447754,
                "owned_by": "Meta",
                "active": true,
                "context_window": 131072,
                "public_apps": null
            },
            {
                "id": "old-model",
                "object": "model",
                "owned_by": "Someone",
                "active": false
            }
        ]
    }"#;

    /// Serves one canned HTTP response and reports the request head it received.
    fn serve_once(
        status_line: &'static str,
        body: &'static str,
    ) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut head = String::new();
            loop {
                let mut line = String::new();
                if reader.read_line(&mut line).unwrap() == 0 || line == "\r\n" {
                    break;
                }
                head.push_str(&line);
            }
            let response = format!(
                "{status_line}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
            let _ = tx.send(head);
        });

        (format!("http://{addr}/openai/v1/"), rx)
    }

    #[test]
    fn test_parse_model_list() {
        let models = parse_model_list(GROQ_BODY).unwrap();
        assert_eq!(models.len(), 2);
        assert_eq!(models[0].id, "llama-3.3-70b-versatile");
        assert_eq!(models[0].owned_by, "Meta");
        assert!(models[0].is_active());
        assert!(!models[1].is_active());
    }

    #[test]
    fn test_parse_model_list_missing_optional_fields() {
        let models = parse_model_list(r#"{"data": [{"id": "bare"}]}"#).unwrap();
        assert_eq!(models[0].id, "bare");
        assert_eq!(models[0].owned_by, "");
        assert!(models[0].active.is_none());
        assert!(models[0].is_active());
    }

    #[test]
    fn test_parse_model_list_rejects_garbage() {
        let err = parse_model_list("<html>nope</html>").unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[test]
    fn test_parse_model_list_requires_data() {
        let err = parse_model_list(r#"{"object": "list"}"#).unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[test]
    fn test_models_url_strips_trailing_slash() {
        let client =
            ProviderClient::new("https://api.groq.com/openai/v1/", "k".into(), None).unwrap();
        assert_eq!(client.models_url(), "https://api.groq.com/openai/v1/models");
    }

    #[test]
    fn test_list_models_sends_bearer_and_parses() {
        let (base_url, rx) = serve_once("HTTP/1.1 200 OK", GROQ_BODY);
        let client = ProviderClient::new(
            &base_url,
            "gsk_test_key".into(),
            Some(Duration::from_secs(5)),
        )
        .unwrap();

        let models = client.list_models().unwrap();
        assert_eq!(models.len(), 2);

        let head = rx.recv().unwrap();
        assert!(head.starts_with("GET /openai/v1/models "));
        assert!(
            head.lines()
                .any(|l| l.eq_ignore_ascii_case("authorization: Bearer gsk_test_key"))
        );
    }

    #[test]
    fn test_list_models_maps_error_status() {
        let (base_url, _rx) = serve_once(
            "HTTP/1.1 401 Unauthorized",
            r#"{"error":{"message":"Invalid API Key"}}"#,
        );
        let client =
            ProviderClient::new(&base_url, "bad".into(), Some(Duration::from_secs(5))).unwrap();

        match client.list_models().unwrap_err() {
            ProviderError::Status { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("Invalid API Key"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_status_error_display() {
        let err = ProviderError::Status {
            status: 503,
            body: "down".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 503: down");
    }
}
