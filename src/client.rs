//! Chat completions client.
//!
//! Sends requests to a remote OpenAI-compatible endpoint and returns either a
//! complete response or a live fragment stream. One client per endpoint; the
//! configuration is read-only for the client's lifetime. No retries, no
//! queuing: one call, one HTTP exchange.

use std::time::Duration;

use reqwest::Client as HttpClient;

use crate::config::ChatConfig;
use crate::errors::ChatError;
use crate::streaming::ChatStream;
use crate::types::{ChatRequest, ChatResponse, ModelInfo, ModelList};

// ─── Constants ───────────────────────────────────────────────────────────────

/// TCP connection timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Total request timeout for non-streaming calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Total request timeout for streaming calls.
///
/// The timeout covers the whole body, not just the first byte. Reasoning
/// models can stream for minutes on long prompts, so this stays generous.
const STREAM_REQUEST_TIMEOUT: Duration = Duration::from_secs(600);

/// Path of the model directory, on the same host as the completions endpoint.
const MODELS_PATH: &str = "/v1/models";

// ─── ChatClient ──────────────────────────────────────────────────────────────

/// Client for a remote chat completions endpoint.
///
/// Construction builds the underlying HTTP clients; connectivity is not
/// checked until the first request. Every operation returns a typed
/// [`ChatError`] on failure. Callers that want the folding behavior instead
/// wrap this in [`crate::LenientClient`].
pub struct ChatClient {
    /// HTTP client for non-streaming requests.
    http: HttpClient,
    /// HTTP client for streaming requests (longer total timeout).
    http_stream: HttpClient,
    config: ChatConfig,
}

impl ChatClient {
    /// Create a client for the endpoint described by `config`.
    pub fn new(config: ChatConfig) -> Result<Self, ChatError> {
        let http = HttpClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ChatError::Transport {
                endpoint: config.api_url.clone(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        let http_stream = HttpClient::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(STREAM_REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ChatError::Transport {
                endpoint: config.api_url.clone(),
                reason: format!("failed to build streaming HTTP client: {e}"),
            })?;

        Ok(Self {
            http,
            http_stream,
            config,
        })
    }

    /// The configuration this client was built with.
    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    // ─── Chat Completion (non-streaming) ─────────────────────────────────

    /// Send a chat completion request and wait for the full response.
    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ChatError> {
        let body = self.prepare(request, false);

        // Log the request metadata (not the message bodies, which can be huge)
        tracing::info!(
            url = %self.config.api_url,
            model = %body.model,
            message_count = body.messages.len(),
            stream = body.stream,
            "sending chat completion request"
        );

        let response = self
            .http
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Transport {
                endpoint: self.config.api_url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ChatError::Http {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let body_text = response.text().await.map_err(|e| ChatError::Transport {
            endpoint: self.config.api_url.clone(),
            reason: format!("failed to read response body: {e}"),
        })?;

        serde_json::from_str(&body_text).map_err(|e| ChatError::Decode {
            reason: e.to_string(),
            body: body_text,
        })
    }

    // ─── Chat Completion (streaming) ─────────────────────────────────────

    /// Send a chat completion request and return as soon as response headers
    /// arrive.
    ///
    /// The returned [`ChatStream`] yields fragments as the endpoint emits
    /// them. One stream per request; it cannot be restarted.
    pub async fn stream(&self, request: &ChatRequest) -> Result<ChatStream, ChatError> {
        let body = self.prepare(request, true);

        tracing::info!(
            url = %self.config.api_url,
            model = %body.model,
            message_count = body.messages.len(),
            stream = body.stream,
            "sending streaming chat completion request"
        );

        let response = self
            .http_stream
            .post(&self.config.api_url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .header("Accept", "text/event-stream")
            .send()
            .await
            .map_err(|e| ChatError::Transport {
                endpoint: self.config.api_url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ChatError::Http {
                status: status.as_u16(),
                body: body_text,
            });
        }

        Ok(ChatStream::from_response(response))
    }

    // ─── Model Directory ─────────────────────────────────────────────────

    /// List the models the endpoint advertises.
    ///
    /// The directory lives at `/v1/models` on the host of the configured
    /// completions endpoint, whatever path that endpoint uses.
    pub async fn models(&self) -> Result<Vec<ModelInfo>, ChatError> {
        let url = models_url(&self.config.api_url)?;

        tracing::info!(url = %url, "listing models");

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| ChatError::Transport {
                endpoint: url.clone(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ChatError::Http {
                status: status.as_u16(),
                body: body_text,
            });
        }

        let body_text = response.text().await.map_err(|e| ChatError::Transport {
            endpoint: url.clone(),
            reason: format!("failed to read response body: {e}"),
        })?;

        let list: ModelList = serde_json::from_str(&body_text).map_err(|e| ChatError::Decode {
            reason: e.to_string(),
            body: body_text,
        })?;

        Ok(list.data)
    }

    // ─── Request Preparation ─────────────────────────────────────────────

    /// Clone the caller's request with the per-call adjustments applied: the
    /// configured default model when `model` is empty, and the stream flag
    /// for the chosen call mode.
    fn prepare(&self, request: &ChatRequest, stream: bool) -> ChatRequest {
        let mut body = request.clone();
        if body.model.is_empty() {
            body.model = self.config.default_model.clone();
        }
        body.stream = stream;
        body
    }
}

/// Derive the model directory URL from the completions endpoint URL,
/// preserving scheme, host, and port.
fn models_url(api_url: &str) -> Result<String, ChatError> {
    let mut url = reqwest::Url::parse(api_url).map_err(|e| ChatError::Transport {
        endpoint: api_url.to_string(),
        reason: format!("invalid endpoint URL: {e}"),
    })?;
    url.set_path(MODELS_PATH);
    url.set_query(None);
    Ok(url.to_string())
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;

    fn test_client() -> ChatClient {
        ChatClient::new(ChatConfig::new(
            "https://api.example.com/v4/chat/completions",
            "sk-test",
            "default-model",
        ))
        .unwrap()
    }

    #[test]
    fn test_prepare_substitutes_default_model() {
        let client = test_client();
        let request = ChatRequest {
            messages: vec![ChatMessage::user("hi")],
            ..ChatRequest::default()
        };

        let body = client.prepare(&request, false);
        assert_eq!(body.model, "default-model");

        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"model\":\"default-model\""));
    }

    #[test]
    fn test_prepare_keeps_explicit_model() {
        let client = test_client();
        let request = ChatRequest {
            model: "glm-4.7".to_string(),
            ..ChatRequest::default()
        };
        assert_eq!(client.prepare(&request, false).model, "glm-4.7");
    }

    #[test]
    fn test_prepare_sets_stream_flag_per_mode() {
        let client = test_client();
        let request = ChatRequest {
            stream: true,
            ..ChatRequest::default()
        };
        // The caller's flag is overridden by the call mode.
        assert!(!client.prepare(&request, false).stream);
        assert!(client.prepare(&request, true).stream);
    }

    #[test]
    fn test_prepare_does_not_touch_caller_request() {
        let client = test_client();
        let request = ChatRequest::default();
        let _ = client.prepare(&request, true);
        assert_eq!(request.model, "");
        assert!(!request.stream);
    }

    #[test]
    fn test_models_url_replaces_path() {
        let url = models_url("https://open.bigmodel.cn/api/paas/v4/chat/completions").unwrap();
        assert_eq!(url, "https://open.bigmodel.cn/v1/models");
    }

    #[test]
    fn test_models_url_preserves_port() {
        let url = models_url("http://localhost:8000/v4/chat/completions").unwrap();
        assert_eq!(url, "http://localhost:8000/v1/models");
    }

    #[test]
    fn test_models_url_drops_query() {
        let url = models_url("https://api.example.com/v4/chat/completions?beta=1").unwrap();
        assert_eq!(url, "https://api.example.com/v1/models");
    }

    #[test]
    fn test_models_url_rejects_invalid() {
        let err = models_url("not a url").unwrap_err();
        assert!(matches!(err, ChatError::Transport { .. }));
    }
}
