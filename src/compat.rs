//! Error-folding client for legacy callers.
//!
//! The original surface of this library never returned errors: a failed
//! request came back as a normal-looking response whose text described the
//! failure. [`LenientClient`] keeps that contract available as an adapter
//! over [`ChatClient`], for callers that want a single code path and
//! human-readable failures inline in the transcript.

use crate::client::ChatClient;
use crate::config::ChatConfig;
use crate::errors::ChatError;
use crate::streaming::ChatStream;
use crate::types::{ChatRequest, ChatResponse, Choice, ModelInfo, ResponseMessage};

/// Model id of the sentinel entry returned when the directory listing fails.
pub const INVALID_REQUEST_MODEL_ID: &str = "Invalid request";

/// Role stamped on folded failure messages, distinguishing them from real
/// assistant turns.
const FOLDED_ROLE: &str = "System";

/// Wrapper around [`ChatClient`] whose operations cannot fail.
///
/// Failures come back folded into the normal response shapes with the
/// failure text as content. Callers that need to branch on failure kinds
/// should use [`ChatClient`] directly.
pub struct LenientClient {
    inner: ChatClient,
}

impl LenientClient {
    pub fn new(config: ChatConfig) -> Result<Self, ChatError> {
        Ok(Self {
            inner: ChatClient::new(config)?,
        })
    }

    /// The wrapped strict client.
    pub fn inner(&self) -> &ChatClient {
        &self.inner
    }

    /// Chat completion that always yields a response.
    ///
    /// On failure the response has one choice whose message carries the
    /// failure text under the `"System"` role, so a transcript shows what
    /// went wrong in place of the reply.
    pub async fn complete(&self, request: &ChatRequest) -> ChatResponse {
        match self.inner.complete(request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "chat completion failed, folding into response");
                folded_response(e.fold_text())
            }
        }
    }

    /// Streaming completion that always yields a stream.
    ///
    /// On failure the stream carries exactly one fragment with the failure
    /// text as delta content, then ends.
    pub async fn stream(&self, request: &ChatRequest) -> ChatStream {
        match self.inner.stream(request).await {
            Ok(stream) => stream,
            Err(e) => {
                tracing::warn!(error = %e, "stream request failed, substituting fallback stream");
                ChatStream::fallback(e.fold_text())
            }
        }
    }

    /// Model directory listing that always yields a list.
    ///
    /// On failure the list holds a single sentinel entry whose id is
    /// [`INVALID_REQUEST_MODEL_ID`].
    pub async fn models(&self) -> Vec<ModelInfo> {
        match self.inner.models().await {
            Ok(models) => models,
            Err(e) => {
                tracing::warn!(error = %e, "model listing failed, returning sentinel entry");
                vec![ModelInfo {
                    id: INVALID_REQUEST_MODEL_ID.to_string(),
                    ..ModelInfo::default()
                }]
            }
        }
    }
}

impl From<ChatClient> for LenientClient {
    fn from(inner: ChatClient) -> Self {
        Self { inner }
    }
}

/// Shape a failure as a normal-looking response.
fn folded_response(text: String) -> ChatResponse {
    ChatResponse {
        choices: vec![Choice {
            index: Some(0),
            message: Some(ResponseMessage {
                role: Some(FOLDED_ROLE.to_string()),
                content: Some(text),
                ..ResponseMessage::default()
            }),
            ..Choice::default()
        }],
        ..ChatResponse::default()
    }
}
