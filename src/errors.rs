//! Client error types.
//!
//! All errors implement `std::error::Error` via `thiserror`. Structured logging
//! is the caller's responsibility; these types carry the context needed to build
//! meaningful log entries.

use thiserror::Error;

/// Errors that can occur while talking to the completions endpoint.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Connection, TLS, DNS, or timeout failure before any response arrived.
    #[error("transport failure for {endpoint}: {reason}")]
    Transport {
        endpoint: String,
        reason: String,
    },

    /// Non-2xx HTTP response from the endpoint.
    #[error("HTTP {status}: {body}")]
    Http {
        status: u16,
        body: String,
    },

    /// A 2xx body that could not be decoded as the expected JSON shape.
    /// The raw body is retained for diagnosis.
    #[error("decode failure: {reason}")]
    Decode {
        body: String,
        reason: String,
    },
}

impl ChatError {
    /// The raw upstream body, when this error carries one.
    pub fn body_text(&self) -> Option<&str> {
        match self {
            ChatError::Http { body, .. } | ChatError::Decode { body, .. } => Some(body),
            ChatError::Transport { .. } => None,
        }
    }

    /// The text a lenient caller shows in place of assistant content: the raw
    /// upstream body when one exists, otherwise the error's display form.
    pub fn fold_text(&self) -> String {
        match self.body_text() {
            Some(body) => body.to_string(),
            None => self.to_string(),
        }
    }
}
