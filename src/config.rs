//! Client configuration.
//!
//! `ChatConfig` mirrors the external JSON settings document (`apiurl`,
//! `apikey`, `model`). Loading and persisting that document is the consumer's
//! job; the client takes an already populated value and treats it as
//! read-only for its whole lifetime.

use serde::{Deserialize, Serialize};

/// Endpoint used when the settings document provides none.
pub const DEFAULT_API_URL: &str = "https://open.bigmodel.cn/api/paas/v4/chat/completions";

/// Model used when the settings document provides none.
pub const DEFAULT_MODEL: &str = "GLM-4.5-Flash";

/// Connection settings for one upstream endpoint.
///
/// Serialized field names follow the settings document, not the Rust names.
/// Missing fields fall back to the defaults, so a partial document loads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Full URL of the chat completions endpoint.
    #[serde(rename = "apiurl")]
    pub api_url: String,
    /// Bearer token sent in the `Authorization` header.
    #[serde(rename = "apikey")]
    pub api_key: String,
    /// Model substituted into requests that leave `model` empty.
    #[serde(rename = "model")]
    pub default_model: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_key: String::new(),
            default_model: DEFAULT_MODEL.to_string(),
        }
    }
}

impl ChatConfig {
    /// Build a config from its three parts.
    pub fn new(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            api_key: api_key.into(),
            default_model: default_model.into(),
        }
    }
}
