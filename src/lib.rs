//! Client library for OpenAI-compatible chat completion services.
//!
//! What lives where:
//! - [`types`]: the wire-format request and response model
//! - [`client`]: one-shot and streaming completions plus the model directory
//! - [`streaming`]: the line-delimited fragment decoder behind [`ChatStream`]
//! - [`compat`]: an error-folding wrapper for legacy callers
//! - [`config`]: endpoint, key, and default model settings
//! - [`errors`]: the failure taxonomy shared by every operation

pub mod client;
pub mod compat;
pub mod config;
pub mod errors;
pub mod streaming;
pub mod types;

pub use client::ChatClient;
pub use compat::{LenientClient, INVALID_REQUEST_MODEL_ID};
pub use config::{ChatConfig, DEFAULT_API_URL, DEFAULT_MODEL};
pub use errors::ChatError;
pub use streaming::{decode_frame, ChatStream, StreamFrame};
pub use types::{
    ChatChunk, ChatMessage, ChatRequest, ChatResponse, Choice, Delta, ModelInfo, ResponseMessage,
    Role, Usage,
};
