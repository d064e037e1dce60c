//! Wire types for the chat completions protocol.
//!
//! These mirror the upstream JSON schema and serve both request building and
//! response parsing. Request types serialize with unset optionals omitted;
//! response types decode tolerantly, treating every field as optional and
//! ignoring unknown fields.

use serde::{Deserialize, Serialize};

// ─── Request Types ───────────────────────────────────────────────────────────

/// Message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

/// A single turn of conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    /// Shorthand for a `system` message.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    /// Shorthand for a `user` message.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    /// Shorthand for an `assistant` message.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Structured output format hint for the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseFormat {
    /// The format type: `"text"` or `"json_object"`.
    pub r#type: String,
}

impl Default for ResponseFormat {
    fn default() -> Self {
        Self {
            r#type: "text".to_string(),
        }
    }
}

/// Tool definition sent in the request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub r#type: String,
    pub function: FunctionDefinition,
}

/// Function definition within a tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    /// JSON Schema describing the function arguments.
    pub parameters: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub strict: Option<bool>,
}

/// Request body for the chat completions endpoint.
///
/// `Default` gives an empty request: no model (the client substitutes its
/// configured default), no history, every sampling parameter unset and
/// therefore absent from the serialized payload.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ChatRequest {
    /// Requested model. Empty means "use the client's configured default".
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_k: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    /// Number of completions to generate for each request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    /// Switch for the model's thinking phase, on models that have one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_thinking: Option<bool>,
    /// Token budget for the thinking phase.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking_budget: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    /// Set per call by the client: `false` for `complete`, `true` for `stream`.
    pub stream: bool,
}

// ─── Response Types ──────────────────────────────────────────────────────────

/// Complete (non-streaming) chat completion response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    /// Creation time, seconds since the epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    /// The model that actually served the request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_result: Option<Vec<VideoResult>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub web_search: Option<Vec<WebSearch>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_filter: Option<Vec<ContentFilter>>,
}

impl ChatResponse {
    /// Content of the first choice's message, when there is one.
    pub fn first_content(&self) -> Option<&str> {
        self.choices.first()?.message.as_ref()?.content.as_deref()
    }
}

/// One completion alternative within a response or chunk.
///
/// `message` is populated on full responses, `delta` on streaming chunks.
/// `index` is unique within the owning choice list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Choice {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<ResponseMessage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta: Option<Delta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finish_reason: Option<String>,
}

/// A message as returned by the endpoint.
///
/// The role stays a plain string on this side so that upstream values pass
/// through verbatim, whatever they are.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    /// Thinking-phase output, on models that expose it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<Audio>,
}

impl ResponseMessage {
    /// Convert into a request-side message for appending to history.
    ///
    /// Roles are matched case-insensitively; anything unrecognized maps to
    /// `assistant`, which is what the endpoint emits for generated turns.
    pub fn to_chat_message(&self) -> ChatMessage {
        let role = match self.role.as_deref() {
            Some(r) if r.eq_ignore_ascii_case("system") => Role::System,
            Some(r) if r.eq_ignore_ascii_case("user") => Role::User,
            _ => Role::Assistant,
        };
        ChatMessage {
            role,
            content: self.content.clone().unwrap_or_default(),
        }
    }
}

/// Tool call as returned by the endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub r#type: String,
    #[serde(default)]
    pub function: FunctionCall,
}

/// Function call details within a tool call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FunctionCall {
    #[serde(default)]
    pub name: String,
    /// Arguments as the raw JSON text the model produced.
    #[serde(default)]
    pub arguments: String,
}

/// Audio payload attached to a message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Audio {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
}

/// Incremental update within a streaming chunk choice.
///
/// `content` and `reasoning_content` are independent; a fragment may carry
/// either or both, and callers accumulate them separately. `role` appears at
/// most once per stream, usually on the first fragment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Delta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

/// Token accounting reported by the endpoint.
///
/// Counters are individually optional; one the endpoint leaves out stays
/// absent instead of reading as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens_details: Option<PromptTokensDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_tokens_details: Option<CompletionTokensDetails>,
}

/// Prompt-side token detail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptTokensDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cached_tokens: Option<u32>,
}

/// Completion-side token detail.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionTokensDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning_tokens: Option<u32>,
}

/// Generated-video entry attached to a response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
}

/// Web search citation attached to a response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebSearch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Content moderation entry attached to a response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContentFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
}

// ─── Streaming Types ─────────────────────────────────────────────────────────

/// One streaming fragment of a chat completion.
///
/// `usage` is present on whichever fragments the endpoint chooses, commonly
/// only near the end; callers merge it when it appears rather than expecting
/// it anywhere in particular.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatChunk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<Choice>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_fingerprint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl ChatChunk {
    /// Delta of the first choice, when there is one.
    pub fn first_delta(&self) -> Option<&Delta> {
        self.choices.first()?.delta.as_ref()
    }
}

// ─── Model Directory Types ───────────────────────────────────────────────────

/// One entry from the model directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owned_by: Option<String>,
}

/// Response shape of the model directory endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelList {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub object: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub data: Vec<ModelInfo>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_optionals_omitted_when_none() {
        let req = ChatRequest {
            model: "test".to_string(),
            messages: vec![ChatMessage::user("hi")],
            ..ChatRequest::default()
        };
        let json = serde_json::to_string(&req).unwrap();
        for field in [
            "max_tokens",
            "temperature",
            "top_p",
            "top_k",
            "min_p",
            "frequency_penalty",
            "\"n\"",
            "stop",
            "enable_thinking",
            "thinking_budget",
            "response_format",
            "tools",
        ] {
            assert!(!json.contains(field), "{field} should be omitted when unset");
        }
        assert!(json.contains("\"stream\":false"));
    }

    #[test]
    fn test_request_optionals_included_when_set() {
        let req = ChatRequest {
            model: "test".to_string(),
            messages: vec![ChatMessage::user("hi")],
            max_tokens: Some(256),
            temperature: Some(0.6),
            top_p: Some(0.9),
            top_k: Some(40),
            min_p: Some(0.05),
            enable_thinking: Some(true),
            thinking_budget: Some(2048),
            stop: Some(vec!["<END>".to_string()]),
            ..ChatRequest::default()
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"max_tokens\":256"));
        assert!(json.contains("\"top_k\":40"));
        assert!(json.contains("\"enable_thinking\":true"));
        assert!(json.contains("\"thinking_budget\":2048"));
        assert!(json.contains("\"stop\":[\"<END>\"]"));
    }

    #[test]
    fn test_request_tool_strict_flag_omitted_when_none() {
        let req = ChatRequest {
            model: "test".to_string(),
            tools: Some(vec![ToolDefinition {
                r#type: "function".to_string(),
                function: FunctionDefinition {
                    name: "lookup".to_string(),
                    description: "Look something up".to_string(),
                    parameters: json!({"type": "object", "properties": {}}),
                    strict: None,
                },
            }]),
            ..ChatRequest::default()
        };
        let json = serde_json::to_string(&req).unwrap();
        assert!(json.contains("\"tools\""));
        assert!(json.contains("\"lookup\""));
        assert!(!json.contains("strict"));
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::System).unwrap(), "\"system\"");
        assert_eq!(serde_json::to_string(&Role::User).unwrap(), "\"user\"");
        assert_eq!(
            serde_json::to_string(&Role::Assistant).unwrap(),
            "\"assistant\""
        );
    }

    #[test]
    fn test_message_constructors() {
        assert_eq!(ChatMessage::system("s").role, Role::System);
        assert_eq!(ChatMessage::user("u").role, Role::User);
        assert_eq!(ChatMessage::assistant("a").role, Role::Assistant);
        assert_eq!(ChatMessage::user("hello").content, "hello");
    }

    #[test]
    fn test_response_decode_ignores_unknown_fields() {
        let body = r#"{
            "id": "abc",
            "brand_new_field": {"nested": true},
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "hello", "flavor": "vanilla"},
                "finish_reason": "stop"
            }]
        }"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.id.as_deref(), Some("abc"));
        assert_eq!(response.first_content(), Some("hello"));
    }

    #[test]
    fn test_response_round_trip_preserves_populated_fields() {
        let input = json!({
            "id": "chatcmpl-1",
            "request_id": "req-9",
            "created": 1700000000,
            "model": "glm-4.7",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": "hi",
                    "reasoning_content": "thinking"
                },
                "finish_reason": "stop"
            }],
            "usage": {
                "prompt_tokens": 5,
                "completion_tokens": 7,
                "total_tokens": 12,
                "completion_tokens_details": {"reasoning_tokens": 3}
            }
        });
        let response: ChatResponse = serde_json::from_value(input.clone()).unwrap();
        let encoded = serde_json::to_value(&response).unwrap();
        assert_eq!(encoded, input);
    }

    #[test]
    fn test_response_round_trip_keeps_absent_fields_absent() {
        let input = json!({
            "choices": [{
                "index": 0,
                "message": {"role": "assistant", "content": "hello"}
            }]
        });
        let response: ChatResponse = serde_json::from_value(input.clone()).unwrap();
        let encoded = serde_json::to_value(&response).unwrap();
        assert_eq!(encoded, input);

        let empty: ChatResponse = serde_json::from_str("{}").unwrap();
        assert_eq!(serde_json::to_string(&empty).unwrap(), "{}");

        // An explicitly empty choice list reads the same as an absent one
        // and is omitted again on re-encode.
        let no_choices: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(no_choices.choices.is_empty());
        assert_eq!(serde_json::to_string(&no_choices).unwrap(), "{}");
    }

    #[test]
    fn test_usage_details_decoded() {
        let body = r#"{
            "prompt_tokens": 100,
            "completion_tokens": 40,
            "total_tokens": 140,
            "prompt_tokens_details": {"cached_tokens": 80},
            "completion_tokens_details": {"reasoning_tokens": 25}
        }"#;
        let usage: Usage = serde_json::from_str(body).unwrap();
        assert_eq!(usage.total_tokens, Some(140));
        assert_eq!(
            usage.prompt_tokens_details,
            Some(PromptTokensDetails {
                cached_tokens: Some(80)
            })
        );
        assert_eq!(
            usage.completion_tokens_details,
            Some(CompletionTokensDetails {
                reasoning_tokens: Some(25)
            })
        );
    }

    #[test]
    fn test_usage_partial_object_keeps_absent_counters() {
        let usage: Usage = serde_json::from_str(r#"{"prompt_tokens":3}"#).unwrap();
        assert_eq!(usage.prompt_tokens, Some(3));
        assert_eq!(usage.completion_tokens, None);
        assert_eq!(usage.total_tokens, None);
        assert_eq!(
            serde_json::to_string(&usage).unwrap(),
            r#"{"prompt_tokens":3}"#
        );
    }

    #[test]
    fn test_to_chat_message_maps_roles() {
        let assistant = ResponseMessage {
            role: Some("assistant".to_string()),
            content: Some("done".to_string()),
            ..ResponseMessage::default()
        };
        let msg = assistant.to_chat_message();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.content, "done");

        // Folded errors arrive with a capitalized role.
        let folded = ResponseMessage {
            role: Some("System".to_string()),
            content: Some("error body".to_string()),
            ..ResponseMessage::default()
        };
        assert_eq!(folded.to_chat_message().role, Role::System);

        let unknown = ResponseMessage {
            role: Some("observer".to_string()),
            ..ResponseMessage::default()
        };
        assert_eq!(unknown.to_chat_message().role, Role::Assistant);
        assert_eq!(unknown.to_chat_message().content, "");
    }

    #[test]
    fn test_message_tool_calls_decoded() {
        let body = r#"{
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": {"name": "lookup", "arguments": "{\"q\":\"rust\"}"}
            }]
        }"#;
        let message: ResponseMessage = serde_json::from_str(body).unwrap();
        assert!(message.content.is_none());
        let calls = message.tool_calls.as_ref().unwrap();
        assert_eq!(calls[0].id, "call_1");
        assert_eq!(calls[0].function.name, "lookup");
        assert_eq!(calls[0].function.arguments, r#"{"q":"rust"}"#);
    }

    #[test]
    fn test_chunk_decodes_with_empty_choices_and_usage() {
        let body = r#"{"id":"s1","choices":[],"usage":{"prompt_tokens":3,"completion_tokens":2,"total_tokens":5}}"#;
        let chunk: ChatChunk = serde_json::from_str(body).unwrap();
        assert!(chunk.choices.is_empty());
        assert_eq!(chunk.usage.as_ref().and_then(|u| u.total_tokens), Some(5));
        assert!(chunk.first_delta().is_none());
    }

    #[test]
    fn test_chunk_first_delta() {
        let body = r#"{
            "id": "s1",
            "object": "chat.completion.chunk",
            "system_fingerprint": "fp_1",
            "choices": [{"index": 0, "delta": {"role": "assistant", "content": "He"}}]
        }"#;
        let chunk: ChatChunk = serde_json::from_str(body).unwrap();
        let delta = chunk.first_delta().unwrap();
        assert_eq!(delta.content.as_deref(), Some("He"));
        assert_eq!(delta.role.as_deref(), Some("assistant"));
        assert_eq!(chunk.object.as_deref(), Some("chat.completion.chunk"));
    }

    #[test]
    fn test_extension_lists_decoded() {
        let body = r#"{
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "see below"}}],
            "video_result": [{"url": "https://v.example/1.mp4", "cover_image_url": "https://v.example/1.png"}],
            "web_search": [{"icon": "https://s.example/i.ico", "title": "Result"}],
            "content_filter": [{"role": "assistant", "level": 0}]
        }"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        let videos = response.video_result.as_ref().unwrap();
        assert_eq!(videos[0].url.as_deref(), Some("https://v.example/1.mp4"));
        let searches = response.web_search.as_ref().unwrap();
        assert_eq!(searches[0].title.as_deref(), Some("Result"));
        let filters = response.content_filter.as_ref().unwrap();
        assert_eq!(filters[0].level, Some(0));
    }

    #[test]
    fn test_model_list_decoded() {
        let body = r#"{
            "object": "list",
            "data": [
                {"id": "glm-4.7", "object": "model", "created": 1700000000, "owned_by": "zhipu"},
                {"id": "glm-4.5-flash"}
            ]
        }"#;
        let list: ModelList = serde_json::from_str(body).unwrap();
        assert_eq!(list.data.len(), 2);
        assert_eq!(list.data[0].id, "glm-4.7");
        assert_eq!(list.data[1].owned_by, None);
    }
}
