//! Anthropic Messages API wire format types

use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

// -- Request types --

/// Anthropic messages API request
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicRequest {
    /// Model identifier
    pub model: String,
    /// Maximum tokens to generate (required by Anthropic)
    pub max_tokens: u32,
    /// System prompt (top-level, not in messages)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    /// Conversation messages
    pub messages: Vec<AnthropicMessage>,
    /// Sampling temperature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    /// Tool definitions
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<AnthropicTool>>,
}

/// Anthropic message
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicMessage {
    /// Role ("user" or "assistant")
    pub role: String,
    /// Content blocks
    pub content: AnthropicContent,
}

/// Anthropic content can be a string or array of content blocks
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum AnthropicContent {
    /// Plain text (shorthand)
    Text(String),
    /// Array of content blocks
    Blocks(Vec<AnthropicContentBlock>),
}

/// Content block in an Anthropic request message
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnthropicContentBlock {
    /// Text content
    Text {
        /// The text string
        text: String,
    },
    /// Tool use replayed from an earlier assistant turn
    ToolUse {
        /// Tool use identifier
        id: String,
        /// Tool name
        name: String,
        /// Tool input as JSON
        input: Box<RawValue>,
    },
    /// Tool result from the user
    ToolResult {
        /// Tool use ID this result responds to
        tool_use_id: String,
        /// Result content
        content: String,
    },
}

/// Anthropic tool definition
#[derive(Debug, Clone, Serialize)]
pub struct AnthropicTool {
    /// Tool name
    pub name: String,
    /// Human-readable description
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// JSON Schema for input parameters
    pub input_schema: serde_json::Value,
}

// -- Response types --

/// Anthropic messages API response
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicResponse {
    /// Response identifier
    #[serde(default)]
    pub id: String,
    /// Object type ("message", or "error" for error payloads)
    #[serde(rename = "type", default)]
    pub response_type: String,
    /// Response content blocks
    #[serde(default)]
    pub content: Vec<AnthropicResponseBlock>,
    /// Model used
    #[serde(default)]
    pub model: String,
    /// Stop reason
    #[serde(default)]
    pub stop_reason: Option<String>,
    /// Error reported in place of a message
    #[serde(default)]
    pub error: Option<AnthropicErrorDetail>,
}

/// Content block in an Anthropic response
///
/// Flat struct: raw JSON values cannot sit inside internally tagged enums.
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicResponseBlock {
    /// Block type ("text", "`tool_use`", ...)
    #[serde(rename = "type")]
    pub block_type: String,
    /// Text of a text block
    #[serde(default)]
    pub text: Option<String>,
    /// Tool use identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Tool name
    #[serde(default)]
    pub name: Option<String>,
    /// Tool input as JSON
    #[serde(default)]
    pub input: Option<Box<RawValue>>,
}

// -- Error response --

/// Anthropic error response body
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicErrorResponse {
    /// Error details
    pub error: AnthropicErrorDetail,
}

/// Anthropic error detail
#[derive(Debug, Clone, Deserialize)]
pub struct AnthropicErrorDetail {
    /// Error type
    #[serde(rename = "type", default)]
    pub error_type: String,
    /// Error message
    pub message: String,
}

impl super::ErrorEnvelope for AnthropicErrorResponse {
    fn into_message(self) -> String {
        self.error.message
    }
}
