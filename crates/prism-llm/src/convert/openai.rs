//! Conversion between internal types and `OpenAI` wire format

use serde_json::value::RawValue;

use crate::error::LlmError;
use crate::protocol::openai::{
    OpenAiFunction, OpenAiFunctionCall, OpenAiMessage, OpenAiReplyToolCall, OpenAiRequest, OpenAiResponse, OpenAiTool,
    OpenAiToolCall,
};
use crate::types::{FunctionDefinition, Message, RequestConfig, Role, ToolCall};

// -- Outbound: internal types -> OpenAI wire format --

impl From<&RequestConfig> for OpenAiRequest {
    fn from(config: &RequestConfig) -> Self {
        let tools = if config.tools.is_empty() {
            None
        } else {
            Some(config.tools.iter().map(Into::into).collect())
        };

        Self {
            model: config.model.clone(),
            messages: config.messages.iter().map(Into::into).collect(),
            temperature: config.temperature,
            max_tokens: (config.max_tokens > 0).then_some(config.max_tokens),
            tools,
        }
    }
}

impl From<&Message> for OpenAiMessage {
    fn from(msg: &Message) -> Self {
        let tool_calls = if msg.tool_calls.is_empty() {
            None
        } else {
            Some(
                msg.tool_calls
                    .iter()
                    .map(|tc| OpenAiToolCall {
                        id: tc.id.clone(),
                        tool_type: tc.kind.as_str().to_owned(),
                        function: OpenAiFunctionCall {
                            name: tc.tool.name.clone(),
                            arguments: tc.tool.arguments.get().to_owned(),
                        },
                    })
                    .collect(),
            )
        };

        // Tool-only assistant turns carry null content
        let content = if msg.role == Role::Assistant && tool_calls.is_some() && msg.content.is_empty() {
            None
        } else {
            Some(msg.content.clone())
        };

        Self {
            role: msg.role.as_str().to_owned(),
            content,
            tool_calls,
            tool_call_id: msg.tool_call_id.clone(),
        }
    }
}

impl From<&FunctionDefinition> for OpenAiTool {
    fn from(def: &FunctionDefinition) -> Self {
        Self {
            tool_type: "function".to_owned(),
            function: OpenAiFunction {
                name: def.name.clone(),
                description: def.description.clone(),
                parameters: def.parameters.clone(),
            },
        }
    }
}

// -- Inbound: OpenAI wire format -> internal types --

/// Text of the first choice
pub fn response_text(response: OpenAiResponse, provider: &str) -> Result<String, LlmError> {
    let content = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default();

    if content.is_empty() {
        return Err(LlmError::InvalidUpstreamReply {
            provider: provider.to_owned(),
            reason: "reply has no text content".to_owned(),
        });
    }

    Ok(content)
}

/// Tool calls of the first choice, in the order the model emitted them
pub fn response_tool_calls(response: OpenAiResponse, provider: &str) -> Result<Vec<ToolCall>, LlmError> {
    let Some(choice) = response.choices.into_iter().next() else {
        return Err(LlmError::InvalidUpstreamReply {
            provider: provider.to_owned(),
            reason: "reply has no choices".to_owned(),
        });
    };

    choice
        .message
        .tool_calls
        .unwrap_or_default()
        .into_iter()
        .map(normalize_tool_call)
        .collect()
}

/// Map one native tool call onto the canonical record
fn normalize_tool_call(call: OpenAiReplyToolCall) -> Result<ToolCall, LlmError> {
    let arguments = unwrap_arguments(call.function.arguments)?;
    Ok(ToolCall::function(call.id, call.function.name, arguments))
}

/// Unwrap string-encoded arguments into the JSON they encode
///
/// The chat completions API sends arguments as a JSON string. Inline JSON
/// (some compatible servers) is passed through untouched, and an empty
/// string stands for no arguments.
fn unwrap_arguments(raw: Box<RawValue>) -> Result<Box<RawValue>, LlmError> {
    if !raw.get().starts_with('"') {
        return Ok(raw);
    }

    let encoded: String = serde_json::from_str(raw.get()).map_err(|e| LlmError::decode(e, raw.get()))?;
    if encoded.trim().is_empty() {
        return RawValue::from_string("{}".to_owned()).map_err(|e| LlmError::decode(e, "{}"));
    }

    RawValue::from_string(encoded.clone()).map_err(|e| LlmError::decode(e, encoded))
}
