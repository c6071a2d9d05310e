//! Conversion between internal types and Anthropic wire format

use serde_json::value::RawValue;

use crate::error::LlmError;
use crate::protocol::anthropic::{
    AnthropicContent, AnthropicContentBlock, AnthropicMessage, AnthropicRequest, AnthropicResponse, AnthropicTool,
};
use crate::types::{FunctionDefinition, Message, RequestConfig, Role, ToolCall};

/// Default max tokens when not specified (Anthropic requires this field)
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Separator between hoisted system prompts
const SYSTEM_SEPARATOR: &str = "\n\n";

// -- Outbound: internal types -> Anthropic wire format --

impl From<&RequestConfig> for AnthropicRequest {
    fn from(config: &RequestConfig) -> Self {
        let system_parts: Vec<&str> = config
            .messages
            .iter()
            .filter(|m| m.role == Role::System)
            .map(|m| m.content.as_str())
            .collect();

        let system = if system_parts.is_empty() {
            None
        } else {
            Some(system_parts.join(SYSTEM_SEPARATOR))
        };

        let mut messages: Vec<AnthropicMessage> = Vec::new();
        for msg in config.messages.iter().filter(|m| m.role != Role::System) {
            push_message(&mut messages, msg);
        }

        let tools = if config.tools.is_empty() {
            None
        } else {
            Some(config.tools.iter().map(Into::into).collect())
        };

        Self {
            model: config.model.clone(),
            max_tokens: if config.max_tokens > 0 {
                config.max_tokens
            } else {
                DEFAULT_MAX_TOKENS
            },
            system,
            messages,
            temperature: config.temperature,
            tools,
        }
    }
}

/// Append one non-system message, folding consecutive tool results into one user turn
fn push_message(messages: &mut Vec<AnthropicMessage>, msg: &Message) {
    match msg.role {
        Role::Tool => {
            let block = AnthropicContentBlock::ToolResult {
                tool_use_id: msg.tool_call_id.clone().unwrap_or_default(),
                content: msg.content.clone(),
            };

            if let Some(AnthropicMessage {
                role,
                content: AnthropicContent::Blocks(blocks),
            }) = messages.last_mut()
                && *role == "user"
                && blocks
                    .iter()
                    .all(|b| matches!(b, AnthropicContentBlock::ToolResult { .. }))
            {
                blocks.push(block);
                return;
            }

            messages.push(AnthropicMessage {
                role: "user".to_owned(),
                content: AnthropicContent::Blocks(vec![block]),
            });
        }
        Role::Assistant if !msg.tool_calls.is_empty() => {
            let mut blocks = Vec::with_capacity(msg.tool_calls.len() + 1);
            if !msg.content.is_empty() {
                blocks.push(AnthropicContentBlock::Text {
                    text: msg.content.clone(),
                });
            }
            blocks.extend(msg.tool_calls.iter().map(|tc| AnthropicContentBlock::ToolUse {
                id: tc.id.clone(),
                name: tc.tool.name.clone(),
                input: tc.tool.arguments.clone(),
            }));

            messages.push(AnthropicMessage {
                role: "assistant".to_owned(),
                content: AnthropicContent::Blocks(blocks),
            });
        }
        Role::Assistant => messages.push(AnthropicMessage {
            role: "assistant".to_owned(),
            content: AnthropicContent::Text(msg.content.clone()),
        }),
        Role::User | Role::System => messages.push(AnthropicMessage {
            role: "user".to_owned(),
            content: AnthropicContent::Text(msg.content.clone()),
        }),
    }
}

impl From<&FunctionDefinition> for AnthropicTool {
    fn from(def: &FunctionDefinition) -> Self {
        Self {
            name: def.name.clone(),
            description: def.description.clone(),
            input_schema: def.parameters.clone(),
        }
    }
}

/// Append an instruction to the hoisted system prompt
pub fn append_system(request: &mut AnthropicRequest, instruction: &str) {
    request.system = Some(match request.system.take() {
        Some(existing) if !existing.is_empty() => format!("{existing}{SYSTEM_SEPARATOR}{instruction}"),
        _ => instruction.to_owned(),
    });
}

// -- Inbound: Anthropic wire format -> internal types --

/// Concatenated text of all text blocks
pub fn response_text(response: AnthropicResponse, provider: &str) -> Result<String, LlmError> {
    let text: String = response
        .content
        .into_iter()
        .filter(|block| block.block_type == "text")
        .filter_map(|block| block.text)
        .collect();

    if text.is_empty() {
        return Err(LlmError::InvalidUpstreamReply {
            provider: provider.to_owned(),
            reason: "reply has no text content".to_owned(),
        });
    }

    Ok(text)
}

/// Tool use blocks of a reply, in the order the model emitted them
pub fn response_tool_calls(response: AnthropicResponse, provider: &str) -> Result<Vec<ToolCall>, LlmError> {
    response
        .content
        .into_iter()
        .filter(|block| block.block_type == "tool_use")
        .map(|block| {
            let (Some(id), Some(name)) = (block.id, block.name) else {
                return Err(LlmError::InvalidUpstreamReply {
                    provider: provider.to_owned(),
                    reason: "tool_use block without id or name".to_owned(),
                });
            };

            let arguments = match block.input {
                Some(input) => input,
                None => RawValue::from_string("{}".to_owned()).map_err(|e| LlmError::decode(e, "{}"))?,
            };

            Ok(ToolCall::function(id, name, arguments))
        })
        .collect()
}
