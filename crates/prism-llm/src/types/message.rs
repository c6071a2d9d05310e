use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use crate::error::LlmError;

/// Role of a message participant
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instruction
    System,
    /// User message
    User,
    /// Assistant response
    Assistant,
    /// Tool/function result
    Tool,
}

impl Role {
    /// Lowercase wire name of the role
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
            Self::Tool => "tool",
        }
    }
}

/// Message in a conversation
///
/// A `Tool` message carries the id of the call it answers in
/// `tool_call_id`; no other role may set it. Only assistant messages carry
/// `tool_calls`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Role of the message author
    pub role: Role,
    /// Message text
    #[serde(default)]
    pub content: String,
    /// Tool calls made by the assistant
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    /// ID of the tool call this message is a response to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

impl Message {
    fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }

    /// Create a system message
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    /// Create an assistant message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content)
    }

    /// Create an assistant message that invokes tools
    ///
    /// Used to replay a tool-calling turn back to the model before the
    /// matching tool results.
    pub fn assistant_tool_calls(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Self::new(Role::Assistant, content)
        }
    }

    /// Create a tool result answering the call with `tool_call_id`
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: Some(tool_call_id.into()),
            ..Self::new(Role::Tool, content)
        }
    }

    /// Check the role-dependent field invariants
    pub fn validate(&self) -> Result<(), LlmError> {
        match (self.role, self.tool_call_id.as_deref()) {
            (Role::Tool, None | Some("")) => Err(LlmError::InvalidRequest(
                "tool message must carry a non-empty tool_call_id".to_owned(),
            )),
            (Role::Tool, Some(_)) | (_, None) => {
                if self.role != Role::Assistant && !self.tool_calls.is_empty() {
                    return Err(LlmError::InvalidRequest(format!(
                        "{} message cannot carry tool calls",
                        self.role.as_str()
                    )));
                }
                Ok(())
            }
            (role, Some(_)) => Err(LlmError::InvalidRequest(format!(
                "{} message cannot carry a tool_call_id",
                role.as_str()
            ))),
        }
    }
}

/// Discriminator of a tool call
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    /// Call to a caller-declared function
    #[default]
    Function,
}

impl ToolKind {
    /// Wire name of the kind
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Function => "function",
        }
    }
}

/// A tool/function call requested by the assistant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Identifier unique within one model turn
    pub id: String,
    /// Kind of call
    #[serde(rename = "type", default)]
    pub kind: ToolKind,
    /// Function name and arguments
    pub tool: FunctionCall,
}

impl ToolCall {
    /// Build a function tool call
    pub fn function(id: impl Into<String>, name: impl Into<String>, arguments: Box<RawValue>) -> Self {
        Self {
            id: id.into(),
            kind: ToolKind::Function,
            tool: FunctionCall {
                name: name.into(),
                arguments,
            },
        }
    }
}

/// Function name and arguments within a tool call
///
/// Arguments stay as the exact JSON text the model produced; decode them
/// with `serde_json::from_str(call.tool.arguments.get())` into the shape the
/// function expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Function name
    pub name: String,
    /// Raw JSON arguments
    pub arguments: Box<RawValue>,
}

impl PartialEq for FunctionCall {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.arguments.get() == other.arguments.get()
    }
}
