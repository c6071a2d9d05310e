//! Canonical provider-agnostic request types
//!
//! Every provider adapter translates these to and from its own wire format.

pub mod message;
pub mod request;
pub mod tool;

pub use message::{FunctionCall, Message, Role, ToolCall, ToolKind};
pub use request::{
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, ProviderId, RequestConfig, RequestOption, with_max_tokens, with_messages,
    with_model, with_provider, with_temperature, with_tools,
    without_temperature,
};
pub use tool::FunctionDefinition;
