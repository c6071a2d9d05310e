//! Provider-agnostic LLM client for Prism
//!
//! Offers one contract for free-text completion, schema-constrained
//! structured extraction, and tool-call elicitation over pluggable provider
//! backends (`OpenAI`-compatible, Anthropic, or caller-supplied). Per-call
//! options are merged over a base configuration, dispatched to the
//! registered provider, and each provider's reply is reconciled into the
//! caller's expected shape.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod client;
pub mod context;
pub mod convert;
pub mod error;
pub mod protocol;
pub mod provider;
pub mod reconcile;
pub mod types;

pub use client::LlmClient;
pub use context::RequestContext;
pub use error::LlmError;
pub use provider::{ObjectTarget, Provider, ProviderRegistry};
pub use types::{
    FunctionCall, FunctionDefinition, Message, ProviderId, RequestConfig, RequestOption, Role, ToolCall, ToolKind,
    with_max_tokens, with_messages, with_model, with_provider, with_temperature, with_tools,
    without_temperature,
};
