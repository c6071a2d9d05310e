//! Provider trait, registry, and implementations for LLM backends

pub mod anthropic;
mod http;
pub mod openai;
pub mod stub;

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::value::RawValue;

use crate::context::RequestContext;
use crate::error::LlmError;
use crate::reconcile;
use crate::types::{Message, ProviderId, RequestConfig, Role, ToolCall};

pub use anthropic::AnthropicProvider;
pub use openai::OpenAiProvider;
pub use stub::StubProvider;

/// Trait implemented by each LLM provider backend
#[async_trait]
pub trait Provider: Send + Sync {
    /// Human-readable provider name
    fn name(&self) -> &str;

    /// Free-text completion of the conversation
    async fn get_text(&self, context: &RequestContext, config: &RequestConfig) -> Result<String, LlmError>;

    /// Structured completion shaped like `target`
    ///
    /// Returns the reconciled JSON text; the caller decodes it. The default
    /// asks for JSON through a system message (unless the conversation
    /// already has one) and unwraps the reply with [`reconcile::extract_raw`].
    async fn get_object(
        &self,
        context: &RequestContext,
        config: &RequestConfig,
        target: &ObjectTarget,
    ) -> Result<Box<RawValue>, LlmError> {
        let instructed = target.instruct(config);
        let text = self.get_text(context, &instructed).await?;
        reconcile::extract_raw(&text)
    }

    /// Tool calls the model chose to make, in emission order
    async fn get_tool_calls(&self, context: &RequestContext, config: &RequestConfig)
    -> Result<Vec<ToolCall>, LlmError>;
}

/// Description of the shape a structured reply must take
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectTarget {
    type_name: String,
    schema: Option<serde_json::Value>,
}

impl ObjectTarget {
    /// Target named after the Rust type `T`
    pub fn of<T: ?Sized>() -> Self {
        Self::named(short_type_name(std::any::type_name::<T>()))
    }

    /// Target with an explicit name
    pub fn named(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            schema: None,
        }
    }

    /// Attach a JSON Schema the reply must satisfy
    #[must_use]
    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.schema = Some(schema);
        self
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub const fn schema(&self) -> Option<&serde_json::Value> {
        self.schema.as_ref()
    }

    /// System instruction asking the model for JSON of this shape
    pub fn instruction(&self) -> String {
        let mut text = format!(
            "You are a helpful assistant that responds with JSON matching the {} type. \
             Your response should be valid JSON and nothing else.",
            self.type_name
        );

        if let Some(schema) = &self.schema {
            text.push_str("\nThe JSON must conform to this JSON Schema:\n");
            text.push_str(&schema.to_string());
        }

        text
    }

    /// Copy of `config` with the instruction prepended as a system message
    ///
    /// Conversations that already carry a system message are left as they are.
    pub fn instruct(&self, config: &RequestConfig) -> RequestConfig {
        let mut instructed = config.clone();
        if !instructed.messages.iter().any(|m| m.role == Role::System) {
            instructed.messages.insert(0, Message::system(self.instruction()));
        }
        instructed
    }
}

/// Strip the module path from a type name, keeping generic types intact
fn short_type_name(full: &str) -> &str {
    if full.contains('<') {
        return full;
    }
    full.rsplit("::").next().unwrap_or(full)
}

/// Mapping from provider identifier to implementation
///
/// Registration may happen while other tasks dispatch; a later
/// registration under the same id replaces the earlier one.
#[derive(Default, Clone)]
pub struct ProviderRegistry {
    providers: Arc<DashMap<ProviderId, Arc<dyn Provider>>>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `provider` under `id`, replacing any previous entry
    pub fn register(&self, id: impl Into<ProviderId>, provider: Arc<dyn Provider>) {
        let id = id.into();
        if self.providers.insert(id.clone(), provider).is_some() {
            tracing::debug!(provider = %id, "replaced registered provider");
        }
    }

    /// Provider registered under `id`
    pub fn get(&self, id: &ProviderId) -> Option<Arc<dyn Provider>> {
        self.providers.get(id).map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, id: &ProviderId) -> bool {
        self.providers.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids: Vec<String> = self.providers.iter().map(|e| e.key().to_string()).collect();
        ids.sort();
        f.debug_struct("ProviderRegistry").field("providers", &ids).finish()
    }
}
