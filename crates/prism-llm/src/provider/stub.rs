//! In-process provider driven by closures
//!
//! Useful for tests and offline runs: replies are computed from the
//! effective [`RequestConfig`] without any network traffic, and every
//! invocation is counted.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::Provider;
use crate::context::RequestContext;
use crate::error::LlmError;
use crate::types::{RequestConfig, ToolCall};

type Handler<T> = Box<dyn Fn(&RequestConfig) -> Result<T, LlmError> + Send + Sync>;

/// Provider whose replies come from caller-supplied closures
pub struct StubProvider {
    name: String,
    text: Option<Handler<String>>,
    tool_calls: Option<Handler<Vec<ToolCall>>>,
    calls: AtomicUsize,
}

impl StubProvider {
    /// Stub with no handlers; every capability reports an invalid reply
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: None,
            tool_calls: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Answer text (and structured) requests with `handler`
    #[must_use]
    pub fn with_text<F>(mut self, handler: F) -> Self
    where
        F: Fn(&RequestConfig) -> Result<String, LlmError> + Send + Sync + 'static,
    {
        self.text = Some(Box::new(handler));
        self
    }

    /// Answer tool-call requests with `handler`
    #[must_use]
    pub fn with_tool_calls<F>(mut self, handler: F) -> Self
    where
        F: Fn(&RequestConfig) -> Result<Vec<ToolCall>, LlmError> + Send + Sync + 'static,
    {
        self.tool_calls = Some(Box::new(handler));
        self
    }

    /// Number of capability invocations so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn invoke<T>(
        &self,
        context: &RequestContext,
        config: &RequestConfig,
        handler: Option<&Handler<T>>,
        capability: &str,
    ) -> Result<T, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let Some(handler) = handler else {
            return Err(LlmError::InvalidUpstreamReply {
                provider: self.name.clone(),
                reason: format!("stub has no {capability} handler"),
            });
        };

        context.run(async { handler(config) }).await
    }
}

impl std::fmt::Debug for StubProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StubProvider")
            .field("name", &self.name)
            .field("calls", &self.call_count())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Provider for StubProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_text(&self, context: &RequestContext, config: &RequestConfig) -> Result<String, LlmError> {
        self.invoke(context, config, self.text.as_ref(), "text").await
    }

    async fn get_tool_calls(&self, context: &RequestContext, config: &RequestConfig) -> Result<Vec<ToolCall>, LlmError> {
        self.invoke(context, config, self.tool_calls.as_ref(), "tool call").await
    }
}
