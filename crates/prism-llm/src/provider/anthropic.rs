//! Anthropic Messages API provider implementation

use async_trait::async_trait;
use prism_config::ProviderConfig;
use reqwest::Client;
use secrecy::SecretString;
use serde_json::value::RawValue;
use url::Url;

use super::{ObjectTarget, Provider, http};
use crate::context::RequestContext;
use crate::convert::anthropic::{append_system, response_text, response_tool_calls};
use crate::error::LlmError;
use crate::protocol::anthropic::{AnthropicErrorResponse, AnthropicRequest, AnthropicResponse};
use crate::reconcile;
use crate::types::{RequestConfig, ToolCall};

/// Default Anthropic API base URL
const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

/// Anthropic Messages API provider
pub struct AnthropicProvider {
    name: String,
    client: Client,
    base_url: Url,
    api_key: Option<SecretString>,
    version: String,
}

impl AnthropicProvider {
    /// Create from provider configuration
    ///
    /// # Errors
    ///
    /// Returns `LlmError::Internal` if the timeout is invalid or the HTTP
    /// client cannot be built.
    pub fn new(name: impl Into<String>, config: &ProviderConfig) -> Result<Self, LlmError> {
        let base_url = match &config.base_url {
            Some(url) => url.clone(),
            None => Url::parse(DEFAULT_BASE_URL).map_err(|e| anyhow::anyhow!("invalid default base URL: {e}"))?,
        };

        Ok(Self {
            name: name.into(),
            client: http::build_client(config.timeout()?)?,
            base_url,
            api_key: config.api_key.clone(),
            version: config.anthropic_version().to_owned(),
        })
    }

    /// Build the messages endpoint URL
    fn messages_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/messages")
    }

    /// Send a messages request and surface any reported error
    async fn create_message(
        &self,
        context: &RequestContext,
        request: &AnthropicRequest,
    ) -> Result<AnthropicResponse, LlmError> {
        let api_key = http::api_key(&self.name, context, self.api_key.as_ref())?;

        tracing::debug!(
            provider = %self.name,
            model = %request.model,
            messages = request.messages.len(),
            "sending messages request"
        );

        let builder = self
            .client
            .post(self.messages_url())
            .header("x-api-key", api_key)
            .header("anthropic-version", &self.version)
            .json(request);

        let mut response =
            http::execute::<AnthropicResponse, AnthropicErrorResponse>(&self.name, context, builder).await?;

        if let Some(error) = response.error.take() {
            return Err(http::reported_error(&self.name, error.message));
        }

        Ok(response)
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_text(&self, context: &RequestContext, config: &RequestConfig) -> Result<String, LlmError> {
        let response = self.create_message(context, &config.into()).await?;
        response_text(response, &self.name)
    }

    async fn get_object(
        &self,
        context: &RequestContext,
        config: &RequestConfig,
        target: &ObjectTarget,
    ) -> Result<Box<RawValue>, LlmError> {
        let mut request = AnthropicRequest::from(config);
        append_system(&mut request, &target.instruction());

        let response = self.create_message(context, &request).await?;
        let text = response_text(response, &self.name)?;
        reconcile::extract_raw(&text)
    }

    async fn get_tool_calls(&self, context: &RequestContext, config: &RequestConfig) -> Result<Vec<ToolCall>, LlmError> {
        if config.tools.is_empty() {
            return Err(LlmError::NoToolsSpecified);
        }

        let response = self.create_message(context, &config.into()).await?;
        response_tool_calls(response, &self.name)
    }
}
