//! OpenAI-compatible provider implementation

use async_trait::async_trait;
use prism_config::ProviderConfig;
use reqwest::Client;
use secrecy::SecretString;
use url::Url;

use super::{Provider, http};
use crate::context::RequestContext;
use crate::convert::openai::{response_text, response_tool_calls};
use crate::error::LlmError;
use crate::protocol::openai::{OpenAiErrorResponse, OpenAiRequest, OpenAiResponse};
use crate::types::{RequestConfig, ToolCall};

/// Default `OpenAI` API base URL
const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// OpenAI-compatible chat completions provider
pub struct OpenAiProvider {
    name: String,
    client: Client,
    base_url: Url,
    api_key: Option<SecretString>,
}

impl OpenAiProvider {
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
        })
    }

    /// Build the chat completions URL
    fn completions_url(&self) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        format!("{base}/chat/completions")
    }

    /// Send a chat completion request and surface any reported error
    async fn complete(&self, context: &RequestContext, request: &OpenAiRequest) -> Result<OpenAiResponse, LlmError> {
        let api_key = http::api_key(&self.name, context, self.api_key.as_ref())?;

        tracing::debug!(
            provider = %self.name,
            model = %request.model,
            messages = request.messages.len(),
            "sending chat completion request"
        );

        let builder = self
            .client
            .post(self.completions_url())
            .bearer_auth(api_key)
            .json(request);

        let mut response = http::execute::<OpenAiResponse, OpenAiErrorResponse>(&self.name, context, builder).await?;

        if let Some(error) = response.error.take() {
            return Err(http::reported_error(&self.name, error.message));
        }

        Ok(response)
    }
}

#[async_trait]
impl Provider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get_text(&self, context: &RequestContext, config: &RequestConfig) -> Result<String, LlmError> {
        let response = self.complete(context, &config.into()).await?;
        response_text(response, &self.name)
    }

    async fn get_tool_calls(&self, context: &RequestContext, config: &RequestConfig) -> Result<Vec<ToolCall>, LlmError> {
        if config.tools.is_empty() {
            return Err(LlmError::NoToolsSpecified);
        }

        let response = self.complete(context, &config.into()).await?;
        response_tool_calls(response, &self.name)
    }
}
