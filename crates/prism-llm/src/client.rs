//! Dispatcher: merge, validate, route, reconcile

use std::sync::Arc;

use prism_config::{Config, ProviderType};
use serde::de::DeserializeOwned;

use crate::context::RequestContext;
use crate::error::LlmError;
use crate::provider::{AnthropicProvider, ObjectTarget, OpenAiProvider, Provider, ProviderRegistry};
use crate::reconcile;
use crate::types::{ProviderId, RequestConfig, RequestOption, ToolCall};

/// Provider-agnostic LLM client
///
/// Cheap to clone; clones share the base configuration and the provider
/// registry.
#[derive(Debug, Clone)]
pub struct LlmClient {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    defaults: RequestConfig,
    registry: ProviderRegistry,
}

impl LlmClient {
    /// Client whose base configuration is the built-in defaults overlaid with `options`
    pub fn new(options: impl IntoIterator<Item = RequestOption>) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                defaults: RequestConfig::default().merged(options),
                registry: ProviderRegistry::new(),
            }),
        }
    }

    /// Build a client from loaded configuration
    ///
    /// `[defaults]` becomes the base configuration and every
    /// `[providers.<id>]` entry is registered under its id.
    ///
    /// # Errors
    ///
    /// Returns an error if a provider adapter cannot be constructed
    pub fn from_config(config: &Config) -> Result<Self, LlmError> {
        let defaults = &config.defaults;
        let mut options = vec![
            RequestOption::MaxTokens(defaults.max_tokens),
            RequestOption::Temperature(Some(defaults.temperature)),
        ];
        if let Some(provider) = &defaults.provider {
            options.push(RequestOption::Provider(provider.as_str().into()));
        }
        if let Some(model) = &defaults.model {
            options.push(RequestOption::Model(model.clone()));
        }

        let client = Self::new(options);

        for (id, provider_config) in &config.providers {
            let provider: Arc<dyn Provider> = match provider_config.provider_type {
                ProviderType::Openai => Arc::new(OpenAiProvider::new(id.as_str(), provider_config)?),
                ProviderType::Anthropic => Arc::new(AnthropicProvider::new(id.as_str(), provider_config)?),
            };
            client.register_provider(id.as_str(), provider);
        }

        tracing::debug!(
            providers = config.providers.len(),
            default_provider = %client.inner.defaults.provider,
            "client configured"
        );

        Ok(client)
    }

    /// Base configuration every call is merged over
    pub fn defaults(&self) -> &RequestConfig {
        &self.inner.defaults
    }

    /// Provider registry shared by all clones of this client
    pub fn registry(&self) -> &ProviderRegistry {
        &self.inner.registry
    }

    /// Register `provider` under `id`, replacing any previous entry
    pub fn register_provider(&self, id: impl Into<ProviderId>, provider: Arc<dyn Provider>) {
        self.inner.registry.register(id, provider);
    }

    /// Free-text completion
    pub async fn get_text(
        &self,
        context: &RequestContext,
        options: impl IntoIterator<Item = RequestOption>,
    ) -> Result<String, LlmError> {
        let (config, provider) = self.prepare(options, "text")?;
        provider.get_text(context, &config).await
    }

    /// Structured completion decoded into `T`
    pub async fn get_object<T: DeserializeOwned>(
        &self,
        context: &RequestContext,
        options: impl IntoIterator<Item = RequestOption>,
    ) -> Result<T, LlmError> {
        self.object(context, ObjectTarget::of::<T>(), options).await
    }

    /// Structured completion constrained by `schema` and decoded into `T`
    pub async fn get_object_with_schema<T: DeserializeOwned>(
        &self,
        context: &RequestContext,
        schema: serde_json::Value,
        options: impl IntoIterator<Item = RequestOption>,
    ) -> Result<T, LlmError> {
        self.object(context, ObjectTarget::of::<T>().with_schema(schema), options)
            .await
    }

    /// Tool calls the model chose to make, in emission order
    pub async fn get_tool_calls(
        &self,
        context: &RequestContext,
        options: impl IntoIterator<Item = RequestOption>,
    ) -> Result<Vec<ToolCall>, LlmError> {
        let (config, provider) = self.prepare(options, "tool_calls")?;
        if config.tools.is_empty() {
            return Err(LlmError::NoToolsSpecified);
        }

        provider.get_tool_calls(context, &config).await
    }

    async fn object<T: DeserializeOwned>(
        &self,
        context: &RequestContext,
        target: ObjectTarget,
        options: impl IntoIterator<Item = RequestOption>,
    ) -> Result<T, LlmError> {
        let (config, provider) = self.prepare(options, "object")?;
        let raw = provider.get_object(context, &config, &target).await?;

        reconcile::decode_candidate(raw.get())
    }

    /// Merge options, then check the effective configuration and resolve its provider
    fn prepare(
        &self,
        options: impl IntoIterator<Item = RequestOption>,
        capability: &'static str,
    ) -> Result<(RequestConfig, Arc<dyn Provider>), LlmError> {
        let config = self.inner.defaults.merged(options);

        if config.model.is_empty() {
            return Err(LlmError::ModelNotSpecified);
        }

        let Some(provider) = self.inner.registry.get(&config.provider) else {
            return Err(LlmError::ProviderNotSupported {
                provider: config.provider.to_string(),
            });
        };

        for message in &config.messages {
            message.validate()?;
        }

        tracing::debug!(
            provider = %config.provider,
            model = %config.model,
            capability,
            messages = config.messages.len(),
            tools = config.tools.len(),
            "dispatching request"
        );

        Ok((config, provider))
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;
    use serde_json::value::RawValue;

    use super::*;
    use crate::provider::StubProvider;
    use crate::types::{
        FunctionDefinition, Message, with_max_tokens, with_messages, with_model, with_provider, with_temperature,
        with_tools,
    };

    #[derive(Debug, Deserialize, PartialEq)]
    struct Person {
        name: String,
        age: u32,
    }

    fn hello_stub() -> StubProvider {
        StubProvider::new("p").with_text(|config| {
            if config.model == "m" {
                Ok("Hello, world!".to_owned())
            } else {
                Ok(format!("unexpected model {}", config.model))
            }
        })
    }

    fn client_with(stub: &Arc<StubProvider>) -> LlmClient {
        let client = LlmClient::new([with_temperature(0.7), with_max_tokens(1000)]);
        client.register_provider("p", Arc::clone(stub) as Arc<dyn Provider>);
        client
    }

    fn weather_tool() -> FunctionDefinition {
        FunctionDefinition::new("get_weather", "Gets the weather", json!({"type": "object"}))
    }

    #[tokio::test]
    async fn get_text_end_to_end() {
        let stub = Arc::new(hello_stub());
        let client = client_with(&stub);

        let text = client
            .get_text(&RequestContext::new(), [with_provider("p"), with_model("m")])
            .await
            .unwrap();

        assert_eq!(text, "Hello, world!");
        assert_eq!(stub.call_count(), 1);
    }

    #[tokio::test]
    async fn get_object_decodes_fenced_reply() {
        let stub = Arc::new(
            StubProvider::new("p").with_text(|_| Ok("```json\n{\"name\":\"John Doe\",\"age\":30}\n```".to_owned())),
        );
        let client = client_with(&stub);

        let person: Person = client
            .get_object(&RequestContext::new(), [with_provider("p"), with_model("m")])
            .await
            .unwrap();

        assert_eq!(
            person,
            Person {
                name: "John Doe".to_owned(),
                age: 30
            }
        );
    }

    #[tokio::test]
    async fn get_object_names_target_in_instruction() {
        let stub = Arc::new(StubProvider::new("p").with_text(|config| {
            let system = &config.messages[0];
            assert!(system.content.contains("matching the Person type"));
            assert!(system.content.contains(r#""required":["name","age"]"#));
            Ok(r#"{"name":"Ada","age":36}"#.to_owned())
        }));
        let client = client_with(&stub);

        let person: Person = client
            .get_object_with_schema(
                &RequestContext::new(),
                json!({"type": "object", "required": ["name", "age"]}),
                [with_provider("p"), with_model("m"), with_messages([Message::user("who?")])],
            )
            .await
            .unwrap();

        assert_eq!(person.name, "Ada");
    }

    #[tokio::test]
    async fn get_object_shape_mismatch_carries_candidate() {
        let stub = Arc::new(StubProvider::new("p").with_text(|_| Ok("```json\n{\"name\":\"John Doe\"}\n```".to_owned())));
        let client = client_with(&stub);

        let err = client
            .get_object::<Person>(&RequestContext::new(), [with_provider("p"), with_model("m")])
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::DecodeFailure { ref candidate, .. } if candidate == r#"{"name":"John Doe"}"#));
    }

    #[tokio::test]
    async fn empty_model_fails_before_dispatch() {
        let stub = Arc::new(hello_stub());
        let client = client_with(&stub);
        let ctx = RequestContext::new();

        let text = client.get_text(&ctx, [with_provider("p")]).await;
        let object = client.get_object::<Person>(&ctx, [with_provider("p")]).await;
        let tools = client
            .get_tool_calls(&ctx, [with_provider("p"), with_tools([weather_tool()])])
            .await;

        assert!(matches!(text, Err(LlmError::ModelNotSpecified)));
        assert!(matches!(object, Err(LlmError::ModelNotSpecified)));
        assert!(matches!(tools, Err(LlmError::ModelNotSpecified)));
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn unknown_provider_carries_id() {
        let stub = Arc::new(hello_stub());
        let client = client_with(&stub);
        let ctx = RequestContext::new();

        let text = client.get_text(&ctx, [with_provider("nope"), with_model("m")]).await;
        let object = client
            .get_object::<Person>(&ctx, [with_provider("nope"), with_model("m")])
            .await;
        let tools = client
            .get_tool_calls(&ctx, [with_provider("nope"), with_model("m"), with_tools([weather_tool()])])
            .await;

        for result in [text.map(drop), object.map(drop), tools.map(drop)] {
            assert!(matches!(result, Err(LlmError::ProviderNotSupported { ref provider }) if provider == "nope"));
        }
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_tools_fail_without_dispatch() {
        let stub = Arc::new(StubProvider::new("p").with_tool_calls(|_| Ok(Vec::new())));
        let client = client_with(&stub);

        let err = client
            .get_tool_calls(&RequestContext::new(), [with_provider("p"), with_model("m")])
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::NoToolsSpecified));
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn tool_calls_keep_order() {
        let stub = Arc::new(StubProvider::new("p").with_tool_calls(|_| {
            let args = || RawValue::from_string("{}".to_owned()).unwrap();
            Ok(vec![
                ToolCall::function("1", "X", args()),
                ToolCall::function("2", "Y", args()),
            ])
        }));
        let client = client_with(&stub);

        let calls = client
            .get_tool_calls(
                &RequestContext::new(),
                [with_provider("p"), with_model("m"), with_tools([weather_tool()])],
            )
            .await
            .unwrap();

        let names: Vec<&str> = calls.iter().map(|c| c.tool.name.as_str()).collect();
        assert_eq!(names, ["X", "Y"]);
    }

    #[tokio::test]
    async fn invalid_message_is_rejected_before_dispatch() {
        let stub = Arc::new(hello_stub());
        let client = client_with(&stub);

        let mut bad = Message::user("hi");
        bad.tool_call_id = Some("call_1".to_owned());

        let err = client
            .get_text(
                &RequestContext::new(),
                [with_provider("p"), with_model("m"), with_messages([bad])],
            )
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::InvalidRequest(_)));
        assert_eq!(stub.call_count(), 0);
    }

    #[tokio::test]
    async fn per_call_options_override_base() {
        let stub = Arc::new(StubProvider::new("p").with_text(|config| {
            Ok(format!("{}:{:?}:{}", config.model, config.temperature, config.max_tokens))
        }));
        let client = LlmClient::new([with_provider("p"), with_model("base"), with_temperature(0.7)]);
        client.register_provider("p", Arc::clone(&stub) as Arc<dyn Provider>);

        let text = client
            .get_text(
                &RequestContext::new(),
                [with_temperature(0.2), with_temperature(0.9), with_model("m")],
            )
            .await
            .unwrap();

        assert_eq!(text, "m:Some(0.9):1000");
        assert_eq!(client.defaults().model, "base");
    }

    #[tokio::test]
    async fn provider_errors_pass_through_unchanged() {
        let stub = Arc::new(StubProvider::new("p").with_text(|_| {
            Err(LlmError::Upstream {
                provider: "p".to_owned(),
                status: 429,
                message: "Rate limit reached for requests".to_owned(),
            })
        }));
        let client = client_with(&stub);

        let err = client
            .get_text(&RequestContext::new(), [with_provider("p"), with_model("m")])
            .await
            .unwrap_err();

        assert!(matches!(err, LlmError::Upstream { status: 429, ref message, .. } if message == "Rate limit reached for requests"));
    }

    #[test]
    fn from_config_registers_providers() {
        let config = Config::from_toml(
            r#"
            [defaults]
            provider = "claude"
            model = "claude-sonnet-4-20250514"
            temperature = 0.3

            [providers.gpt]
            type = "openai"
            api_key = "sk-test"

            [providers.claude]
            type = "anthropic"
            api_key = "sk-ant-test"
            timeout = "10s"
            "#,
        )
        .unwrap();

        let client = LlmClient::from_config(&config).unwrap();

        assert_eq!(client.defaults().provider.as_str(), "claude");
        assert_eq!(client.defaults().model, "claude-sonnet-4-20250514");
        assert_eq!(client.defaults().max_tokens, 1000);
        assert_eq!(client.defaults().temperature, Some(0.3));
        assert_eq!(client.registry().len(), 2);
        assert_eq!(client.registry().get(&ProviderId::new("gpt")).unwrap().name(), "gpt");
    }
}
