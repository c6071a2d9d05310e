use std::fmt;

pub use prism_config::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};
use serde::{Deserialize, Serialize};

use super::message::Message;
use super::tool::FunctionDefinition;

/// Identifier a provider is registered under
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    /// Canonical id for the `OpenAI` adapter
    pub const OPENAI: &'static str = "openai";
    /// Canonical id for the Anthropic adapter
    pub const ANTHROPIC: &'static str = "anthropic";

    /// Create an id from any string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProviderId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ProviderId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Request parameters handed to a provider
///
/// The same type serves as the client's base configuration and as the
/// effective per-call configuration produced by [`RequestConfig::merged`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestConfig {
    /// Provider to dispatch to
    pub provider: ProviderId,
    /// Model identifier
    pub model: String,
    /// Conversation messages
    pub messages: Vec<Message>,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature; `None` leaves it to the provider
    pub temperature: Option<f64>,
    /// Functions offered to the model
    pub tools: Vec<FunctionDefinition>,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            provider: ProviderId::default(),
            model: String::new(),
            messages: Vec::new(),
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: Some(DEFAULT_TEMPERATURE),
            tools: Vec::new(),
        }
    }
}

impl RequestConfig {
    /// Overlay `options` onto a copy of this configuration
    ///
    /// Options apply in the order given, each replacing exactly one field,
    /// so later options win. `self` is left untouched.
    pub fn merged(&self, options: impl IntoIterator<Item = RequestOption>) -> Self {
        options.into_iter().fold(self.clone(), |draft, option| option.apply(draft))
    }
}

/// A single field override applied during configuration merge
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOption {
    /// Set the provider id
    Provider(ProviderId),
    /// Set the model
    Model(String),
    /// Replace the conversation
    Messages(Vec<Message>),
    /// Set the generation limit
    MaxTokens(u32),
    /// Set or clear the sampling temperature
    Temperature(Option<f64>),
    /// Replace the offered functions
    Tools(Vec<FunctionDefinition>),
}

impl RequestOption {
    /// Apply this override to a draft configuration
    pub fn apply(self, draft: RequestConfig) -> RequestConfig {
        match self {
            Self::Provider(provider) => RequestConfig { provider, ..draft },
            Self::Model(model) => RequestConfig { model, ..draft },
            Self::Messages(messages) => RequestConfig { messages, ..draft },
            Self::MaxTokens(max_tokens) => RequestConfig { max_tokens, ..draft },
            Self::Temperature(temperature) => RequestConfig { temperature, ..draft },
            Self::Tools(tools) => RequestConfig { tools, ..draft },
        }
    }
}

/// Select the provider for the request
pub fn with_provider(provider: impl Into<ProviderId>) -> RequestOption {
    RequestOption::Provider(provider.into())
}

/// Select the model for the request
pub fn with_model(model: impl Into<String>) -> RequestOption {
    RequestOption::Model(model.into())
}

/// Replace the conversation sent with the request
pub fn with_messages(messages: impl IntoIterator<Item = Message>) -> RequestOption {
    RequestOption::Messages(messages.into_iter().collect())
}

/// Set the maximum number of tokens to generate
pub fn with_max_tokens(max_tokens: u32) -> RequestOption {
    RequestOption::MaxTokens(max_tokens)
}

/// Set the sampling temperature
pub fn with_temperature(temperature: f64) -> RequestOption {
    RequestOption::Temperature(Some(temperature))
}

/// Leave the sampling temperature to the provider's own default
pub fn without_temperature() -> RequestOption {
    RequestOption::Temperature(None)
}

/// Replace the functions offered to the model
pub fn with_tools(tools: impl IntoIterator<Item = FunctionDefinition>) -> RequestOption {
    RequestOption::Tools(tools.into_iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn weather_tool() -> FunctionDefinition {
        FunctionDefinition::new(
            "get_weather",
            "Gets the weather for a location",
            serde_json::json!({"type": "object", "properties": {"location": {"type": "string"}}}),
        )
    }

    #[test]
    fn default_matches_client_defaults() {
        let config = RequestConfig::default();
        assert_eq!(config.temperature, Some(0.7));
        assert_eq!(config.max_tokens, 1000);
        assert!(config.model.is_empty());
        assert!(config.provider.as_str().is_empty());
    }

    #[test]
    fn last_override_wins() {
        let base = RequestConfig::default();
        let merged = base.merged([with_temperature(0.2), with_temperature(0.9)]);
        assert_eq!(merged.temperature, Some(0.9));
    }

    #[test]
    fn zero_temperature_is_kept_and_can_be_cleared() {
        let base = RequestConfig::default();

        assert_eq!(base.merged([with_temperature(0.0)]).temperature, Some(0.0));
        assert_eq!(base.merged([with_temperature(0.0), without_temperature()]).temperature, None);
    }

    #[test]
    fn repeated_override_is_idempotent() {
        let base = RequestConfig::default();
        let once = base.merged([with_model("gpt-4o"), with_max_tokens(256)]);
        let twice = base.merged([with_model("gpt-4o"), with_max_tokens(256), with_max_tokens(256)]);
        assert_eq!(once, twice);
    }

    #[test]
    fn overrides_take_precedence_over_base() {
        let base = RequestConfig::default().merged([with_provider("openai"), with_model("gpt-4")]);
        let merged = base.merged([with_model("gpt-4o-mini")]);

        assert_eq!(merged.provider.as_str(), "openai");
        assert_eq!(merged.model, "gpt-4o-mini");
    }

    #[test]
    fn sequences_are_replaced_not_appended() {
        let base = RequestConfig::default().merged([
            with_messages([Message::system("be terse"), Message::user("hi")]),
            with_tools([weather_tool()]),
        ]);

        let merged = base.merged([with_messages([Message::user("bye")]), with_tools([])]);

        assert_eq!(merged.messages.len(), 1);
        assert_eq!(merged.messages[0].content, "bye");
        assert!(merged.tools.is_empty());
    }

    #[test]
    fn merge_leaves_base_untouched() {
        let base = RequestConfig::default().merged([with_messages([Message::user("hi")])]);
        let snapshot = base.clone();

        let mut merged = base.merged([with_temperature(1.5)]);
        merged.messages.push(Message::assistant("hello"));
        merged.messages[0].content.push_str(" there");

        assert_eq!(base, snapshot);
        assert_eq!(base.messages.len(), 1);
        assert_eq!(base.messages[0].content, "hi");
    }

    #[test]
    fn provider_id_conversions() {
        let id: ProviderId = "anthropic".into();
        assert_eq!(id.as_str(), ProviderId::ANTHROPIC);
        assert_eq!(id.to_string(), "anthropic");
        assert_eq!(ProviderId::from(String::from("openai")), ProviderId::new(ProviderId::OPENAI));
    }
}
