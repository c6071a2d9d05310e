//! Programmatic configuration builder for integration tests

use indexmap::IndexMap;
use prism_config::{Config, DefaultsConfig, ProviderConfig, ProviderType};
use secrecy::SecretString;
use url::Url;

use super::mock_llm::API_KEY;

/// Builder for constructing test configurations
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Create a new builder with built-in defaults and no providers
    pub fn new() -> Self {
        Self {
            config: Config {
                defaults: DefaultsConfig::default(),
                providers: IndexMap::new(),
                telemetry: None,
            },
        }
    }

    /// Default provider and model for every call
    pub fn with_defaults(mut self, provider: &str, model: &str) -> Self {
        self.config.defaults.provider = Some(provider.to_owned());
        self.config.defaults.model = Some(model.to_owned());
        self
    }

    /// Add an OpenAI-compatible provider pointed at a mock backend
    pub fn with_openai_provider(self, name: &str, base_url: &str) -> Self {
        self.with_provider(name, ProviderType::Openai, base_url)
    }

    /// Add an Anthropic provider pointed at a mock backend
    pub fn with_anthropic_provider(self, name: &str, base_url: &str) -> Self {
        self.with_provider(name, ProviderType::Anthropic, base_url)
    }

    fn with_provider(mut self, name: &str, provider_type: ProviderType, base_url: &str) -> Self {
        let mut provider = ProviderConfig::new(provider_type);
        provider.api_key = Some(SecretString::from(API_KEY.to_owned()));
        provider.base_url = Some(Url::parse(base_url).expect("valid mock URL"));

        self.config.providers.insert(name.to_owned(), provider);
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Config {
        self.config.validate().expect("valid test config");
        self.config
    }
}
