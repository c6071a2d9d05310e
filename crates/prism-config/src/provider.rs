use std::time::Duration;

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Anthropic API version sent when the provider does not pin one
pub const DEFAULT_ANTHROPIC_VERSION: &str = "2023-06-01";

/// Configuration for a single provider adapter
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderConfig {
    /// Provider protocol type
    #[serde(rename = "type")]
    pub provider_type: ProviderType,
    /// API key for authentication
    #[serde(default)]
    pub api_key: Option<SecretString>,
    /// Base URL override
    #[serde(default)]
    pub base_url: Option<Url>,
    /// Request timeout (e.g. "30s", "2m")
    #[serde(default)]
    pub timeout: Option<String>,
    /// `anthropic-version` header value
    #[serde(default)]
    pub anthropic_version: Option<String>,
}

impl ProviderConfig {
    /// Config for `provider_type` with everything else unset
    pub const fn new(provider_type: ProviderType) -> Self {
        Self {
            provider_type,
            api_key: None,
            base_url: None,
            timeout: None,
            anthropic_version: None,
        }
    }

    /// Parsed request timeout
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout is not a valid duration string
    pub fn timeout(&self) -> anyhow::Result<Option<Duration>> {
        self.timeout
            .as_deref()
            .map(|s| duration_str::parse(s).map_err(|e| anyhow::anyhow!("invalid timeout '{s}': {e}")))
            .transpose()
    }

    /// Version header value, falling back to [`DEFAULT_ANTHROPIC_VERSION`]
    pub fn anthropic_version(&self) -> &str {
        self.anthropic_version.as_deref().unwrap_or(DEFAULT_ANTHROPIC_VERSION)
    }
}

/// Supported provider protocols
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderType {
    /// OpenAI-compatible chat completions API
    Openai,
    /// Anthropic Messages API
    Anthropic,
}
