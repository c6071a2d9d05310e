use serde::Deserialize;

/// Temperature used when the file does not set one
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Token limit used when the file does not set one
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

/// `[defaults]` table: the client's base request configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    /// Provider id used when a call does not pick one
    #[serde(default)]
    pub provider: Option<String>,
    /// Model used when a call does not pick one
    #[serde(default)]
    pub model: Option<String>,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            provider: None,
            model: None,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }
}

const fn default_max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}

const fn default_temperature() -> f64 {
    DEFAULT_TEMPERATURE
}
