#![allow(clippy::must_use_candidate)]

pub mod defaults;
mod env;
mod loader;
pub mod provider;
pub mod telemetry;

use indexmap::IndexMap;
use serde::Deserialize;

pub use defaults::{DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, DefaultsConfig};
pub use provider::{DEFAULT_ANTHROPIC_VERSION, ProviderConfig, ProviderType};
pub use telemetry::{LogFormat, TelemetryConfig};

/// Top-level Prism configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Base request configuration applied to every call
    #[serde(default)]
    pub defaults: DefaultsConfig,
    /// Provider adapters keyed by the id requests select them with
    #[serde(default)]
    pub providers: IndexMap<String, ProviderConfig>,
    /// Logging configuration for host applications
    #[serde(default)]
    pub telemetry: Option<TelemetryConfig>,
}
