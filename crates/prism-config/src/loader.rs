use std::path::Path;

use anyhow::Context;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;

        let config = Self::from_toml(&raw)?;
        tracing::debug!(path = %path.display(), providers = config.providers.len(), "loaded configuration");

        Ok(config)
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if environment variable expansion, parsing, or
    /// validation fails
    pub fn from_toml(raw: &str) -> anyhow::Result<Self> {
        let expanded = crate::env::expand_env(raw).context("config variable expansion failed")?;

        let config: Self = toml::from_str(&expanded).context("failed to parse config")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if defaults are out of range or a provider entry is
    /// invalid
    pub fn validate(&self) -> anyhow::Result<()> {
        self.validate_defaults()?;
        self.validate_providers()?;
        Ok(())
    }

    fn validate_defaults(&self) -> anyhow::Result<()> {
        let temperature = self.defaults.temperature;
        if !(0.0..=2.0).contains(&temperature) {
            anyhow::bail!("defaults.temperature must be between 0.0 and 2.0, got {temperature}");
        }

        // Programmatic registration is allowed when no providers are configured
        if let Some(ref provider) = self.defaults.provider
            && !self.providers.is_empty()
            && !self.providers.contains_key(provider)
        {
            anyhow::bail!("defaults.provider '{provider}' is not configured under [providers]");
        }

        Ok(())
    }

    fn validate_providers(&self) -> anyhow::Result<()> {
        for (name, provider) in &self.providers {
            if name.trim().is_empty() {
                anyhow::bail!("provider ids must not be empty");
            }

            if let Some(ref url) = provider.base_url
                && !matches!(url.scheme(), "http" | "https")
            {
                anyhow::bail!("provider '{name}' base_url must use http or https, got '{}'", url.scheme());
            }

            provider
                .timeout()
                .with_context(|| format!("provider '{name}' has an invalid timeout"))?;
        }

        Ok(())
    }
}
