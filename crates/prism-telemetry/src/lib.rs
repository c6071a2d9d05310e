//! Logging setup for Prism
//!
//! Installs a `tracing-subscriber` registry for applications that embed the
//! client, in human-readable or JSON form.

use prism_config::{LogFormat, TelemetryConfig};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when the configured directives do not parse
const FALLBACK_FILTER: &str = "info";

/// Initialize logging from configuration
///
/// The filter comes from `telemetry.log_filter` when set, otherwise from
/// `default_filter`; unparseable directives fall back to `info`.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed
pub fn init(config: Option<&TelemetryConfig>, default_filter: &str) -> anyhow::Result<()> {
    let directives = config
        .and_then(|c| c.log_filter.as_deref())
        .unwrap_or(default_filter);
    let filter = build_filter(directives);
    let format = config.map(|c| c.format).unwrap_or_default();

    let (pretty, json) = match format {
        LogFormat::Pretty => (Some(tracing_subscriber::fmt::layer().with_target(true).pretty()), None),
        LogFormat::Json => (
            None,
            Some(
                tracing_subscriber::fmt::layer()
                    .with_target(true)
                    .json()
                    .flatten_event(true),
            ),
        ),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(pretty)
        .with(json)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))?;

    tracing::debug!(filter = directives, ?format, "logging initialized");

    Ok(())
}

/// Parse `directives`, falling back to `info` when they are invalid
fn build_filter(directives: &str) -> EnvFilter {
    EnvFilter::try_new(directives).unwrap_or_else(|e| {
        eprintln!("invalid log filter '{directives}': {e}; using '{FALLBACK_FILTER}'");
        EnvFilter::new(FALLBACK_FILTER)
    })
}
