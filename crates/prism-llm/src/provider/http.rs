//! Shared HTTP exchange for the JSON-over-HTTPS adapters

use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;

use crate::context::RequestContext;
use crate::error::LlmError;
use crate::protocol::ErrorEnvelope;

/// HTTP client honoring the configured timeout
pub fn build_client(timeout: Option<Duration>) -> Result<Client, LlmError> {
    let mut builder = Client::builder();
    if let Some(timeout) = timeout {
        builder = builder.timeout(timeout);
    }

    builder
        .build()
        .map_err(|e| LlmError::Internal(anyhow::anyhow!("failed to build HTTP client: {e}")))
}

/// API key for a call: the context override first, then the configured key
pub fn api_key(provider: &str, context: &RequestContext, configured: Option<&SecretString>) -> Result<String, LlmError> {
    let key = context
        .api_key
        .as_ref()
        .or(configured)
        .map(|k| k.expose_secret().trim().to_owned())
        .unwrap_or_default();

    if key.is_empty() {
        return Err(LlmError::EmptyCredential {
            provider: provider.to_owned(),
        });
    }

    Ok(key)
}

/// Send `request` and decode a successful JSON reply into `R`
///
/// The whole exchange runs under the context's cancellation and deadline.
/// Non-success statuses become [`LlmError::Upstream`] carrying the message
/// of the provider's error envelope `E` verbatim, or the raw body when it
/// does not parse as one.
pub async fn execute<R: DeserializeOwned, E: ErrorEnvelope>(
    provider: &str,
    context: &RequestContext,
    request: RequestBuilder,
) -> Result<R, LlmError> {
    context
        .run(async {
            let response = request.send().await.map_err(|e| {
                tracing::error!(provider = %provider, error = %e, "upstream request failed");
                LlmError::Transport {
                    provider: provider.to_owned(),
                    source: e,
                }
            })?;

            let status = response.status();
            let body = response.text().await.map_err(|e| {
                tracing::error!(provider = %provider, error = %e, "failed to read upstream reply");
                LlmError::Transport {
                    provider: provider.to_owned(),
                    source: e,
                }
            })?;

            if !status.is_success() {
                tracing::warn!(provider = %provider, status = %status, "upstream returned error");
                return Err(LlmError::Upstream {
                    provider: provider.to_owned(),
                    status: status.as_u16(),
                    message: error_message::<E>(&body).unwrap_or(body),
                });
            }

            serde_json::from_str(&body).map_err(|e| LlmError::InvalidUpstreamReply {
                provider: provider.to_owned(),
                reason: format!("failed to parse response: {e}"),
            })
        })
        .await
}

/// Message of an error body shaped like `E`
fn error_message<E: ErrorEnvelope>(body: &str) -> Option<String> {
    serde_json::from_str::<E>(body).ok().map(ErrorEnvelope::into_message)
}

/// Upstream error for an error object inside a success reply
pub fn reported_error(provider: &str, message: String) -> LlmError {
    tracing::warn!(provider = %provider, "upstream reported error in success reply");
    LlmError::Upstream {
        provider: provider.to_owned(),
        status: 200,
        message,
    }
}
