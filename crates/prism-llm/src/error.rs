use thiserror::Error;

/// Errors that can occur while dispatching an LLM request
#[derive(Debug, Error)]
pub enum LlmError {
    /// Effective configuration has an empty model identifier
    #[error("model not specified")]
    ModelNotSpecified,

    /// No provider is registered under the requested identifier
    #[error("provider not supported: {provider}")]
    ProviderNotSupported { provider: String },

    /// Provider has no API key to authenticate with
    #[error("{provider} API key is empty")]
    EmptyCredential { provider: String },

    /// Upstream returned a non-success status or an error payload
    #[error("{provider} API error: {message}")]
    Upstream {
        provider: String,
        /// HTTP status of the reply
        status: u16,
        /// Upstream error message, verbatim
        message: String,
    },

    /// Upstream reply succeeded but lacked the expected content
    #[error("invalid response from {provider} API: {reason}")]
    InvalidUpstreamReply { provider: String, reason: String },

    /// Reconciled JSON candidate could not be decoded into the target shape
    #[error("failed to decode JSON response: {source}: {candidate}")]
    DecodeFailure {
        #[source]
        source: serde_json::Error,
        /// Exact text handed to the decoder
        candidate: String,
    },

    /// Tool-call request made without any declared function
    #[error("no tools specified")]
    NoToolsSpecified,

    /// Request violates a message or configuration invariant
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network-level failure talking to the provider
    #[error("request to {provider} failed: {source}")]
    Transport {
        provider: String,
        #[source]
        source: reqwest::Error,
    },

    /// Caller cancelled the request
    #[error("request cancelled")]
    Cancelled,

    /// Caller-supplied deadline elapsed before the provider replied
    #[error("request deadline exceeded")]
    DeadlineExceeded,

    /// Unexpected internal error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl LlmError {
    /// Whether a caller-side retry might succeed
    ///
    /// Transient errors indicate a network hiccup or an overloaded upstream.
    /// Nothing in this crate retries on its own.
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Transport { .. } | Self::DeadlineExceeded => true,
            Self::Upstream { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    /// Wrap a decode error together with the text that failed to parse
    pub(crate) fn decode(source: serde_json::Error, candidate: impl Into<String>) -> Self {
        Self::DecodeFailure {
            source,
            candidate: candidate.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_not_supported_names_provider() {
        let err = LlmError::ProviderNotSupported {
            provider: "mistral".to_owned(),
        };
        assert_eq!(err.to_string(), "provider not supported: mistral");
    }

    #[test]
    fn decode_failure_includes_candidate() {
        let source = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err = LlmError::decode(source, "{oops");
        assert!(err.to_string().ends_with(": {oops"));
    }

    #[test]
    fn transient_classification() {
        let overloaded = LlmError::Upstream {
            provider: "openai".to_owned(),
            status: 529,
            message: "overloaded".to_owned(),
        };
        let bad_request = LlmError::Upstream {
            provider: "openai".to_owned(),
            status: 400,
            message: "bad model".to_owned(),
        };
        assert!(overloaded.is_transient());
        assert!(!bad_request.is_transient());
        assert!(LlmError::DeadlineExceeded.is_transient());
        assert!(!LlmError::ModelNotSpecified.is_transient());
        assert!(!LlmError::Cancelled.is_transient());
    }
}
