use std::future::Future;
use std::time::Duration;

use secrecy::SecretString;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::error::LlmError;

/// Per-call runtime context handed through to providers
///
/// Carries cancellation, an optional deadline, and an optional API key that
/// overrides the key a provider was configured with.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancellation: CancellationToken,
    deadline: Option<Instant>,
    /// Caller-supplied API key that takes precedence over the configured key
    pub api_key: Option<SecretString>,
}

impl RequestContext {
    /// Context with no deadline and a fresh cancellation token
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel the call when `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    /// Give up once `timeout` has elapsed from now
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Give up at `deadline`
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Override the provider's configured API key for this call
    #[must_use]
    pub fn with_api_key(mut self, api_key: SecretString) -> Self {
        self.api_key = Some(api_key);
        self
    }

    /// Token that cancels this call
    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancellation
    }

    /// Deadline of this call, if any
    pub const fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the call has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancellation.is_cancelled()
    }

    /// Drive `future` to completion unless cancelled or out of time
    ///
    /// The future is dropped on cancellation or deadline expiry, which
    /// aborts any in-flight HTTP exchange it owns.
    pub async fn run<T, F>(&self, future: F) -> Result<T, LlmError>
    where
        F: Future<Output = Result<T, LlmError>>,
    {
        let bounded = async {
            match self.deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, future)
                    .await
                    .unwrap_or(Err(LlmError::DeadlineExceeded)),
                None => future.await,
            }
        };

        tokio::select! {
            biased;
            () = self.cancellation.cancelled() => Err(LlmError::Cancelled),
            result = bounded => result,
        }
    }
}
