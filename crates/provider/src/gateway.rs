//! Resilient invocation wrapper around a [`TicketAnalyzer`].
//!
//! Every logical call gets a hard per-attempt timeout and a bounded
//! exponential-backoff retry budget. Terminal failures are normalized into
//! [`ProviderError`]; a shape mismatch in an otherwise successful reply is
//! surfaced immediately without burning further attempts.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use triage_common::ProviderError;

use crate::client::{Classification, TicketAnalyzer};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts, including the first one.
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
    #[serde(default = "default_backoff_factor")]
    pub backoff_factor: f64,
}

fn default_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    500
}

fn default_backoff_factor() -> f64 {
    2.0
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            base_delay_ms: default_base_delay_ms(),
            backoff_factor: default_backoff_factor(),
        }
    }
}

pub struct ProviderGateway {
    inner: Arc<dyn TicketAnalyzer>,
    timeout: Duration,
    retry: RetryConfig,
}

impl ProviderGateway {
    pub fn new(inner: Arc<dyn TicketAnalyzer>, timeout: Duration, mut retry: RetryConfig) -> Self {
        // A zero attempt budget would never invoke the provider at all.
        retry.attempts = retry.attempts.max(1);
        Self {
            inner,
            timeout,
            retry,
        }
    }

    /// Name of the wrapped analyzer, for health reporting.
    pub fn provider_name(&self) -> &str {
        self.inner.name()
    }

    /// Invoke the analyzer and validate its reply into a [`Classification`].
    ///
    /// Transient failures (transport errors, per-attempt timeouts) are
    /// retried with backoff applied before each retry, never after the final
    /// attempt. The final attempt's failure determines the error kind:
    /// [`ProviderError::Timeout`] if it timed out, [`ProviderError::Exhausted`]
    /// otherwise. A reply that does not deserialize into the classification
    /// shape yields [`ProviderError::Invalid`] without retry.
    pub async fn analyze(&self, text: &str) -> Result<Classification, ProviderError> {
        let started = Instant::now();
        let mut delay = Duration::from_millis(self.retry.base_delay_ms);

        for attempt in 1..=self.retry.attempts {
            match tokio::time::timeout(self.timeout, self.inner.analyze(text)).await {
                Ok(Ok(raw)) => {
                    return serde_json::from_value::<Classification>(raw).map_err(|e| {
                        error!(
                            provider = self.inner.name(),
                            attempt,
                            error = %e,
                            "provider reply does not match classification shape"
                        );
                        ProviderError::Invalid(e.to_string())
                    });
                }
                Ok(Err(e)) => {
                    if attempt == self.retry.attempts {
                        error!(
                            provider = self.inner.name(),
                            attempts = attempt,
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            error = %e,
                            "provider attempts exhausted"
                        );
                        return Err(ProviderError::Exhausted {
                            attempts: attempt,
                            detail: e.to_string(),
                        });
                    }
                    warn!(
                        provider = self.inner.name(),
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "provider attempt failed, retrying"
                    );
                }
                // Timeout: the in-flight attempt is dropped here, its
                // eventual result discarded.
                Err(_) => {
                    if attempt == self.retry.attempts {
                        error!(
                            provider = self.inner.name(),
                            attempts = attempt,
                            timeout_ms = self.timeout.as_millis() as u64,
                            elapsed_ms = started.elapsed().as_millis() as u64,
                            "provider timed out on final attempt"
                        );
                        return Err(ProviderError::Timeout { attempts: attempt });
                    }
                    warn!(
                        provider = self.inner.name(),
                        attempt,
                        timeout_ms = self.timeout.as_millis() as u64,
                        "provider attempt timed out, retrying"
                    );
                }
            }

            tokio::time::sleep(delay).await;
            delay = delay.mul_f64(self.retry.backoff_factor);
        }

        unreachable!("final attempt always returns; attempts is clamped to >= 1")
    }
}
