//! Per-call deadline and bounded exponential-backoff retry for provider requests

use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::{sleep, timeout};

use crate::config::RetryConfig;
use crate::error::Error;

/// Failure of a single provider call, classified for retry
#[derive(Debug, Error)]
pub enum CallError {
    /// Deadline elapsed
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    /// Worth another attempt: connection errors, 429, 5xx
    #[error("{0}")]
    Transient(String),
    /// Will fail the same way again: other 4xx, malformed responses
    #[error("{0}")]
    Fatal(String),
}

impl CallError {
    /// Classify a transport error
    pub fn from_reqwest(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() || err.is_request() {
            Self::Transient(err.to_string())
        } else {
            Self::Fatal(err.to_string())
        }
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: StatusCode, body: &str) -> Self {
        let message = format!("HTTP {} - {}", status, body);
        if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
            Self::Transient(message)
        } else {
            Self::Fatal(message)
        }
    }

    /// Convert into a pipeline error; timeouts become `ProviderTimeout`,
    /// everything else goes through `wrap`
    pub fn into_error(self, provider: &str, operation: &str, wrap: fn(String) -> Error) -> Error {
        match self {
            CallError::Timeout(timeout) => Error::ProviderTimeout {
                provider: provider.to_string(),
                operation: operation.to_string(),
                timeout,
            },
            CallError::Transient(msg) | CallError::Fatal(msg) => {
                wrap(format!("{} {}: {}", provider, operation, msg))
            }
        }
    }
}

/// Decode a JSON response, classifying non-success statuses
pub async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, CallError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CallError::from_status(status, &body));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| CallError::Fatal(format!("Failed to parse response: {}", e)))
}

/// Deadline plus bounded retry with exponential backoff
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
    timeout: Duration,
}

impl RetryPolicy {
    /// Create a policy; `max_attempts` counts the first try and is at least 1
    pub fn new(max_attempts: u32, base_delay: Duration, timeout: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            timeout,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.base_delay(), config.timeout())
    }

    /// Run `operation` until it succeeds, fails fatally, or attempts run out
    pub async fn run<F, Fut, T>(&self, label: &str, operation: F) -> Result<T, CallError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, CallError>>,
    {
        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            let outcome = match timeout(self.timeout, operation()).await {
                Ok(result) => result,
                Err(_) => Err(CallError::Timeout(self.timeout)),
            };

            match outcome {
                Ok(value) => return Ok(value),
                Err(CallError::Fatal(msg)) => return Err(CallError::Fatal(msg)),
                Err(e) => {
                    if attempt < self.max_attempts {
                        let delay = self.base_delay * 2u32.pow(attempt - 1);
                        tracing::warn!(
                            "{} failed (attempt {}/{}): {}; retrying in {:?}",
                            label,
                            attempt,
                            self.max_attempts,
                            e,
                            delay
                        );
                        sleep(delay).await;
                    }
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| CallError::Fatal("no attempts made".to_string())))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}
