//! JSON fetcher for off-chain metadata.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::error::{SdkError, SdkResult};
use crate::http::retry::RetryConfig;
use crate::task::CancellationScope;

enum Failure {
    Retryable(SdkError),
    Fatal(SdkError),
}

/// Fetches JSON documents with retries.
#[derive(Clone)]
pub struct JsonFetcher {
    client: Client,
    retry: RetryConfig,
}

impl JsonFetcher {
    pub fn new(retry: RetryConfig) -> SdkResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(4)
            .build()
            .map_err(|err| SdkError::Http(format!("failed to build HTTP client: {}", err)))?;
        Ok(Self { client, retry })
    }

    pub fn retry(&self) -> &RetryConfig {
        &self.retry
    }

    /// GET `url` and decode the body as JSON.
    ///
    /// Retries transport failures and the configured statuses. The scope is
    /// checked before every attempt and before every backoff sleep.
    pub async fn get_json<T: DeserializeOwned>(&self, url: &str, scope: &CancellationScope) -> SdkResult<T> {
        let mut attempt = 0;
        loop {
            scope.throw_if_canceled()?;
            match self.fetch(url).await {
                Ok(value) => return Ok(value),
                Err(Failure::Retryable(err)) if attempt < self.retry.max_retries => {
                    let delay = self.retry.delay_for_attempt(attempt);
                    tracing::debug!(
                        attempt = attempt + 1,
                        max = self.retry.max_retries,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying {}",
                        url
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(Failure::Retryable(err)) | Err(Failure::Fatal(err)) => return Err(err),
            }
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, url: &str) -> Result<T, Failure> {
        let response = self.client.get(url).send().await.map_err(|err| {
            let error = SdkError::Http(format!("GET {}: {}", url, err));
            if err.is_connect() || err.is_timeout() || err.is_request() {
                Failure::Retryable(error)
            } else {
                Failure::Fatal(error)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let error = SdkError::Http(format!("GET {} returned {}", url, status));
            return Err(if self.retry.is_retryable_status(status.as_u16()) {
                Failure::Retryable(error)
            } else {
                Failure::Fatal(error)
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|err| Failure::Fatal(SdkError::Serialization(format!("invalid JSON at {}: {}", url, err))))
    }
}

impl std::fmt::Debug for JsonFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFetcher").field("retry", &self.retry).finish()
    }
}
