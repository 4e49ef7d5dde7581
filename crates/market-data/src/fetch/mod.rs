//! Resilient fetch client.
//!
//! Wraps an [`HttpTransport`] with the retry protocol used for every call to
//! the exchange:
//!
//! - `429`: wait for the server's `Retry-After` hint (or the current backoff), retry
//! - `5xx`: wait for the current backoff, retry
//! - other non-2xx: fail immediately with [`MarketDataError::HttpError`]
//! - transport failure or timeout: wait for the current backoff, retry
//! - `2xx` with a non-JSON content type: fail with [`MarketDataError::UnexpectedContentType`]
//!
//! The backoff doubles after every wait and never drops below the previous
//! wait, even after a short `Retry-After` hint. Once the retry budget of the
//! [`RetryPolicy`] is spent the last error is returned.

mod policy;
mod sleeper;
mod transport;

pub use policy::{
    RetryPolicy, DEFAULT_INITIAL_BACKOFF, DEFAULT_MAX_RETRIES, DEFAULT_STALE_COOLDOWN,
};
pub use sleeper::{RecordingSleeper, Sleeper, TokioSleeper};
pub use transport::{
    FetchRequest, HttpMethod, HttpResponse, HttpTransport, ReqwestTransport, REQUEST_TIMEOUT,
};

use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::errors::{body_excerpt, MarketDataError, RetryClass};

/// HTTP client that applies the retry protocol to every request.
#[derive(Clone)]
pub struct FetchClient {
    transport: Arc<dyn HttpTransport>,
    sleeper: Arc<dyn Sleeper>,
}

impl FetchClient {
    pub fn new(transport: Arc<dyn HttpTransport>, sleeper: Arc<dyn Sleeper>) -> Self {
        Self { transport, sleeper }
    }

    /// Client over `reqwest` that sleeps on the tokio timer.
    pub fn with_defaults() -> Self {
        Self::new(Arc::new(ReqwestTransport::new()), Arc::new(TokioSleeper))
    }

    /// Performs `request` under `policy` and returns the parsed JSON body.
    pub async fn fetch(
        &self,
        request: &FetchRequest,
        policy: &RetryPolicy,
    ) -> Result<serde_json::Value, MarketDataError> {
        let mut last_wait = Duration::ZERO;
        let mut attempt: u32 = 0;

        loop {
            let err = match self.attempt(request).await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if err.retry_class() == RetryClass::Never {
                return Err(err);
            }

            if attempt >= policy.max_retries {
                warn!(
                    "Giving up on {} after {} attempts: {}",
                    request.url,
                    attempt + 1,
                    err
                );
                return Err(err);
            }

            let wait = err
                .retry_after()
                .unwrap_or_else(|| policy.backoff_for(attempt))
                .max(last_wait);
            warn!(
                "Attempt {}/{} for {} failed ({}), retrying in {:?}",
                attempt + 1,
                policy.max_attempts(),
                request.url,
                err,
                wait
            );
            self.sleeper.sleep(wait).await;

            last_wait = wait;
            attempt += 1;
        }
    }

    /// Like [`fetch`](Self::fetch), then decodes the body into `T`.
    pub async fn fetch_as<T: DeserializeOwned>(
        &self,
        request: &FetchRequest,
        policy: &RetryPolicy,
    ) -> Result<T, MarketDataError> {
        let value = self.fetch(request, policy).await?;
        serde_json::from_value(value).map_err(|e| MarketDataError::Parse(e.to_string()))
    }

    async fn attempt(&self, request: &FetchRequest) -> Result<serde_json::Value, MarketDataError> {
        let response = self.transport.send(request).await?;

        if response.status == 429 {
            return Err(MarketDataError::RateLimited {
                url: request.url.clone(),
                retry_after: response.retry_after_duration(),
            });
        }

        if response.status >= 500 {
            return Err(MarketDataError::ServerError {
                status: response.status,
                body_excerpt: body_excerpt(&response.body),
            });
        }

        if !response.is_success() {
            return Err(MarketDataError::HttpError {
                status: response.status,
                body_excerpt: body_excerpt(&response.body),
            });
        }

        if !response.is_json() {
            return Err(MarketDataError::UnexpectedContentType {
                content_type: response
                    .content_type
                    .clone()
                    .unwrap_or_else(|| "unknown".to_string()),
                body_excerpt: body_excerpt(&response.body),
            });
        }

        debug!("{} -> {} ({} bytes)", request.url, response.status, response.body.len());

        serde_json::from_str(&response.body).map_err(|e| MarketDataError::Parse(e.to_string()))
    }
}
