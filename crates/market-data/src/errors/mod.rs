//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`MarketDataError`]: The error enum for every upstream exchange operation
//! - [`RetryClass`]: Classification that drives the fetch client's retry loop

mod retry;

pub use retry::RetryClass;

use std::time::Duration;
use thiserror::Error;

/// Maximum number of characters of a response body kept in an error.
pub const BODY_EXCERPT_LEN: usize = 100;

/// Errors that can occur while talking to the exchange.
///
/// Each variant is classified into a [`RetryClass`] via [`retry_class`](Self::retry_class),
/// which decides whether the fetch client sleeps and tries again or gives up.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarketDataError {
    /// The exchange throttled the request (HTTP 429).
    /// Carries the server's retry-after hint when one was sent.
    #[error("Rate limited by upstream: {url}")]
    RateLimited {
        /// The requested URL
        url: String,
        /// Server-provided wait hint
        retry_after: Option<Duration>,
    },

    /// The exchange answered with a 5xx status.
    #[error("Upstream server error {status}: {body_excerpt}")]
    ServerError {
        /// HTTP status code
        status: u16,
        /// First characters of the response body
        body_excerpt: String,
    },

    /// Any other non-2xx status. Malformed requests are never retried.
    #[error("HTTP error {status}: {body_excerpt}")]
    HttpError {
        /// HTTP status code
        status: u16,
        /// First characters of the response body
        body_excerpt: String,
    },

    /// A 2xx response whose content type is not JSON, typically an HTML error page.
    #[error("Expected JSON but received {content_type}: {body_excerpt}")]
    UnexpectedContentType {
        /// The content type the server reported
        content_type: String,
        /// First characters of the response body
        body_excerpt: String,
    },

    /// Network-level failure (DNS, connection reset, TLS).
    #[error("Transport error: {0}")]
    Transport(String),

    /// The request did not complete before the client timeout.
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// The body claimed to be JSON but did not decode into the expected shape.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// A kline row was missing fields or held a non-numeric price.
    #[error("Invalid kline: {0}")]
    InvalidKline(String),
}

impl MarketDataError {
    /// Returns the retry classification for this error.
    ///
    /// ```
    /// use seasonality_market_data::errors::{MarketDataError, RetryClass};
    ///
    /// let error = MarketDataError::RateLimited { url: "/klines".to_string(), retry_after: None };
    /// assert_eq!(error.retry_class(), RetryClass::WithBackoff);
    ///
    /// let error = MarketDataError::HttpError { status: 400, body_excerpt: String::new() };
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            Self::RateLimited { .. }
            | Self::ServerError { .. }
            | Self::Transport(_)
            | Self::Timeout(_) => RetryClass::WithBackoff,

            Self::HttpError { .. }
            | Self::UnexpectedContentType { .. }
            | Self::Parse(_)
            | Self::InvalidKline(_) => RetryClass::Never,
        }
    }

    /// Wait hint supplied by the server, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// True for upstream throttling.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }
}

/// Truncates a response body for inclusion in an error message.
pub fn body_excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT_LEN).collect()
}
