//! Error types for the fetch module.
//!
//! These errors never cross the engine boundary as failures: the fetch
//! client converts every one of them into a tagged placeholder outcome.
//! They are kept structured so the placeholder carries the reason for
//! logging and failed-chapter bookkeeping.

use thiserror::Error;

/// Errors that can occur fetching a chapter from the remote text source.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS resolution, connection refused, TLS errors, etc.)
    #[error("network error fetching {url}: {source}")]
    Network {
        /// The URL that failed.
        url: String,
        /// The underlying network error.
        #[source]
        source: reqwest::Error,
    },

    /// Request timed out before completion.
    #[error("timeout fetching {url}")]
    Timeout {
        /// The URL that timed out.
        url: String,
    },

    /// HTTP error response (4xx client errors, 5xx server errors).
    #[error("HTTP {status} fetching {url}")]
    HttpStatus {
        /// The URL that returned an error status.
        url: String,
        /// The HTTP status code.
        status: u16,
    },

    /// The response body did not match the expected verse payload shape.
    #[error("malformed payload from {url}: {detail}")]
    MalformedPayload {
        /// The URL whose body failed to parse.
        url: String,
        /// What was wrong with the payload.
        detail: String,
    },

    /// The configured base URL is not a valid URL.
    #[error("invalid base URL: {url}")]
    InvalidBaseUrl {
        /// The invalid URL string.
        url: String,
    },
}

impl FetchError {
    /// Creates a network error from a reqwest error, classifying timeouts.
    pub fn from_reqwest(url: impl Into<String>, source: reqwest::Error) -> Self {
        let url = url.into();
        if source.is_timeout() {
            Self::Timeout { url }
        } else {
            Self::Network { url, source }
        }
    }

    /// Creates an HTTP status error.
    pub fn http_status(url: impl Into<String>, status: u16) -> Self {
        Self::HttpStatus {
            url: url.into(),
            status,
        }
    }

    /// Creates a malformed payload error.
    pub fn malformed(url: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::MalformedPayload {
            url: url.into(),
            detail: detail.into(),
        }
    }

    /// Creates an invalid base URL error.
    pub fn invalid_base_url(url: impl Into<String>) -> Self {
        Self::InvalidBaseUrl { url: url.into() }
    }
}
