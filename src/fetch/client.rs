//! HTTP client for fetching chapter verses from the remote text source.
//!
//! The remote interface is `GET {base}/{book}+{chapter}?translation=kjv`
//! returning `{ "verses": [{ "verse": n, "text": s }, ...] }`. Any
//! deviation (network error, non-2xx, missing or empty verses array) is a
//! fetch failure, which this client converts into a placeholder outcome
//! after the retry policy is exhausted. Nothing here ever errors out to
//! the caller.

use async_trait::async_trait;
use reqwest::{Client, ClientBuilder};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

use super::error::FetchError;
use super::retry::{RetryDecision, RetryPolicy, classify_error};
use super::{FetchOutcome, VerseSource, placeholder_verses};
use crate::canon::{ChapterKey, Verse};

/// Default remote text source.
pub const DEFAULT_BASE_URL: &str = "https://bible-api.com";

/// Connect timeout for chapter requests.
const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Read timeout for chapter requests. Payloads are small JSON; a slow
/// response past this point is treated like any other fetch failure.
const READ_TIMEOUT_SECS: u64 = 30;

/// Wire shape of a chapter response.
#[derive(Debug, Deserialize)]
struct ChapterPayload {
    verses: Vec<Verse>,
}

/// HTTP client for chapter fetches.
///
/// Designed to be created once and reused across a whole book download,
/// taking advantage of connection pooling.
///
/// # Example
///
/// ```no_run
/// use biblesync_core::canon::chapter_key;
/// use biblesync_core::fetch::{VerseFetchClient, VerseSource};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = VerseFetchClient::new();
/// let key = chapter_key("John", 3)?;
/// let outcome = client.fetch_chapter(&key).await;
/// println!("real content: {}", outcome.is_real());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct VerseFetchClient {
    client: Client,
    base_url: Url,
    retry_policy: RetryPolicy,
}

impl Default for VerseFetchClient {
    fn default() -> Self {
        Self::new()
    }
}

impl VerseFetchClient {
    /// Creates a client against the default remote source.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client builder fails with the static
    /// configuration. This should never happen in practice.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
            .expect("default base URL is valid")
    }

    /// Creates a client against an explicit base URL.
    ///
    /// Used by tests to point at a local mock server.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidBaseUrl`] if the URL does not parse.
    #[allow(clippy::expect_used)]
    pub fn with_base_url(base_url: &str) -> Result<Self, FetchError> {
        let base_url =
            Url::parse(base_url).map_err(|_| FetchError::invalid_base_url(base_url))?;
        let client = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .timeout(Duration::from_secs(READ_TIMEOUT_SECS))
            .gzip(true)
            .build()
            .expect("failed to build HTTP client with static configuration");
        Ok(Self {
            client,
            base_url,
            retry_policy: RetryPolicy::default(),
        })
    }

    /// Replaces the retry policy.
    #[must_use]
    pub fn with_retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }

    /// Builds the chapter request URL, percent-encoding the book name.
    fn chapter_url(&self, key: &ChapterKey) -> String {
        let base = self.base_url.as_str().trim_end_matches('/');
        let book = urlencoding::encode(key.book());
        format!("{base}/{book}+{}?translation=kjv", key.chapter())
    }

    /// Performs one fetch attempt.
    async fn try_fetch(&self, url: &str) -> Result<Vec<Verse>, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::http_status(url, status.as_u16()));
        }

        let payload: ChapterPayload = response
            .json()
            .await
            .map_err(|e| {
                if e.is_decode() {
                    FetchError::malformed(url, "body is not a verses payload")
                } else {
                    FetchError::from_reqwest(url, e)
                }
            })?;

        if payload.verses.is_empty() {
            return Err(FetchError::malformed(url, "empty verses array"));
        }

        let mut verses: Vec<Verse> = payload
            .verses
            .into_iter()
            .map(|v| Verse {
                verse: v.verse,
                text: v.text.trim().to_string(),
            })
            .collect();
        // Verse numbers ascend within a chapter; the remote source is not
        // trusted to guarantee it.
        verses.sort_by_key(|v| v.verse);
        Ok(verses)
    }
}

#[async_trait]
impl VerseSource for VerseFetchClient {
    /// Fetches one chapter, retrying transient failures per policy, then
    /// falling back to placeholder verses.
    #[instrument(skip(self), fields(key = %key))]
    async fn fetch_chapter(&self, key: &ChapterKey) -> FetchOutcome {
        let url = self.chapter_url(key);
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            debug!(attempt, url = %url, "fetching chapter");

            let error = match self.try_fetch(&url).await {
                Ok(verses) => {
                    debug!(key = %key, verse_count = verses.len(), "chapter fetched");
                    return FetchOutcome::Real(verses);
                }
                Err(e) => e,
            };

            match self.retry_policy.should_retry(classify_error(&error), attempt) {
                RetryDecision::Retry { delay, attempt: next } => {
                    debug!(
                        key = %key,
                        attempt = next,
                        delay_ms = delay.as_millis(),
                        error = %error,
                        "retrying chapter fetch"
                    );
                    tokio::time::sleep(delay).await;
                }
                RetryDecision::DoNotRetry { reason } => {
                    warn!(
                        key = %key,
                        attempts = attempt,
                        %reason,
                        error = %error,
                        "chapter fetch failed, returning placeholder"
                    );
                    return FetchOutcome::Placeholder {
                        verses: placeholder_verses(key),
                        error,
                    };
                }
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::canon::chapter_key;
    use serde_json::json;
    use wiremock::matchers::{method, path, path_regex, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn fast_client(server_uri: &str) -> VerseFetchClient {
        VerseFetchClient::with_base_url(server_uri)
            .unwrap()
            .with_retry_policy(RetryPolicy::with_max_attempts(1))
    }

    #[tokio::test]
    async fn test_fetch_success_trims_and_sorts_verses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/John+3"))
            .and(query_param("translation", "kjv"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "verses": [
                    { "verse": 17, "text": "  For God sent not his Son  " },
                    { "verse": 16, "text": "For God so loved the world\n" }
                ]
            })))
            .mount(&server)
            .await;

        let client = fast_client(&server.uri());
        let key = chapter_key("John", 3).unwrap();
        let outcome = client.fetch_chapter(&key).await;

        assert!(outcome.is_real());
        let verses = outcome.into_verses();
        assert_eq!(verses[0].verse, 16);
        assert_eq!(verses[0].text, "For God so loved the world");
        assert_eq!(verses[1].verse, 17);
        assert_eq!(verses[1].text, "For God sent not his Son");
    }

    #[tokio::test]
    async fn test_fetch_encodes_book_names_with_spaces() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path_regex(r"^/1(%20| )John\+1$"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "verses": [{ "verse": 1, "text": "That which was from the beginning" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = fast_client(&server.uri());
        let key = chapter_key("1 John", 1).unwrap();
        let outcome = client.fetch_chapter(&key).await;
        assert!(outcome.is_real());
    }

    #[tokio::test]
    async fn test_server_error_returns_placeholder() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = fast_client(&server.uri());
        let key = chapter_key("John", 3).unwrap();
        let outcome = client.fetch_chapter(&key).await;

        match outcome {
            FetchOutcome::Placeholder { verses, error } => {
                assert_eq!(verses.len(), 10);
                assert_eq!(verses[0].text, "Loading John 3:1...");
                assert!(matches!(error, FetchError::HttpStatus { status: 500, .. }));
            }
            FetchOutcome::Real(_) => panic!("expected placeholder on 500"),
        }
    }

    #[tokio::test]
    async fn test_404_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let client = VerseFetchClient::with_base_url(&server.uri())
            .unwrap()
            .with_retry_policy(RetryPolicy::with_max_attempts(3));
        let key = chapter_key("John", 3).unwrap();
        let outcome = client.fetch_chapter(&key).await;

        assert!(!outcome.is_real());
    }

    #[tokio::test]
    async fn test_transient_failure_retried_then_succeeds() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "verses": [{ "verse": 1, "text": "In the beginning" }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = VerseFetchClient::with_base_url(&server.uri())
            .unwrap()
            .with_retry_policy(RetryPolicy::new(
                2,
                Duration::from_millis(10),
                Duration::from_millis(20),
                2.0,
            ));
        let key = chapter_key("Genesis", 1).unwrap();
        let outcome = client.fetch_chapter(&key).await;

        assert!(outcome.is_real(), "second attempt should succeed");
    }

    #[tokio::test]
    async fn test_malformed_payload_returns_placeholder() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "oops": true })))
            .mount(&server)
            .await;

        let client = fast_client(&server.uri());
        let key = chapter_key("John", 3).unwrap();
        let outcome = client.fetch_chapter(&key).await;

        match outcome {
            FetchOutcome::Placeholder { error, .. } => {
                assert!(matches!(error, FetchError::MalformedPayload { .. }));
            }
            FetchOutcome::Real(_) => panic!("expected placeholder on malformed body"),
        }
    }

    #[tokio::test]
    async fn test_empty_verses_array_is_a_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "verses": [] })))
            .mount(&server)
            .await;

        let client = fast_client(&server.uri());
        let key = chapter_key("John", 3).unwrap();
        assert!(!client.fetch_chapter(&key).await.is_real());
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(matches!(
            VerseFetchClient::with_base_url("not a url"),
            Err(FetchError::InvalidBaseUrl { .. })
        ));
    }

    #[test]
    fn test_chapter_url_shape() {
        let client = VerseFetchClient::with_base_url("https://bible.example.org/").unwrap();
        let key = chapter_key("Song of Solomon", 2).unwrap();
        assert_eq!(
            client.chapter_url(&key),
            "https://bible.example.org/Song%20of%20Solomon+2?translation=kjv"
        );
    }
}
