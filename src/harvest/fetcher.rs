//! HTTP fetcher implementation
//!
//! This module performs the single-URL fetch:
//! - Parsing the URL and resolving scheme, host and port
//! - One GET request with a bounded total timeout and no connection reuse
//! - Extracting the `Server` and `Content-Type` headers with defaults
//! - Reading the whole body into memory
//! - Classifying failures as invalid URL, network, or body read errors

use crate::config::FetcherConfig;
use crate::site::{SiteRecord, DEFAULT_CONTENT_TYPE};
use crate::url::parse_target;
use crate::FetchError;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, CONNECTION, CONTENT_TYPE, SERVER};
use reqwest::Client;
use std::error::Error as StdError;

/// Fetches one URL into a [`SiteRecord`]
///
/// Implementations must be safe to call concurrently; the batch coordinator
/// shares a single fetcher across all in-flight fetches.
#[async_trait]
pub trait SiteFetcher: Send + Sync {
    /// Fetches `url`, reporting why it failed instead of substituting defaults
    async fn fetch(&self, url: &str) -> Result<SiteRecord, FetchError>;
}

/// Fetcher backed by a reqwest client
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

/// Builds an HTTP client following the fetch policy
///
/// Idle connections are never kept, so every fetch opens its own connection
/// and nothing is shared between fetches.
///
/// # Arguments
///
/// * `config` - The fetcher configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use sumi_harvest::config::FetcherConfig;
/// use sumi_harvest::harvest::build_http_client;
///
/// let client = build_http_client(&FetcherConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent())
        .timeout(config.request_timeout())
        .pool_max_idle_per_host(0)
        .http1_only()
        .gzip(true)
        .brotli(true)
        .build()
}

impl HttpFetcher {
    /// Creates a fetcher with a client built from `config`
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_http_client(config)?))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl SiteFetcher for HttpFetcher {
    /// Fetches a URL and extracts its metadata
    ///
    /// # Failure Classification
    ///
    /// | Condition | Error |
    /// |-----------|-------|
    /// | Malformed URL, non-http(s) scheme, no host | `InvalidUrl` |
    /// | DNS, connect, TLS, timeout before response | `Network` |
    /// | Timeout while reading the body | `Network` |
    /// | Other failure while reading the body | `BodyRead` |
    ///
    /// HTTP error statuses are not failures: a 404 page is still a page.
    async fn fetch(&self, url: &str) -> Result<SiteRecord, FetchError> {
        let target = parse_target(url).map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })?;

        let response = self
            .client
            .get(target.url.clone())
            .header(CONNECTION, "close")
            .send()
            .await
            .map_err(|e| FetchError::Network {
                url: url.to_string(),
                reason: describe_error(&e),
            })?;

        let status = response.status();
        let server_header = header_or(response.headers(), SERVER, "");
        let content_type = header_or(response.headers(), CONTENT_TYPE, DEFAULT_CONTENT_TYPE);

        let body = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Network {
                    url: url.to_string(),
                    reason: describe_error(&e),
                }
            } else {
                FetchError::BodyRead {
                    url: url.to_string(),
                    reason: describe_error(&e),
                }
            }
        })?;

        tracing::debug!(
            "Fetched {} (status {}, {} bytes, {})",
            url,
            status.as_u16(),
            body.len(),
            content_type
        );

        Ok(SiteRecord {
            source_url: url.to_string(),
            scheme: target.scheme,
            host: target.host,
            port: target.port,
            server_header,
            content_type,
            body: String::from_utf8_lossy(&body).into_owned(),
        })
    }
}

/// Returns the first value of a header, or `default` if absent
fn header_or(headers: &HeaderMap, name: HeaderName, default: &str) -> String {
    headers
        .get(name)
        .map(|value| String::from_utf8_lossy(value.as_bytes()).into_owned())
        .unwrap_or_else(|| default.to_string())
}

/// Flattens a reqwest error and its causes into one line
fn describe_error(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        return "Request timeout".to_string();
    }
    flatten_causes(error)
}

/// Joins an error with each cause its message does not already include
fn flatten_causes(error: &(dyn StdError + 'static)) -> String {
    let mut reason = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !reason.contains(&text) {
            reason.push_str(": ");
            reason.push_str(&text);
        }
        source = cause.source();
    }
    reason
}
