//! Sumi-Harvest: bounded, order-preserving site metadata fetcher
//!
//! This crate fetches metadata (scheme, host, port, `Server` and
//! `Content-Type` headers, body) for a batch of URLs concurrently. At most a
//! fixed number of requests are in flight at once, results come back in input
//! order, and a failing URL degrades into a placeholder record instead of
//! failing the batch. Results can be handed to C callers through [`ffi`].

pub mod config;
pub mod ffi;
pub mod harvest;
pub mod output;
pub mod site;
pub mod url;

use std::fmt;
use thiserror::Error;

/// Main error type for Sumi-Harvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("Output error: {0}")]
    Output(#[from] output::OutputError),

    #[error("Failed to start async runtime: {0}")]
    Runtime(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// URL-specific errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing host in URL")]
    MissingHost,
}

/// Failure of a single fetch
///
/// The fetcher only reports what went wrong; turning a failure into an
/// output record is the batch coordinator's job.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: UrlError,
    },

    #[error("Network error for {url}: {reason}")]
    Network { url: String, reason: String },

    #[error("Failed to read body from {url}: {reason}")]
    BodyRead { url: String, reason: String },
}

/// Discriminant of a [`FetchError`], used for statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FetchErrorKind {
    InvalidUrl,
    Network,
    BodyRead,
}

impl FetchError {
    /// Returns the kind of failure
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            Self::InvalidUrl { .. } => FetchErrorKind::InvalidUrl,
            Self::Network { .. } => FetchErrorKind::Network,
            Self::BodyRead { .. } => FetchErrorKind::BodyRead,
        }
    }

    /// Returns the URL the failed fetch was issued for
    pub fn url(&self) -> &str {
        match self {
            Self::InvalidUrl { url, .. }
            | Self::Network { url, .. }
            | Self::BodyRead { url, .. } => url,
        }
    }
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::InvalidUrl => "InvalidURL",
            Self::Network => "NetworkError",
            Self::BodyRead => "BodyReadError",
        };
        f.write_str(name)
    }
}

/// Result type alias for Sumi-Harvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use crate::url::{parse_target, SiteTarget};
pub use config::Config;
pub use harvest::{scrape_all, scrape_one, Coordinator, HttpFetcher, SiteFetcher};
pub use site::SiteRecord;
