use crate::output::OutputFormat;
use serde::Deserialize;
use std::time::Duration;

/// Total time allowed for one fetch, in milliseconds
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 5_000;

/// Maximum number of fetches in flight at once
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 50;

/// Main configuration structure for Sumi-Harvest
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub fetcher: FetcherConfig,
    pub output: OutputConfig,
}

/// Fetch behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetcherConfig {
    /// Total timeout for a single fetch (milliseconds)
    #[serde(rename = "request-timeout-ms")]
    pub request_timeout_ms: u64,

    /// Maximum number of fetches in flight at once
    #[serde(rename = "max-concurrent-fetches")]
    pub max_concurrent_fetches: usize,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: Option<String>,
}

impl FetcherConfig {
    /// Returns the per-fetch timeout as a Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Returns the configured User-Agent, or the crate's own
    pub fn user_agent(&self) -> String {
        self.user_agent
            .clone()
            .unwrap_or_else(|| format!("sumi-harvest/{}", env!("CARGO_PKG_VERSION")))
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            user_agent: None,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// How records are printed
    pub format: OutputFormat,

    /// Path to an optional markdown summary file
    #[serde(rename = "summary-path")]
    pub summary_path: Option<String>,

    /// Whether text output includes response bodies
    #[serde(rename = "show-body")]
    pub show_body: bool,
}
