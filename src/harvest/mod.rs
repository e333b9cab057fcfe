//! Harvest module for fetching site metadata
//!
//! This module contains the core fetching logic, including:
//! - The single-URL fetcher and its HTTP implementation
//! - Admission control capping concurrent fetches
//! - The batch coordinator that preserves input order

mod admission;
mod coordinator;
mod fetcher;

pub use admission::{Admission, AdmissionPermit, FlightTracker};
pub use coordinator::{BatchReport, Coordinator};
pub use fetcher::{build_http_client, HttpFetcher, SiteFetcher};

use crate::config::FetcherConfig;
use crate::site::SiteRecord;
use crate::HarvestError;

/// Fetches a batch of URLs with the default fetch policy
///
/// Returns exactly one record per URL, in input order. URLs that fail are
/// represented by placeholder records; only building the HTTP client can
/// fail the call.
///
/// # Example
///
/// ```no_run
/// use sumi_harvest::harvest::scrape_all;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let urls = vec!["https://example.com".to_string(), "not a url".to_string()];
/// let records = scrape_all(&urls).await?;
/// assert_eq!(records.len(), 2);
/// assert_eq!(records[1].port, 80);
/// # Ok(())
/// # }
/// ```
pub async fn scrape_all(urls: &[String]) -> Result<Vec<SiteRecord>, HarvestError> {
    let coordinator = Coordinator::from_config(&FetcherConfig::default())?;
    Ok(coordinator.run(urls).await.records)
}

/// Fetches a single URL with the default fetch policy
///
/// Unlike [`scrape_all`], a failure is returned rather than replaced by a
/// placeholder.
pub async fn scrape_one(url: &str) -> Result<SiteRecord, HarvestError> {
    let fetcher = HttpFetcher::new(&FetcherConfig::default())?;
    Ok(fetcher.fetch(url).await?)
}
