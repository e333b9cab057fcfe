//! Batch coordinator - bounded, order-preserving fan-out
//!
//! This module runs the fetcher for every URL of a batch:
//! - At most `max_concurrent_fetches` fetches are in flight at once
//! - The output has exactly one record per input URL, at the same position
//! - A failed fetch becomes a placeholder record and a logged warning
//! - Cancelling the batch stops admission and returns what has completed

use crate::config::FetcherConfig;
use crate::harvest::admission::{Admission, FlightTracker};
use crate::harvest::fetcher::{HttpFetcher, SiteFetcher};
use crate::output::BatchStatistics;
use crate::site::SiteRecord;
use crate::HarvestError;
use chrono::Utc;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

/// Everything a batch run produces
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// One record per input URL, in input order
    pub records: Vec<SiteRecord>,

    /// Counters describing the run
    pub stats: BatchStatistics,
}

/// Main batch coordinator structure
///
/// The admission gate belongs to the coordinator, so concurrent runs on the
/// same coordinator share one concurrency cap.
pub struct Coordinator {
    fetcher: Arc<dyn SiteFetcher>,
    admission: Admission,
}

impl Coordinator {
    /// Creates a coordinator around any fetcher
    ///
    /// # Arguments
    ///
    /// * `fetcher` - The fetcher run for each URL
    /// * `max_concurrent_fetches` - Cap on fetches in flight (raised to 1 if zero)
    pub fn new(fetcher: Arc<dyn SiteFetcher>, max_concurrent_fetches: usize) -> Self {
        Self {
            fetcher,
            admission: Admission::new(max_concurrent_fetches),
        }
    }

    /// Creates a coordinator using the HTTP fetcher
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - Failed to build the HTTP client
    pub fn from_config(config: &FetcherConfig) -> Result<Self, HarvestError> {
        let fetcher = HttpFetcher::new(config)?;
        Ok(Self::new(Arc::new(fetcher), config.max_concurrent_fetches))
    }

    /// Returns the concurrency cap
    pub fn max_concurrent_fetches(&self) -> usize {
        self.admission.capacity()
    }

    /// Fetches every URL and returns the records in input order
    ///
    /// Never fails because of an individual URL; see [`BatchReport::stats`]
    /// for how many records are placeholders.
    pub async fn run(&self, urls: &[String]) -> BatchReport {
        self.run_until_cancelled(urls, &CancellationToken::new()).await
    }

    /// Fetches every URL until done or until `cancel` fires
    ///
    /// # Process
    ///
    /// 1. Pre-fill one placeholder per URL
    /// 2. For each URL in order, wait for an admission slot, then spawn its fetch
    /// 3. Write each successful record into its own slot as fetches complete
    /// 4. Wait for every spawned fetch before returning
    ///
    /// On cancellation no further fetches are admitted, in-flight fetches
    /// are abandoned, and their slots keep the placeholder.
    pub async fn run_until_cancelled(
        &self,
        urls: &[String],
        cancel: &CancellationToken,
    ) -> BatchReport {
        let started_at = Utc::now();
        let start_time = Instant::now();
        let tracker = Arc::new(FlightTracker::default());

        tracing::info!(
            "Starting batch of {} URLs (max {} in flight)",
            urls.len(),
            self.admission.capacity()
        );

        // Sized once; slots are overwritten in place, never pushed
        let mut records: Vec<SiteRecord> =
            urls.iter().map(|url| SiteRecord::placeholder(url)).collect();
        let mut stats = BatchStatistics::new(urls.len(), self.admission.capacity(), started_at);

        let mut tasks = JoinSet::new();
        let mut spawned = 0;

        for (index, url) in urls.iter().enumerate() {
            let permit = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!(
                        "Batch cancelled after admitting {} of {} URLs",
                        spawned,
                        urls.len()
                    );
                    break;
                }
                permit = self.admission.acquire(&tracker) => match permit {
                    Ok(permit) => permit,
                    Err(e) => {
                        tracing::error!("Admission gate closed: {}", e);
                        break;
                    }
                },
            };

            let fetcher = Arc::clone(&self.fetcher);
            let url = url.clone();
            let cancel = cancel.clone();

            tasks.spawn(async move {
                let _permit = permit;
                let outcome = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => None,
                    result = fetcher.fetch(&url) => Some(result),
                };
                (index, outcome)
            });
            spawned += 1;
        }

        stats.cancelled += urls.len() - spawned;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, Some(Ok(mut record)))) => {
                    // The slot always reports the URL it was fetched for
                    if record.source_url != urls[index] {
                        tracing::debug!(
                            "Fetcher reported {} for {}, keeping the input URL",
                            record.source_url,
                            urls[index]
                        );
                        record.source_url = urls[index].clone();
                    }
                    records[index] = record;
                    stats.succeeded += 1;
                }
                Ok((index, Some(Err(e)))) => {
                    let url = &urls[index];
                    tracing::warn!(url = %url, error = %e, "Fetch failed, using placeholder");
                    *stats.failures.entry(e.kind()).or_insert(0) += 1;
                }
                Ok((_, None)) => {
                    stats.cancelled += 1;
                }
                Err(e) => {
                    tracing::error!("Fetch task did not complete: {}", e);
                    stats.panicked += 1;
                }
            }
        }

        // Unreachable by construction: the slot vector is never resized
        assert_eq!(
            records.len(),
            urls.len(),
            "batch produced {} records for {} URLs",
            records.len(),
            urls.len()
        );

        stats.finish(tracker.peak(), tracker.waits(), start_time.elapsed());

        tracing::info!(
            "Batch completed: {} succeeded, {} failed, {} cancelled in {:?}",
            stats.succeeded,
            stats.failed(),
            stats.cancelled,
            stats.elapsed
        );

        BatchReport { records, stats }
    }
}
