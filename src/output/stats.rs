//! Batch statistics
//!
//! This module holds the counters collected while a batch runs and formats
//! them for display.

use crate::FetchErrorKind;
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fmt::Write;
use std::time::Duration;

/// Batch statistics summary
#[derive(Debug, Clone)]
pub struct BatchStatistics {
    /// Number of URLs submitted
    pub total_urls: usize,

    /// Fetches that produced a real record
    pub succeeded: usize,

    /// Failed fetches by error kind
    pub failures: BTreeMap<FetchErrorKind, usize>,

    /// URLs whose fetch was never started or was abandoned on cancellation
    pub cancelled: usize,

    /// Fetch tasks that panicked
    pub panicked: usize,

    /// Concurrency cap in effect
    pub max_concurrent_fetches: usize,

    /// Highest number of fetches in flight at once
    pub peak_in_flight: usize,

    /// Number of fetches that had to wait for an admission slot
    pub admission_waits: u64,

    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl BatchStatistics {
    /// Creates empty statistics for a batch that is starting now
    pub fn new(
        total_urls: usize,
        max_concurrent_fetches: usize,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            total_urls,
            succeeded: 0,
            failures: BTreeMap::new(),
            cancelled: 0,
            panicked: 0,
            max_concurrent_fetches,
            peak_in_flight: 0,
            admission_waits: 0,
            started_at,
            finished_at: started_at,
            elapsed: Duration::ZERO,
        }
    }

    /// Records the admission counters and closes the batch
    pub fn finish(&mut self, peak_in_flight: usize, admission_waits: u64, elapsed: Duration) {
        self.peak_in_flight = peak_in_flight;
        self.admission_waits = admission_waits;
        self.elapsed = elapsed;
        self.finished_at = Utc::now();
    }

    /// Fetches that ended in an error or a panic
    pub fn failed(&self) -> usize {
        self.failures.values().sum::<usize>() + self.panicked
    }

    /// Records in the output that are placeholders
    pub fn placeholders(&self) -> usize {
        self.total_urls - self.succeeded
    }

    /// Share of URLs fetched successfully, in percent
    pub fn success_rate(&self) -> f64 {
        if self.total_urls > 0 {
            (self.succeeded as f64 / self.total_urls as f64) * 100.0
        } else {
            0.0
        }
    }
}

/// Formats statistics for display
pub fn format_statistics(stats: &BatchStatistics) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "=== Batch Statistics ===\n");

    let _ = writeln!(out, "Overview:");
    let _ = writeln!(out, "  URLs submitted: {}", stats.total_urls);
    let _ = writeln!(out, "  Succeeded: {}", stats.succeeded);
    let _ = writeln!(out, "  Failed: {}", stats.failed());
    if stats.cancelled > 0 {
        let _ = writeln!(out, "  Cancelled: {}", stats.cancelled);
    }
    let _ = writeln!(out, "  Elapsed: {:.2}s", stats.elapsed.as_secs_f64());
    let _ = writeln!(out);

    let _ = writeln!(out, "Concurrency:");
    let _ = writeln!(out, "  Cap: {}", stats.max_concurrent_fetches);
    let _ = writeln!(out, "  Peak in flight: {}", stats.peak_in_flight);
    let _ = writeln!(out, "  Admission waits: {}", stats.admission_waits);
    let _ = writeln!(out);

    if stats.failed() > 0 {
        let _ = writeln!(out, "Error Summary:");
        for (kind, count) in &stats.failures {
            let _ = writeln!(out, "  {}: {}", kind, count);
        }
        if stats.panicked > 0 {
            let _ = writeln!(out, "  Panicked: {}", stats.panicked);
        }
        let _ = writeln!(out);
    }

    let _ = writeln!(
        out,
        "Success Rate: {:.1}% ({} / {} URLs fetched)",
        stats.success_rate(),
        stats.succeeded,
        stats.total_urls
    );

    out
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &BatchStatistics) {
    print!("{}", format_statistics(stats));
}
