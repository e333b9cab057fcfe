//! Admission control for concurrent fetches
//!
//! A counting semaphore caps how many fetches may be in flight at once. Each
//! fetch holds an [`AdmissionPermit`] for its whole duration; dropping the
//! permit frees the slot for the next waiting fetch.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{AcquireError, OwnedSemaphorePermit, Semaphore, TryAcquireError};

/// Global cap on in-flight fetches
#[derive(Debug, Clone)]
pub struct Admission {
    semaphore: Arc<Semaphore>,
    capacity: usize,
}

/// Per-batch counters describing how admission behaved
#[derive(Debug, Default)]
pub struct FlightTracker {
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    waits: AtomicU64,
}

/// Permission for one fetch to be in flight
///
/// Releases its slot when dropped.
#[derive(Debug)]
pub struct AdmissionPermit {
    _permit: OwnedSemaphorePermit,
    tracker: Arc<FlightTracker>,
}

impl Admission {
    /// Creates an admission gate allowing `capacity` concurrent fetches
    ///
    /// A capacity of zero is raised to one so that batches always progress.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            semaphore: Arc::new(Semaphore::new(capacity)),
            capacity,
        }
    }

    /// Returns the maximum number of concurrent fetches
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of slots currently free
    pub fn available(&self) -> usize {
        self.semaphore.available_permits()
    }

    /// Waits for a free slot
    ///
    /// If no slot is free immediately the wait is recorded on `tracker`.
    pub async fn acquire(
        &self,
        tracker: &Arc<FlightTracker>,
    ) -> Result<AdmissionPermit, AcquireError> {
        let permit = match Arc::clone(&self.semaphore).try_acquire_owned() {
            Ok(permit) => permit,
            Err(e) => {
                if matches!(e, TryAcquireError::NoPermits) {
                    tracker.waits.fetch_add(1, Ordering::Relaxed);
                }
                Arc::clone(&self.semaphore).acquire_owned().await?
            }
        };

        let now = tracker.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        tracker.peak.fetch_max(now, Ordering::SeqCst);

        Ok(AdmissionPermit {
            _permit: permit,
            tracker: Arc::clone(tracker),
        })
    }
}

impl FlightTracker {
    /// Fetches currently holding a permit
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Highest number of permits held at the same time
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Number of acquisitions that had to wait for a slot
    pub fn waits(&self) -> u64 {
        self.waits.load(Ordering::Relaxed)
    }
}

impl Drop for AdmissionPermit {
    fn drop(&mut self) {
        self.tracker.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}
