//! Site record types
//!
//! A [`SiteRecord`] is the outcome of fetching one URL. Records are produced
//! by the fetcher on success, or substituted as placeholders by the batch
//! coordinator when a fetch fails.

mod record;

pub use record::{SiteRecord, DEFAULT_CONTENT_TYPE, DEFAULT_PORT, HTTPS_PORT};
