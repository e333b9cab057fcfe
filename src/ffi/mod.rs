//! C ABI for foreign callers
//!
//! Exposes the batch and single fetch operations to non-Rust callers. Results
//! are copied into [`CSite`] records allocated by this crate:
//!
//! | Producer | Release with |
//! |----------|--------------|
//! | `parse_urls(urls, count)` | `free_sites(sites, count)` |
//! | `scrape_single_url(url)` | `free_site(site)` |
//!
//! Both release functions accept NULL. Releasing a handle twice is undefined
//! behavior.
//!
//! ```c
//! const char *urls[] = {"https://example.com", "not-a-url"};
//! CSite *sites = parse_urls(urls, 2);
//! printf("%s %d\n", sites[1].url, sites[1].port);  /* not-a-url 80 */
//! free_sites(sites, 2);
//! ```

mod site;

pub use site::{export_site, export_sites, release_site, release_sites, CSite};

use crate::config::FetcherConfig;
use crate::harvest::{Coordinator, HttpFetcher, SiteFetcher};
use crate::HarvestError;
use std::ffi::CStr;
use std::os::raw::{c_char, c_int};
use std::ptr;
use tokio::runtime::Runtime;
use tracing_subscriber::EnvFilter;

/// Builds the runtime that drives one foreign call
fn build_runtime() -> Result<Runtime, HarvestError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| HarvestError::Runtime(e.to_string()))
}

/// Copies a C string; NULL becomes the empty string
///
/// # Safety
///
/// `ptr` must be null or point to a NUL-terminated string.
unsafe fn read_c_string(ptr: *const c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        CStr::from_ptr(ptr).to_string_lossy().into_owned()
    }
}

/// Fetches a batch of URLs and returns one record per URL, in order
///
/// Failed URLs yield placeholder records. Returns NULL when `count <= 0`,
/// `urls` is NULL, or the runtime cannot start. NULL entries are treated as
/// empty (invalid) URLs.
///
/// # Safety
///
/// `urls` must point to `count` pointers, each null or NUL-terminated. The
/// result must be released with [`free_sites`] using the same `count`.
#[no_mangle]
pub unsafe extern "C" fn parse_urls(urls: *const *const c_char, count: c_int) -> *mut CSite {
    if urls.is_null() || count <= 0 {
        return ptr::null_mut();
    }

    let urls: Vec<String> = std::slice::from_raw_parts(urls, count as usize)
        .iter()
        .map(|&url| read_c_string(url))
        .collect();

    let result = build_runtime().and_then(|runtime| {
        runtime.block_on(async {
            let coordinator = Coordinator::from_config(&FetcherConfig::default())?;
            Ok::<_, HarvestError>(coordinator.run(&urls).await)
        })
    });

    match result {
        Ok(report) => export_sites(&report.records),
        Err(e) => {
            tracing::error!("Batch of {} URLs could not run: {}", urls.len(), e);
            ptr::null_mut()
        }
    }
}

/// Fetches a single URL
///
/// Returns NULL on any failure; there is nothing to release in that case.
///
/// # Safety
///
/// `url` must be null or NUL-terminated. A non-null result must be released
/// with [`free_site`].
#[no_mangle]
pub unsafe extern "C" fn scrape_single_url(url: *const c_char) -> *mut CSite {
    if url.is_null() {
        return ptr::null_mut();
    }
    let url = read_c_string(url);

    let result = build_runtime().and_then(|runtime| {
        runtime.block_on(async {
            let fetcher = HttpFetcher::new(&FetcherConfig::default())?;
            Ok::<_, HarvestError>(fetcher.fetch(&url).await?)
        })
    });

    match result {
        Ok(record) => export_site(&record),
        Err(e) => {
            tracing::warn!("Error scraping {}: {}", url, e);
            ptr::null_mut()
        }
    }
}

/// Releases a record returned by [`scrape_single_url`]
///
/// # Safety
///
/// `site` must be null or an unreleased result of [`scrape_single_url`].
#[no_mangle]
pub unsafe extern "C" fn free_site(site: *mut CSite) {
    release_site(site);
}

/// Releases an array returned by [`parse_urls`]
///
/// # Safety
///
/// `sites` must be null or an unreleased result of [`parse_urls`] called
/// with the same `count`.
#[no_mangle]
pub unsafe extern "C" fn free_sites(sites: *mut CSite, count: c_int) {
    if count <= 0 {
        return;
    }
    release_sites(sites, count as usize);
}

/// Installs a log subscriber for foreign callers
///
/// `verbosity`: 0 warnings, 1 info, 2 debug, 3+ trace. Returns 0 when the
/// subscriber was installed and 1 when one was already present.
#[no_mangle]
pub extern "C" fn harvest_init_logging(verbosity: c_int) -> c_int {
    let filter = match verbosity {
        c_int::MIN..=0 => "sumi_harvest=warn",
        1 => "sumi_harvest=info",
        2 => "sumi_harvest=debug",
        _ => "sumi_harvest=trace",
    };

    let installed = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .try_init();

    c_int::from(installed.is_err())
}
