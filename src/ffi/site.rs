//! C layout of a site record and its allocation pairing
//!
//! Every string and every record handed to C is allocated here and must come
//! back through the matching release function exactly once.

use crate::site::SiteRecord;
use std::ffi::CString;
use std::os::raw::{c_char, c_int};
use std::ptr;

/// Flat, fixed-layout copy of a [`SiteRecord`] for C callers
///
/// All strings are NUL-terminated and owned by this crate.
#[repr(C)]
#[derive(Debug)]
pub struct CSite {
    pub url: *mut c_char,
    pub host: *mut c_char,
    pub server: *mut c_char,
    pub scheme: *mut c_char,
    pub content_type: *mut c_char,
    pub body: *mut c_char,
    pub port: c_int,
}

impl CSite {
    /// Copies a record into newly allocated C strings
    pub fn export(record: &SiteRecord) -> Self {
        Self {
            url: export_string(&record.source_url),
            host: export_string(&record.host),
            server: export_string(&record.server_header),
            scheme: export_string(&record.scheme),
            content_type: export_string(&record.content_type),
            body: export_string(&record.body),
            port: c_int::from(record.port),
        }
    }

    /// Frees every string of this record and nulls the pointers
    ///
    /// # Safety
    ///
    /// Every non-null pointer must have been produced by [`CSite::export`]
    /// and not freed since.
    unsafe fn release_strings(&mut self) {
        for field in [
            &mut self.url,
            &mut self.host,
            &mut self.server,
            &mut self.scheme,
            &mut self.content_type,
            &mut self.body,
        ] {
            release_string(field);
        }
    }
}

/// Copies a string into a C allocation
///
/// C sees a string only up to its first NUL byte, so the copy stops there.
fn export_string(value: &str) -> *mut c_char {
    let bytes = value.as_bytes();
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    CString::new(&bytes[..end]).unwrap_or_default().into_raw()
}

/// # Safety
///
/// `*field` must be null or come from [`export_string`] and not be freed yet.
unsafe fn release_string(field: &mut *mut c_char) {
    if !field.is_null() {
        drop(CString::from_raw(*field));
        *field = ptr::null_mut();
    }
}

/// Moves one exported record to the heap for a C caller
///
/// Release with [`release_site`].
pub fn export_site(record: &SiteRecord) -> *mut CSite {
    Box::into_raw(Box::new(CSite::export(record)))
}

/// Moves an array of exported records to the heap for a C caller
///
/// Release with [`release_sites`], passing `records.len()`.
pub fn export_sites(records: &[SiteRecord]) -> *mut CSite {
    let sites: Box<[CSite]> = records.iter().map(CSite::export).collect();
    Box::into_raw(sites).cast::<CSite>()
}

/// Frees a record produced by [`export_site`]
///
/// Null is ignored.
///
/// # Safety
///
/// `site` must be null or a pointer returned by [`export_site`] that has not
/// been released. Releasing the same pointer twice is undefined behavior.
pub unsafe fn release_site(site: *mut CSite) {
    if site.is_null() {
        return;
    }
    let mut site = Box::from_raw(site);
    site.release_strings();
}

/// Frees an array produced by [`export_sites`]
///
/// Null is ignored.
///
/// # Safety
///
/// `sites` must be null or a pointer returned by [`export_sites`] for exactly
/// `count` records, not released before. Releasing the same array twice, or
/// with a different count, is undefined behavior.
pub unsafe fn release_sites(sites: *mut CSite, count: usize) {
    if sites.is_null() {
        return;
    }
    let mut sites: Box<[CSite]> = Box::from_raw(ptr::slice_from_raw_parts_mut(sites, count));
    for site in sites.iter_mut() {
        site.release_strings();
    }
}
