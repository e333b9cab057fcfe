//! URL handling module for Sumi-Harvest
//!
//! This module turns a raw URL string into a [`SiteTarget`]: the parsed URL to
//! request together with the scheme, host and resolved port reported in the
//! site record.

mod port;

use crate::{UrlError, UrlResult};
use url::{Host, ParseError, Url};

pub use port::{default_port, lookup_service_port};

/// A URL that passed validation and is ready to be fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiteTarget {
    /// The URL to request (service-name ports already rewritten)
    pub url: Url,

    /// `http` or `https`
    pub scheme: String,

    /// Hostname, without brackets for IPv6 literals
    pub host: String,

    /// Explicit port if present, else the scheme default
    pub port: u16,
}

/// Parses a raw URL into a fetch target
///
/// # Port Resolution
///
/// 1. An explicit numeric port wins
/// 2. A service-name port (`http`, `ftp`, ...) is resolved to its number
/// 3. An unresolvable port falls back to the scheme default
/// 4. Without a port: 443 for https, 80 otherwise
///
/// # Arguments
///
/// * `raw` - The URL string as supplied by the caller
///
/// # Returns
///
/// * `Ok(SiteTarget)` - The parsed target
/// * `Err(UrlError)` - The URL is malformed, not http(s), or has no host
///
/// # Examples
///
/// ```
/// use sumi_harvest::url::parse_target;
///
/// let target = parse_target("https://example.com:8443/path").unwrap();
/// assert_eq!(target.scheme, "https");
/// assert_eq!(target.host, "example.com");
/// assert_eq!(target.port, 8443);
///
/// let target = parse_target("http://example.com:https/").unwrap();
/// assert_eq!(target.port, 443);
///
/// assert!(parse_target("not a url").is_err());
/// ```
pub fn parse_target(raw: &str) -> UrlResult<SiteTarget> {
    let url = match Url::parse(raw) {
        Ok(url) => url,
        Err(ParseError::InvalidPort) => {
            let rewritten = port::resolve_service_port(raw)
                .ok_or_else(|| UrlError::Parse(ParseError::InvalidPort.to_string()))?;
            Url::parse(&rewritten).map_err(|e| UrlError::Parse(e.to_string()))?
        }
        Err(e) => return Err(UrlError::Parse(e.to_string())),
    };

    let scheme = url.scheme().to_string();
    if scheme != "http" && scheme != "https" {
        return Err(UrlError::InvalidScheme(scheme));
    }

    let host = match url.host() {
        Some(Host::Ipv6(addr)) => addr.to_string(),
        Some(host) => host.to_string(),
        None => return Err(UrlError::MissingHost),
    };

    let port = url.port().unwrap_or_else(|| default_port(&scheme));

    Ok(SiteTarget {
        url,
        scheme,
        host,
        port,
    })
}
