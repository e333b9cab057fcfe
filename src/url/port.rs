use crate::site::{DEFAULT_PORT, HTTPS_PORT};

/// Well-known TCP service names and their ports
const SERVICE_PORTS: &[(&str, u16)] = &[
    ("ftp-data", 20),
    ("ftp", 21),
    ("ssh", 22),
    ("telnet", 23),
    ("smtp", 25),
    ("domain", 53),
    ("gopher", 70),
    ("finger", 79),
    ("http", 80),
    ("www", 80),
    ("www-http", 80),
    ("pop3", 110),
    ("nntp", 119),
    ("imap", 143),
    ("imap2", 143),
    ("ldap", 389),
    ("https", 443),
    ("submission", 587),
    ("ldaps", 636),
    ("ftps", 990),
    ("imaps", 993),
    ("pop3s", 995),
    ("socks", 1080),
    ("http-alt", 8080),
    ("webcache", 8080),
];

/// Resolves a port string to its number
///
/// Accepts numeric ports and service names (case-insensitive).
///
/// # Examples
///
/// ```
/// use sumi_harvest::url::lookup_service_port;
///
/// assert_eq!(lookup_service_port("8080"), Some(8080));
/// assert_eq!(lookup_service_port("https"), Some(443));
/// assert_eq!(lookup_service_port("bogus"), None);
/// ```
pub fn lookup_service_port(name: &str) -> Option<u16> {
    if let Ok(port) = name.parse::<u16>() {
        return Some(port);
    }

    let name = name.to_ascii_lowercase();
    SERVICE_PORTS
        .iter()
        .find(|(service, _)| *service == name)
        .map(|(_, port)| *port)
}

/// Returns the port implied by a scheme: 443 for https, 80 for everything else
pub fn default_port(scheme: &str) -> u16 {
    if scheme == "https" {
        HTTPS_PORT
    } else {
        DEFAULT_PORT
    }
}

/// Splits a raw URL around the port of its authority
///
/// Returns `(before, port, after)` where `before` ends just before the `:`
/// separator, or `None` if the authority has no port.
fn split_port(raw: &str) -> Option<(&str, &str, &str)> {
    let authority_start = raw.find("://")? + 3;
    let rest = &raw[authority_start..];
    let authority_len = rest
        .find(|c| matches!(c, '/' | '?' | '#'))
        .unwrap_or(rest.len());
    let authority = &rest[..authority_len];

    // Userinfo may itself contain ':'
    let host_start = authority.rfind('@').map_or(0, |i| i + 1);
    let host_port = &authority[host_start..];

    let colon = if host_port.starts_with('[') {
        let close = host_port.find(']')?;
        if !host_port[close + 1..].starts_with(':') {
            return None;
        }
        close + 1
    } else {
        host_port.rfind(':')?
    };

    let colon = authority_start + host_start + colon;
    let port_end = authority_start + authority_len;
    Some((&raw[..colon], &raw[colon + 1..port_end], &raw[port_end..]))
}

/// Rewrites a URL whose port the URL parser rejected
///
/// A resolvable service name becomes its numeric port; anything else is
/// dropped so the scheme default applies. Returns `None` if no port could be
/// located in the authority.
pub(crate) fn resolve_service_port(raw: &str) -> Option<String> {
    let (head, port, tail) = split_port(raw)?;

    match lookup_service_port(port) {
        Some(number) => Some(format!("{}:{}{}", head, number, tail)),
        None => {
            tracing::debug!(
                "Unresolvable port '{}' in {}, using scheme default",
                port,
                raw
            );
            Some(format!("{}{}", head, tail))
        }
    }
}
