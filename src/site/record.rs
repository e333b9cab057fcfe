use serde::Serialize;

/// Port used when a URL has no explicit port and is not https, or cannot be parsed
pub const DEFAULT_PORT: u16 = 80;

/// Port used for https URLs without an explicit port
pub const HTTPS_PORT: u16 = 443;

/// Content-Type reported when the response has none or the fetch failed
pub const DEFAULT_CONTENT_TYPE: &str = "text/plain";

/// Metadata describing one fetched URL
///
/// Every field always holds a well-defined value: failures are represented
/// by defaults (empty strings, port 80, `text/plain`) rather than a separate
/// "missing" marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteRecord {
    /// The URL exactly as it was supplied
    pub source_url: String,

    /// `http` or `https`; empty if the URL could not be parsed
    pub scheme: String,

    /// Hostname portion of the URL; empty if the URL could not be parsed
    pub host: String,

    /// Explicit port, else 443 for https, else 80
    pub port: u16,

    /// Value of the `Server` response header, or empty
    pub server_header: String,

    /// Value of the `Content-Type` response header, or `text/plain`
    pub content_type: String,

    /// Response body; empty if the fetch failed
    pub body: String,
}

impl SiteRecord {
    /// Creates the record substituted for a URL whose fetch failed
    ///
    /// Only `source_url` carries information; every other field holds its
    /// default.
    ///
    /// # Examples
    ///
    /// ```
    /// use sumi_harvest::site::SiteRecord;
    ///
    /// let record = SiteRecord::placeholder("not a url");
    /// assert_eq!(record.source_url, "not a url");
    /// assert_eq!(record.port, 80);
    /// assert!(record.body.is_empty());
    /// ```
    pub fn placeholder(source_url: &str) -> Self {
        Self {
            source_url: source_url.to_string(),
            scheme: String::new(),
            host: String::new(),
            port: DEFAULT_PORT,
            server_header: String::new(),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            body: String::new(),
        }
    }

    /// Returns true if this record carries no fetched data
    pub fn is_placeholder(&self) -> bool {
        *self == Self::placeholder(&self.source_url)
    }
}
