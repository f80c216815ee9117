//! Transport configuration for the document-chat server.

use std::collections::HashMap;
use std::time::Duration;

/// Default base URL for a locally hosted document-chat server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";

/// Transport options shared by the chat and upload clients.
///
/// # Example
/// ```rust
/// use docchat::options::TransportOptions;
/// use std::time::Duration;
///
/// let options = TransportOptions::new("http://localhost:5000")
///     .with_timeout(Duration::from_secs(60));
/// ```
#[derive(Debug, Clone)]
pub struct TransportOptions {
    /// Request timeout. For the chat endpoint this bounds the whole
    /// exchange including the streamed body, so leave it unset (or
    /// generous) for long responses.
    pub timeout: Option<Duration>,

    /// HTTP-specific settings.
    pub http: HttpTransport,
}

/// HTTP-specific transport settings.
///
/// The document-chat protocol is unauthenticated, so there is no API key
/// here; use `extra_headers` if a deployment sits behind a gateway that
/// needs one.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    /// Base URL of the server, e.g. `http://localhost:5000`.
    pub base_url: String,

    /// HTTP proxy URL.
    pub proxy: Option<String>,

    /// Additional HTTP headers to include in every request.
    pub extra_headers: Option<HashMap<String, String>>,
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            proxy: None,
            extra_headers: None,
        }
    }
}

impl HttpTransport {
    /// Create HTTP transport settings for the given server base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            proxy: None,
            extra_headers: None,
        }
    }

    /// Set the proxy URL.
    pub fn with_proxy(mut self, proxy: String) -> Self {
        self.proxy = Some(proxy);
        self
    }

    /// Set extra headers.
    pub fn with_extra_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.extra_headers = Some(headers);
        self
    }

    /// Add a single extra header.
    pub fn with_header(mut self, key: String, value: String) -> Self {
        self.extra_headers
            .get_or_insert_with(HashMap::new)
            .insert(key, value);
        self
    }
}

impl TransportOptions {
    /// Create transport options for the given server base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            timeout: None,
            http: HttpTransport::new(base_url),
        }
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

impl Default for TransportOptions {
    fn default() -> Self {
        Self {
            timeout: None,
            http: HttpTransport::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_chain() {
        let options = TransportOptions::new("http://example.com")
            .with_timeout(Duration::from_secs(30));

        assert_eq!(options.http.base_url, "http://example.com");
        assert_eq!(options.timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_with_header_accumulates() {
        let http = HttpTransport::new("http://example.com")
            .with_header("x-a".to_string(), "1".to_string())
            .with_header("x-b".to_string(), "2".to_string());

        let headers = http.extra_headers.unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers["x-a"], "1");
    }

    #[test]
    fn test_default_points_at_local_server() {
        let options = TransportOptions::default();
        assert_eq!(options.http.base_url, DEFAULT_BASE_URL);
        assert!(options.timeout.is_none());
    }
}
