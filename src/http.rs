//! HTTP client construction and request plumbing shared by both endpoints.

use reqwest::{Client, RequestBuilder};
use std::collections::HashMap;

use crate::client::ClientError;
use crate::options::TransportOptions;

/// Build a configured HTTP client from transport options.
///
/// Applies the timeout and proxy settings. An unparsable proxy URL is a
/// configuration error rather than being silently ignored.
pub fn build_http_client(transport_options: &TransportOptions) -> Result<Client, ClientError> {
    let mut builder = Client::builder();

    if let Some(timeout) = transport_options.timeout {
        builder = builder.timeout(timeout);
    }

    if let Some(proxy_url) = &transport_options.http.proxy {
        let proxy = reqwest::Proxy::all(proxy_url)
            .map_err(|e| ClientError::Config(format!("invalid proxy URL '{}': {}", proxy_url, e)))?;
        builder = builder.proxy(proxy);
    }

    Ok(builder.build()?)
}

/// Append an endpoint path to the configured base URL.
///
/// # Example
/// ```
/// use docchat::http::endpoint_url;
///
/// assert_eq!(endpoint_url("http://localhost:5000", "/chat"), "http://localhost:5000/chat");
/// assert_eq!(endpoint_url("http://localhost:5000/", "/chat"), "http://localhost:5000/chat");
/// ```
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Add extra headers to a request if specified in transport options.
pub fn add_extra_headers(
    mut request: RequestBuilder,
    extra_headers: &Option<HashMap<String, String>>,
) -> RequestBuilder {
    if let Some(headers) = extra_headers {
        for (key, value) in headers {
            request = request.header(key, value);
        }
    }
    request
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_build_http_client() {
        let transport_options =
            TransportOptions::new("http://localhost:5000").with_timeout(Duration::from_secs(30));

        let client = build_http_client(&transport_options);
        assert!(client.is_ok());
    }

    #[test]
    fn test_build_http_client_with_proxy() {
        let mut transport_options = TransportOptions::new("http://localhost:5000");
        transport_options.http.proxy = Some("http://proxy.example.com:8080".to_string());

        let client = build_http_client(&transport_options);
        assert!(client.is_ok());
    }

    #[test]
    fn test_build_http_client_rejects_bad_proxy() {
        let mut transport_options = TransportOptions::new("http://localhost:5000");
        transport_options.http.proxy = Some("not a url".to_string());

        match build_http_client(&transport_options) {
            Err(ClientError::Config(msg)) => assert!(msg.contains("proxy")),
            other => panic!("expected Config error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_endpoint_url_joins_cleanly() {
        assert_eq!(
            endpoint_url("http://h:1/", "/upload"),
            "http://h:1/upload"
        );
        assert_eq!(endpoint_url("http://h:1", "/upload"), "http://h:1/upload");
    }
}
