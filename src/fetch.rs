//! Network retrieval wrapper around the synchronous parsing core.
//!
//! Fetching is the one async boundary in the crate: the document is
//! downloaded with a size cap, then handed as a byte slice to
//! [`FeedParser`]. No retries happen here — retry policy belongs to the
//! caller.

use std::time::Duration;

use futures::StreamExt;
use thiserror::Error;

use crate::error::ParseError;
use crate::model::Feed;
use crate::parser::FeedParser;

/// Total request budget, connect through body.
pub const CLIENT_TIMEOUT: Duration = Duration::from_secs(15);
/// Connection establishment budget, covering the TLS handshake.
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

const MAX_FEED_SIZE: usize = 10 * 1024 * 1024; // 10MB

/// Errors that can occur while retrieving and parsing a remote feed.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network-level error (DNS, connection, TLS, etc.)
    #[error("request failed: {0}")]
    Network(reqwest::Error),
    /// HTTP response outside the 200–399 range
    #[error("HTTP error: {status} {text}")]
    Http { status: u16, text: String },
    /// Request exceeded the client timeout
    #[error("request timed out")]
    Timeout,
    /// Response body exceeded the 10MB size limit
    #[error("response too large")]
    ResponseTooLarge,
    /// The feed URL did not parse or uses a non-HTTP scheme
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    /// The proxy address did not form a valid URL
    #[error("invalid proxy address: {0}")]
    InvalidProxy(String),
    /// The downloaded document failed to parse
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Forward proxy configuration for [`Fetcher::with_proxy`].
#[derive(Debug, Clone)]
pub struct ProxyConfig {
    /// `host:port` of the proxy.
    pub address: String,
    /// Optional basic-auth credentials, sent base64-encoded in the
    /// `Proxy-Authorization` header.
    pub credentials: Option<(String, String)>,
}

/// Retrieves feed documents over HTTP and parses them.
///
/// The HTTP client is built once at construction with fixed timeouts;
/// there is no lazily-created shared default.
pub struct Fetcher {
    client: reqwest::Client,
    parser: FeedParser,
}

impl std::fmt::Debug for Fetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Fetcher").finish_non_exhaustive()
    }
}

impl Fetcher {
    /// A fetcher with the default direct-connection client.
    pub fn new(parser: FeedParser) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(CLIENT_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(FetchError::Network)?;
        Ok(Fetcher { client, parser })
    }

    /// A fetcher routing every request through `proxy`.
    pub fn with_proxy(parser: FeedParser, proxy: &ProxyConfig) -> Result<Self, FetchError> {
        let mut proxy_config = reqwest::Proxy::all(format!("http://{}", proxy.address))
            .map_err(|e| FetchError::InvalidProxy(e.to_string()))?;
        if let Some((username, password)) = &proxy.credentials {
            proxy_config = proxy_config.basic_auth(username, password);
        }

        let client = reqwest::Client::builder()
            .timeout(CLIENT_TIMEOUT)
            .connect_timeout(CONNECT_TIMEOUT)
            .proxy(proxy_config)
            .build()
            .map_err(FetchError::Network)?;
        Ok(Fetcher { client, parser })
    }

    /// Fetches `url` and parses the response body into the canonical model.
    ///
    /// Redirects are followed by the client, so 2xx–3xx counts as success;
    /// anything else becomes [`FetchError::Http`] carrying the status code
    /// and reason text.
    pub async fn fetch(&self, url: &str) -> Result<Feed, FetchError> {
        let url = url::Url::parse(url).map_err(|e| FetchError::InvalidUrl(e.to_string()))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(FetchError::InvalidUrl(format!(
                "unsupported scheme: {}",
                url.scheme()
            )));
        }

        let response = self.client.get(url.clone()).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout
            } else {
                FetchError::Network(e)
            }
        })?;

        let status = response.status();
        if !(200..400).contains(&status.as_u16()) {
            return Err(FetchError::Http {
                status: status.as_u16(),
                text: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let bytes = read_limited_bytes(response).await?;
        tracing::debug!(url = %url, bytes = bytes.len(), "fetched feed document");

        Ok(self.parser.parse(bytes.as_slice())?)
    }
}

/// Reads the response body, enforcing the size limit as chunks arrive.
async fn read_limited_bytes(response: reqwest::Response) -> Result<Vec<u8>, FetchError> {
    // Fast path: check Content-Length header
    if let Some(len) = response.content_length() {
        if len as usize > MAX_FEED_SIZE {
            return Err(FetchError::ResponseTooLarge);
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();

    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(FetchError::Network)?;
        if bytes.len().saturating_add(chunk.len()) > MAX_FEED_SIZE {
            return Err(FetchError::ResponseTooLarge);
        }
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_proxy_client_construction() {
        let proxy = ProxyConfig {
            address: "proxy.internal:3128".to_string(),
            credentials: Some(("user".to_string(), "secret".to_string())),
        };
        assert!(Fetcher::with_proxy(FeedParser::new(), &proxy).is_ok());
    }

    #[test]
    fn test_invalid_proxy_address_rejected() {
        let proxy = ProxyConfig {
            address: "not a host".to_string(),
            credentials: None,
        };
        let err = Fetcher::with_proxy(FeedParser::new(), &proxy).unwrap_err();
        assert!(matches!(err, FetchError::InvalidProxy(_)));
    }

    #[tokio::test]
    async fn test_non_http_scheme_rejected() {
        let fetcher = Fetcher::new(FeedParser::new()).unwrap();
        let err = fetcher.fetch("ftp://example.com/feed").await.unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl(_)));
    }
}
