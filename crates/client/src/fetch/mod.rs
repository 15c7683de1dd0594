//! Network access for the worker.
//!
//! The worker only sees the [`Network`] trait. Any `Err` from it means
//! "network unavailable", whatever the cause (DNS, refused connection,
//! timeout, oversized body); the strategies never distinguish between them.
//!
//! [`FetchClient`] is the reqwest-backed implementation used by the host
//! binary. Unlike a typical HTTP client wrapper it resolves with the response
//! for every status code: a 404 is a response, not a failure.

pub mod url;

#[cfg(test)]
pub(crate) mod stub;

use async_trait::async_trait;
use reqwest::{Client, Method, header};
use std::time::{Duration, Instant};
use tether_core::{Error, Request, Response, ResponseType};

pub use self::url::{UrlError, is_same_origin, resolve};

/// A way to put a request on the wire.
#[async_trait]
pub trait Network: Send + Sync {
    /// Perform the request once. No retries.
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "tether/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Transport timeout (default: none)
    pub timeout: Option<Duration>,

    /// Maximum number of redirects to follow (default: 20)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "tether/0.1".to_string(), max_bytes: 5 * 1024 * 1024, timeout: None, max_redirects: 20 }
    }
}

impl FetchConfig {
    pub fn from_app_config(config: &tether_core::AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Default::default()
        }
    }
}

/// HTTP client for the live network.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true);

        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }

        let http = builder
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }
}

#[async_trait]
impl Network for FetchClient {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let start = Instant::now();
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|e| Error::InvalidInput(format!("invalid method {}: {e}", request.method)))?;

        let mut builder = self.http.request(method, request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Error::Network(format!("{}: {e}", request.url)))?;

        if let Some(len) = response.content_length()
            && exceeds(len, self.config.max_bytes)
        {
            return Err(Error::Network(format!("{len} bytes exceeds {}", self.config.max_bytes)));
        }

        let status = response.status();
        let final_url = response.url().clone();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str().to_string(), v.to_string())))
            .collect::<Vec<_>>();

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::Network(format!("failed to read response: {e}")))?;

        if body.len() > self.config.max_bytes {
            return Err(Error::Network(format!("{} bytes exceeds {}", body.len(), self.config.max_bytes)));
        }

        tracing::debug!(
            url = %request.url,
            status = status.as_u16(),
            bytes = body.len(),
            fetch_ms = start.elapsed().as_millis() as u64,
            "network fetch"
        );

        Ok(Response {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
            headers,
            body,
            response_type: ResponseType::Basic,
            url: Some(final_url),
        })
    }
}

/// Whether a declared content length is over `max_bytes`. Lengths that do
/// not fit in `usize` always are.
fn exceeds(len: u64, max_bytes: usize) -> bool {
    usize::try_from(len).map_or(true, |len| len > max_bytes)
}

/// Content type of a response, without parameters.
pub fn content_type(response: &Response) -> Option<&str> {
    response
        .header(header::CONTENT_TYPE.as_str())
        .map(|ct| ct.split(';').next().unwrap_or(ct).trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn test_fetch_config_default() {
        let config = FetchConfig::default();
        assert_eq!(config.user_agent, "tether/0.1");
        assert_eq!(config.max_bytes, 5 * 1024 * 1024);
        assert_eq!(config.timeout, None);
        assert_eq!(config.max_redirects, 20);
    }

    #[test]
    fn test_fetch_config_from_app_config() {
        let app = tether_core::AppConfig { user_agent: "somewheria/1".into(), timeout_ms: Some(1_500), ..Default::default() };
        let config = FetchConfig::from_app_config(&app);
        assert_eq!(config.user_agent, "somewheria/1");
        assert_eq!(config.timeout, Some(Duration::from_millis(1_500)));
    }

    #[tokio::test]
    async fn test_fetch_client_new() {
        let client = FetchClient::new(FetchConfig::default());
        assert!(client.is_ok());
    }

    #[tokio::test]
    async fn test_malformed_method_is_rejected_before_sending() {
        let client = FetchClient::new(FetchConfig::default()).unwrap();
        let mut request = Request::get(::url::Url::parse("https://somewheria.example/").unwrap());
        request.method = "GE T".to_string();
        let result = client.fetch(&request).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_declared_length_limit() {
        assert!(!exceeds(1_024, 1_024));
        assert!(exceeds(1_025, 1_024));
        assert!(exceeds(u64::MAX, usize::MAX - 1));
    }

    #[test]
    fn test_content_type_strips_params() {
        let mut response = Response::synthetic(200, Some("text/html; charset=utf-8"), Bytes::new());
        assert_eq!(content_type(&response), Some("text/html"));
        response.headers.clear();
        assert_eq!(content_type(&response), None);
    }
}
