//! HTTP client for delivery attempts with configurable timeouts.
//!
//! Executes exactly one request per call and reports either the received
//! status or a categorized transport error. Classification and failover live
//! in the engine.

use std::time::{Duration, Instant};

use bytes::Bytes;
use contracts::HttpConfig;
use reqwest::{header::HeaderMap, Method, Response, Url};

use crate::error::{DeliveryError, Result};

/// Response body bytes kept for diagnostics.
const MAX_BODY_EXCERPT: usize = 1024;

/// Configuration for the delivery client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Timeout for a whole request.
    pub timeout: Duration,
    /// Timeout for establishing a connection.
    pub connect_timeout: Duration,
    /// User agent string for requests.
    pub user_agent: String,
    /// Maximum number of redirects to follow.
    pub max_redirects: u32,
    /// Whether to verify TLS certificates.
    pub verify_tls: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(crate::DEFAULT_TIMEOUT_SECONDS),
            connect_timeout: Duration::from_secs(crate::DEFAULT_CONNECT_TIMEOUT_SECONDS),
            user_agent: concat!("tsdb-relay/", env!("CARGO_PKG_VERSION")).to_string(),
            max_redirects: 3,
            verify_tls: true,
        }
    }
}

impl From<&HttpConfig> for ClientConfig {
    fn from(config: &HttpConfig) -> Self {
        Self {
            timeout: Duration::from_secs(config.timeout_secs),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            user_agent: config.user_agent.clone(),
            verify_tls: config.verify_tls,
            ..Self::default()
        }
    }
}

/// HTTP client shared by every delivery engine.
///
/// Cloning is cheap and clones share one connection pool.
#[derive(Debug, Clone)]
pub struct DeliveryClient {
    client: reqwest::Client,
    config: ClientConfig,
}

/// Outcome of an attempt that produced an HTTP response.
#[derive(Debug, Clone)]
pub struct AttemptResponse {
    /// HTTP status code.
    pub status_code: u16,
    /// Leading bytes of the response body.
    pub body: String,
    /// Total duration of the request.
    pub duration: Duration,
}

impl DeliveryClient {
    /// Creates a new delivery client with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError::ConfigurationError` if the HTTP client cannot
    /// be configured with the provided settings.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects as usize))
            .danger_accept_invalid_certs(!config.verify_tls)
            .build()
            .map_err(|e| {
                DeliveryError::configuration(format!("failed to build HTTP client: {e}"))
            })?;

        Ok(Self { client, config })
    }

    /// Creates a new delivery client with default configuration.
    pub fn with_defaults() -> Result<Self> {
        Self::new(ClientConfig::default())
    }

    /// Client configuration.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Executes a single request.
    ///
    /// Any received status is returned as `Ok`; only failures to complete
    /// the exchange are errors.
    ///
    /// # Errors
    ///
    /// - `Timeout` when the request exceeds the configured timeout
    /// - `NetworkError` for connection, DNS and I/O failures
    pub async fn execute(
        &self,
        method: Method,
        url: &Url,
        headers: &HeaderMap,
        body: Bytes,
    ) -> Result<AttemptResponse> {
        let start_time = Instant::now();
        let endpoint = authority(url);

        let request = self
            .client
            .request(method, url.clone())
            .headers(headers.clone())
            .body(body);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!(
                    endpoint = %endpoint,
                    duration_ms = start_time.elapsed().as_millis(),
                    "Request failed: {}",
                    e
                );

                if e.is_timeout() {
                    return Err(DeliveryError::timeout(endpoint, self.config.timeout.as_secs()));
                }
                if e.is_connect() {
                    return Err(DeliveryError::network(endpoint, format!("connection failed: {e}")));
                }
                return Err(DeliveryError::network(endpoint, e.to_string()));
            }
        };

        let status_code = response.status().as_u16();
        let body = read_excerpt(response).await;
        let duration = start_time.elapsed();

        tracing::trace!(
            endpoint = %endpoint,
            status = status_code,
            duration_ms = duration.as_millis(),
            "Received response"
        );

        Ok(AttemptResponse {
            status_code,
            body,
            duration,
        })
    }
}

/// Drains the body so the connection can be reused, keeping an excerpt.
async fn read_excerpt(response: Response) -> String {
    match response.bytes().await {
        Ok(bytes) if bytes.len() > MAX_BODY_EXCERPT => {
            let truncated = String::from_utf8_lossy(&bytes[..MAX_BODY_EXCERPT]);
            format!("{truncated}... (truncated)")
        }
        Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
        Err(e) => format!("[Failed to read response body: {e}]"),
    }
}

/// `host:port` of a URL, used to name endpoints in errors.
pub(crate) fn authority(url: &Url) -> String {
    match (url.host_str(), url.port_or_known_default()) {
        (Some(host), Some(port)) => format!("{host}:{port}"),
        (Some(host), None) => host.to_string(),
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use reqwest::header::{HeaderName, HeaderValue};
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    use super::*;

    fn put_url(server: &MockServer) -> Url {
        Url::parse(&format!("{}/api/put", server.uri())).unwrap()
    }

    #[tokio::test]
    async fn successful_attempt() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .and(matchers::path("/api/put"))
            .respond_with(ResponseTemplate::new(204))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = DeliveryClient::with_defaults().unwrap();
        let response = client
            .execute(Method::POST, &put_url(&mock_server), &HeaderMap::new(), Bytes::from("[]"))
            .await
            .unwrap();

        assert_eq!(response.status_code, 204);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn error_status_is_not_a_transport_error() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
            .mount(&mock_server)
            .await;

        let client = DeliveryClient::with_defaults().unwrap();
        let response = client
            .execute(Method::POST, &put_url(&mock_server), &HeaderMap::new(), Bytes::new())
            .await
            .unwrap();

        assert_eq!(response.status_code, 500);
        assert_eq!(response.body, "Internal Server Error");
    }

    #[tokio::test]
    async fn headers_and_body_forwarded() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("PUT"))
            .and(matchers::header("Content-Encoding", "gzip"))
            .and(matchers::body_bytes(b"payload".to_vec()))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&mock_server)
            .await;

        let mut headers = HeaderMap::new();
        headers.append(
            HeaderName::from_static("content-encoding"),
            HeaderValue::from_static("gzip"),
        );

        let client = DeliveryClient::with_defaults().unwrap();
        let response = client
            .execute(Method::PUT, &put_url(&mock_server), &headers, Bytes::from("payload"))
            .await
            .unwrap();
        assert_eq!(response.status_code, 200);
    }

    #[tokio::test]
    async fn timeout_categorized() {
        let mock_server = MockServer::start().await;

        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(204).set_delay(Duration::from_secs(2)))
            .mount(&mock_server)
            .await;

        let client = DeliveryClient::new(ClientConfig {
            timeout: Duration::from_millis(100),
            ..ClientConfig::default()
        })
        .unwrap();

        let err = client
            .execute(Method::POST, &put_url(&mock_server), &HeaderMap::new(), Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::Timeout { .. }), "got: {err:?}");
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn connection_refused_categorized() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let url = Url::parse(&format!("http://127.0.0.1:{port}/api/put")).unwrap();

        let client = DeliveryClient::with_defaults().unwrap();
        let err = client
            .execute(Method::POST, &url, &HeaderMap::new(), Bytes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, DeliveryError::NetworkError { .. }), "got: {err:?}");
        assert!(err.to_string().contains(&format!("127.0.0.1:{port}")));
    }

    #[test]
    fn authority_includes_default_port() {
        let url = Url::parse("http://tsdb.local/api/put").unwrap();
        assert_eq!(authority(&url), "tsdb.local:80");

        let url = Url::parse("https://tsdb.local:8443/api/put").unwrap();
        assert_eq!(authority(&url), "tsdb.local:8443");
    }
}
