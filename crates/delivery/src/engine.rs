//! Send-with-failover delivery to a single destination.
//!
//! The engine keeps a rotation cursor across calls so consecutive sends
//! spread over the endpoints. Within one call, transport failures rotate to
//! the next endpoint until every endpoint has been tried once; a received
//! but unacceptable status ends the call immediately.

use std::time::{Duration, Instant};

use bytes::Bytes;
use contracts::{endpoint_url, AcceptableStatusSet, DestinationConfig, HeaderSet};
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Method, Url,
};
use tracing::{debug, instrument};

use crate::{
    classifier::{classify, Classification},
    client::{authority, DeliveryClient},
    error::{DeliveryError, Result},
};

/// A resolved endpoint: display name plus full request URL.
#[derive(Debug, Clone)]
struct Target {
    endpoint: String,
    url: Url,
}

/// Proof of a successful delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReceipt {
    /// Endpoint (`host:port`) that accepted the payload.
    pub endpoint: String,
    /// Status it answered with.
    pub status_code: u16,
    /// Attempts made, including the successful one.
    pub attempts: u32,
    /// Wall time of the whole call.
    pub duration: Duration,
}

/// Round-robin, failover HTTP sender for one destination.
///
/// `send` takes `&mut self`: an engine is never driven concurrently with
/// itself, so the cursor needs no synchronization.
#[derive(Debug)]
pub struct DeliveryEngine {
    name: String,
    targets: Vec<Target>,
    method: Method,
    headers: HeaderMap,
    acceptable: AcceptableStatusSet,
    cursor: usize,
    client: DeliveryClient,
}

impl DeliveryEngine {
    /// Builds an engine for a destination.
    ///
    /// # Errors
    ///
    /// Returns `DeliveryError::ConfigurationError` when the destination has
    /// no endpoints, an endpoint or the path does not form a valid URL, the
    /// method is not a valid token, or a header cannot be sent on the wire.
    #[instrument(
        name = "delivery_engine_new",
        skip(config, client),
        fields(destination = %config.name)
    )]
    pub fn new(config: &DestinationConfig, client: DeliveryClient) -> Result<Self> {
        if config.endpoints.is_empty() {
            return Err(DeliveryError::configuration(format!(
                "destination '{}' has no endpoints",
                config.name
            )));
        }

        let targets = config
            .endpoints
            .iter()
            .map(|endpoint| resolve_target(endpoint, &config.path))
            .collect::<Result<Vec<_>>>()?;

        let method = Method::from_bytes(config.method.as_bytes()).map_err(|_| {
            DeliveryError::configuration(format!("invalid HTTP method '{}'", config.method))
        })?;

        let header_set = config
            .header_set()
            .map_err(|e| DeliveryError::configuration(e.to_string()))?;
        let headers = to_header_map(&header_set)?;

        debug!(
            destination = %config.name,
            endpoints = targets.len(),
            method = %method,
            path = %config.path,
            "Delivery engine ready"
        );

        Ok(Self {
            name: config.name.clone(),
            targets,
            method,
            headers,
            acceptable: config.accept_statuses.clone(),
            cursor: 0,
            client,
        })
    }

    /// Destination name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Endpoints in configured order, as `host:port`.
    pub fn endpoints(&self) -> impl Iterator<Item = &str> {
        self.targets.iter().map(|t| t.endpoint.as_str())
    }

    /// Index of the endpoint the next call starts at.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Delivers a payload to the destination.
    ///
    /// Starts at the cursor endpoint and advances the cursor by one for the
    /// next call, whatever the outcome.
    ///
    /// # Errors
    ///
    /// - `Rejected` when an endpoint answers with a non-acceptable status;
    ///   remaining endpoints are not tried
    /// - `Exhausted` when every endpoint failed at transport level
    #[instrument(
        level = "debug",
        name = "delivery_engine_send",
        skip(self, payload),
        fields(destination = %self.name, bytes = payload.len())
    )]
    pub async fn send(&mut self, payload: Bytes) -> Result<DeliveryReceipt> {
        let started = Instant::now();
        let count = self.targets.len();
        let start = self.cursor;
        self.cursor = (start + 1) % count;

        let mut last_error = None;

        for attempt in 0..count {
            let target = &self.targets[(start + attempt) % count];
            let attempts = attempt as u32 + 1;

            let outcome = self
                .client
                .execute(self.method.clone(), &target.url, &self.headers, payload.clone())
                .await;

            match outcome {
                Ok(response) => {
                    return match classify(response.status_code, &self.acceptable) {
                        Classification::Success => Ok(DeliveryReceipt {
                            endpoint: target.endpoint.clone(),
                            status_code: response.status_code,
                            attempts,
                            duration: started.elapsed(),
                        }),
                        Classification::Failure => Err(DeliveryError::rejected(
                            target.endpoint.clone(),
                            response.status_code,
                            response.body,
                        )),
                    };
                }
                Err(e) if e.is_transport() => {
                    debug!(
                        endpoint = %target.endpoint,
                        attempt = attempts,
                        error = %e,
                        "Rotating to next endpoint"
                    );
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(match last_error {
            Some(e) => DeliveryError::exhausted(count as u32, e),
            None => DeliveryError::configuration("destination has no endpoints"),
        })
    }
}

/// Turns `host:port` or a URL plus a path into a request URL.
///
/// The endpoint is checked for a host before the path is joined, so
/// `http://` never borrows a host from the path.
fn resolve_target(endpoint: &str, path: &str) -> Result<Target> {
    let url = endpoint_url(endpoint, path)
        .map_err(|e| DeliveryError::configuration(e.to_string()))?;

    Ok(Target {
        endpoint: authority(&url),
        url,
    })
}

/// Keeps every value of repeated names, in order.
fn to_header_map(headers: &HeaderSet) -> Result<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, values) in headers.iter() {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_| {
            DeliveryError::configuration(format!("invalid header name '{name}'"))
        })?;
        for value in values {
            let header_value = HeaderValue::from_str(value).map_err(|_| {
                DeliveryError::configuration(format!("invalid value for header '{name}'"))
            })?;
            map.append(header_name.clone(), header_value);
        }
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use wiremock::{matchers, Mock, MockServer, ResponseTemplate};

    use super::*;

    fn destination(endpoints: Vec<String>) -> DestinationConfig {
        DestinationConfig {
            name: "tsdb".into(),
            endpoints,
            path: "/api/put".into(),
            method: "POST".into(),
            headers: vec!["Content-Encoding: gzip".into()],
            accept_statuses: AcceptableStatusSet::from([204, 400]),
        }
    }

    fn engine(endpoints: Vec<String>) -> DeliveryEngine {
        DeliveryEngine::new(&destination(endpoints), DeliveryClient::with_defaults().unwrap())
            .unwrap()
    }

    /// Address nothing is listening on.
    fn dead_endpoint() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        addr.to_string()
    }

    async fn server_answering(status: u16, expected_calls: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .and(matchers::path("/api/put"))
            .respond_with(ResponseTemplate::new(status))
            .expect(expected_calls)
            .mount(&server)
            .await;
        server
    }

    #[test]
    fn zero_endpoints_is_configuration_error() {
        let result =
            DeliveryEngine::new(&destination(vec![]), DeliveryClient::with_defaults().unwrap());
        assert!(matches!(result, Err(DeliveryError::ConfigurationError { .. })));
    }

    #[test]
    fn invalid_method_is_configuration_error() {
        let mut config = destination(vec!["tsdb:4242".into()]);
        config.method = "BAD METHOD".into();
        let result = DeliveryEngine::new(&config, DeliveryClient::with_defaults().unwrap());
        assert!(matches!(result, Err(DeliveryError::ConfigurationError { .. })));
    }

    #[test]
    fn malformed_header_is_configuration_error() {
        let mut config = destination(vec!["tsdb:4242".into()]);
        config.headers = vec!["no-colon".into()];
        let result = DeliveryEngine::new(&config, DeliveryClient::with_defaults().unwrap());
        assert!(matches!(result, Err(DeliveryError::ConfigurationError { .. })));
    }

    #[test]
    fn endpoints_accept_authority_or_url() {
        let engine = engine(vec!["tsdb-1:4242".into(), "https://tsdb-2/".into()]);
        let endpoints: Vec<_> = engine.endpoints().collect();
        assert_eq!(endpoints, ["tsdb-1:4242", "tsdb-2:443"]);
        assert_eq!(engine.targets[0].url.as_str(), "http://tsdb-1:4242/api/put");
        assert_eq!(engine.targets[1].url.as_str(), "https://tsdb-2/api/put");
    }

    #[test]
    fn endpoint_without_host_is_configuration_error() {
        for endpoint in ["http://", "https:///api"] {
            let config = destination(vec!["tsdb:4242".into(), endpoint.into()]);
            let result = DeliveryEngine::new(&config, DeliveryClient::with_defaults().unwrap());
            assert!(
                matches!(result, Err(DeliveryError::ConfigurationError { .. })),
                "{endpoint} accepted"
            );
        }
    }

    #[test]
    fn endpoint_base_path_preserved() {
        let target = resolve_target("http://proxy:8080/tsdb/", "/api/put").unwrap();
        assert_eq!(target.url.as_str(), "http://proxy:8080/tsdb/api/put");
    }

    #[tokio::test]
    async fn round_robin_across_calls() {
        let servers = [
            server_answering(204, 2).await,
            server_answering(204, 2).await,
            server_answering(204, 2).await,
        ];
        let mut engine = engine(servers.iter().map(|s| s.uri()).collect());
        let expected: Vec<String> = engine.endpoints().map(str::to_string).collect();

        let mut hit = Vec::new();
        for _ in 0..6 {
            let receipt = engine.send(Bytes::from_static(b"[]")).await.unwrap();
            assert_eq!(receipt.attempts, 1);
            hit.push(receipt.endpoint);
        }

        assert_eq!(hit[..3], expected[..]);
        assert_eq!(hit[3..], expected[..]);
    }

    #[tokio::test]
    async fn transport_failure_rotates_within_call() {
        let second = server_answering(204, 1).await;
        let third = server_answering(204, 0).await;
        let mut engine = engine(vec![dead_endpoint(), second.uri(), third.uri()]);

        let receipt = engine.send(Bytes::from_static(b"[]")).await.unwrap();

        assert_eq!(receipt.attempts, 2);
        assert_eq!(receipt.status_code, 204);
        assert_eq!(receipt.endpoint, engine.endpoints().nth(1).unwrap());
        assert_eq!(engine.cursor(), 1);
    }

    #[tokio::test]
    async fn rejection_is_not_retried_elsewhere() {
        let first = server_answering(500, 1).await;
        let second = server_answering(204, 0).await;
        let third = server_answering(204, 0).await;
        let mut engine = engine(vec![first.uri(), second.uri(), third.uri()]);

        let err = engine.send(Bytes::from_static(b"[]")).await.unwrap_err();

        assert_eq!(err.status_code(), Some(500));
        assert!(matches!(err, DeliveryError::Rejected { .. }));
    }

    #[tokio::test]
    async fn acceptable_status_is_success() {
        let server = server_answering(400, 1).await;
        let mut engine = engine(vec![server.uri()]);

        let receipt = engine.send(Bytes::from_static(b"[]")).await.unwrap();
        assert_eq!(receipt.status_code, 400);
    }

    #[tokio::test]
    async fn all_endpoints_down_is_exhausted() {
        let mut engine = engine(vec![dead_endpoint(), dead_endpoint()]);

        let err = engine.send(Bytes::from_static(b"[]")).await.unwrap_err();

        match err {
            DeliveryError::Exhausted { attempts, last_error } => {
                assert_eq!(attempts, 2);
                assert!(last_error.is_transport());
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cursor_advances_after_failure() {
        let first = server_answering(500, 1).await;
        let second = server_answering(204, 1).await;
        let mut engine = engine(vec![first.uri(), second.uri()]);

        assert!(engine.send(Bytes::from_static(b"[]")).await.is_err());
        assert_eq!(engine.cursor(), 1);

        let receipt = engine.send(Bytes::from_static(b"[]")).await.unwrap();
        assert_eq!(receipt.endpoint, engine.endpoints().nth(1).unwrap());
        assert_eq!(engine.cursor(), 0);
    }

    #[tokio::test]
    async fn repeated_header_values_sent_in_order() {
        let server = MockServer::start().await;
        Mock::given(matchers::method("POST"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&server)
            .await;

        let mut config = destination(vec![server.uri()]);
        config.headers = vec![
            "Content-Encoding: gzip".into(),
            "x-relay-tag: first".into(),
            "X-Relay-Tag: second".into(),
            "X-RELAY-TAG: third".into(),
        ];
        let mut engine =
            DeliveryEngine::new(&config, DeliveryClient::with_defaults().unwrap()).unwrap();

        engine.send(Bytes::from_static(b"payload")).await.unwrap();

        let requests = server.received_requests().await.unwrap();
        assert_eq!(requests.len(), 1);
        let tags: Vec<_> = requests[0]
            .headers
            .get_all("x-relay-tag")
            .iter()
            .map(|v| v.to_str().unwrap().to_string())
            .collect();
        assert_eq!(tags, ["first", "second", "third"]);
        assert_eq!(requests[0].headers.get("content-encoding").unwrap(), "gzip");
        assert_eq!(requests[0].body, b"payload");
    }
}
