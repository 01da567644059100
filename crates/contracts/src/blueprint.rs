//! RelayBlueprint - Config Loader output
//!
//! Describes the full relay: message source, HTTP client settings and the
//! routes that gate records into destinations.

use serde::{Deserialize, Serialize};

use crate::{AcceptableStatusSet, ContractError, HeaderSet};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Full relay configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RelayBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Where records come from
    pub source: SourceConfig,

    /// Shared HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Sampled fan-out routes, evaluated in order for every record
    pub routes: Vec<RouteConfig>,
}

impl RelayBlueprint {
    /// Total number of destinations across all routes
    pub fn destination_count(&self) -> usize {
        self.routes.iter().map(|r| r.destinations.len()).sum()
    }
}

/// Message source kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Kafka consumer group subscription
    #[default]
    Kafka,
    /// Newline-delimited records on standard input
    Stdin,
}

/// Message source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Source kind
    #[serde(default)]
    pub kind: SourceKind,

    /// Bootstrap brokers (`host:port[,host:port]`)
    #[serde(default)]
    pub brokers: String,

    /// Consumer group id
    #[serde(default)]
    pub group: String,

    /// Subscribed topics
    #[serde(default)]
    pub topics: Vec<String>,

    /// Bounded wait for a single poll (milliseconds)
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
}

fn default_poll_timeout_ms() -> u64 {
    100
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            brokers: String::new(),
            group: String::new(),
            topics: Vec::new(),
            poll_timeout_ms: default_poll_timeout_ms(),
        }
    }
}

/// HTTP client configuration shared by every delivery engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout (seconds)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Connection establishment timeout (seconds)
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// User-Agent header value
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Verify TLS certificates
    #[serde(default = "default_verify_tls")]
    pub verify_tls: bool,
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_user_agent() -> String {
    concat!("tsdb-relay/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_verify_tls() -> bool {
    true
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            user_agent: default_user_agent(),
            verify_tls: default_verify_tls(),
        }
    }
}

/// A sampler gating one or more destinations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Unique route name
    pub name: String,

    /// Forward one of every `discard_ratio` records (0 = forward all)
    ///
    /// Signed so that a negative value can be reported as a configuration
    /// error instead of failing to deserialize.
    #[serde(default)]
    pub discard_ratio: i64,

    /// Destinations that receive every forwarded record, in order
    pub destinations: Vec<DestinationConfig>,
}

/// One logical HTTP backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    /// Unique destination name
    pub name: String,

    /// Candidate endpoints (`host:port` or URL), tried round-robin
    pub endpoints: Vec<String>,

    /// Request path (e.g. `/api/put`)
    pub path: String,

    /// HTTP method
    #[serde(default = "default_method")]
    pub method: String,

    /// `"Name: value"` header lines
    #[serde(default)]
    pub headers: Vec<String>,

    /// Non-2xx statuses treated as delivered
    #[serde(default)]
    pub accept_statuses: AcceptableStatusSet,
}

fn default_method() -> String {
    "POST".to_string()
}

impl DestinationConfig {
    /// Parse the configured header lines
    pub fn header_set(&self) -> Result<HeaderSet, ContractError> {
        HeaderSet::from_lines(&self.headers)
    }
}

/// Header lines used by the originating OpenTSDB deployment
pub const DEFAULT_HEADER_LINES: &[&str] = &["Content-Encoding: gzip"];

/// Acceptable statuses used by the originating OpenTSDB deployment
pub const DEFAULT_ACCEPT_STATUSES: &str = "204,400";
