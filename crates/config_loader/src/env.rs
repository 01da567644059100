//! Environment-variable configuration
//!
//! Builds the classic OpenTSDB relay topology from the variables the relay
//! has always been deployed with:
//!
//! | route        | destinations                          | ratio variable                       |
//! |--------------|---------------------------------------|--------------------------------------|
//! | `bosun`      | `/api/put`, `/api/metadata/put`       | `OPEN_TSDB_BOSUN_DISCARD_RATIO`      |
//! | `short_term` | `/api/put` on short-term TSDB         | `OPEN_TSDB_SHORT_TERM_DISCARD_RATIO` |
//! | `long_term`  | `/api/put` on legacy and long-term    | `OPEN_TSDB_LONG_TERM_DISCARD_RATIO`  |

use contracts::{
    AcceptableStatusSet, ConfigVersion, ContractError, DestinationConfig, HttpConfig,
    RelayBlueprint, RouteConfig, SourceConfig, SourceKind, DEFAULT_ACCEPT_STATUSES,
    DEFAULT_HEADER_LINES,
};

pub const KAFKA_BROKER: &str = "KAFKA_BROKER";
pub const KAFKA_CONSUMER_GROUP: &str = "KAFKA_CONSUMER_GROUP";
pub const KAFKA_TOPIC: &str = "KAFKA_TOPIC";

pub const BOSUN_URL: &str = "OPEN_TSDB_BOSUN_URL";
pub const SHORT_TERM_URL: &str = "OPEN_TSDB_SHORT_TERM_URL";
pub const LONG_TERM_URL: &str = "OPEN_TSDB_LONG_TERM_URL";
pub const LEGACY_URL: &str = "OPEN_TSDB_LEGACY_URL";

pub const BOSUN_DISCARD_RATIO: &str = "OPEN_TSDB_BOSUN_DISCARD_RATIO";
pub const SHORT_TERM_DISCARD_RATIO: &str = "OPEN_TSDB_SHORT_TERM_DISCARD_RATIO";
pub const LONG_TERM_DISCARD_RATIO: &str = "OPEN_TSDB_LONG_TERM_DISCARD_RATIO";

/// `;`-separated header lines overriding `Content-Encoding: gzip`
pub const HTTP_HEADERS: &str = "RELAY_HTTP_HEADERS";
/// Comma-delimited statuses overriding `204,400`
pub const ACCEPT_STATUSES: &str = "RELAY_ACCEPT_STATUSES";

const PUT_PATH: &str = "/api/put";
const METADATA_PUT_PATH: &str = "/api/metadata/put";

/// Split a comma-delimited list, dropping blank entries
pub fn comma_delimited_list(s: &str) -> Vec<String> {
    s.split(',')
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build a blueprint from an environment lookup function
///
/// Routes whose URL variable is unset or blank are left out.
pub fn blueprint_from_lookup<F>(lookup: F) -> Result<RelayBlueprint, ContractError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

    let headers: Vec<String> = match var(HTTP_HEADERS) {
        Some(raw) => raw
            .split(';')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect(),
        None => DEFAULT_HEADER_LINES.iter().map(|l| l.to_string()).collect(),
    };
    let accept_statuses = AcceptableStatusSet::parse_list(
        var(ACCEPT_STATUSES).as_deref().unwrap_or(DEFAULT_ACCEPT_STATUSES),
    )?;

    let destination = |name: &str, endpoints: Vec<String>, path: &str| DestinationConfig {
        name: name.to_string(),
        endpoints,
        path: path.to_string(),
        method: "POST".to_string(),
        headers: headers.clone(),
        accept_statuses: accept_statuses.clone(),
    };

    let mut routes = Vec::new();

    if let Some(url) = var(BOSUN_URL) {
        let endpoints = comma_delimited_list(&url);
        routes.push(RouteConfig {
            name: "bosun".into(),
            discard_ratio: parse_ratio(BOSUN_DISCARD_RATIO, var(BOSUN_DISCARD_RATIO))?,
            destinations: vec![
                destination("bosun_datapoints", endpoints.clone(), PUT_PATH),
                destination("bosun_metadata", endpoints, METADATA_PUT_PATH),
            ],
        });
    }

    if let Some(url) = var(SHORT_TERM_URL) {
        routes.push(RouteConfig {
            name: "short_term".into(),
            discard_ratio: parse_ratio(SHORT_TERM_DISCARD_RATIO, var(SHORT_TERM_DISCARD_RATIO))?,
            destinations: vec![destination(
                "open_tsdb_short_term",
                comma_delimited_list(&url),
                PUT_PATH,
            )],
        });
    }

    let mut long_term = Vec::new();
    if let Some(url) = var(LEGACY_URL) {
        long_term.push(destination(
            "open_tsdb_legacy",
            comma_delimited_list(&url),
            PUT_PATH,
        ));
    }
    if let Some(url) = var(LONG_TERM_URL) {
        long_term.push(destination(
            "open_tsdb_long_term",
            comma_delimited_list(&url),
            PUT_PATH,
        ));
    }
    if !long_term.is_empty() {
        routes.push(RouteConfig {
            name: "long_term".into(),
            discard_ratio: parse_ratio(LONG_TERM_DISCARD_RATIO, var(LONG_TERM_DISCARD_RATIO))?,
            destinations: long_term,
        });
    }

    Ok(RelayBlueprint {
        version: ConfigVersion::V1,
        source: SourceConfig {
            kind: SourceKind::Kafka,
            brokers: var(KAFKA_BROKER).unwrap_or_default(),
            group: var(KAFKA_CONSUMER_GROUP).unwrap_or_default(),
            topics: var(KAFKA_TOPIC)
                .map(|t| comma_delimited_list(&t))
                .unwrap_or_default(),
            ..Default::default()
        },
        http: HttpConfig::default(),
        routes,
    })
}

/// Missing ratio means "no sampling"; anything non-numeric is rejected
fn parse_ratio(key: &str, value: Option<String>) -> Result<i64, ContractError> {
    match value {
        None => Ok(0),
        Some(raw) => raw.trim().parse().map_err(|e| ContractError::ConfigParse {
            message: format!("{key} must be an integer, got '{raw}'"),
            source: Some(Box::new(e)),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_full_topology() {
        let bp = blueprint_from_lookup(lookup(&[
            (KAFKA_BROKER, "kafka:9092"),
            (KAFKA_CONSUMER_GROUP, "relay"),
            (KAFKA_TOPIC, "metrics"),
            (BOSUN_URL, "bosun:8070"),
            (SHORT_TERM_URL, "short-1:4242, short-2:4242"),
            (LONG_TERM_URL, "long:4242"),
            (LEGACY_URL, "legacy:4242"),
            (BOSUN_DISCARD_RATIO, "0"),
            (SHORT_TERM_DISCARD_RATIO, "3"),
            (LONG_TERM_DISCARD_RATIO, "5"),
        ]))
        .unwrap();

        assert_eq!(bp.source.brokers, "kafka:9092");
        assert_eq!(bp.source.topics, vec!["metrics".to_string()]);

        let names: Vec<_> = bp.routes.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["bosun", "short_term", "long_term"]);

        let bosun = &bp.routes[0];
        assert_eq!(bosun.destinations[0].path, "/api/put");
        assert_eq!(bosun.destinations[1].path, "/api/metadata/put");

        let short = &bp.routes[1];
        assert_eq!(short.discard_ratio, 3);
        assert_eq!(short.destinations[0].endpoints.len(), 2);

        let long = &bp.routes[2];
        assert_eq!(long.discard_ratio, 5);
        assert_eq!(long.destinations[0].name, "open_tsdb_legacy");
        assert_eq!(long.destinations[1].name, "open_tsdb_long_term");

        let dest = &long.destinations[1];
        assert_eq!(dest.headers, vec!["Content-Encoding: gzip".to_string()]);
        assert!(dest.accept_statuses.contains(204));
        assert!(dest.accept_statuses.contains(400));
    }

    #[test]
    fn test_unset_urls_omit_routes() {
        let bp = blueprint_from_lookup(lookup(&[(SHORT_TERM_URL, "short:4242")])).unwrap();
        assert_eq!(bp.routes.len(), 1);
        assert_eq!(bp.routes[0].name, "short_term");
        assert_eq!(bp.routes[0].discard_ratio, 0);
    }

    #[test]
    fn test_non_numeric_ratio_rejected() {
        let err = blueprint_from_lookup(lookup(&[
            (SHORT_TERM_URL, "short:4242"),
            (SHORT_TERM_DISCARD_RATIO, "ten"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains(SHORT_TERM_DISCARD_RATIO));
    }

    #[test]
    fn test_header_and_status_overrides() {
        let bp = blueprint_from_lookup(lookup(&[
            (BOSUN_URL, "bosun:8070"),
            (HTTP_HEADERS, "Content-Encoding: gzip; X-Relay: a"),
            (ACCEPT_STATUSES, "204"),
        ]))
        .unwrap();
        let dest = &bp.routes[0].destinations[0];
        assert_eq!(dest.headers.len(), 2);
        assert!(!dest.accept_statuses.contains(400));
    }

    #[test]
    fn test_comma_delimited_list() {
        assert_eq!(
            comma_delimited_list(" a, ,b ,"),
            vec!["a".to_string(), "b".to_string()]
        );
        assert!(comma_delimited_list("").is_empty());
    }
}
