//! Configuration validation
//!
//! Rules:
//! - at least one route; route and destination names unique and non-empty
//! - discard_ratio >= 0
//! - every route has destinations, every destination has endpoints
//! - path starts with '/', method is an HTTP token, header lines parse
//! - kafka source has brokers, group and topics
//! - poll and request timeouts > 0

use std::collections::HashSet;

use contracts::{parse_endpoint, ContractError, DestinationConfig, RelayBlueprint, SourceKind};

/// Validate a RelayBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    validate_source(blueprint)?;
    validate_http(blueprint)?;
    validate_routes(blueprint)?;
    validate_destinations(blueprint)?;
    Ok(())
}

fn validate_source(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    let source = &blueprint.source;

    if source.poll_timeout_ms == 0 {
        return Err(ContractError::config_validation(
            "source.poll_timeout_ms",
            "poll_timeout_ms must be > 0",
        ));
    }

    if source.kind == SourceKind::Kafka {
        if source.brokers.trim().is_empty() {
            return Err(ContractError::config_validation(
                "source.brokers",
                "kafka source requires brokers",
            ));
        }
        if source.group.trim().is_empty() {
            return Err(ContractError::config_validation(
                "source.group",
                "kafka source requires a consumer group",
            ));
        }
        if source.topics.iter().all(|t| t.trim().is_empty()) {
            return Err(ContractError::config_validation(
                "source.topics",
                "kafka source requires at least one topic",
            ));
        }
    }

    Ok(())
}

fn validate_http(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    if blueprint.http.timeout_secs == 0 {
        return Err(ContractError::config_validation(
            "http.timeout_secs",
            "timeout_secs must be > 0",
        ));
    }
    Ok(())
}

/// Route names unique, ratios non-negative, destinations present
fn validate_routes(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    if blueprint.routes.is_empty() {
        return Err(ContractError::config_validation(
            "routes",
            "at least one route must be configured",
        ));
    }

    let mut seen = HashSet::new();
    for (idx, route) in blueprint.routes.iter().enumerate() {
        if route.name.trim().is_empty() {
            return Err(ContractError::config_validation(
                format!("routes[{idx}].name"),
                "route name cannot be empty",
            ));
        }
        if !seen.insert(route.name.as_str()) {
            return Err(ContractError::config_validation(
                format!("routes[name={}]", route.name),
                "duplicate route name",
            ));
        }
        if route.discard_ratio < 0 {
            return Err(ContractError::config_validation(
                format!("routes[{}].discard_ratio", route.name),
                format!("discard_ratio must be >= 0, got {}", route.discard_ratio),
            ));
        }
        if route.destinations.is_empty() {
            return Err(ContractError::config_validation(
                format!("routes[{}].destinations", route.name),
                "route has no destinations",
            ));
        }
    }
    Ok(())
}

fn validate_destinations(blueprint: &RelayBlueprint) -> Result<(), ContractError> {
    let mut seen = HashSet::new();
    for route in &blueprint.routes {
        for dest in &route.destinations {
            let field = format!("routes[{}].destinations[{}]", route.name, dest.name);

            if dest.name.trim().is_empty() {
                return Err(ContractError::config_validation(
                    format!("routes[{}].destinations", route.name),
                    "destination name cannot be empty",
                ));
            }
            if !seen.insert(dest.name.as_str()) {
                return Err(ContractError::config_validation(
                    field,
                    "duplicate destination name",
                ));
            }
            validate_destination(&field, dest)?;
        }
    }
    Ok(())
}

fn validate_destination(field: &str, dest: &DestinationConfig) -> Result<(), ContractError> {
    if dest.endpoints.is_empty() {
        return Err(ContractError::config_validation(
            format!("{field}.endpoints"),
            "destination has no endpoints",
        ));
    }
    if dest.endpoints.iter().any(|e| e.trim().is_empty()) {
        return Err(ContractError::config_validation(
            format!("{field}.endpoints"),
            "endpoint cannot be empty",
        ));
    }
    for endpoint in &dest.endpoints {
        parse_endpoint(endpoint).map_err(|e| {
            ContractError::config_validation(format!("{field}.endpoints"), e.to_string())
        })?;
    }
    if !dest.path.starts_with('/') {
        return Err(ContractError::config_validation(
            format!("{field}.path"),
            format!("path must start with '/', got '{}'", dest.path),
        ));
    }
    if !is_http_token(&dest.method) {
        return Err(ContractError::config_validation(
            format!("{field}.method"),
            format!("invalid HTTP method '{}'", dest.method),
        ));
    }
    dest.header_set().map_err(|e| {
        ContractError::config_validation(format!("{field}.headers"), e.to_string())
    })?;
    Ok(())
}

/// RFC 9110 token characters
fn is_http_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
        })
}
