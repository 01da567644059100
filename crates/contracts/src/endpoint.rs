//! Endpoint addresses
//!
//! An endpoint is `host:port` or a URL. Without a scheme it is read as
//! `http://`. Any base path is kept and the destination path is appended.

use url::Url;

use crate::ContractError;

/// Parse an endpoint into its base URL
///
/// # Errors
/// Returns `ConfigParse` when the endpoint is not a URL, uses a scheme other
/// than http/https, or has no host.
pub fn parse_endpoint(endpoint: &str) -> Result<Url, ContractError> {
    let raw = endpoint.trim();
    let base = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("http://{raw}")
    };

    // the url crate reads `http:///api` as host `api`
    let authority = base
        .split_once("://")
        .map_or("", |(_, rest)| rest)
        .split(['/', '?', '#'])
        .next()
        .unwrap_or_default();
    if authority.is_empty() {
        return Err(ContractError::config_parse(format!("endpoint '{endpoint}' has no host")));
    }

    let url = Url::parse(&base)
        .map_err(|e| ContractError::config_parse(format!("invalid endpoint '{endpoint}': {e}")))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ContractError::config_parse(format!(
            "endpoint '{endpoint}' must use http or https"
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ContractError::config_parse(format!("endpoint '{endpoint}' has no host")));
    }

    Ok(url)
}

/// Join an endpoint and a destination path into a request URL
pub fn endpoint_url(endpoint: &str, path: &str) -> Result<Url, ContractError> {
    let base = parse_endpoint(endpoint)?;
    let full = format!("{}{}", base.as_str().trim_end_matches('/'), path);
    Url::parse(&full)
        .map_err(|e| ContractError::config_parse(format!("invalid endpoint '{endpoint}': {e}")))
}
