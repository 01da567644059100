//! `validate` command implementation.

use anyhow::{Context, Result};
use contracts::{RelayBlueprint, SourceKind};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    source_kind: String,
    route_count: usize,
    destination_count: usize,
    endpoint_count: usize,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.source.describe(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_source = args.source.describe();

    match args.source.load() {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            let endpoint_count = blueprint
                .routes
                .iter()
                .flat_map(|r| &r.destinations)
                .map(|d| d.endpoints.len())
                .sum();

            ValidationResult {
                valid: true,
                config_source,
                error: None,
                warnings: (!warnings.is_empty()).then_some(warnings),
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    source_kind: format!("{:?}", blueprint.source.kind),
                    route_count: blueprint.routes.len(),
                    destination_count: blueprint.destination_count(),
                    endpoint_count,
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_source,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &RelayBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    if blueprint.source.kind == SourceKind::Stdin {
        warnings.push("Source is stdin - records are read line by line".to_string());
    }

    for route in &blueprint.routes {
        for destination in &route.destinations {
            if destination.endpoints.len() == 1 {
                warnings.push(format!(
                    "Destination '{}' in route '{}' has a single endpoint - no failover",
                    destination.name, route.name
                ));
            }
        }
    }

    if !blueprint.http.verify_tls {
        warnings.push("TLS certificate verification is disabled".to_string());
    }

    warnings
}

fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_source);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Source: {}", summary.source_kind);
            println!("  Routes: {}", summary.route_count);
            println!("  Destinations: {}", summary.destination_count);
            println!("  Endpoints: {}", summary.endpoint_count);
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_source);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
