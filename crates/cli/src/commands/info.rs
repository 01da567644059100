//! `info` command implementation.

use anyhow::{Context, Result};
use contracts::RelayBlueprint;
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    source: SourceInfo,
    routes: Vec<RouteInfo>,
}

#[derive(Serialize)]
struct SourceInfo {
    kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    brokers: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    group: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    topics: Vec<String>,
    poll_timeout_ms: u64,
}

#[derive(Serialize)]
struct RouteInfo {
    name: String,
    discard_ratio: i64,
    destinations: Vec<DestinationInfo>,
}

#[derive(Serialize)]
struct DestinationInfo {
    name: String,
    method: String,
    path: String,
    endpoints: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    headers: Vec<String>,
    accept_statuses: Vec<u16>,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.source.describe(), "Loading configuration info");

    let blueprint = args
        .source
        .load()
        .with_context(|| format!("Failed to load config from {}", args.source.describe()))?;

    if args.json {
        let json = serde_json::to_string_pretty(&build_config_info(&blueprint))
            .context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint);
    }

    Ok(())
}

fn build_config_info(blueprint: &RelayBlueprint) -> ConfigInfo {
    let routes = blueprint
        .routes
        .iter()
        .map(|route| RouteInfo {
            name: route.name.clone(),
            discard_ratio: route.discard_ratio,
            destinations: route
                .destinations
                .iter()
                .map(|d| DestinationInfo {
                    name: d.name.clone(),
                    method: d.method.clone(),
                    path: d.path.clone(),
                    endpoints: d.endpoints.clone(),
                    headers: d.headers.clone(),
                    accept_statuses: d.accept_statuses.iter().collect(),
                })
                .collect(),
        })
        .collect();

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        source: SourceInfo {
            kind: format!("{:?}", blueprint.source.kind),
            brokers: blueprint.source.brokers.clone(),
            group: blueprint.source.group.clone(),
            topics: blueprint.source.topics.clone(),
            poll_timeout_ms: blueprint.source.poll_timeout_ms,
        },
        routes,
    }
}

fn print_config_info(blueprint: &RelayBlueprint) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  tsdb-relay Configuration                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let source = &blueprint.source;
    println!("📥 Source");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Kind: {:?}", source.kind);
    if !source.brokers.is_empty() {
        println!("   ├─ Brokers: {}", source.brokers);
        println!("   ├─ Group: {}", source.group);
        println!("   ├─ Topics: {}", source.topics.join(", "));
    }
    println!("   └─ Poll timeout: {} ms", source.poll_timeout_ms);

    println!("\n📤 Routes ({})", blueprint.routes.len());
    for (i, route) in blueprint.routes.iter().enumerate() {
        let is_last = i == blueprint.routes.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };
        let child_prefix = if is_last { "   " } else { "│  " };

        let ratio = match route.discard_ratio {
            0 | 1 => "every record".to_string(),
            n => format!("1 of every {n}"),
        };
        println!("   {} {} ({})", prefix, route.name, ratio);

        for (j, destination) in route.destinations.iter().enumerate() {
            let dest_is_last = j == route.destinations.len() - 1;
            let dest_prefix = if dest_is_last { "└─" } else { "├─" };
            println!(
                "   {}  {} {} {} {} -> [{}]",
                child_prefix,
                dest_prefix,
                destination.name,
                destination.method,
                destination.path,
                destination.endpoints.join(", ")
            );
        }
    }

    println!();
}
