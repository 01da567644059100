//! `run` command implementation.

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_relay(args: &RunArgs) -> Result<()> {
    let mut blueprint = args
        .source
        .load()
        .with_context(|| format!("Failed to load config from {}", args.source.describe()))?;

    if let Some(poll_timeout_ms) = args.poll_timeout_ms {
        info!(poll_timeout_ms, "Overriding poll timeout from CLI");
        blueprint.source.poll_timeout_ms = poll_timeout_ms;
    }

    info!(
        source = ?blueprint.source.kind,
        routes = blueprint.routes.len(),
        destinations = blueprint.destination_count(),
        "Configuration loaded"
    );

    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let pipeline = Pipeline::new(PipelineConfig {
        blueprint,
        max_records: (args.max_records > 0).then_some(args.max_records),
        metrics_port: (args.metrics_port > 0).then_some(args.metrics_port),
    });

    info!("Starting relay...");
    let stats = pipeline.run().await.context("Relay execution failed")?;

    info!(
        records = stats.summary.records,
        reason = ?stats.summary.stop_reason,
        duration_secs = stats.duration.as_secs_f64(),
        rate = format!("{:.2}", stats.records_per_second()),
        "Relay finished"
    );
    stats.print_summary();

    Ok(())
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::RelayBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Source: {:?}", blueprint.source.kind);
    if !blueprint.source.topics.is_empty() {
        println!(
            "  {} / {} / {}",
            blueprint.source.brokers,
            blueprint.source.group,
            blueprint.source.topics.join(",")
        );
    }

    println!("\nRoutes ({}):", blueprint.routes.len());
    for route in &blueprint.routes {
        println!("  - {} (discard ratio {})", route.name, route.discard_ratio);
        for destination in &route.destinations {
            println!(
                "      {} {} {} -> {}",
                destination.name,
                destination.method,
                destination.path,
                destination.endpoints.join(", ")
            );
        }
    }

    println!();
}
