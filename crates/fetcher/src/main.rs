use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use rover_manifest_core::{
    load_config, validate_config, write_aggregate, ManifestOrchestrator, DEMO_API_KEY,
};

/// Optional TOML file layered over the built-in defaults.
const CONFIG_ENV: &str = "MANIFEST_CONFIG";

// All fetches share one task; a single-threaded runtime is enough.
#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        error!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config_path = std::env::var(CONFIG_ENV).ok().map(PathBuf::from);
    if let Some(path) = &config_path {
        info!("Loading configuration from {:?}", path);
    }
    let config = load_config(config_path.as_deref()).context("Failed to load configuration")?;
    validate_config(&config).context("Configuration validation failed")?;

    if config.api.api_key == DEMO_API_KEY {
        info!("API_KEY not set, using the rate-limited {} credential", DEMO_API_KEY);
    }
    info!(
        rovers = ?config.rovers,
        max_attempts = config.retry.max_attempts,
        "Configuration loaded"
    );

    // Fetch
    let orchestrator = ManifestOrchestrator::from_config(&config);
    let report = orchestrator
        .run_with_session(&config.http, &config.rovers)
        .await
        .context("Failed to fetch manifests")?;

    info!(
        "Time taken to pull manifests: {:.2} seconds",
        report.elapsed.as_secs_f64()
    );

    // Persist
    write_aggregate(&config.output.path, &report.aggregate)
        .await
        .with_context(|| format!("Failed to save manifest data to {:?}", config.output.path))?;

    info!(
        "Saved {} manifest entries to {:?} ({} succeeded, {} failed)",
        report.aggregate.len(),
        config.output.path,
        report.aggregate.success_count(),
        report.aggregate.failure_count()
    );

    Ok(())
}
