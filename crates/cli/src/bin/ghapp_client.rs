//! `ghapp-client`: reports check-run progress from a Tekton step.
//!
//! Configured entirely from the environment. On a successful create the
//! assigned check-run id is the only thing written to stdout.

use clap::Parser;
use cli::config::RelayConfig;
use cli::{observability, relay_client};
use tracing::error;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = RelayConfig::parse();
    let telemetry = observability::init(&config.logging, "ghapp-client")?;

    let result = relay_client::run(&config).await;
    if let Err(err) = &result {
        error!(error = %format!("{err:#}"), "relay failed");
    }
    telemetry.shutdown();

    if let Some(id) = result? {
        println!("{id}");
    }
    Ok(())
}
