//! `tekton-github-app`: the GitHub ⇄ Tekton check-run bridge server.

use std::net::SocketAddr;

use anyhow::Context;
use clap::Parser;
use cli::app::{self, Bridge};
use cli::config::ServerConfig;
use cli::observability;
use tokio::net::TcpListener;
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::parse();
    let telemetry = observability::init(&config.logging, "tekton-github-app")?;

    let result = serve(config).await;
    if let Err(err) = &result {
        error!(error = %format!("{err:#}"), "tekton-github-app stopped");
    }
    telemetry.shutdown();
    result
}

async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    info!("starting tekton-github-app");
    config.validate().context("invalid configuration")?;
    debug!(?config, "configuration parsed");

    let app = app::router(Bridge::from_config(&config)?);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    info!(
        %addr,
        webhook_path = %config.webhook_path,
        tekton_url = %config.tekton_url,
        "listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving HTTP")?;
    info!("shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    info!("shutdown requested");
}
