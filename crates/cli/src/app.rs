//! Composition root: builds the adapters once and mounts them on one router.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::routing::get;
use axum::Router;
use github::{AppCredentials, AppInstallationAuth, GithubClient};
use listener::{WebhookReceiver, WebhookSecret};
use protocol::{CheckRunApi, CheckSuiteNotifier};
use tekton::{BasicAuth, TektonEndpoint, TektonForwarder};
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;

/// Liveness probe route.
pub const HEALTH_PATH: &str = "/healthz";

/// The collaborators the bridge routes are wired to.
#[derive(Clone)]
pub struct Bridge {
    /// Applies `/tekton/` events to GitHub.
    pub checks: Arc<dyn CheckRunApi>,
    /// Receives check suites accepted by the webhook.
    pub notifier: Arc<dyn CheckSuiteNotifier>,
    /// Key that webhook signatures are checked against.
    pub webhook_secret: WebhookSecret,
    /// Route GitHub delivers webhooks to.
    pub webhook_path: String,
    /// Deadline on every outbound call made while serving a request.
    pub timeout: Duration,
}

impl Bridge {
    /// Builds the GitHub client and the Tekton forwarder from `config`.
    pub fn from_config(config: &ServerConfig) -> anyhow::Result<Self> {
        let credentials = AppCredentials::from_key_file(
            config.app_id,
            config.installation_id,
            &config.private_key_path,
        )
        .context("loading the GitHub App private key")?;
        let http = github::http_client().context("building the GitHub HTTP client")?;
        let tokens = AppInstallationAuth::new(credentials, http.clone(), &config.github_api_url);
        let checks = GithubClient::new(http, &config.github_api_url, Arc::new(tokens));

        let tekton_http = reqwest::Client::builder()
            .build()
            .context("building the Tekton HTTP client")?;
        let mut forwarder = TektonForwarder::new(tekton_http, &config.tekton_url);
        if let Some(username) = &config.tekton_username {
            forwarder = forwarder
                .with_basic_auth(BasicAuth::new(username, config.tekton_password.clone()));
        }

        let webhook_secret = WebhookSecret::new(&config.webhook_secret)
            .context("GH_APP_WEBHOOK_SECRET must not be empty")?;

        Ok(Self {
            checks: Arc::new(checks),
            notifier: Arc::new(forwarder),
            webhook_secret,
            webhook_path: config.webhook_path.clone(),
            timeout: config.downstream_timeout(),
        })
    }
}

/// Mounts the health probe, the GitHub webhook and the Tekton endpoint.
pub fn router(bridge: Bridge) -> Router {
    let receiver = WebhookReceiver::new(bridge.webhook_secret, bridge.notifier)
        .with_timeout(bridge.timeout);
    let endpoint = TektonEndpoint::new(bridge.checks).with_timeout(bridge.timeout);

    let router = Router::new().route(HEALTH_PATH, get(healthz));
    let router = listener::mount(router, &bridge.webhook_path, receiver);
    tekton::mount(router, endpoint).layer(TraceLayer::new_for_http())
}

async fn healthz() -> &'static str {
    "ok"
}
