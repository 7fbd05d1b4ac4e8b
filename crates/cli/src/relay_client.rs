//! Sends one check-run event from a Tekton step to the bridge.

use anyhow::{bail, Context};
use protocol::{CheckRunCreatedResponseBody, CheckRunId, TektonEvent, TektonEventType};
use tracing::{debug, info, instrument};

use crate::config::RelayConfig;

/// POSTs `event` to the bridge at `url`.
///
/// Returns the id GitHub assigned when `event` is a create.
#[instrument(skip_all, fields(url = %url, event_type = %event.event_type))]
pub async fn send(
    http: &reqwest::Client,
    url: &str,
    event: &TektonEvent,
) -> anyhow::Result<Option<CheckRunId>> {
    debug!("sending event to the bridge");
    let response = http
        .post(url)
        .json(event)
        .send()
        .await
        .with_context(|| format!("sending the event to {url}"))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        bail!("bridge answered {status}: {body}");
    }

    match event.event_type {
        TektonEventType::CreateCheckRun => {
            let created: CheckRunCreatedResponseBody = response
                .json()
                .await
                .context("decoding the create response")?;
            info!(check_run_id = %created.id, "check run created");
            Ok(Some(created.id))
        }
        TektonEventType::UpdateCheckRun => {
            info!("check run updated");
            Ok(None)
        }
    }
}

/// Builds the event described by `config` and sends it.
pub async fn run(config: &RelayConfig) -> anyhow::Result<Option<CheckRunId>> {
    let event = config.event().context("invalid configuration")?;
    let http = reqwest::Client::builder()
        .build()
        .context("building the HTTP client")?;
    send(&http, &config.ghapp_url, &event).await
}
