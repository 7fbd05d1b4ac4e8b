//! `POST /tekton/`: check-run progress reported by pipeline steps.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use protocol::{
    CheckRunApi, CheckRunCreatedResponseBody, RelayError, TektonEvent, TektonEventType,
    DOWNSTREAM_TIMEOUT,
};
use thiserror::Error;
use tracing::{error, info, instrument, warn};

/// Route the endpoint is mounted at.
pub const TEKTON_PATH: &str = "/tekton/";

/// Handler state for [`TEKTON_PATH`].
#[derive(Clone)]
pub struct TektonEndpoint {
    checks: Arc<dyn CheckRunApi>,
    timeout: Duration,
}

impl TektonEndpoint {
    /// Creates an endpoint that applies events through `checks`.
    pub fn new(checks: Arc<dyn CheckRunApi>) -> Self {
        Self {
            checks,
            timeout: DOWNSTREAM_TIMEOUT,
        }
    }

    /// Overrides the deadline on the outbound check-run call.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl std::future::Future<Output = Result<T, RelayError>>,
    ) -> Result<T, RelayError> {
        tokio::time::timeout(self.timeout, call)
            .await
            .map_err(|_| RelayError::Timeout {
                operation,
                after: self.timeout,
            })?
    }
}

/// Mounts the endpoint at [`TEKTON_PATH`] on `router`.
pub fn mount<S>(router: Router<S>, endpoint: TektonEndpoint) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route(TEKTON_PATH, post(handle).with_state(endpoint))
}

/// Why an event was not applied.
#[derive(Debug, Error)]
pub enum EndpointError {
    /// The body is not a valid `TektonEvent`. `400`.
    #[error("cannot decode tekton event: {0}")]
    Decode(#[from] serde_json::Error),

    /// An update arrived without the id GitHub assigned. `400`.
    #[error("update-checkrun requires a check-run id")]
    MissingId,

    /// GitHub failed, rejected the call, or did not answer in time. `502`.
    #[error(transparent)]
    Downstream(#[from] RelayError),
}

impl EndpointError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Decode(_) | Self::MissingId => StatusCode::BAD_REQUEST,
            Self::Downstream(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

impl IntoResponse for EndpointError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "check run not applied");
        } else {
            warn!(error = %self, "tekton event rejected");
        }
        (status, self.to_string()).into_response()
    }
}

#[instrument(skip_all, fields(event_type = tracing::field::Empty))]
async fn handle(
    State(endpoint): State<TektonEndpoint>,
    body: Bytes,
) -> Result<Response, EndpointError> {
    let event: TektonEvent = serde_json::from_slice(&body)?;
    tracing::Span::current().record("event_type", event.event_type.as_str());

    if event.check_run.has_premature_conclusion() {
        warn!(
            status = %event.check_run.status,
            "conclusion sent on a check run that is not completed"
        );
    }

    match event.event_type {
        TektonEventType::CreateCheckRun => {
            let id = endpoint
                .bounded(
                    "create check run",
                    endpoint
                        .checks
                        .create_check_run(&event.check_suite, &event.check_run),
                )
                .await?;
            info!(check_run_id = %id, "check run created for tekton");
            Ok((
                StatusCode::CREATED,
                Json(CheckRunCreatedResponseBody { id }),
            )
                .into_response())
        }
        TektonEventType::UpdateCheckRun => {
            let id = event.check_run.id.ok_or(EndpointError::MissingId)?;
            endpoint
                .bounded(
                    "update check run",
                    endpoint
                        .checks
                        .update_check_run(&event.check_suite, id, &event.check_run),
                )
                .await?;
            info!(check_run_id = %id, "check run updated for tekton");
            Ok(StatusCode::OK.into_response())
        }
    }
}
