//! The axum route GitHub delivers webhooks to.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::Router;
use protocol::{CheckSuiteNotifier, RelayError, DOWNSTREAM_TIMEOUT};
use thiserror::Error;
use tracing::{debug, error, field, info, instrument, warn, Span};

use crate::{
    verify, SignatureError, WebhookEvent, WebhookSecret, DELIVERY_HEADER, EVENT_HEADER,
    SIGNATURE_HEADER,
};

const FORWARD_OPERATION: &str = "forward check suite";

/// Handler state for the webhook route.
#[derive(Clone)]
pub struct WebhookReceiver {
    secret: WebhookSecret,
    notifier: Arc<dyn CheckSuiteNotifier>,
    timeout: Duration,
}

impl WebhookReceiver {
    /// Creates a receiver that forwards check suites to `notifier`.
    pub fn new(secret: WebhookSecret, notifier: Arc<dyn CheckSuiteNotifier>) -> Self {
        Self {
            secret,
            notifier,
            timeout: DOWNSTREAM_TIMEOUT,
        }
    }

    /// Overrides the forwarding deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Mounts the webhook route at `path` on `router`.
pub fn mount<S>(router: Router<S>, path: &str, receiver: WebhookReceiver) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route(path, post(receive).with_state(receiver))
}

/// Per-delivery failures, each mapped to the status GitHub sees.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// The delivery is not authenticated. `400`.
    #[error("invalid webhook signature: {0}")]
    Signature(#[from] SignatureError),

    /// No `X-GitHub-Event` header. `400`.
    #[error("missing X-GitHub-Event header")]
    MissingEventKind,

    /// The payload does not decode. `400`.
    #[error("cannot parse {kind} payload: {source}")]
    Payload {
        /// Event kind from the header.
        kind: String,
        /// Decode error.
        #[source]
        source: serde_json::Error,
    },

    /// The notifier failed or timed out. `503`, so GitHub redelivers.
    #[error(transparent)]
    Forward(#[from] RelayError),
}

impl WebhookError {
    fn status(&self) -> StatusCode {
        match self {
            Self::Signature(_) | Self::MissingEventKind | Self::Payload { .. } => {
                StatusCode::BAD_REQUEST
            }
            Self::Forward(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "check suite not forwarded");
        } else {
            warn!(error = %self, "webhook delivery rejected");
        }
        (status, self.to_string()).into_response()
    }
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

#[instrument(skip_all, fields(delivery = field::Empty, event = field::Empty))]
async fn receive(
    State(receiver): State<WebhookReceiver>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, WebhookError> {
    let span = Span::current();
    if let Some(delivery) = header(&headers, DELIVERY_HEADER) {
        span.record("delivery", delivery);
    }

    verify(&receiver.secret, header(&headers, SIGNATURE_HEADER), &body)?;

    let kind = header(&headers, EVENT_HEADER).ok_or(WebhookError::MissingEventKind)?;
    span.record("event", kind);

    let event = WebhookEvent::parse(kind, &body).map_err(|source| WebhookError::Payload {
        kind: kind.to_string(),
        source,
    })?;

    let check_suite_event = match event {
        WebhookEvent::CheckSuite(event) => event,
        WebhookEvent::Ping => {
            info!("webhook ping received");
            return Ok(StatusCode::OK);
        }
        WebhookEvent::Other(kind) => {
            debug!(kind = %kind, "ignoring webhook event");
            return Ok(StatusCode::OK);
        }
    };

    let check_suite = check_suite_event.to_check_suite();
    info!(
        action = ?check_suite_event.action,
        owner = %check_suite.repo_owner,
        repo = %check_suite.repo_name,
        head_sha = %check_suite.head_sha,
        "forwarding check suite"
    );
    tokio::time::timeout(
        receiver.timeout,
        receiver.notifier.check_suite_created(&check_suite),
    )
    .await
    .map_err(|_| RelayError::Timeout {
        operation: FORWARD_OPERATION,
        after: receiver.timeout,
    })??;

    Ok(StatusCode::OK)
}
