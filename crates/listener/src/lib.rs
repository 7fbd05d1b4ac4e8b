//! GitHub webhook receiver.
//!
//! Receives webhook deliveries from the GitHub App, proves they came from
//! GitHub, and turns `check_suite` requests into `check-suite-created`
//! notifications through an injected [`protocol::CheckSuiteNotifier`].
//!
//! ## Request pipeline
//!
//! 1. **Authenticate.** `X-Hub-Signature-256` must be the HMAC-SHA256 of the
//!    raw body under the shared webhook secret. Anything else is answered
//!    with `400` before the body is looked at.
//! 2. **Classify.** `X-GitHub-Event` names the event kind. Only
//!    `check_suite` is acted on; every other kind is acknowledged with `200`.
//! 3. **Parse.** The `check_suite` payload is decoded into the repository
//!    owner, repository name and head SHA. Failure is a `400`.
//! 4. **Forward.** Every `check_suite` delivery is forwarded under the
//!    downstream deadline, whatever its action. Failure is a `503` so GitHub
//!    redelivers.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** GitHub's webhook envelope is parsed here and nowhere
//! else. The notifier is supplied by the composition root; this crate does
//! not know it talks to Tekton.

mod payload;
mod receiver;
mod signature;

pub use payload::{
    CheckSuiteAction, CheckSuitePayload, CheckSuiteWebhook, OwnerPayload, RepositoryPayload,
    WebhookEvent,
};
pub use receiver::{mount, WebhookError, WebhookReceiver};
pub use signature::{sign, verify, SignatureError, WebhookSecret};

/// Header carrying the event kind.
pub const EVENT_HEADER: &str = "x-github-event";
/// Header carrying the delivery GUID.
pub const DELIVERY_HEADER: &str = "x-github-delivery";
/// Header carrying the SHA-256 payload signature.
pub const SIGNATURE_HEADER: &str = "x-hub-signature-256";
