//! Tekton-side adapter.
//!
//! Two halves, one per direction of the bridge:
//!
//! - [`TektonForwarder`] implements [`protocol::CheckSuiteNotifier`] by
//!   POSTing a `check-suite-created` notification to the Tekton
//!   EventListener.
//! - [`TektonEndpoint`] serves `POST /tekton/`, where pipeline steps report
//!   check-run progress. Each event becomes exactly one call on an injected
//!   [`protocol::CheckRunApi`].
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate knows the Tekton EventListener's HTTP
//! contract and nothing about GitHub. The check-run API behind the endpoint
//! is supplied by the composition root.

mod endpoint;
mod forwarder;

pub use endpoint::{mount, EndpointError, TektonEndpoint, TEKTON_PATH};
pub use forwarder::{BasicAuth, TektonForwarder};
