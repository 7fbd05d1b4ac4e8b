//! Check-run relay protocol shared by both sides of the bridge.
//!
//! This crate holds every type that crosses the HTTP boundary between the
//! GitHub-facing and Tekton-facing services, plus the port traits through
//! which the composition root cross-wires them. Adapter crates implement the
//! traits; they never add wire types of their own.
//!
//! ## Architectural Layer
//!
//! **Domain model + port definitions.** This crate has no I/O dependencies.
//! It defines *what* is exchanged; adapter crates define *how* it travels.
//!
//! ## Module Layout
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`identifiers`] | Newtype identifiers (`RepoOwner`, `CommitSha`, `CheckRunId`, ...) |
//! | [`types`] | Wire enumerations (`CheckRunStatus`, `CheckRunConclusion`, `TektonEventType`) and `Timestamp` |
//! | [`events`] | Message records (`CheckSuite`, `CheckRun`, `TektonEvent`, response bodies) |
//! | [`errors`] | Codec and relay error types |
//! | [`ports`] | `CheckRunApi` and `CheckSuiteNotifier` traits |
//!
//! ## Check-run lifecycle
//!
//! `absent → queued → in_progress → completed{conclusion}`. Creation is the
//! only way out of `absent`; every later transition is an update addressed by
//! the [`CheckRunId`] GitHub assigned at creation. Transition legality is left
//! to GitHub.

use std::time::Duration;

pub mod errors;
pub mod events;
pub mod identifiers;
pub mod ports;
pub mod types;

// Re-export everything at the crate root for ergonomic usage by downstream crates.
pub use errors::{IdentifierError, ParseEnumError, RelayError};
pub use events::{
    CheckRun, CheckRunCreatedResponseBody, CheckSuite, CheckSuiteCreatedBody, TektonEvent,
};
pub use identifiers::{CheckRunId, CommitSha, RepoName, RepoOwner};
pub use ports::{CheckRunApi, CheckSuiteNotifier};
pub use types::{CheckRunConclusion, CheckRunStatus, NotificationEvent, TektonEventType, Timestamp};

/// Upper bound on every outbound call made while serving an inbound request.
pub const DOWNSTREAM_TIMEOUT: Duration = Duration::from_secs(20);
