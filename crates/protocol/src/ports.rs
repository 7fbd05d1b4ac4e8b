//! Port traits through which the two halves of the bridge reach each other.
//!
//! The webhook receiver needs something that can announce a new check suite
//! to CI ([`CheckSuiteNotifier`]); the Tekton endpoint needs something that
//! can create and update check runs on GitHub ([`CheckRunApi`]). The
//! composition root constructs one implementation of each and injects it
//! into the handler that needs it. Neither handler crate depends on the
//! other, and there is no process-wide registry.

use async_trait::async_trait;

use crate::{CheckRun, CheckRunId, CheckSuite, RelayError};

/// Creates and updates check runs on the source-control host.
///
/// Implementations are constructed once at startup and shared across all
/// concurrent requests, so they must be usable through `&self`.
#[async_trait]
pub trait CheckRunApi: Send + Sync {
    /// Creates `check_run` against the head commit of `check_suite`.
    ///
    /// `check_run.id` and `check_run.conclusion` are ignored. Returns the
    /// identifier assigned by the host.
    async fn create_check_run(
        &self,
        check_suite: &CheckSuite,
        check_run: &CheckRun,
    ) -> Result<CheckRunId, RelayError>;

    /// Overwrites the state of the existing check run `id` with `check_run`.
    ///
    /// `check_run.id` is ignored in favour of `id`.
    async fn update_check_run(
        &self,
        check_suite: &CheckSuite,
        id: CheckRunId,
        check_run: &CheckRun,
    ) -> Result<(), RelayError>;
}

/// Tells the CI system that a check suite was requested for a commit.
#[async_trait]
pub trait CheckSuiteNotifier: Send + Sync {
    /// Delivers a `check-suite-created` notification for `check_suite`.
    async fn check_suite_created(&self, check_suite: &CheckSuite) -> Result<(), RelayError>;
}
