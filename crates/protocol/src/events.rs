//! Messages exchanged across the bridge.
//!
//! [`TektonEvent`] travels from the relay client to the Tekton-facing
//! endpoint; [`CheckRunCreatedResponseBody`] is that endpoint's reply to a
//! create; [`CheckSuiteCreatedBody`] travels from the bridge to Tekton's
//! EventListener. All are plain values exchanged by copy.

use serde::{Deserialize, Serialize};

use crate::identifiers::unassigned_as_none;
use crate::{
    CheckRunConclusion, CheckRunId, CheckRunStatus, CommitSha, NotificationEvent, RepoName,
    RepoOwner, TektonEventType,
};

// ---------------------------------------------------------------------------
// Check suites and check runs
// ---------------------------------------------------------------------------

/// One check-suite instance: the repository and the commit it is attached to.
///
/// A key, not an entity; it has no lifecycle of its own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CheckSuite {
    /// Owner login (`origoss` in `origoss/tekton-github-app`).
    pub repo_owner: RepoOwner,
    /// Repository name (`tekton-github-app`).
    pub repo_name: RepoName,
    /// SHA of the commit the check suite belongs to.
    pub head_sha: CommitSha,
}

impl CheckSuite {
    /// Creates a [`CheckSuite`].
    pub fn new(repo_owner: RepoOwner, repo_name: RepoName, head_sha: CommitSha) -> Self {
        Self {
            repo_owner,
            repo_name,
            head_sha,
        }
    }
}

/// One named CI status entry shown against a commit.
///
/// `conclusion` is omitted from the wire when absent, never sent as `null`.
/// `id` is `None` until GitHub assigns one; a `0` on input is read as `None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRun {
    /// Display name in the GitHub checks UI.
    pub name: String,
    /// Title of the check run's output block.
    pub title: String,
    /// Markdown summary of the check run's output block.
    pub summary: String,
    /// Terminal outcome; meaningful only once `status` is `completed`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<CheckRunConclusion>,
    /// Lifecycle position.
    pub status: CheckRunStatus,
    /// GitHub-assigned identifier.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "unassigned_as_none"
    )]
    pub id: Option<CheckRunId>,
}

impl CheckRun {
    /// Creates an unassigned check run in the `queued` state.
    pub fn queued(
        name: impl Into<String>,
        title: impl Into<String>,
        summary: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            summary: summary.into(),
            conclusion: None,
            status: CheckRunStatus::Queued,
            id: None,
        }
    }

    /// Returns a copy with `status` replaced.
    #[must_use]
    pub fn with_status(mut self, status: CheckRunStatus) -> Self {
        self.status = status;
        self
    }

    /// Returns a copy with `conclusion` set.
    #[must_use]
    pub fn with_conclusion(mut self, conclusion: CheckRunConclusion) -> Self {
        self.conclusion = Some(conclusion);
        self
    }

    /// Returns a copy addressed to the check run `id`.
    #[must_use]
    pub fn with_id(mut self, id: CheckRunId) -> Self {
        self.id = Some(id);
        self
    }

    /// Returns `true` when a conclusion is present on a non-terminal status.
    ///
    /// The decoder accepts this shape; GitHub decides whether it is legal.
    pub fn has_premature_conclusion(&self) -> bool {
        self.conclusion.is_some() && !self.status.is_terminal()
    }
}

// ---------------------------------------------------------------------------
// Relay client → bridge
// ---------------------------------------------------------------------------

/// Request body of the Tekton-facing endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TektonEvent {
    /// Which operation to perform.
    #[serde(rename = "type")]
    pub event_type: TektonEventType,
    /// Commit the check run belongs to.
    #[serde(rename = "check-suite")]
    pub check_suite: CheckSuite,
    /// Check run to create, or the new state of an existing one.
    #[serde(rename = "check-run")]
    pub check_run: CheckRun,
}

impl TektonEvent {
    /// A `create-checkrun` event. Any id on `check_run` is dropped.
    pub fn create(check_suite: CheckSuite, mut check_run: CheckRun) -> Self {
        check_run.id = None;
        Self {
            event_type: TektonEventType::CreateCheckRun,
            check_suite,
            check_run,
        }
    }

    /// An `update-checkrun` event addressed to `id`.
    pub fn update(check_suite: CheckSuite, check_run: CheckRun, id: CheckRunId) -> Self {
        Self {
            event_type: TektonEventType::UpdateCheckRun,
            check_suite,
            check_run: check_run.with_id(id),
        }
    }
}

/// Reply to a successful `create-checkrun` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckRunCreatedResponseBody {
    /// Identifier GitHub assigned to the new check run.
    pub id: CheckRunId,
}

// ---------------------------------------------------------------------------
// Bridge → Tekton
// ---------------------------------------------------------------------------

/// Notification POSTed to Tekton when GitHub requests a check suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckSuiteCreatedBody {
    /// Always [`NotificationEvent::CheckSuiteCreated`].
    pub event: NotificationEvent,
    /// The check suite that was requested.
    #[serde(rename = "check-suite")]
    pub check_suite: CheckSuite,
}

impl CheckSuiteCreatedBody {
    /// Wraps `check_suite` in a `check-suite-created` notification.
    pub fn new(check_suite: CheckSuite) -> Self {
        Self {
            event: NotificationEvent::CheckSuiteCreated,
            check_suite,
        }
    }
}
