//! The slice of GitHub's webhook envelope the bridge reads.
//!
//! Only the fields needed to build a [`CheckSuite`] are modelled; GitHub's
//! payloads carry far more and unknown fields are ignored. Identifiers decode
//! straight into the protocol newtypes, so an empty owner, repository or SHA
//! is a parse error rather than a notification Tekton cannot use.

use protocol::{CheckSuite, CommitSha, RepoName, RepoOwner};
use serde::Deserialize;

/// A parsed delivery, keyed on the `X-GitHub-Event` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    /// `check_suite`: the only kind the bridge acts on.
    CheckSuite(CheckSuiteWebhook),
    /// `ping`: sent when the webhook is configured.
    Ping,
    /// Anything else, acknowledged and ignored.
    Other(String),
}

impl WebhookEvent {
    /// Parses `body` according to the event `kind`.
    ///
    /// Bodies of kinds other than `check_suite` are not decoded at all.
    pub fn parse(kind: &str, body: &[u8]) -> Result<Self, serde_json::Error> {
        match kind {
            "check_suite" => serde_json::from_slice(body).map(Self::CheckSuite),
            "ping" => Ok(Self::Ping),
            other => Ok(Self::Other(other.to_string())),
        }
    }
}

/// `check_suite` webhook payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckSuiteWebhook {
    /// What happened to the check suite.
    pub action: CheckSuiteAction,
    /// The check suite itself.
    pub check_suite: CheckSuitePayload,
    /// The repository it belongs to.
    pub repository: RepositoryPayload,
}

impl CheckSuiteWebhook {
    /// The protocol-level key of this check suite.
    pub fn to_check_suite(&self) -> CheckSuite {
        CheckSuite::new(
            self.repository.owner.login.clone(),
            self.repository.name.clone(),
            self.check_suite.head_sha.clone(),
        )
    }
}

/// `check_suite.action` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckSuiteAction {
    /// A push created a new check suite.
    Requested,
    /// Someone asked GitHub to re-run the check suite.
    Rerequested,
    /// All check runs in the suite finished.
    Completed,
    /// An action this version does not know about.
    #[serde(other)]
    Unknown,
}

/// `check_suite` object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CheckSuitePayload {
    /// Commit the check suite was created for.
    pub head_sha: CommitSha,
}

/// `repository` object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepositoryPayload {
    /// Repository name.
    pub name: RepoName,
    /// Owning user or organisation.
    pub owner: OwnerPayload,
}

/// `repository.owner` object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OwnerPayload {
    /// Owner login.
    pub login: RepoOwner,
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    const REQUESTED: &[u8] = include_bytes!("../tests/fixtures/check_suite_requested.json");

    #[test]
    fn parses_a_real_check_suite_delivery() {
        let WebhookEvent::CheckSuite(event) = WebhookEvent::parse("check_suite", REQUESTED).unwrap()
        else {
            panic!("expected a check_suite event");
        };
        assert_eq!(event.action, CheckSuiteAction::Requested);
        assert_eq!(
            event.to_check_suite(),
            CheckSuite::new(
                RepoOwner::new("Codertocat").unwrap(),
                RepoName::new("Hello-World").unwrap(),
                CommitSha::new("ec26c3e57ca3a959ca5aad62de7213c562f8c821").unwrap(),
            )
        );
    }

    #[test]
    fn unknown_actions_still_parse() {
        let body = br#"{"action":"archived","check_suite":{"head_sha":"abc"},
            "repository":{"name":"r","owner":{"login":"o"}}}"#;
        let WebhookEvent::CheckSuite(event) = WebhookEvent::parse("check_suite", body).unwrap()
        else {
            panic!("expected a check_suite event");
        };
        assert_eq!(event.action, CheckSuiteAction::Unknown);
    }

    #[test]
    fn empty_head_sha_is_a_parse_error() {
        let body = br#"{"action":"requested","check_suite":{"head_sha":""},
            "repository":{"name":"r","owner":{"login":"o"}}}"#;
        assert!(WebhookEvent::parse("check_suite", body).is_err());
    }

    #[test]
    fn other_kinds_are_not_decoded() {
        assert_eq!(WebhookEvent::parse("ping", b"not json").unwrap(), WebhookEvent::Ping);
        assert_eq!(
            WebhookEvent::parse("push", b"not json").unwrap(),
            WebhookEvent::Other("push".into())
        );
    }
}
