//! Outbound `check-suite-created` notifications.

use async_trait::async_trait;
use protocol::{CheckSuite, CheckSuiteCreatedBody, CheckSuiteNotifier, RelayError};
use tracing::{info, instrument};

const OPERATION: &str = "forward check suite";

/// HTTP basic credentials for the EventListener ingress.
#[derive(Clone)]
pub struct BasicAuth {
    username: String,
    password: Option<String>,
}

impl BasicAuth {
    /// Credentials for `username`, with an optional password.
    pub fn new(username: impl Into<String>, password: Option<String>) -> Self {
        Self {
            username: username.into(),
            password,
        }
    }
}

impl std::fmt::Debug for BasicAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicAuth")
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| ".."))
            .finish()
    }
}

/// Notifies a Tekton EventListener that GitHub requested a check suite.
#[derive(Debug, Clone)]
pub struct TektonForwarder {
    http: reqwest::Client,
    url: String,
    auth: Option<BasicAuth>,
}

impl TektonForwarder {
    /// Creates a forwarder posting to the EventListener at `url`.
    pub fn new(http: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            http,
            url: url.into(),
            auth: None,
        }
    }

    /// Attaches basic auth to every notification.
    #[must_use]
    pub fn with_basic_auth(mut self, auth: BasicAuth) -> Self {
        self.auth = Some(auth);
        self
    }
}

#[async_trait]
impl CheckSuiteNotifier for TektonForwarder {
    #[instrument(skip_all, fields(
        owner = %check_suite.repo_owner,
        repo = %check_suite.repo_name,
        head_sha = %check_suite.head_sha,
    ))]
    async fn check_suite_created(&self, check_suite: &CheckSuite) -> Result<(), RelayError> {
        let mut request = self
            .http
            .post(&self.url)
            .json(&CheckSuiteCreatedBody::new(check_suite.clone()));
        if let Some(auth) = &self.auth {
            request = request.basic_auth(&auth.username, auth.password.as_deref());
        }

        let response = request
            .send()
            .await
            .map_err(|err| RelayError::downstream(OPERATION, err))?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RelayError::Rejected {
                operation: OPERATION,
                status: status.as_u16(),
                body,
            });
        }

        info!(status = status.as_u16(), "tekton accepted check suite");
        Ok(())
    }
}
