//! Check-run calls against the GitHub REST API.

use std::sync::Arc;

use async_trait::async_trait;
use protocol::{
    CheckRun, CheckRunApi, CheckRunConclusion, CheckRunId, CheckRunStatus, CheckSuite,
    RelayError, Timestamp,
};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::{GithubError, TokenSource};

/// Public GitHub REST endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("tekton-github-app/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "2022-11-28";

/// Builds the `reqwest` client used for every GitHub call, with the headers
/// GitHub requires preset.
pub fn http_client() -> Result<reqwest::Client, GithubError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
    headers.insert(
        HeaderName::from_static("x-github-api-version"),
        HeaderValue::from_static(API_VERSION),
    );
    Ok(reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .build()?)
}

pub(crate) fn api_url(base: &str, path: &str) -> String {
    format!("{base}/{path}")
}

/// Passes 2xx responses through and turns everything else into
/// [`GithubError::Api`], preferring GitHub's `message` field.
pub(crate) async fn check_status(
    response: reqwest::Response,
) -> Result<reqwest::Response, GithubError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ApiErrorBody>(&body)
        .map(|err| err.message)
        .unwrap_or(body);
    Err(GithubError::Api {
        status: status.as_u16(),
        message,
    })
}

#[derive(Deserialize)]
struct ApiErrorBody {
    message: String,
}

// ---------------------------------------------------------------------------
// Request / response bodies
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct CheckRunOutput<'a> {
    title: &'a str,
    summary: &'a str,
}

impl<'a> CheckRunOutput<'a> {
    fn of(run: &'a CheckRun) -> Self {
        Self {
            title: &run.title,
            summary: &run.summary,
        }
    }
}

#[derive(Serialize)]
struct CreateCheckRunRequest<'a> {
    name: &'a str,
    head_sha: &'a str,
    status: CheckRunStatus,
    started_at: Timestamp,
    output: CheckRunOutput<'a>,
}

#[derive(Serialize)]
struct UpdateCheckRunRequest<'a> {
    name: &'a str,
    status: CheckRunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    conclusion: Option<CheckRunConclusion>,
    output: CheckRunOutput<'a>,
}

#[derive(Deserialize)]
struct CheckRunResponse {
    id: u64,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Authenticated client for the GitHub check-run endpoints.
#[derive(Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    api_base: String,
    tokens: Arc<dyn TokenSource>,
}

impl GithubClient {
    /// Creates a client for the API at `api_base` (e.g. [`DEFAULT_API_URL`]).
    pub fn new(http: reqwest::Client, api_base: &str, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            tokens,
        }
    }

    fn check_runs_url(&self, suite: &CheckSuite) -> String {
        api_url(
            &self.api_base,
            &format!("repos/{}/{}/check-runs", suite.repo_owner, suite.repo_name),
        )
    }

    async fn send_create(
        &self,
        suite: &CheckSuite,
        run: &CheckRun,
    ) -> Result<CheckRunId, GithubError> {
        let body = CreateCheckRunRequest {
            name: &run.name,
            head_sha: suite.head_sha.as_str(),
            status: run.status,
            started_at: Timestamp::now(),
            output: CheckRunOutput::of(run),
        };
        let token = self.tokens.token().await?;
        let response = self
            .http
            .post(self.check_runs_url(suite))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        let created: CheckRunResponse = check_status(response).await?.json().await?;
        CheckRunId::new(created.id).map_err(|err| GithubError::InvalidResponse(err.to_string()))
    }

    async fn send_update(
        &self,
        suite: &CheckSuite,
        id: CheckRunId,
        run: &CheckRun,
    ) -> Result<(), GithubError> {
        let body = UpdateCheckRunRequest {
            name: &run.name,
            status: run.status,
            conclusion: run.conclusion,
            output: CheckRunOutput::of(run),
        };
        let token = self.tokens.token().await?;
        let url = format!("{}/{id}", self.check_runs_url(suite));
        let response = self
            .http
            .patch(url)
            .bearer_auth(token)
            .json(&body)
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

impl std::fmt::Debug for GithubClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GithubClient")
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CheckRunApi for GithubClient {
    #[instrument(skip_all, fields(
        owner = %check_suite.repo_owner,
        repo = %check_suite.repo_name,
        head_sha = %check_suite.head_sha,
        name = %check_run.name,
        status = %check_run.status,
    ))]
    async fn create_check_run(
        &self,
        check_suite: &CheckSuite,
        check_run: &CheckRun,
    ) -> Result<CheckRunId, RelayError> {
        if check_run.conclusion.is_some() {
            debug!("conclusion is not sent on create");
        }
        let id = self
            .send_create(check_suite, check_run)
            .await
            .map_err(|err| err.into_relay("create check run"))?;
        info!(check_run_id = %id, "check run created");
        Ok(id)
    }

    #[instrument(skip_all, fields(
        owner = %check_suite.repo_owner,
        repo = %check_suite.repo_name,
        check_run_id = %id,
        status = %check_run.status,
        conclusion = check_run.conclusion.map(CheckRunConclusion::as_str),
    ))]
    async fn update_check_run(
        &self,
        check_suite: &CheckSuite,
        id: CheckRunId,
        check_run: &CheckRun,
    ) -> Result<(), RelayError> {
        self.send_update(check_suite, id, check_run)
            .await
            .map_err(|err| err.into_relay("update check run"))?;
        info!("check run updated");
        Ok(())
    }
}
