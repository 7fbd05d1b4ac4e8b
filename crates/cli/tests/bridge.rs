use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use cli::app::{router, Bridge};
use cli::relay_client;
use listener::{sign, WebhookSecret};
use pretty_assertions::assert_eq;
use protocol::{
    CheckRun, CheckRunApi, CheckRunConclusion, CheckRunId, CheckRunStatus, CheckSuite,
    CheckSuiteNotifier, CommitSha, RelayError, RepoName, RepoOwner, TektonEvent,
};
use reqwest::StatusCode;

const SECRET: &str = "bridge-secret";

#[derive(Default)]
struct FakeGithub {
    created: Mutex<Vec<CheckRun>>,
    updated: Mutex<Vec<(CheckRunId, CheckRun)>>,
}

#[async_trait]
impl CheckRunApi for FakeGithub {
    async fn create_check_run(
        &self,
        _check_suite: &CheckSuite,
        check_run: &CheckRun,
    ) -> Result<CheckRunId, RelayError> {
        if check_run.name == "rejected" {
            return Err(RelayError::Rejected {
                operation: "create check run",
                status: 422,
                body: "Validation Failed".into(),
            });
        }
        self.created.lock().unwrap().push(check_run.clone());
        Ok(CheckRunId::new(1001).unwrap())
    }

    async fn update_check_run(
        &self,
        _check_suite: &CheckSuite,
        id: CheckRunId,
        check_run: &CheckRun,
    ) -> Result<(), RelayError> {
        self.updated.lock().unwrap().push((id, check_run.clone()));
        Ok(())
    }
}

#[derive(Default)]
struct FakeTekton {
    notified: Mutex<Vec<CheckSuite>>,
}

#[async_trait]
impl CheckSuiteNotifier for FakeTekton {
    async fn check_suite_created(&self, check_suite: &CheckSuite) -> Result<(), RelayError> {
        self.notified.lock().unwrap().push(check_suite.clone());
        Ok(())
    }
}

struct Harness {
    base: String,
    github: Arc<FakeGithub>,
    tekton: Arc<FakeTekton>,
}

async fn spawn_bridge(webhook_path: &str) -> Harness {
    let github = Arc::new(FakeGithub::default());
    let tekton = Arc::new(FakeTekton::default());
    let app = router(Bridge {
        checks: github.clone(),
        notifier: tekton.clone(),
        webhook_secret: WebhookSecret::new(SECRET).unwrap(),
        webhook_path: webhook_path.to_string(),
        timeout: Duration::from_secs(5),
    });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind to ephemeral port");
    let addr = listener.local_addr().expect("port");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("bridge server");
    });
    Harness {
        base: format!("http://{addr}"),
        github,
        tekton,
    }
}

fn suite() -> CheckSuite {
    CheckSuite::new(
        RepoOwner::new("origoss").unwrap(),
        RepoName::new("tekton-github-app").unwrap(),
        CommitSha::new("6dcb09b5b57875f334f61aebed695e2e4193db5e").unwrap(),
    )
}

#[tokio::test]
async fn health_probe_answers_ok() {
    let bridge = spawn_bridge("/").await;

    let response = reqwest::get(format!("{}/healthz", bridge.base)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn relay_client_drives_a_check_run_through_its_lifecycle() {
    let bridge = spawn_bridge("/").await;
    let url = format!("{}/tekton/", bridge.base);
    let http = reqwest::Client::new();
    let run = CheckRun::queued("unit-tests", "Unit tests", "Queued");

    let id = relay_client::send(&http, &url, &TektonEvent::create(suite(), run.clone()))
        .await
        .unwrap()
        .expect("create returns an id");
    assert_eq!(id, CheckRunId::new(1001).unwrap());

    let running = run.clone().with_status(CheckRunStatus::InProgress);
    let finished = run
        .with_status(CheckRunStatus::Completed)
        .with_conclusion(CheckRunConclusion::Success);
    for update in [running.clone(), finished.clone()] {
        let reply = relay_client::send(&http, &url, &TektonEvent::update(suite(), update, id))
            .await
            .unwrap();
        assert_eq!(reply, None);
    }

    assert_eq!(bridge.github.created.lock().unwrap().len(), 1);
    assert_eq!(
        *bridge.github.updated.lock().unwrap(),
        vec![(id, running.with_id(id)), (id, finished.with_id(id))]
    );
}

#[tokio::test]
async fn relay_client_fails_on_a_non_success_status() {
    let bridge = spawn_bridge("/").await;
    let url = format!("{}/tekton/", bridge.base);
    let event = TektonEvent::create(suite(), CheckRun::queued("rejected", "", ""));

    let err = relay_client::send(&reqwest::Client::new(), &url, &event)
        .await
        .unwrap_err();

    let message = format!("{err:#}");
    assert!(message.contains("502"), "{message}");
    assert!(message.contains("Validation Failed"), "{message}");
}

#[tokio::test]
async fn webhook_is_served_on_the_configured_path() {
    let bridge = spawn_bridge("/github/webhook").await;
    let body = include_str!("../../listener/tests/fixtures/check_suite_requested.json");
    let signature = sign(&WebhookSecret::new(SECRET).unwrap(), body.as_bytes());

    let deliver = |path: &'static str| {
        reqwest::Client::new()
            .post(format!("{}{path}", bridge.base))
            .header("x-github-event", "check_suite")
            .header("x-hub-signature-256", signature.clone())
            .body(body)
            .send()
    };

    assert_eq!(deliver("/").await.unwrap().status(), StatusCode::NOT_FOUND);
    assert_eq!(
        deliver("/github/webhook").await.unwrap().status(),
        StatusCode::OK
    );

    let notified = bridge.tekton.notified.lock().unwrap().clone();
    assert_eq!(notified.len(), 1);
    assert_eq!(notified[0].repo_owner.as_str(), "Codertocat");
}
