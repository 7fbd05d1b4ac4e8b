//! Command-line and environment configuration for both binaries.
//!
//! Every setting is a long flag with an environment fallback, so the binaries
//! run unchanged from a Kubernetes manifest or a Tekton step. `clap` rejects
//! malformed numbers and enumeration tokens; [`ServerConfig::validate`] and
//! [`RelayConfig::event`] catch what clap cannot.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, ensure, Context};
use clap::{Args, Parser, ValueEnum};
use protocol::{
    CheckRun, CheckRunConclusion, CheckRunId, CheckRunStatus, CheckSuite, CommitSha, RepoName,
    RepoOwner, TektonEvent,
};

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Default verbosity when `RUST_LOG` is unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogLevel {
    /// Failures only.
    Error,
    /// Failures and rejected requests.
    Warn,
    /// Lifecycle and per-request summaries.
    #[default]
    Info,
    /// Ignored events and configuration details.
    Debug,
    /// Everything, including dependency internals.
    Trace,
}

impl LogLevel {
    /// The `EnvFilter` directive for this level.
    pub fn as_directive(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Log line format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Logging and tracing settings shared by both binaries.
#[derive(Debug, Clone, Args)]
pub struct LoggingConfig {
    /// Verbosity when RUST_LOG is not set.
    #[arg(long, env = "LOG_LEVEL", value_enum, ignore_case = true, default_value_t)]
    pub log_level: LogLevel,

    /// Log line format.
    #[arg(long, env = "LOG_FORMAT", value_enum, ignore_case = true, default_value_t)]
    pub log_format: LogFormat,

    /// OTLP gRPC endpoint; spans are exported only when set.
    #[arg(long = "otlp-endpoint", env = "OTEL_EXPORTER_OTLP_ENDPOINT")]
    pub otlp_endpoint: Option<String>,
}

// ---------------------------------------------------------------------------
// Bridge server
// ---------------------------------------------------------------------------

/// Configuration of the `tekton-github-app` bridge server.
#[derive(Clone, Parser)]
#[command(
    name = "tekton-github-app",
    version,
    about = "Relays GitHub check suites to Tekton and Tekton check-run updates to GitHub"
)]
pub struct ServerConfig {
    /// TCP port to listen on.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// GitHub App id.
    #[arg(long, env = "GH_APP_ID")]
    pub app_id: u64,

    /// Installation id of the GitHub App on the target account.
    #[arg(long, env = "GH_APP_INSTALLATION_ID")]
    pub installation_id: u64,

    /// PEM file holding the GitHub App private key.
    #[arg(long, env = "GH_APP_PRIVATE_KEY_PATH")]
    pub private_key_path: PathBuf,

    /// Secret configured on the GitHub App webhook.
    #[arg(long, env = "GH_APP_WEBHOOK_SECRET", hide_env_values = true)]
    pub webhook_secret: String,

    /// Tekton EventListener URL that receives check-suite notifications.
    #[arg(long, env = "TEKTON_URL")]
    pub tekton_url: String,

    /// Basic-auth user for the EventListener.
    #[arg(long, env = "TEKTON_USERNAME")]
    pub tekton_username: Option<String>,

    /// Basic-auth password for the EventListener.
    #[arg(long, env = "TEKTON_PASSWORD", hide_env_values = true)]
    pub tekton_password: Option<String>,

    /// GitHub REST API base URL.
    #[arg(long, env = "GITHUB_API_URL", default_value = github::DEFAULT_API_URL)]
    pub github_api_url: String,

    /// Path the GitHub webhook is delivered to.
    #[arg(long, env = "WEBHOOK_PATH", default_value = "/")]
    pub webhook_path: String,

    /// Deadline in seconds for each outbound call made while serving a request.
    #[arg(
        long,
        env = "DOWNSTREAM_TIMEOUT_SECS",
        default_value_t = 20,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub downstream_timeout_secs: u64,

    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl ServerConfig {
    /// Checks the settings clap cannot express.
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            !self.webhook_secret.is_empty(),
            "GH_APP_WEBHOOK_SECRET must not be empty"
        );
        reqwest::Url::parse(&self.tekton_url)
            .with_context(|| format!("TEKTON_URL is not a valid URL: {:?}", self.tekton_url))?;
        reqwest::Url::parse(&self.github_api_url).with_context(|| {
            format!("GITHUB_API_URL is not a valid URL: {:?}", self.github_api_url)
        })?;
        ensure!(
            self.webhook_path.starts_with('/'),
            "WEBHOOK_PATH must start with '/': {:?}",
            self.webhook_path
        );
        if self.webhook_path == tekton::TEKTON_PATH || self.webhook_path == crate::app::HEALTH_PATH
        {
            bail!("WEBHOOK_PATH {:?} collides with a built-in route", self.webhook_path);
        }
        if self.tekton_password.is_some() && self.tekton_username.is_none() {
            bail!("TEKTON_PASSWORD is set but TEKTON_USERNAME is not");
        }
        Ok(())
    }

    /// [`Self::downstream_timeout_secs`] as a [`Duration`].
    pub fn downstream_timeout(&self) -> Duration {
        Duration::from_secs(self.downstream_timeout_secs)
    }
}

impl std::fmt::Debug for ServerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerConfig")
            .field("port", &self.port)
            .field("app_id", &self.app_id)
            .field("installation_id", &self.installation_id)
            .field("private_key_path", &self.private_key_path)
            .field("tekton_url", &self.tekton_url)
            .field("tekton_username", &self.tekton_username)
            .field("github_api_url", &self.github_api_url)
            .field("webhook_path", &self.webhook_path)
            .field("downstream_timeout_secs", &self.downstream_timeout_secs)
            .field("logging", &self.logging)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Relay client
// ---------------------------------------------------------------------------

/// Operation requested from a Tekton step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayCommand {
    /// `create_checkrun`: open a new check run.
    CreateCheckRun,
    /// `update_checkrun`: move an existing check run forward.
    UpdateCheckRun,
}

impl FromStr for RelayCommand {
    type Err = String;

    /// Accepts `create_checkrun` and `update_checkrun` in any case, with
    /// `-` or `_` as separator.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().replace('-', "_").as_str() {
            "create_checkrun" => Ok(Self::CreateCheckRun),
            "update_checkrun" => Ok(Self::UpdateCheckRun),
            _ => Err(format!(
                "expected create_checkrun or update_checkrun, got {value:?}"
            )),
        }
    }
}

/// Configuration of the `ghapp-client` relay client.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ghapp-client",
    version,
    about = "Reports check-run progress from a Tekton step to tekton-github-app"
)]
pub struct RelayConfig {
    /// URL of the bridge's /tekton/ endpoint.
    #[arg(long, env = "GHAPP_URL")]
    pub ghapp_url: String,

    /// Owner of the repository the commit belongs to.
    #[arg(long, env = "REPO_OWNER")]
    pub repo_owner: String,

    /// Repository name.
    #[arg(long, env = "REPO_NAME")]
    pub repo_name: String,

    /// Commit the check run is attached to.
    #[arg(long, env = "HEAD_SHA")]
    pub head_sha: String,

    /// Check-run name shown on the commit.
    #[arg(long, env = "NAME")]
    pub name: String,

    /// Output title of the check run.
    #[arg(long, env = "TITLE", default_value = "")]
    pub title: String,

    /// Output summary of the check run.
    #[arg(long, env = "SUMMARY", default_value = "")]
    pub summary: String,

    /// create_checkrun or update_checkrun.
    #[arg(long, env = "COMMAND")]
    pub command: RelayCommand,

    /// queued, in_progress or completed.
    #[arg(long, env = "STATUS")]
    pub status: CheckRunStatus,

    /// success, failure, neutral, cancelled, skipped or timed_out. Empty
    /// means no conclusion.
    #[arg(long, env = "CONCLUSION")]
    pub conclusion: Option<String>,

    /// Check-run id returned by an earlier create; required for updates.
    /// Empty means no id.
    #[arg(long, env = "ID")]
    pub id: Option<String>,

    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl RelayConfig {
    /// Builds the event this invocation should send.
    pub fn event(&self) -> anyhow::Result<TektonEvent> {
        let check_suite = CheckSuite::new(
            RepoOwner::new(&self.repo_owner).context("invalid REPO_OWNER")?,
            RepoName::new(&self.repo_name).context("invalid REPO_NAME")?,
            CommitSha::new(&self.head_sha).context("invalid HEAD_SHA")?,
        );
        let mut check_run =
            CheckRun::queued(&self.name, &self.title, &self.summary).with_status(self.status);
        if let Some(conclusion) = non_empty(&self.conclusion) {
            let conclusion = CheckRunConclusion::parse(conclusion).context("invalid CONCLUSION")?;
            check_run = check_run.with_conclusion(conclusion);
        }

        match self.command {
            RelayCommand::CreateCheckRun => Ok(TektonEvent::create(check_suite, check_run)),
            RelayCommand::UpdateCheckRun => {
                let id = non_empty(&self.id).context("ID is required for update_checkrun")?;
                let id = id
                    .parse::<u64>()
                    .with_context(|| format!("invalid ID {id:?}"))?;
                let id = CheckRunId::new(id).context("invalid ID")?;
                Ok(TektonEvent::update(check_suite, check_run, id))
            }
        }
    }
}

/// Tekton substitutes unset parameters with `""`; treat that as absent.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use protocol::TektonEventType;

    use super::*;

    const SERVER_ARGS: &[&str] = &[
        "tekton-github-app",
        "--app-id",
        "123",
        "--installation-id",
        "456",
        "--private-key-path",
        "/etc/ghapp/key.pem",
        "--webhook-secret",
        "s3cret",
    ];

    const TEKTON_URL: &[&str] = &["--tekton-url", "http://el-github.tekton-pipelines:8080"];

    /// Parses the required server flags plus `extra`. The default Tekton URL
    /// is added only when `extra` does not set one.
    fn server(extra: &[&str]) -> Result<ServerConfig, clap::Error> {
        let tekton_url = if extra.contains(&"--tekton-url") {
            &[][..]
        } else {
            TEKTON_URL
        };
        ServerConfig::try_parse_from(SERVER_ARGS.iter().chain(tekton_url).chain(extra))
    }

    fn relay(extra: &[&str]) -> Result<RelayConfig, clap::Error> {
        let base = [
            "ghapp-client",
            "--ghapp-url",
            "http://tekton-github-app:8080/tekton/",
            "--repo-owner",
            "origoss",
            "--repo-name",
            "tekton-github-app",
            "--head-sha",
            "6dcb09b5b57875f334f61aebed695e2e4193db5e",
            "--name",
            "unit-tests",
        ];
        RelayConfig::try_parse_from(base.iter().chain(extra))
    }

    #[test]
    fn server_defaults() {
        let config = server(&[]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.github_api_url, "https://api.github.com");
        assert_eq!(config.webhook_path, "/");
        assert_eq!(config.downstream_timeout(), Duration::from_secs(20));
        assert_eq!(config.logging.log_level, LogLevel::Info);
        assert_eq!(config.logging.log_format, LogFormat::Text);
        config.validate().unwrap();
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let config = server(&["--log-level", "DEBUG", "--log-format", "json"]).unwrap();
        assert_eq!(config.logging.log_level, LogLevel::Debug);
        assert_eq!(config.logging.log_format, LogFormat::Json);
    }

    #[test]
    fn numeric_settings_are_checked_by_the_parser() {
        assert!(server(&["--port", "http"]).is_err());
        assert!(server(&["--downstream-timeout-secs", "0"]).is_err());
        assert!(ServerConfig::try_parse_from(["tekton-github-app"]).is_err());
    }

    #[test]
    fn validation_rejects_unusable_settings() {
        assert!(server(&["--webhook-path", "hooks"]).unwrap().validate().is_err());
        assert!(server(&["--webhook-path", "/tekton/"]).unwrap().validate().is_err());
        assert!(server(&["--webhook-path", "/healthz"]).unwrap().validate().is_err());
        assert!(server(&["--tekton-password", "pw"]).unwrap().validate().is_err());
        assert!(server(&["--tekton-url", "not a url"]).unwrap().validate().is_err());
        server(&["--tekton-username", "u", "--tekton-password", "pw"])
            .unwrap()
            .validate()
            .unwrap();
    }

    #[test]
    fn debug_output_hides_secrets() {
        let config = server(&["--tekton-username", "u", "--tekton-password", "hunter2"]).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("s3cret"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn command_accepts_both_spellings_in_any_case() {
        for token in ["create_checkrun", "CREATE_CHECKRUN", "create-checkrun"] {
            assert_eq!(token.parse::<RelayCommand>(), Ok(RelayCommand::CreateCheckRun));
        }
        assert_eq!("Update-CheckRun".parse::<RelayCommand>(), Ok(RelayCommand::UpdateCheckRun));
        assert!("delete_checkrun".parse::<RelayCommand>().is_err());
    }

    #[test]
    fn create_event_ignores_any_id() {
        let config = relay(&[
            "--command",
            "create_checkrun",
            "--status",
            "queued",
            "--id",
            "99",
        ])
        .unwrap();
        let event = config.event().unwrap();
        assert_eq!(event.event_type, TektonEventType::CreateCheckRun);
        assert_eq!(event.check_run.id, None);
        assert_eq!(event.check_run.status, CheckRunStatus::Queued);
    }

    #[test]
    fn update_event_carries_id_and_conclusion() {
        let config = relay(&[
            "--command",
            "UPDATE_CHECKRUN",
            "--status",
            "completed",
            "--conclusion",
            "timed_out",
            "--id",
            "4242",
        ])
        .unwrap();
        let event = config.event().unwrap();
        assert_eq!(event.event_type, TektonEventType::UpdateCheckRun);
        assert_eq!(event.check_run.id, Some(CheckRunId::new(4242).unwrap()));
        assert_eq!(event.check_run.conclusion, Some(CheckRunConclusion::TimedOut));
    }

    #[test]
    fn update_without_a_usable_id_is_a_configuration_error() {
        let missing = relay(&["--command", "update_checkrun", "--status", "in_progress"]).unwrap();
        assert!(missing.event().is_err());

        let zero = relay(&[
            "--command",
            "update_checkrun",
            "--status",
            "in_progress",
            "--id",
            "0",
        ])
        .unwrap();
        assert!(zero.event().is_err());

        for bad in ["--id=-3", "--id=abc"] {
            let config = relay(&["--command", "update_checkrun", "--status", "queued", bad]);
            assert!(config.map_or(true, |c| c.event().is_err()), "{bad}");
        }
    }

    #[test]
    fn empty_conclusion_and_id_are_treated_as_unset() {
        // Tekton renders unset step parameters as empty strings.
        std::env::set_var("CONCLUSION", "");
        std::env::set_var("ID", "");

        let create = relay(&["--command", "create_checkrun", "--status", "queued"]).unwrap();
        let event = create.event().unwrap();
        assert_eq!(event.check_run.conclusion, None);
        assert_eq!(event.check_run.id, None);

        let update = relay(&["--command", "update_checkrun", "--status", "in_progress"]).unwrap();
        let err = update.event().unwrap_err();
        assert!(format!("{err:#}").contains("ID is required"), "{err:#}");

        let flags = relay(&[
            "--command",
            "create_checkrun",
            "--status",
            "queued",
            "--conclusion",
            "",
            "--id",
            "",
        ])
        .unwrap();
        assert_eq!(flags.event().unwrap().check_run.conclusion, None);
    }

    #[test]
    fn invalid_tokens_and_empty_identifiers_are_rejected() {
        assert!(relay(&["--command", "create_checkrun", "--status", "Queued"]).is_err());
        let stale = relay(&[
            "--command",
            "create_checkrun",
            "--status",
            "completed",
            "--conclusion",
            "stale",
        ])
        .unwrap();
        assert!(stale.event().is_err());
        assert!(relay(&["--command", "rerun", "--status", "queued"]).is_err());

        let empty_sha = RelayConfig::try_parse_from([
            "ghapp-client",
            "--ghapp-url",
            "http://localhost/tekton/",
            "--repo-owner",
            "origoss",
            "--repo-name",
            "tekton-github-app",
            "--head-sha",
            "",
            "--name",
            "unit-tests",
            "--command",
            "create_checkrun",
            "--status",
            "queued",
        ])
        .unwrap();
        assert!(empty_sha.event().is_err());
    }
}
