//! Bearer-token sources for the GitHub REST API.

use std::fmt;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, instrument};

use crate::client::{api_url, check_status};
use crate::GithubError;

/// GitHub caps App JWT lifetime at ten minutes; stay under it for clock skew.
const JWT_LIFETIME: Duration = Duration::minutes(9);
/// Backdate `iat` so a server clock slightly behind ours still accepts it.
const JWT_BACKDATE: Duration = Duration::seconds(60);
/// Refresh installation tokens this long before GitHub expires them.
const TOKEN_REFRESH_MARGIN: Duration = Duration::seconds(60);

/// Supplies the bearer token attached to every GitHub API call.
#[async_trait]
pub trait TokenSource: Send + Sync {
    /// Returns a token valid for at least the duration of one API call.
    async fn token(&self) -> Result<String, GithubError>;
}

// ---------------------------------------------------------------------------
// Static token
// ---------------------------------------------------------------------------

/// A pre-issued token (personal access token, or a token minted elsewhere).
#[derive(Clone)]
pub struct StaticToken(String);

impl StaticToken {
    /// Wraps `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StaticToken(..)")
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn token(&self) -> Result<String, GithubError> {
        Ok(self.0.clone())
    }
}

// ---------------------------------------------------------------------------
// GitHub App installation
// ---------------------------------------------------------------------------

/// Identity of a GitHub App installation plus the App's signing key.
#[derive(Clone)]
pub struct AppCredentials {
    app_id: u64,
    installation_id: u64,
    key: EncodingKey,
}

impl AppCredentials {
    /// Builds credentials from a PEM-encoded RSA private key.
    pub fn from_pem(app_id: u64, installation_id: u64, pem: &[u8]) -> Result<Self, GithubError> {
        Ok(Self {
            app_id,
            installation_id,
            key: EncodingKey::from_rsa_pem(pem)?,
        })
    }

    /// Builds credentials from the PEM file GitHub issues for the App.
    pub fn from_key_file(
        app_id: u64,
        installation_id: u64,
        path: &Path,
    ) -> Result<Self, GithubError> {
        let pem = std::fs::read(path).map_err(|source| GithubError::KeyFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_pem(app_id, installation_id, &pem)
    }

    /// The App id.
    pub fn app_id(&self) -> u64 {
        self.app_id
    }

    /// The installation the bridge acts as.
    pub fn installation_id(&self) -> u64 {
        self.installation_id
    }

    fn app_jwt(&self, now: DateTime<Utc>) -> Result<String, GithubError> {
        let claims = AppClaims {
            iat: (now - JWT_BACKDATE).timestamp(),
            exp: (now + JWT_LIFETIME).timestamp(),
            iss: self.app_id.to_string(),
        };
        Ok(jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &claims,
            &self.key,
        )?)
    }
}

impl fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCredentials")
            .field("app_id", &self.app_id)
            .field("installation_id", &self.installation_id)
            .finish_non_exhaustive()
    }
}

#[derive(Serialize)]
struct AppClaims {
    iat: i64,
    exp: i64,
    iss: String,
}

#[derive(Clone, Deserialize)]
struct InstallationToken {
    token: String,
    expires_at: DateTime<Utc>,
}

impl InstallationToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + TOKEN_REFRESH_MARGIN < self.expires_at
    }
}

/// Installation access tokens for a GitHub App, cached until near expiry.
///
/// Concurrent callers that find the cache stale wait on the same refresh
/// instead of each minting their own token.
pub struct AppInstallationAuth {
    credentials: AppCredentials,
    http: reqwest::Client,
    api_base: String,
    cached: Mutex<Option<InstallationToken>>,
}

impl AppInstallationAuth {
    /// Creates a token source that exchanges App JWTs at `api_base`.
    pub fn new(credentials: AppCredentials, http: reqwest::Client, api_base: &str) -> Self {
        Self {
            credentials,
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            cached: Mutex::new(None),
        }
    }

    #[instrument(skip_all, fields(installation_id = self.credentials.installation_id))]
    async fn exchange(&self) -> Result<InstallationToken, GithubError> {
        let jwt = self.credentials.app_jwt(Utc::now())?;
        let url = api_url(
            &self.api_base,
            &format!(
                "app/installations/{}/access_tokens",
                self.credentials.installation_id
            ),
        );
        let response = self.http.post(url).bearer_auth(jwt).send().await?;
        let token: InstallationToken = check_status(response).await?.json().await?;
        debug!(expires_at = %token.expires_at, "installation token issued");
        Ok(token)
    }
}

impl fmt::Debug for AppInstallationAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppInstallationAuth")
            .field("credentials", &self.credentials)
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl TokenSource for AppInstallationAuth {
    async fn token(&self) -> Result<String, GithubError> {
        let mut cached = self.cached.lock().await;
        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(Utc::now())) {
            return Ok(token.token.clone());
        }
        let fresh = self.exchange().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }
}
