use std::path::PathBuf;

use protocol::RelayError;
use thiserror::Error;

/// Failures talking to the GitHub REST API.
#[derive(Debug, Error)]
pub enum GithubError {
    /// Transport-level failure (connect, TLS, body read, JSON decode).
    #[error("GitHub request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// GitHub answered with a non-success status.
    #[error("GitHub API returned {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// `message` from GitHub's error body, or the raw body.
        message: String,
    },

    /// The App private key file could not be read.
    #[error("cannot read GitHub App private key {path}: {source}")]
    KeyFile {
        /// Configured key path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The App private key could not be parsed or the App JWT could not be signed.
    #[error("GitHub App JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// GitHub answered successfully but the body is not usable.
    #[error("unexpected GitHub response: {0}")]
    InvalidResponse(String),
}

impl GithubError {
    /// Folds this error into the port-level [`RelayError`] for `operation`.
    pub fn into_relay(self, operation: &'static str) -> RelayError {
        match self {
            Self::Api { status, message } => RelayError::Rejected {
                operation,
                status,
                body: message,
            },
            other => RelayError::downstream(operation, other),
        }
    }
}
