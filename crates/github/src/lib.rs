//! GitHub infrastructure adapter.
//!
//! Implements [`protocol::CheckRunApi`] against the GitHub Checks REST API,
//! authenticated as a GitHub App installation.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** This crate must not contain relay rules. All GitHub API
//! details (headers, URL layout, error bodies, App authentication) are
//! handled here; the rest of the workspace sees only
//! [`protocol::CheckRunApi`].
//!
//! ## Authentication
//!
//! [`GithubClient`] asks a [`TokenSource`] for a bearer token before every
//! call. Two sources are provided:
//!
//! - [`AppInstallationAuth`]: signs an RS256 App JWT with the App's private
//!   key, exchanges it for an installation access token, and caches that
//!   token until shortly before it expires.
//! - [`StaticToken`]: a fixed pre-issued token.
//!
//! The client and its token source are built once at startup and shared
//! by every request.

mod auth;
mod client;
mod errors;

pub use auth::{AppCredentials, AppInstallationAuth, StaticToken, TokenSource};
pub use client::{http_client, GithubClient, DEFAULT_API_URL};
pub use errors::GithubError;
