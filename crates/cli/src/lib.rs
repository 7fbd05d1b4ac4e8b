//! Composition root for the bridge and the relay client.
//!
//! Both binaries are thin: they parse [`config`], install [`observability`],
//! and hand over to [`app`] (the `tekton-github-app` server) or
//! [`relay_client`] (the `ghapp-client` step helper). Keeping the wiring in
//! a library lets the integration tests drive it without spawning processes.
//!
//! ## Architectural Layer
//!
//! **Composition root.** The only crate that depends on every adapter. It
//! builds the GitHub client and the Tekton forwarder once, wraps them in
//! `Arc<dyn …>`, and injects them into the routes that need them.

pub mod app;
pub mod config;
pub mod observability;
pub mod relay_client;
