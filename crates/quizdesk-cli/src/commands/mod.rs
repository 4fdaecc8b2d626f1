pub mod admin;
pub mod auth;
pub mod catalog;
pub mod init;
pub mod lessons;
pub mod practice;
pub mod take;
pub mod tier;

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizdesk_client::config::load_config_from;
use quizdesk_client::HttpBackend;
use quizdesk_core::session::Session;

/// Build a backend from the config file and environment.
pub fn connect(config_path: Option<PathBuf>) -> Result<HttpBackend> {
    let config = load_config_from(config_path.as_deref())?;
    tracing::debug!(?config, "loaded config");
    config.backend()
}

/// Resolve the stored token into a session.
pub async fn session(backend: &HttpBackend) -> Result<Session> {
    anyhow::ensure!(
        backend.token().is_some(),
        "not logged in. Run `quizdesk login` first"
    );
    backend
        .session()
        .await
        .context("failed to load the current user")
}
