//! The `quizdesk login` and `quizdesk whoami` commands.

use std::path::PathBuf;

use anyhow::{Context, Result};

use quizdesk_client::config::{
    default_config_path, global_config_path, read_config_file, CONFIG_FILE_NAME,
};
use quizdesk_client::ClientConfig;

/// Log in and write the token to the config file.
///
/// The file is the explicit `--config` path (created if missing), else the
/// config file already in use, else the global one. Only the token is
/// changed; environment overrides are used for the call but never saved.
pub async fn login(config_path: Option<PathBuf>, email: String, password: String) -> Result<()> {
    let target = config_path
        .or_else(default_config_path)
        .or_else(global_config_path)
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME));

    let mut stored = if target.exists() {
        read_config_file(&target)?
    } else {
        ClientConfig::default()
    };
    let mut backend = stored.clone().resolved().backend()?;

    let auth = backend
        .login(&email, &password)
        .await
        .context("login failed")?;

    stored.token = Some(auth.token);
    stored.save(&target)?;

    println!(
        "Logged in as {} <{}> ({})",
        auth.user.name, auth.user.email, auth.user.role
    );
    println!("Token saved to {}", target.display());
    Ok(())
}

pub async fn whoami(config_path: Option<PathBuf>) -> Result<()> {
    let backend = super::connect(config_path)?;
    let session = super::session(&backend).await?;
    let user = session.user();
    println!("{} <{}> ({}, id {})", user.name, user.email, user.role, user.id);
    Ok(())
}
