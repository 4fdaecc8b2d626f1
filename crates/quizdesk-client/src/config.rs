//! Client configuration loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::http::HttpBackend;

pub const CONFIG_FILE_NAME: &str = "quizdesk.toml";

/// Connection settings for the portal backend.
///
/// Note: Custom Debug impl masks the token to keep it out of logs.
#[derive(Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the REST API, including the version prefix.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Bearer token from a previous login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_url", &self.api_url)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_api_url() -> String {
    "http://localhost:8080/api/v1".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            token: None,
            timeout_secs: default_timeout(),
        }
    }
}

impl ClientConfig {
    /// Apply `QUIZDESK_API_URL` / `QUIZDESK_TOKEN` overrides and expand
    /// `${VAR}` references.
    pub fn resolved(mut self) -> Self {
        if let Ok(url) = std::env::var("QUIZDESK_API_URL") {
            self.api_url = url;
        }
        if let Ok(token) = std::env::var("QUIZDESK_TOKEN") {
            self.token = Some(token);
        }

        self.api_url = resolve_env_vars(&self.api_url)
            .trim_end_matches('/')
            .to_string();
        self.token = self
            .token
            .as_deref()
            .map(resolve_env_vars)
            .filter(|t| !t.is_empty());
        self
    }

    /// Build an HTTP backend from these settings.
    pub fn backend(&self) -> Result<HttpBackend> {
        HttpBackend::new(&self.api_url, self.token.clone(), self.timeout_secs)
            .context("failed to build HTTP client")
    }

    /// Write the config as TOML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to encode config")?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write config: {}", path.display()))
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are copied as-is and never expanded again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + 2 + len];
        result.push_str(&std::env::var(var_name).unwrap_or_default());
        rest = &rest[start + 2 + len + 1..];
    }
    result.push_str(rest);
    result
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizdesk.toml` in the current directory
/// 2. `~/.config/quizdesk/config.toml`
///
/// Environment variable overrides: `QUIZDESK_API_URL`, `QUIZDESK_TOKEN`.
pub fn load_config() -> Result<ClientConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) if p.exists() => Some(p.to_path_buf()),
        Some(p) => anyhow::bail!("config file not found: {}", p.display()),
        None => default_config_path(),
    };

    let config = match config_path {
        Some(path) => read_config_file(&path)?,
        None => ClientConfig::default(),
    };

    Ok(config.resolved())
}

/// Read a config file as written: no environment overrides, no `${VAR}`
/// expansion. Use this when the file is going to be written back.
pub fn read_config_file(path: &Path) -> Result<ClientConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<ClientConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

/// The first existing config file in the search order, if any.
pub fn default_config_path() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }
    global_config_path().filter(|p| p.exists())
}

/// `~/.config/quizdesk/config.toml`, whether or not it exists.
pub fn global_config_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|h| {
        PathBuf::from(h)
            .join(".config")
            .join("quizdesk")
            .join("config.toml")
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_env_vars_basic() {
        std::env::set_var("_QUIZDESK_TEST_VAR", "hello");
        assert_eq!(resolve_env_vars("${_QUIZDESK_TEST_VAR}"), "hello");
        assert_eq!(
            resolve_env_vars("prefix_${_QUIZDESK_TEST_VAR}_suffix"),
            "prefix_hello_suffix"
        );
        std::env::remove_var("_QUIZDESK_TEST_VAR");
    }

    #[test]
    fn resolve_env_vars_does_not_expand_values() {
        std::env::set_var("_QUIZDESK_SELF_REF", "${_QUIZDESK_SELF_REF}");
        assert_eq!(
            resolve_env_vars("a/${_QUIZDESK_SELF_REF}/b"),
            "a/${_QUIZDESK_SELF_REF}/b"
        );
        std::env::remove_var("_QUIZDESK_SELF_REF");

        assert_eq!(resolve_env_vars("${_QUIZDESK_UNSET_VAR}x"), "x");
        assert_eq!(resolve_env_vars("open ${brace"), "open ${brace");
    }

    #[test]
    fn default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, "http://localhost:8080/api/v1");
        assert_eq!(config.timeout_secs, 30);
        assert!(config.token.is_none());
    }

    #[test]
    fn debug_masks_token() {
        let config = ClientConfig {
            token: Some("secret-token".into()),
            ..Default::default()
        };
        let debug = format!("{config:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("***"));
    }

    #[test]
    fn save_then_load_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("quizdesk.toml");
        let config = ClientConfig {
            api_url: "https://portal.example.org/api/v1/".into(),
            token: Some("abc".into()),
            timeout_secs: 5,
        };
        config.save(&path).unwrap();

        let loaded = load_config_from(Some(&path)).unwrap();
        assert_eq!(loaded.api_url, "https://portal.example.org/api/v1");
        assert_eq!(loaded.timeout_secs, 5);
    }

    #[test]
    fn read_config_file_keeps_references() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quizdesk.toml");
        std::fs::write(&path, "api_url = \"${_QUIZDESK_RAW_URL}/api/v1\"\n").unwrap();

        let raw = read_config_file(&path).unwrap();
        assert_eq!(raw.api_url, "${_QUIZDESK_RAW_URL}/api/v1");
    }

    #[test]
    fn missing_explicit_path_is_an_error() {
        let err = load_config_from(Some(Path::new("/nonexistent/quizdesk.toml"))).unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn parse_partial_config() {
        let config: ClientConfig = toml::from_str(r#"api_url = "http://10.0.0.2/api/v1""#).unwrap();
        assert_eq!(config.api_url, "http://10.0.0.2/api/v1");
        assert_eq!(config.timeout_secs, 30);
    }
}
