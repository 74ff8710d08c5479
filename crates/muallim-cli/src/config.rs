//! Configuration file management for muallim.
//!
//! Provides a TOML-based config file at `~/.config/muallim/config.toml` and a
//! resolution chain: CLI flag > env var > config file > default.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use muallim_core::client::DEFAULT_ENDPOINT;
use muallim_core::plan::DEFAULT_MODEL;

/// Environment variable holding the API key.
pub const API_KEY_ENV: &str = "API_KEY";
/// Environment variable overriding the model name.
pub const MODEL_ENV: &str = "MUALLIM_MODEL";
/// Environment variable overriding the API endpoint.
pub const ENDPOINT_ENV: &str = "MUALLIM_ENDPOINT";

// -----------------------------------------------------------------------
// Config file types
// -----------------------------------------------------------------------

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub gemini: GeminiSection,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct GeminiSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
}

// -----------------------------------------------------------------------
// Paths
// -----------------------------------------------------------------------

/// Return the muallim config directory.
///
/// Uses XDG layout: `$XDG_CONFIG_HOME/muallim` or `~/.config/muallim`.
pub fn config_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return PathBuf::from(xdg).join("muallim");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("muallim")
}

/// Return the path to the muallim config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.toml")
}

// -----------------------------------------------------------------------
// Read / write
// -----------------------------------------------------------------------

/// Parse config file contents.
pub fn parse_config(contents: &str) -> Result<ConfigFile> {
    toml::from_str(contents).context("failed to parse config file")
}

/// Load and parse the config file. Returns an error if it does not exist.
pub fn load_config() -> Result<ConfigFile> {
    let path = config_path();
    let contents = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read config file at {}", path.display()))?;
    parse_config(&contents)
}

/// Serialize and write the config file, creating parent dirs as needed.
/// Sets file permissions to 0600 on Unix since it may hold an API key.
pub fn save_config(config: &ConfigFile) -> Result<PathBuf> {
    let path = config_path();
    let dir = config_dir();
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create config directory {}", dir.display()))?;

    let contents = toml::to_string_pretty(config).context("failed to serialize config")?;
    std::fs::write(&path, &contents)
        .with_context(|| format!("failed to write config file at {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        std::fs::set_permissions(&path, perms)
            .with_context(|| format!("failed to set permissions on {}", path.display()))?;
    }

    Ok(path)
}

// -----------------------------------------------------------------------
// Resolved config
// -----------------------------------------------------------------------

/// Fully resolved configuration, ready for use.
#[derive(Debug, Clone)]
pub struct MuallimConfig {
    /// API key. `None` is not an error here; generation reports it.
    pub credential: Option<String>,
    pub model: String,
    pub endpoint: String,
}

impl MuallimConfig {
    /// Resolve from the process environment and the config file on disk.
    pub fn resolve(cli_api_key: Option<&str>, cli_model: Option<&str>) -> Self {
        let file_config = match load_config() {
            Ok(cfg) => Some(cfg),
            Err(e) => {
                tracing::debug!(error = %format!("{e:#}"), "no usable config file");
                None
            }
        };
        Self::resolve_with(cli_api_key, cli_model, |k| std::env::var(k).ok(), file_config)
    }

    /// Resolve with an explicit env lookup and config file (testable without
    /// touching the process environment).
    ///
    /// Blank values at any level count as unset and fall through.
    ///
    /// - Credential: `cli_api_key` > `API_KEY` > `gemini.api_key` > none
    /// - Model: `cli_model` > `MUALLIM_MODEL` > `gemini.model` > [`DEFAULT_MODEL`]
    /// - Endpoint: `MUALLIM_ENDPOINT` > `gemini.endpoint` > [`DEFAULT_ENDPOINT`]
    pub fn resolve_with(
        cli_api_key: Option<&str>,
        cli_model: Option<&str>,
        env: impl Fn(&str) -> Option<String>,
        file_config: Option<ConfigFile>,
    ) -> Self {
        let section = file_config.map(|c| c.gemini).unwrap_or_default();
        let non_blank = |v: &String| !v.trim().is_empty();

        let credential = cli_api_key
            .map(str::to_string)
            .filter(non_blank)
            .or_else(|| env(API_KEY_ENV).filter(non_blank))
            .or_else(|| section.api_key.filter(non_blank));

        let model = cli_model
            .map(str::to_string)
            .filter(non_blank)
            .or_else(|| env(MODEL_ENV).filter(non_blank))
            .or_else(|| section.model.filter(non_blank))
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        let endpoint = env(ENDPOINT_ENV)
            .filter(non_blank)
            .or_else(|| section.endpoint.filter(non_blank))
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        Self {
            credential,
            model,
            endpoint,
        }
    }
}

// -----------------------------------------------------------------------
// Tests
// -----------------------------------------------------------------------
