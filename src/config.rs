//! Configuration management for quizscribe.
//!
//! Settings come from an optional TOML file, then environment variables on
//! top. The API key is only ever read from the environment.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::llm::LlmConfig;
use crate::ocr::OcrConfig;

/// Config file picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "quizscribe.toml";

/// Errors from loading settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Web server settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on.
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Largest accepted upload, in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
}

fn default_bind() -> String {
    "127.0.0.1:8501".to_string()
}

fn default_max_upload_bytes() -> usize {
    20 * 1024 * 1024
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            max_upload_bytes: default_max_upload_bytes(),
        }
    }
}

impl ServerConfig {
    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `QUIZSCRIBE_BIND`: listen address
    /// - `QUIZSCRIBE_MAX_UPLOAD_BYTES`: upload size limit
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("QUIZSCRIBE_BIND") {
            if !val.trim().is_empty() {
                self.bind = val;
            }
        }
        if let Some(n) = lookup("QUIZSCRIBE_MAX_UPLOAD_BYTES").and_then(|v| v.parse().ok()) {
            self.max_upload_bytes = n;
        }
        self
    }
}

/// Application settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub ocr: OcrConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Settings {
    /// Parse settings from TOML text, without environment overrides.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read settings from a TOML file, without environment overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Apply environment overrides to every section.
    pub fn with_env_overrides(self) -> Self {
        Self {
            llm: self.llm.with_env_overrides(),
            ocr: self.ocr.with_env_overrides(),
            server: self.server.with_env_overrides(),
        }
    }
}

/// Load settings for this process.
///
/// An explicit `config_path` must exist. Without one, `quizscribe.toml` in the
/// working directory is used if present, otherwise defaults.
pub fn load_settings(config_path: Option<&Path>) -> Result<Settings, ConfigError> {
    let base = match config_path {
        Some(path) => {
            tracing::info!("Loading config from {}", path.display());
            Settings::from_file(path)?
        }
        None => {
            let local = Path::new(DEFAULT_CONFIG_FILE);
            if local.is_file() {
                tracing::info!("Loading config from {}", local.display());
                Settings::from_file(local)?
            } else {
                tracing::debug!("No config file found, using defaults");
                Settings::default()
            }
        }
    };

    Ok(base.with_env_overrides())
}
