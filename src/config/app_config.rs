use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::domain::pomodoro::DEFAULT_MINUTES;

pub const BACKEND_URL_ENV: &str = "MINDMAZE_BACKEND_URL";
pub const ID_TOKEN_ENV: &str = "MINDMAZE_ID_TOKEN";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the REST backend, without trailing slash
    pub backend_url: String,

    /// Per-request timeout (in seconds)
    pub request_timeout_secs: u64,

    /// Initial pomodoro length in minutes
    pub pomodoro_minutes: u32,

    /// Static identity token, only ever read from the environment
    #[serde(skip)]
    pub id_token: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:5000".to_string(),
            request_timeout_secs: 10,
            pomodoro_minutes: DEFAULT_MINUTES,
            id_token: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from the user config directory, then apply env overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env();
        Ok(config)
    }

    /// Missing file means defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        info!(path = %path.display(), "Configuration saved");
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("mindmaze").join("config.toml"))
    }

    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            if !url.trim().is_empty() {
                self.backend_url = url.trim().trim_end_matches('/').to_string();
            }
        }
        self.id_token = std::env::var(ID_TOKEN_ENV)
            .ok()
            .filter(|t| !t.trim().is_empty());
    }
}
