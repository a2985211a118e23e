//! Loading `ClientConfig` from the environment or a JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::model::{ClientConfig, StorageConfig, default_version};

pub const ENV_API_END_POINT: &str = "TICKETDESK_API_END_POINT";
pub const ENV_OAUTH_URL: &str = "TICKETDESK_OAUTH_URL";
pub const ENV_VERSION: &str = "TICKETDESK_VERSION";
pub const ENV_STATE_FILE: &str = "TICKETDESK_STATE_FILE";

impl ClientConfig {
    pub fn new(api_base_url: impl Into<String>) -> Self {
        Self {
            api_base_url: normalize_base_url(&api_base_url.into()),
            oauth_url: None,
            version: default_version(),
            request_timeout_secs: None,
            storage: StorageConfig::default(),
        }
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source; `from_env` passes
    /// the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let base = lookup(ENV_API_END_POINT)
            .filter(|v| !v.trim().is_empty())
            .with_context(|| format!("{} is not set", ENV_API_END_POINT))?;

        let mut cfg = Self::new(base);
        cfg.oauth_url = lookup(ENV_OAUTH_URL).filter(|v| !v.trim().is_empty());
        if let Some(version) = lookup(ENV_VERSION).filter(|v| !v.trim().is_empty()) {
            cfg.version = version;
        }
        if let Some(path) = lookup(ENV_STATE_FILE).filter(|v| !v.trim().is_empty()) {
            cfg.storage.path = Some(PathBuf::from(path));
        }
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).with_context(|| format!("read {}", path.display()))?;
        let mut cfg: ClientConfig = serde_json::from_slice(&bytes)
            .with_context(|| format!("parse {}", path.display()))?;
        if cfg.api_base_url.trim().is_empty() {
            anyhow::bail!("{}: api_base_url must not be empty", path.display());
        }
        cfg.api_base_url = normalize_base_url(&cfg.api_base_url);
        Ok(cfg)
    }

    pub fn client_version_label(&self) -> String {
        format!("v{}", self.version)
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
