use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL every API path is appended to, without a trailing slash.
    pub api_base_url: String,

    /// Where the login view sends the user to authorize.
    #[serde(default)]
    pub oauth_url: Option<String>,

    #[serde(default = "default_version")]
    pub version: String,

    /// Per-request timeout. Unset means the transport default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,

    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON file holding the persisted client state. Unset keeps the state in
    /// memory for the lifetime of the process.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

pub(crate) fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
