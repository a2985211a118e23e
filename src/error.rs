//! Error kinds surfaced by the API client.
//!
//! Every view receives the same closed set of failures and decides locally
//! whether to show a toast, redirect, or both.

use reqwest::StatusCode;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No response was received (connect failure, timeout, broken body).
    #[error("server unreachable ({label})")]
    Transport {
        label: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{status} {detail}")]
    Client { status: StatusCode, detail: String },

    #[error("{status} {detail}")]
    Server { status: StatusCode, detail: String },

    /// A success status other than the one the call requires.
    #[error("unexpected status {status} ({label})")]
    UnexpectedStatus { label: String, status: StatusCode },

    #[error("decode {label}")]
    Decode {
        label: String,
        #[source]
        source: BoxError,
    },

    #[error("request cancelled")]
    Cancelled,
}

impl ApiError {
    pub fn transport(label: &str, source: reqwest::Error) -> Self {
        ApiError::Transport {
            label: label.to_string(),
            source,
        }
    }

    pub fn decode(label: &str, source: impl Into<BoxError>) -> Self {
        ApiError::Decode {
            label: label.to_string(),
            source: source.into(),
        }
    }

    /// Classifies a non-success response by status class.
    pub fn from_status(status: StatusCode, body: &[u8]) -> Self {
        let detail = extract_detail(status, body);
        if status.is_server_error() {
            ApiError::Server { status, detail }
        } else {
            ApiError::Client { status, detail }
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ApiError::Client { status, .. }
            | ApiError::Server { status, .. }
            | ApiError::UnexpectedStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Client { detail, .. } | ApiError::Server { detail, .. } => Some(detail),
            _ => None,
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, ApiError::Transport { .. })
    }

    /// Whether the server rejected the credentials themselves, as opposed to
    /// refusing access to one resource.
    pub fn is_auth_failure(&self) -> bool {
        match self {
            ApiError::Client { status, detail } => {
                *status == StatusCode::UNAUTHORIZED
                    || (*status == StatusCode::FORBIDDEN && is_credential_detail(detail))
            }
            _ => false,
        }
    }

    /// Detail text for "…, detail: {x}" style toasts.
    pub fn display_detail(&self) -> String {
        match self.detail() {
            Some(d) => d.to_string(),
            None => self.to_string(),
        }
    }
}

const CREDENTIAL_DETAILS: &[&str] = &["Invalid authentication credentials", "Not authenticated"];

fn is_credential_detail(detail: &str) -> bool {
    CREDENTIAL_DETAILS.iter().any(|d| detail == *d)
}

/// Pulls a human-readable message out of an error body: `detail` (string or
/// structured), then `error`, then the raw text, then the status reason.
pub(crate) fn extract_detail(status: StatusCode, body: &[u8]) -> String {
    if let Ok(v) = serde_json::from_slice::<serde_json::Value>(body) {
        for key in ["detail", "error"] {
            match v.get(key) {
                Some(serde_json::Value::String(s)) => return s.clone(),
                Some(serde_json::Value::Null) | None => {}
                Some(other) => return other.to_string(),
            }
        }
    }
    let text = String::from_utf8_lossy(body);
    let text = text.trim();
    if !text.is_empty() {
        return text.to_string();
    }
    status
        .canonical_reason()
        .unwrap_or("unknown error")
        .to_string()
}

#[cfg(test)]
#[path = "tests/error_tests.rs"]
mod tests;
