use std::time::Duration;

use anyhow::{Context, Result};

use crate::error::{ApiError, ApiResult};
use crate::model::ClientConfig;
use crate::session::Session;

mod http_client;

mod types;
pub use self::types::*;
mod oauth;
mod tickets;
mod users;

/// Thin wrapper over the ticket REST API. One method per endpoint; no
/// retries and no caching. Cloning shares the connection pool.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    session: Session,
    client: reqwest::blocking::Client,
}

impl ApiClient {
    pub fn new(cfg: &ClientConfig, session: Session) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .user_agent(format!("ticketdesk/{}", cfg.version));
        if let Some(secs) = cfg.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build().context("build reqwest client")?;
        Ok(Self {
            base_url: cfg.api_base_url.trim_end_matches('/').to_string(),
            session,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}
