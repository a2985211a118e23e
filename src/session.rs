//! Bearer-token session: the single owner of the stored credentials.
//!
//! Readers ask the session for the current credentials or the decoded
//! identity; only the session writes them, and every write is broadcast to
//! subscribers.

use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};

use crate::model::Identity;
use crate::store::{KeyValueStore, SharedStore, keys};

mod bootstrap;
mod claims;

pub use self::bootstrap::{BootstrapOutcome, bootstrap};
pub use self::claims::decode_identity;

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// Token pair as persisted and as returned by the OAuth endpoints.
#[derive(Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Credentials {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
}

impl Credentials {
    pub fn bearer(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            token_type: default_token_type(),
        }
    }

    pub fn authorization(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .finish()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignOutReason {
    /// The user asked to leave.
    Logout,
    /// The server refused the credentials.
    Rejected,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn,
    Refreshed,
    SignedOut(SignOutReason),
}

#[derive(Clone)]
pub struct Session {
    store: SharedStore,
    subscribers: Arc<Mutex<Vec<Sender<SessionEvent>>>>,
}

impl Session {
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            subscribers: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(SharedStore::in_memory())
    }

    pub fn store(&self) -> &SharedStore {
        &self.store
    }

    /// Stored token pair. Both halves must be present; a storage failure
    /// reads as "no credentials".
    pub fn credentials(&self) -> Option<Credentials> {
        let read = self.store.with(|store| -> Result<Option<Credentials>> {
            let token = store.get(keys::ACCESS_TOKEN)?;
            let token_type = store.get(keys::TOKEN_TYPE)?;
            Ok(match (token, token_type) {
                (Some(access_token), Some(token_type)) => Some(Credentials {
                    access_token,
                    token_type,
                }),
                _ => None,
            })
        });
        match read {
            Ok(creds) => creds,
            Err(err) => {
                tracing::warn!("read session credentials: {:#}", err);
                None
            }
        }
    }

    /// Value for the `Authorization` header, if signed in.
    pub fn authorization(&self) -> Option<String> {
        self.credentials().map(|c| c.authorization())
    }

    /// Claims of the stored token. Missing, malformed and expired tokens all
    /// read as `None`.
    pub fn identity(&self) -> Option<Identity> {
        let token = match self.store.get(keys::ACCESS_TOKEN) {
            Ok(Some(token)) => token,
            Ok(None) => return None,
            Err(err) => {
                tracing::warn!("read access token: {:#}", err);
                return None;
            }
        };
        decode_identity(&token)
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity().is_some()
    }

    pub fn sign_in(&self, creds: &Credentials) -> Result<()> {
        self.write(creds).context("store credentials")?;
        tracing::info!("session signed in");
        self.notify(SessionEvent::SignedIn);
        Ok(())
    }

    pub fn replace(&self, creds: &Credentials) -> Result<()> {
        self.write(creds).context("store refreshed credentials")?;
        tracing::debug!("session token refreshed");
        self.notify(SessionEvent::Refreshed);
        Ok(())
    }

    pub fn sign_out(&self, reason: SignOutReason) -> Result<()> {
        let had_token = self.credentials().is_some();
        self.store
            .with(|store| -> Result<()> {
                store.remove(keys::ACCESS_TOKEN)?;
                store.remove(keys::TOKEN_TYPE)?;
                Ok(())
            })
            .context("clear credentials")?;
        if had_token {
            tracing::info!(?reason, "session signed out");
            self.notify(SessionEvent::SignedOut(reason));
        }
        Ok(())
    }

    pub fn subscribe(&self) -> Receiver<SessionEvent> {
        let (tx, rx) = mpsc::channel();
        self.subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(tx);
        rx
    }

    fn write(&self, creds: &Credentials) -> Result<()> {
        self.store.with(|store: &mut dyn KeyValueStore| -> Result<()> {
            store.set(keys::ACCESS_TOKEN, &creds.access_token)?;
            store.set(keys::TOKEN_TYPE, &creds.token_type)?;
            Ok(())
        })
    }

    fn notify(&self, event: SessionEvent) {
        let mut subs = self
            .subscribers
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        subs.retain(|tx| tx.send(event).is_ok());
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
