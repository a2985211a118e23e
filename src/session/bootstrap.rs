use reqwest::StatusCode;

use super::SignOutReason;
use crate::remote::ApiClient;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BootstrapOutcome {
    /// Nothing stored; the user starts logged out.
    NoToken,
    Refreshed,
    /// The server refused the stored token and it was removed.
    Cleared,
    /// Refresh failed for another reason; the stored token stays.
    Kept,
}

/// Start-of-application refresh of a stored token.
pub fn bootstrap(client: &ApiClient) -> BootstrapOutcome {
    let session = client.session();
    if session.credentials().is_none() {
        return BootstrapOutcome::NoToken;
    }

    match client.refresh_token() {
        Ok(creds) => match session.replace(&creds) {
            Ok(()) => BootstrapOutcome::Refreshed,
            Err(err) => {
                tracing::warn!("persist refreshed token: {:#}", err);
                BootstrapOutcome::Kept
            }
        },
        Err(err) if err.status() == Some(StatusCode::FORBIDDEN) => {
            if let Err(clear_err) = session.sign_out(SignOutReason::Rejected) {
                tracing::warn!("clear rejected token: {:#}", clear_err);
            }
            BootstrapOutcome::Cleared
        }
        Err(err) => {
            tracing::warn!("token refresh failed: {}", err);
            BootstrapOutcome::Kept
        }
    }
}
