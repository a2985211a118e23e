use crate::app::AppContext;
use crate::cancel::CancelToken;
use crate::error::ApiError;
use crate::routing::ROOT_PATH;

use super::Outcome;

pub struct LoginView {
    ctx: AppContext,
    error: Option<String>,
}

impl LoginView {
    pub fn new(ctx: AppContext) -> Self {
        Self { ctx, error: None }
    }

    /// Where the login button sends the user.
    pub fn authorize_url(&self) -> Option<&str> {
        self.ctx.config().oauth_url.as_deref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Completes the OAuth redirect: trades `code` for a token, stores it
    /// and heads to the root page.
    pub fn handle_callback(&mut self, code: &str) -> Outcome {
        self.error = None;
        let _loading = self.ctx.loading().start();

        let token = CancelToken::new();
        let creds = match self.ctx.call(&token, |c| c.exchange_code(code)) {
            Ok(creds) => creds,
            Err(err) => {
                tracing::warn!("oauth code exchange failed: {}", err);
                self.error = Some(login_failure_message(&err));
                return Outcome::Stay;
            }
        };

        if let Err(err) = self.ctx.session().sign_in(&creds) {
            tracing::warn!("store login token: {:#}", err);
            self.error = Some(format!("Login Failed: {:#}", err));
            return Outcome::Stay;
        }
        Outcome::navigate(ROOT_PATH)
    }
}

fn login_failure_message(err: &ApiError) -> String {
    match (err.status(), err.detail()) {
        (Some(status), Some(detail)) => format!("Login Failed: {} {}", status.as_u16(), detail),
        (Some(status), None) => format!("Login Failed: {}", status.as_u16()),
        _ if err.is_transport() => "Login Failed: Server no response".to_string(),
        _ => format!("Login Failed: {}", err),
    }
}
