use reqwest::Method;

use super::*;
use crate::session::Credentials;

impl ApiClient {
    /// Trades an authorization code from the OAuth redirect for a session
    /// token. Does not store it; the caller signs the session in.
    pub fn exchange_code(&self, code: &str) -> ApiResult<Credentials> {
        let resp = self.send(
            self.request(Method::POST, "/oauth")
                .json(&CodeExchangeRequest { code }),
            "oauth code exchange",
        )?;
        self.json(resp, "parse oauth token")
    }

    /// Asks the server to renew the stored token. The server may hand back
    /// the same token while it is far from expiry.
    pub fn refresh_token(&self) -> ApiResult<Credentials> {
        let resp = self.send(self.request(Method::PUT, "/oauth"), "oauth refresh")?;
        self.json(resp, "parse refreshed token")
    }
}
