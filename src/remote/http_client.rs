use reqwest::Method;
use reqwest::blocking::{RequestBuilder, Response};
use serde::de::DeserializeOwned;

use super::*;
use crate::session::SignOutReason;

impl ApiClient {
    pub(super) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Starts a request and attaches the session's `Authorization` header
    /// when both halves of the token are stored.
    pub(super) fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let req = self.client.request(method, self.url(path));
        match self.session.authorization() {
            Some(auth) => req.header(reqwest::header::AUTHORIZATION, auth),
            None => req,
        }
    }

    /// Sends the request and turns every non-success status into an
    /// `ApiError`. Credential rejections clear the stored session.
    pub(super) fn send(&self, req: RequestBuilder, label: &str) -> ApiResult<Response> {
        tracing::debug!(label, "api request");
        let resp = req.send().map_err(|e| ApiError::transport(label, e))?;
        self.ensure_ok(resp, label)
    }

    pub(super) fn ensure_ok(&self, resp: Response, label: &str) -> ApiResult<Response> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.bytes().map_err(|e| ApiError::transport(label, e))?;
        let err = ApiError::from_status(status, &body);
        tracing::warn!(label, %status, "api request failed: {}", err);

        if err.is_auth_failure()
            && let Err(clear_err) = self.session.sign_out(SignOutReason::Rejected)
        {
            tracing::warn!("clear rejected credentials: {:#}", clear_err);
        }
        Err(err)
    }

    pub(super) fn json<T: DeserializeOwned>(&self, resp: Response, label: &str) -> ApiResult<T> {
        let bytes = resp.bytes().map_err(|e| ApiError::transport(label, e))?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::decode(label, e))
    }

    /// Reads a body that is either a JSON string or bare text.
    pub(super) fn text_or_json_string(&self, resp: Response, label: &str) -> ApiResult<String> {
        let bytes = resp.bytes().map_err(|e| ApiError::transport(label, e))?;
        if let Ok(s) = serde_json::from_slice::<String>(&bytes) {
            return Ok(s);
        }
        String::from_utf8(bytes.to_vec()).map_err(|e| ApiError::decode(label, e))
    }
}

#[cfg(test)]
#[path = "../tests/remote/http_client_tests.rs"]
mod tests;
