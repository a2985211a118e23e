use reqwest::Method;

use super::*;
use crate::model::{User, UserId};

impl ApiClient {
    pub fn get_user(&self, user_id: UserId) -> ApiResult<User> {
        let resp = self.send(
            self.request(Method::GET, &format!("/user/{}", user_id)),
            "get user",
        )?;
        self.json(resp, "parse user")
    }

    pub fn api_version(&self) -> ApiResult<String> {
        let resp = self.send(self.request(Method::GET, "/version"), "get version")?;
        let version = self.text_or_json_string(resp, "parse version")?;
        Ok(version.trim().to_string())
    }
}
