use serde::{Deserialize, Serialize};

use super::UserId;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,

    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,

    #[serde(default)]
    pub is_admin: bool,
    pub display_name: String,
    pub display_avatar: String,
}

/// Claims carried in the session token. Decoded locally for display only;
/// the server stays the authority on who the caller is.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub username: String,

    #[serde(default)]
    pub global_name: Option<String>,
    #[serde(default)]
    pub avatar: Option<String>,

    #[serde(default)]
    pub is_admin: bool,
    pub display_name: String,
    pub display_avatar: String,

    pub exp: u64,
    pub iat: u64,
}

impl Identity {
    pub fn user(&self) -> User {
        User {
            id: self.id,
            username: self.username.clone(),
            global_name: self.global_name.clone(),
            avatar: self.avatar.clone(),
            is_admin: self.is_admin,
            display_name: self.display_name.clone(),
            display_avatar: self.display_avatar.clone(),
        }
    }
}
