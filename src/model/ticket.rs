use serde::{Deserialize, Serialize};

use super::{TicketId, UserId};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    pub ticket_id: TicketId,
    pub author_id: UserId,

    /// Seconds since the unix epoch, UTC.
    pub create_utc_timestamp: f64,

    #[serde(default)]
    pub files: Vec<String>,

    #[serde(default)]
    pub public: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
}

impl TicketUpdate {
    pub fn public(public: bool) -> Self {
        Self {
            public: Some(public),
        }
    }
}
