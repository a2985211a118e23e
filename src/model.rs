mod config;
mod ids;
mod ticket;
mod user;

pub use self::config::{ClientConfig, StorageConfig};
pub(crate) use self::config::default_version;
pub use self::ids::{TicketId, UserId, UserRef};
pub use self::ticket::{Ticket, TicketUpdate};
pub use self::user::{Identity, User};

#[cfg(test)]
#[path = "tests/model_tests.rs"]
mod tests;
