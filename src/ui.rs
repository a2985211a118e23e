//! Ephemeral interface state shared by the shell and its views.

mod loading;
mod messages;
mod sidebar;

pub use self::loading::{LoadingGuard, LoadingIndicator};
pub use self::messages::{Level, MESSAGE_TIMEOUT, MessageBox, MessageQueue};
pub use self::sidebar::{API_DOWN_LABEL, SIDEBAR_LINKS, Sidebar, SidebarLink};
