use crate::model::ClientConfig;
use crate::remote::ApiClient;
use crate::routing::{CREATE_PATH, LOGIN_PATH, TICKET_LIST_PATH};
use crate::store::{SharedStore, keys};

pub const API_DOWN_LABEL: &str = "API down";
const API_VERSION_PLACEHOLDER: &str = "v0.0.0";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SidebarLink {
    pub path: &'static str,
    pub label: &'static str,
}

pub const SIDEBAR_LINKS: &[SidebarLink] = &[
    SidebarLink {
        path: TICKET_LIST_PATH,
        label: "Ticket List",
    },
    SidebarLink {
        path: CREATE_PATH,
        label: "Create Ticket",
    },
];

impl SidebarLink {
    pub fn is_selected(&self, current_path: &str) -> bool {
        current_path == self.path
            || current_path
                .strip_suffix('/')
                .is_some_and(|p| p == self.path)
    }
}

/// Navigation drawer. The open flag survives restarts through the store.
pub struct Sidebar {
    store: SharedStore,
    open: bool,
    api_version: String,
    client_version: String,
}

impl Sidebar {
    /// Missing or unreadable state, and any stored value but `"false"`,
    /// start the sidebar open.
    pub fn load(store: SharedStore, cfg: &ClientConfig) -> Self {
        let open = match store.get(keys::SIDE_BAR) {
            Ok(value) => value.as_deref() != Some("false"),
            Err(err) => {
                tracing::warn!("read sidebar state: {:#}", err);
                true
            }
        };
        Self {
            store,
            open,
            api_version: API_VERSION_PLACEHOLDER.to_string(),
            client_version: cfg.client_version_label(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = open;
        let value = if open { "true" } else { "false" };
        if let Err(err) = self.store.set(keys::SIDE_BAR, value) {
            tracing::warn!("persist sidebar state: {:#}", err);
        }
    }

    pub fn toggle(&mut self) {
        self.set_open(!self.open);
    }

    /// Following a link closes the drawer and yields the target path.
    pub fn follow(&mut self, link: &SidebarLink) -> String {
        self.set_open(false);
        link.path.to_string()
    }

    /// The sidebar is not drawn on the login page.
    pub fn is_visible_on(path: &str) -> bool {
        let path = path.split(['?', '#']).next().unwrap_or(path);
        path != LOGIN_PATH && path.strip_suffix('/') != Some(LOGIN_PATH)
    }

    pub fn refresh_api_version(&mut self, client: &ApiClient) {
        self.api_version = match client.api_version() {
            Ok(version) => format!("v{}", version),
            Err(err) => {
                tracing::warn!("api version unavailable: {}", err);
                API_DOWN_LABEL.to_string()
            }
        };
    }

    pub fn api_version_label(&self) -> &str {
        &self.api_version
    }

    pub fn client_version_label(&self) -> &str {
        &self.client_version
    }
}

#[cfg(test)]
#[path = "../tests/ui/sidebar_tests.rs"]
mod tests;
