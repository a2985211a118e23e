//! Application shell: owns the shared context, guards every navigation and
//! keeps exactly one page view alive.

use std::sync::mpsc::Receiver;

use anyhow::Result;

use crate::model::ClientConfig;
use crate::routing::{
    self, AuthState, LOGIN_PATH, Resolution, Route, load_last_path, query_param, record_last_path,
};
use crate::session::{self, BootstrapOutcome, SessionEvent, SignOutReason};
use crate::store::{self, SharedStore, keys};
use crate::ui::Sidebar;
use crate::views::{CreateView, LoginView, Outcome, TicketContentView, TicketListView};

mod context;

pub use self::context::{AppContext, SERVER_DOWN_MESSAGE};

/// Redirect chains longer than this are cut off.
const MAX_REDIRECTS: usize = 8;

pub enum Page {
    Login(LoginView),
    TicketList(TicketListView),
    TicketContent(TicketContentView),
    Create(CreateView),
}

impl Page {
    fn for_route(ctx: &AppContext, route: &Route) -> Self {
        match route {
            Route::Login => Page::Login(LoginView::new(ctx.clone())),
            Route::TicketList { user } => {
                Page::TicketList(TicketListView::new(ctx.clone(), *user))
            }
            Route::TicketContent { user, ticket, file } => Page::TicketContent(
                TicketContentView::new(ctx.clone(), *user, ticket.clone(), file.clone()),
            ),
            Route::Create => Page::Create(CreateView::new(ctx.clone())),
        }
    }
}

pub struct App {
    ctx: AppContext,
    sidebar: Sidebar,
    /// Last path of the previous run, the target of `/last`.
    previous_path: Option<String>,
    current_path: String,
    route: Option<Route>,
    page: Option<Page>,
    session_events: Receiver<SessionEvent>,
}

impl App {
    /// Opens the store named by `config.storage`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let store = SharedStore::new(store::open(&config.storage)?);
        Self::with_store(config, store)
    }

    pub fn with_store(config: ClientConfig, store: SharedStore) -> Result<Self> {
        let ctx = AppContext::new(config, store)?;
        let sidebar = Sidebar::load(ctx.store().clone(), ctx.config());
        let previous_path = load_last_path(ctx.store());
        let session_events = ctx.session().subscribe();
        Ok(Self {
            ctx,
            sidebar,
            previous_path,
            current_path: String::new(),
            route: None,
            page: None,
            session_events,
        })
    }

    /// Refreshes the stored token, loads the API version and opens `path`.
    pub fn start(&mut self, path: &str) -> BootstrapOutcome {
        let outcome = session::bootstrap(self.ctx.client());
        tracing::info!(?outcome, "session bootstrap");
        self.sidebar.refresh_api_version(self.ctx.client());
        self.drain_session_events();
        self.navigate(path);
        outcome
    }

    /// Resolves `path` through the guard, following redirects, and builds
    /// the page it lands on.
    pub fn navigate(&mut self, path: &str) -> Option<&Route> {
        let mut target = path.to_string();
        for _ in 0..MAX_REDIRECTS {
            let auth = AuthState::from_session(self.ctx.session());
            match routing::resolve(&target, &auth, self.previous_path.as_deref()) {
                Resolution::Redirect(next) => {
                    tracing::debug!(from = %target, to = %next, "redirect");
                    target = next;
                }
                Resolution::Render(route) => match self.enter(&target, route) {
                    Outcome::Stay => return self.route.as_ref(),
                    Outcome::Navigate(next) => target = next,
                },
            }
        }
        tracing::warn!(path, "redirect limit reached");
        self.route.as_ref()
    }

    fn enter(&mut self, path: &str, route: Route) -> Outcome {
        if let Err(err) = record_last_path(self.ctx.store(), path) {
            tracing::warn!("record last path: {:#}", err);
        }
        self.current_path = path.to_string();
        let mut page = Page::for_route(&self.ctx, &route);
        self.route = Some(route);

        let outcome = match &mut page {
            Page::Login(view) => match query_param(path, "code") {
                Some(code) => view.handle_callback(&code),
                None => Outcome::Stay,
            },
            Page::TicketList(view) => view.load(),
            Page::TicketContent(view) => view.load(),
            Page::Create(_) => Outcome::Stay,
        };
        self.page = Some(page);
        outcome
    }

    /// Acts on what a view returned. Also re-checks the session, since any
    /// request may have cleared it.
    pub fn handle(&mut self, outcome: Outcome) {
        let signed_out = self.drain_session_events();
        match outcome {
            Outcome::Navigate(path) => {
                self.navigate(&path);
            }
            Outcome::Stay if signed_out => {
                let current = self.current_path.clone();
                self.navigate(&current);
            }
            Outcome::Stay => {}
        }
    }

    /// Clears the session and the recorded path, then shows the login page.
    pub fn logout(&mut self) {
        if let Err(err) = self.ctx.session().sign_out(SignOutReason::Logout) {
            tracing::warn!("logout: {:#}", err);
        }
        if let Err(err) = self.ctx.store().remove(keys::LAST_PATH) {
            tracing::warn!("clear last path: {:#}", err);
        }
        self.previous_path = None;
        self.drain_session_events();
        self.navigate(LOGIN_PATH);
    }

    /// Returns whether a sign-out was among the pending events.
    fn drain_session_events(&mut self) -> bool {
        let mut signed_out = false;
        while let Ok(event) = self.session_events.try_recv() {
            tracing::debug!(?event, "session event");
            signed_out |= matches!(event, SessionEvent::SignedOut(_));
        }
        signed_out
    }

    pub fn context(&self) -> &AppContext {
        &self.ctx
    }

    pub fn route(&self) -> Option<&Route> {
        self.route.as_ref()
    }

    pub fn current_path(&self) -> &str {
        &self.current_path
    }

    pub fn page(&self) -> Option<&Page> {
        self.page.as_ref()
    }

    pub fn page_mut(&mut self) -> Option<&mut Page> {
        self.page.as_mut()
    }

    pub fn sidebar(&self) -> &Sidebar {
        &self.sidebar
    }

    pub fn sidebar_mut(&mut self) -> &mut Sidebar {
        &mut self.sidebar
    }

    pub fn sidebar_visible(&self) -> bool {
        Sidebar::is_visible_on(&self.current_path)
    }
}

#[cfg(test)]
#[path = "tests/app_tests.rs"]
mod tests;
