//! View models behind each page. A view never renders; it holds the page
//! state, talks to the API through the injected context, and tells the
//! shell where to go next.
//!
//! Loads that can be superseded are split into `begin_*` (on the view),
//! `run` (on the returned request, safe to move to another thread) and
//! `apply_*` (back on the view). Results from a stale or cancelled request
//! are dropped at apply time.

pub mod create;
pub mod login;
pub mod ticket_content;
pub mod ticket_list;

pub use self::create::{CreateView, PendingFile};
pub use self::login::LoginView;
pub use self::ticket_content::TicketContentView;
pub use self::ticket_list::TicketListView;

/// What the shell should do after a view handled an event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Stay,
    Navigate(String),
}

impl Outcome {
    pub fn navigate(path: impl Into<String>) -> Self {
        Outcome::Navigate(path.into())
    }
}

/// Either a request to run, or an outcome decided without one.
#[derive(Debug)]
pub enum Step<R> {
    Request(R),
    Done(Outcome),
}
