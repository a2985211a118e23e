use std::collections::HashMap;

use crate::app::AppContext;
use crate::cancel::{CancelToken, RequestScope, RequestTicket};
use crate::error::{ApiError, ApiResult};
use crate::model::{Ticket, TicketId, TicketUpdate, User, UserId, UserRef};
use crate::routing::{Route, TICKET_LIST_PATH};

use super::{Outcome, Step};

mod sort;

pub use self::sort::{sort_key, sort_tickets};

/// Access-control editor for one ticket.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditState {
    pub ticket: TicketId,
    pub public: bool,
}

/// List load ready to run; owns everything it needs.
pub struct ListLoad {
    ctx: AppContext,
    ticket: RequestTicket,
    user: Option<UserId>,
    fetch_profile: bool,
}

pub struct ListLoaded {
    ticket: RequestTicket,
    tickets: ApiResult<Vec<TicketId>>,
    profile: Option<ApiResult<User>>,
}

impl ListLoad {
    pub fn run(self) -> ListLoaded {
        let token = self.ticket.token();
        let profile = match (self.fetch_profile, self.user) {
            (true, Some(user)) => Some(self.ctx.call(token, |c| c.get_user(user))),
            _ => None,
        };
        let tickets = self.ctx.call(token, |c| c.list_tickets(self.user));
        ListLoaded {
            ticket: self.ticket,
            tickets,
            profile,
        }
    }
}

pub struct TicketListView {
    ctx: AppContext,
    user: Option<UserId>,
    tickets: Option<Vec<TicketId>>,
    display_user: Option<User>,
    ascending: bool,
    edit: Option<EditState>,
    last_edit: Option<TicketId>,
    info: HashMap<TicketId, Ticket>,
    scope: RequestScope,
}

impl TicketListView {
    /// List of `user`'s tickets, or the caller's own when `None`.
    pub fn new(ctx: AppContext, user: Option<UserId>) -> Self {
        Self {
            ctx,
            user,
            tickets: None,
            display_user: None,
            ascending: false,
            edit: None,
            last_edit: None,
            info: HashMap::new(),
            scope: RequestScope::new(),
        }
    }

    fn own_id(&self) -> Option<UserId> {
        self.ctx.identity().map(|i| i.id)
    }

    /// Whether the list belongs to the signed-in user. Only then can its
    /// tickets be edited or deleted.
    pub fn is_self(&self) -> bool {
        match self.user {
            None => true,
            Some(id) => self.own_id() == Some(id),
        }
    }

    pub fn begin_load(&mut self) -> Step<ListLoad> {
        let mut fetch_profile = false;
        if !self.is_self() {
            let is_admin = self.ctx.identity().is_some_and(|i| i.is_admin);
            if !is_admin {
                self.scope.cancel();
                return Step::Done(Outcome::navigate(TICKET_LIST_PATH));
            }
            fetch_profile = true;
        } else {
            self.display_user = None;
        }

        self.tickets = None;
        Step::Request(ListLoad {
            ctx: self.ctx.clone(),
            ticket: self.scope.begin(),
            user: self.user,
            fetch_profile,
        })
    }

    /// Applies a finished load. Returns `false` when the result was stale
    /// and got dropped.
    pub fn apply_load(&mut self, loaded: ListLoaded) -> bool {
        if !self.scope.accepts(&loaded.ticket) {
            tracing::debug!(generation = loaded.ticket.generation(), "drop stale ticket list");
            return false;
        }

        match loaded.profile {
            Some(Ok(user)) => self.display_user = Some(user),
            Some(Err(err)) => tracing::warn!("load list owner profile: {}", err),
            None => {}
        }

        match loaded.tickets {
            Ok(ids) => self.tickets = Some(ids),
            Err(ApiError::Cancelled) => {}
            Err(err) => {
                if !err.is_transport() {
                    self.ctx.messages().error(format!(
                        "Get ticket list failed, detail: {}",
                        err.display_detail()
                    ));
                }
            }
        }
        true
    }

    pub fn load(&mut self) -> Outcome {
        match self.begin_load() {
            Step::Request(req) => {
                let loaded = req.run();
                self.apply_load(loaded);
                Outcome::Stay
            }
            Step::Done(outcome) => outcome,
        }
    }

    /// Drops the current list and cached rows, then reloads.
    pub fn refresh(&mut self) -> Outcome {
        self.last_edit = None;
        self.info.clear();
        self.load()
    }

    /// `None` while loading or after a failed load.
    pub fn tickets(&self) -> Option<&[TicketId]> {
        self.tickets.as_deref()
    }

    pub fn sorted(&self) -> Option<Vec<TicketId>> {
        self.tickets
            .as_deref()
            .map(|ids| sort_tickets(ids, self.ascending))
    }

    pub fn is_ascending(&self) -> bool {
        self.ascending
    }

    pub fn toggle_order(&mut self) {
        self.ascending = !self.ascending;
    }

    pub fn display_user(&self) -> Option<&User> {
        self.display_user.as_ref()
    }

    pub fn title(&self) -> String {
        match &self.display_user {
            Some(user) => format!("Ticket List - {}", user.display_name),
            None => "Ticket List".to_string(),
        }
    }

    /// Path of a ticket's content page.
    pub fn ticket_path(&self, ticket: &TicketId) -> String {
        let user = match self.user {
            Some(id) => UserRef::Id(id),
            None => UserRef::from_option(self.own_id()),
        };
        Route::TicketContent {
            user,
            ticket: ticket.clone(),
            file: None,
        }
        .path()
    }

    /// Row metadata, fetched on first use and cached until the next refresh.
    pub fn ticket_info(&mut self, ticket: &TicketId) -> Option<&Ticket> {
        if !self.info.contains_key(ticket) {
            let fetched = {
                let token = CancelToken::new();
                self.ctx.call(&token, |c| c.get_ticket(ticket, self.user))
            };
            match fetched {
                Ok(info) => {
                    self.info.insert(ticket.clone(), info);
                }
                Err(err) => {
                    tracing::warn!(ticket = %ticket, "load ticket info: {}", err);
                    return None;
                }
            }
        }
        self.info.get(ticket)
    }

    pub fn last_edited(&self) -> Option<&TicketId> {
        self.last_edit.as_ref()
    }

    pub fn edit_state(&self) -> Option<&EditState> {
        self.edit.as_ref()
    }

    pub fn open_edit(&mut self, ticket: TicketId, public: bool) {
        if !self.is_self() {
            return;
        }
        self.last_edit = Some(ticket.clone());
        self.edit = Some(EditState { ticket, public });
    }

    pub fn set_edit_public(&mut self, public: bool) {
        if let Some(edit) = &mut self.edit {
            edit.public = public;
        }
    }

    pub fn cancel_edit(&mut self) {
        self.edit = None;
    }

    /// Saves the open edit. The editor closes and the list reloads whether
    /// or not the save went through.
    pub fn save_edit(&mut self) -> Outcome {
        let Some(edit) = self.edit.take() else {
            return Outcome::Stay;
        };

        {
            let _loading = self.ctx.loading().start();
            let token = CancelToken::new();
            let update = TicketUpdate::public(edit.public);
            match self
                .ctx
                .call(&token, |c| c.modify_ticket(&edit.ticket, &update))
            {
                Ok(_) => {
                    self.ctx.messages().info("Save succeed");
                }
                Err(err) => {
                    tracing::warn!(ticket = %edit.ticket, "save ticket access: {}", err);
                    self.ctx.messages().error("Save failed");
                }
            }
        }

        self.info.remove(&edit.ticket);
        self.load()
    }

    /// Deletes one of the caller's tickets. On success it leaves the list;
    /// on failure it stays.
    pub fn delete(&mut self, ticket: &TicketId) -> bool {
        if !self.is_self() {
            return false;
        }
        let _loading = self.ctx.loading().start();
        let token = CancelToken::new();
        match self.ctx.call(&token, |c| c.delete_ticket(ticket)) {
            Ok(()) => {
                self.ctx.messages().info("Delete succeed");
                if let Some(ids) = &mut self.tickets {
                    ids.retain(|id| id != ticket);
                }
                self.info.remove(ticket);
                true
            }
            Err(err) => {
                tracing::warn!(ticket = %ticket, "delete ticket: {}", err);
                self.ctx.messages().error("Delete failed");
                false
            }
        }
    }
}

/// Short row label: `2024/01/15 12:30:45 deadbeef`. Ids that do not have
/// the timestamp-hash shape are shown as they are.
pub fn preview_name(id: &str) -> String {
    let Some((stamp, hash)) = id.split_once('H') else {
        return id.to_string();
    };
    let stamp = stamp.split('.').next().unwrap_or(stamp);
    let Some((date, time)) = stamp.split_once('T') else {
        return id.to_string();
    };
    let hash: String = hash.chars().take(8).collect();
    format!("{} {} {}", date.replace('-', "/"), time.replace('_', ":"), hash)
}

#[cfg(test)]
#[path = "../tests/views/ticket_list_tests.rs"]
mod tests;
