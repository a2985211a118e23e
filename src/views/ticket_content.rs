use std::fs;
use std::path::Path;

use anyhow::Context;

use crate::app::AppContext;
use crate::cancel::{CancelToken, RequestScope, RequestTicket};
use crate::error::{ApiError, ApiResult};
use crate::model::{Ticket, TicketId, User, UserId, UserRef};
use crate::routing::{Route, TICKET_LIST_PATH};
use crate::time_utils::display_utc_timestamp;

use super::{Outcome, Step};

/// File name suggested for the zip archive.
pub const ARCHIVE_FILE_NAME: &str = "download.zip";

pub struct ContentLoad {
    ctx: AppContext,
    ticket: RequestTicket,
    user: Option<UserId>,
    ticket_id: TicketId,
    file: Option<String>,
}

pub struct ContentLoaded {
    ticket: RequestTicket,
    info: ApiResult<Ticket>,
    author: Option<ApiResult<User>>,
    content: Option<ApiResult<String>>,
}

impl ContentLoad {
    /// Ticket metadata first, then its author and the open file, both
    /// addressed through the ticket's real author id.
    pub fn run(self) -> ContentLoaded {
        let token = self.ticket.token();
        let info = self
            .ctx
            .call(token, |c| c.get_ticket(&self.ticket_id, self.user));

        let (author, content) = match &info {
            Ok(ticket) => {
                let author_id = ticket.author_id;
                let author = self.ctx.call(token, |c| c.get_user(author_id));
                let content = self.file.as_deref().map(|file| {
                    self.ctx.call(token, |c| {
                        c.get_ticket_file(&ticket.ticket_id, file, Some(author_id))
                    })
                });
                (Some(author), content)
            }
            Err(_) => (None, None),
        };

        ContentLoaded {
            ticket: self.ticket,
            info,
            author,
            content,
        }
    }
}

pub struct TicketContentView {
    ctx: AppContext,
    user: UserRef,
    ticket_id: TicketId,
    file: Option<String>,
    ticket: Option<Ticket>,
    author: Option<User>,
    content: Option<String>,
    scope: RequestScope,
}

impl TicketContentView {
    pub fn new(ctx: AppContext, user: UserRef, ticket_id: TicketId, file: Option<String>) -> Self {
        Self {
            ctx,
            user,
            ticket_id,
            file,
            ticket: None,
            author: None,
            content: None,
            scope: RequestScope::new(),
        }
    }

    pub fn begin_load(&mut self) -> Step<ContentLoad> {
        if self.ticket_id.as_str().is_empty() {
            self.scope.cancel();
            return Step::Done(Outcome::navigate(TICKET_LIST_PATH));
        }
        self.ticket = None;
        self.author = None;
        self.content = None;
        Step::Request(ContentLoad {
            ctx: self.ctx.clone(),
            ticket: self.scope.begin(),
            user: self.user.user_id(),
            ticket_id: self.ticket_id.clone(),
            file: self.file.clone(),
        })
    }

    pub fn apply_load(&mut self, loaded: ContentLoaded) -> Outcome {
        if !self.scope.accepts(&loaded.ticket) {
            tracing::debug!(generation = loaded.ticket.generation(), "drop stale ticket content");
            return Outcome::Stay;
        }

        let ticket = match loaded.info {
            Ok(ticket) => ticket,
            Err(ApiError::Cancelled) => return Outcome::Stay,
            Err(err) => {
                tracing::warn!(ticket = %self.ticket_id, "load ticket: {}", err);
                self.ctx.messages().error("Get ticket info failed");
                return Outcome::navigate(TICKET_LIST_PATH);
            }
        };
        self.ticket = Some(ticket);

        match loaded.author {
            Some(Ok(author)) => self.author = Some(author),
            Some(Err(err)) => tracing::warn!("load ticket author: {}", err),
            None => {}
        }

        match loaded.content {
            Some(Ok(content)) => {
                self.content = Some(content);
                Outcome::Stay
            }
            Some(Err(ApiError::Cancelled)) | None => Outcome::Stay,
            Some(Err(err)) => {
                if !err.is_transport() {
                    self.ctx.messages().error(format!(
                        "Get file content failed, {}",
                        err.display_detail()
                    ));
                }
                Outcome::navigate(self.ticket_page_path())
            }
        }
    }

    pub fn load(&mut self) -> Outcome {
        match self.begin_load() {
            Step::Request(req) => {
                let loaded = req.run();
                self.apply_load(loaded)
            }
            Step::Done(outcome) => outcome,
        }
    }

    pub fn ticket_id(&self) -> &TicketId {
        &self.ticket_id
    }

    pub fn ticket(&self) -> Option<&Ticket> {
        self.ticket.as_ref()
    }

    pub fn author(&self) -> Option<&User> {
        self.author.as_ref()
    }

    pub fn open_file_name(&self) -> Option<&str> {
        self.file.as_deref()
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Content split into numbered lines, starting at 1.
    pub fn content_lines(&self) -> Vec<(usize, &str)> {
        match &self.content {
            Some(content) => content.split('\n').enumerate().map(|(i, l)| (i + 1, l)).collect(),
            None => Vec::new(),
        }
    }

    pub fn created_at(&self) -> Option<String> {
        self.ticket
            .as_ref()
            .map(|t| display_utc_timestamp(t.create_utc_timestamp))
    }

    pub fn access_label(&self) -> Option<&'static str> {
        self.ticket
            .as_ref()
            .map(|t| if t.public { "Public" } else { "Private" })
    }

    /// Path of this ticket without an open file.
    pub fn ticket_page_path(&self) -> String {
        Route::TicketContent {
            user: self.user,
            ticket: self.ticket_id.clone(),
            file: None,
        }
        .path()
    }

    /// Each file of the ticket with the path that opens it.
    pub fn file_links(&self) -> Vec<(String, String)> {
        let Some(ticket) = &self.ticket else {
            return Vec::new();
        };
        ticket
            .files
            .iter()
            .map(|name| {
                let path = Route::TicketContent {
                    user: self.user,
                    ticket: self.ticket_id.clone(),
                    file: Some(name.clone()),
                }
                .path();
                (name.clone(), path)
            })
            .collect()
    }

    pub fn back(&self) -> Outcome {
        Outcome::navigate(self.ticket_page_path())
    }

    /// Downloads every file of the ticket as one zip archive into `dest`.
    pub fn download_zip(&self, dest: &Path) -> bool {
        let Some(ticket) = &self.ticket else {
            return false;
        };
        let messages = self.ctx.messages();
        messages.info("Start download");

        let token = CancelToken::new();
        let bytes = match self.ctx.call(&token, |c| {
            c.download_ticket_zip(&ticket.ticket_id, Some(ticket.author_id))
        }) {
            Ok(bytes) => bytes,
            Err(err) => {
                tracing::warn!(ticket = %ticket.ticket_id, "download ticket: {}", err);
                if !err.is_transport() {
                    messages.error(format!("Download failed, {}", err.display_detail()));
                }
                return false;
            }
        };

        match fs::write(dest, &bytes).with_context(|| format!("write {}", dest.display())) {
            Ok(()) => {
                messages.info("Download finished");
                true
            }
            Err(err) => {
                tracing::warn!("save ticket archive: {:#}", err);
                messages.error(format!("Download failed, {:#}", err));
                false
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/views/ticket_content_tests.rs"]
mod tests;
