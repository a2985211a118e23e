use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::app::AppContext;
use crate::cancel::CancelToken;
use crate::model::UserRef;
use crate::remote::UploadPart;
use crate::routing::Route;

use super::Outcome;

mod file_tree;

/// A file waiting to be uploaded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingFile {
    /// Name sent to the server, `/`-separated, relative to the drop root.
    pub relative_path: String,
    pub source: PathBuf,
}

pub struct CreateView {
    ctx: AppContext,
    pending: Vec<PendingFile>,
    search: String,
    public: bool,
}

impl CreateView {
    pub fn new(ctx: AppContext) -> Self {
        Self {
            ctx,
            pending: Vec::new(),
            search: String::new(),
            public: false,
        }
    }

    /// Replaces the pending list with a flat file selection.
    pub fn select_files<I>(&mut self, paths: I)
    where
        I: IntoIterator<Item = PathBuf>,
    {
        self.pending = paths
            .into_iter()
            .filter_map(|source| {
                let name = source.file_name()?.to_string_lossy().into_owned();
                Some(PendingFile {
                    relative_path: name,
                    source,
                })
            })
            .collect();
    }

    /// Adds dropped files and directories to the pending list. Directories
    /// are walked recursively. Returns how many files were added.
    pub fn drop_paths<I>(&mut self, paths: I) -> Result<usize>
    where
        I: IntoIterator<Item = PathBuf>,
    {
        let mut added = 0;
        for path in paths {
            let files = file_tree::collect_dropped(&path)?;
            added += files.len();
            self.pending.extend(files);
        }
        Ok(added)
    }

    pub fn pending(&self) -> &[PendingFile] {
        &self.pending
    }

    /// Pending files whose name contains the search text.
    pub fn visible(&self) -> Vec<&PendingFile> {
        self.pending
            .iter()
            .filter(|f| f.relative_path.contains(&self.search))
            .collect()
    }

    pub fn remove(&mut self, relative_path: &str) -> Option<PendingFile> {
        let idx = self
            .pending
            .iter()
            .position(|f| f.relative_path == relative_path)?;
        Some(self.pending.remove(idx))
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn set_public(&mut self, public: bool) {
        self.public = public;
    }

    pub fn is_public(&self) -> bool {
        self.public
    }

    /// Uploads all pending files as one ticket. On success the list empties
    /// and the shell moves to the new ticket; on failure the list is kept.
    pub fn upload(&mut self) -> Outcome {
        if self.pending.is_empty() {
            self.ctx.messages().warn("No file selected");
            return Outcome::Stay;
        }
        let _loading = self.ctx.loading().start();

        let parts = match self.read_parts() {
            Ok(parts) => parts,
            Err(err) => {
                tracing::warn!("read upload files: {:#}", err);
                self.ctx.messages().error("Upload failed");
                return Outcome::Stay;
            }
        };

        let token = CancelToken::new();
        match self
            .ctx
            .call(&token, |c| c.upload_ticket(&parts, self.public))
        {
            Ok(ticket) => {
                tracing::info!(ticket = %ticket, files = parts.len(), "ticket uploaded");
                self.ctx.messages().info("Upload succeed");
                self.pending.clear();
                let own = self.ctx.identity().map(|i| i.id);
                Outcome::navigate(
                    Route::TicketContent {
                        user: UserRef::from_option(own),
                        ticket,
                        file: None,
                    }
                    .path(),
                )
            }
            Err(err) => {
                tracing::warn!("upload ticket: {}", err);
                self.ctx.messages().error("Upload failed");
                Outcome::Stay
            }
        }
    }

    fn read_parts(&self) -> Result<Vec<UploadPart>> {
        self.pending
            .iter()
            .map(|f| {
                let bytes =
                    fs::read(&f.source).with_context(|| format!("read {}", f.source.display()))?;
                Ok(UploadPart {
                    file_name: f.relative_path.clone(),
                    bytes,
                })
            })
            .collect()
    }
}

#[cfg(test)]
#[path = "../tests/views/create_tests.rs"]
mod tests;
