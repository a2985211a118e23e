//! Persistent client state: plain string key/value pairs.

use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::{Context, Result};

use crate::model::StorageConfig;

mod file;
mod memory;

pub use self::file::FileStore;
pub use self::memory::MemoryStore;

pub mod keys {
    pub const ACCESS_TOKEN: &str = "access_token";
    pub const TOKEN_TYPE: &str = "token_type";
    pub const LAST_PATH: &str = "lastPath";
    pub const SIDE_BAR: &str = "sideBar";
}

pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Opens the store the configuration points at.
pub fn open(cfg: &StorageConfig) -> Result<Box<dyn KeyValueStore>> {
    match &cfg.path {
        Some(path) => Ok(Box::new(FileStore::open(path)?)),
        None => Ok(Box::new(MemoryStore::default())),
    }
}

/// Handle onto one store shared by the session and the UI state that
/// persists alongside it (last path, sidebar).
#[derive(Clone)]
pub struct SharedStore {
    inner: Arc<Mutex<Box<dyn KeyValueStore>>>,
}

impl SharedStore {
    pub fn new(store: Box<dyn KeyValueStore>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(store)),
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(MemoryStore::default()))
    }

    fn lock(&self) -> MutexGuard<'_, Box<dyn KeyValueStore>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        self.lock().get(key)
    }

    pub fn set(&self, key: &str, value: &str) -> Result<()> {
        self.lock().set(key, value)
    }

    pub fn remove(&self, key: &str) -> Result<()> {
        self.lock().remove(key)
    }

    /// Runs `f` with the store locked so multi-key updates are not
    /// interleaved with other writers.
    pub(crate) fn with<T>(&self, f: impl FnOnce(&mut dyn KeyValueStore) -> T) -> T {
        let mut guard = self.lock();
        f(&mut **guard)
    }
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("create parent directories")?;
    }
    let tmp = path.with_extension(format!("tmp.{}", std::process::id()));
    fs::write(&tmp, bytes).with_context(|| format!("write temp file {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
