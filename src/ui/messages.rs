use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

/// How long a toast stays on screen.
pub const MESSAGE_TIMEOUT: Duration = Duration::from_secs(7);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Info,
    Warn,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Level::Info => "INFO",
            Level::Warn => "WARN",
            Level::Error => "ERROR",
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageBox {
    pub level: Level,
    pub text: String,
    /// Distinguishes identical texts shown at the same time.
    pub tag: String,
    pub created_at: Instant,
}

impl MessageBox {
    pub fn expires_at(&self) -> Instant {
        self.created_at + MESSAGE_TIMEOUT
    }
}

/// Toast queue. Messages leave in the order they arrived once their
/// timeout has passed; expiry is evaluated whenever the queue is read.
#[derive(Clone, Default)]
pub struct MessageQueue {
    inner: Arc<Mutex<VecDeque<MessageBox>>>,
    seq: Arc<AtomicU64>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<MessageBox>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn push(&self, level: Level, text: impl Into<String>) -> String {
        self.push_at(level, text, Instant::now())
    }

    pub fn push_at(&self, level: Level, text: impl Into<String>, now: Instant) -> String {
        let text = text.into();
        match level {
            Level::Error => tracing::warn!(%level, "{}", text),
            _ => tracing::debug!(%level, "{}", text),
        }
        let tag = self.next_tag();
        self.lock().push_back(MessageBox {
            level,
            text,
            tag: tag.clone(),
            created_at: now,
        });
        tag
    }

    pub fn info(&self, text: impl Into<String>) -> String {
        self.push(Level::Info, text)
    }

    pub fn warn(&self, text: impl Into<String>) -> String {
        self.push(Level::Warn, text)
    }

    pub fn error(&self, text: impl Into<String>) -> String {
        self.push(Level::Error, text)
    }

    /// Messages still on screen.
    pub fn active(&self) -> Vec<MessageBox> {
        self.active_at(Instant::now())
    }

    pub fn active_at(&self, now: Instant) -> Vec<MessageBox> {
        let mut queue = self.lock();
        while queue.front().is_some_and(|m| m.expires_at() <= now) {
            queue.pop_front();
        }
        queue.iter().cloned().collect()
    }

    /// Removes one message early. Returns whether it was still queued.
    pub fn dismiss(&self, tag: &str) -> bool {
        let mut queue = self.lock();
        let before = queue.len();
        queue.retain(|m| m.tag != tag);
        queue.len() != before
    }

    fn next_tag(&self) -> String {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let mut bytes = [0u8; 8];
        match getrandom::getrandom(&mut bytes) {
            Ok(()) => format!("{:016x}", u64::from_le_bytes(bytes) ^ seq),
            Err(err) => {
                tracing::debug!("getrandom: {:?}", err);
                format!("{:016x}", seq)
            }
        }
    }
}

#[cfg(test)]
#[path = "../tests/ui/messages_tests.rs"]
mod tests;
