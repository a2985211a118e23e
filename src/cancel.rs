//! Request cancellation tied to the lifetime of the view that issued it.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{ApiError, ApiResult};

#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn check(&self) -> ApiResult<()> {
        if self.is_cancelled() {
            return Err(ApiError::Cancelled);
        }
        Ok(())
    }
}

/// Handed out by `RequestScope::begin`; travels with the request and comes
/// back with its result.
#[derive(Clone, Debug)]
pub struct RequestTicket {
    generation: u64,
    token: CancelToken,
}

impl RequestTicket {
    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Generation guard for one kind of request in a view. Beginning a new
/// request cancels the previous one, and only the latest request's result
/// may be applied.
#[derive(Debug, Default)]
pub struct RequestScope {
    generation: u64,
    current: Option<CancelToken>,
}

impl RequestScope {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self) -> RequestTicket {
        self.cancel();
        self.generation += 1;
        let token = CancelToken::new();
        self.current = Some(token.clone());
        RequestTicket {
            generation: self.generation,
            token,
        }
    }

    pub fn accepts(&self, ticket: &RequestTicket) -> bool {
        ticket.generation == self.generation && !ticket.token.is_cancelled()
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.current.take() {
            token.cancel();
        }
    }
}

impl Drop for RequestScope {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
#[path = "tests/cancel_tests.rs"]
mod tests;
