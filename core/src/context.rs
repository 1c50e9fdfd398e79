//! Cancellation and deadline signal carried by a request.
//!
//! # Design
//! Calls are blocking, so cancellation is cooperative: the executor checks
//! the token right before dispatch, and the remaining time until the deadline
//! bounds the transport call itself.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

/// Handle used to request cancellation. Clones observe the same state.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    token: CancellationToken,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// A token that is cancelled together with this one, but can also be
    /// cancelled on its own.
    pub fn child(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Optional deadline plus optional cancellation token.
#[derive(Debug, Clone, Default)]
pub struct Context {
    deadline: Option<Instant>,
    cancel: Option<CancelToken>,
}

impl Context {
    /// No deadline, never cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    /// Deadline `timeout` from now. A timeout too large to represent as an
    /// instant leaves the context without a deadline.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.with_deadline(deadline),
            None => self,
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    /// Time left before the deadline, `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }
}
