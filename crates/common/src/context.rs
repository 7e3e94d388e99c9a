//! Request context: cooperative cancellation plus an optional deadline
//!
//! A [`Context`] travels with every transport call. Every suspending
//! operation (DNS lookups, HTTP I/O) races against [`Context::done`], and
//! the retry kernel polls [`Context::is_done`] between attempts.
//!
//! Contexts form a tree: [`Context::with_cancel`] and
//! [`Context::with_timeout`] derive children that are cancelled with their
//! parent but can be cancelled (or expire) on their own without affecting
//! the parent.
//!
//! # Examples
//!
//! ```
//! use std::time::Duration;
//!
//! use agora_rest_common::Context;
//!
//! let root = Context::background();
//! let call = root.with_timeout(Duration::from_secs(10));
//! assert!(call.deadline().is_some());
//! assert!(root.deadline().is_none());
//!
//! call.cancel();
//! assert!(call.is_done());
//! assert!(!root.is_done());
//! ```

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use agora_rest_domain::RestError;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Cancellation scope for a single logical call
#[derive(Debug, Clone)]
pub struct Context {
    token: CancellationToken,
    deadline: Option<Instant>,
    request_id: Option<Arc<str>>,
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

impl Context {
    /// Root context: never cancelled by itself, no deadline.
    pub fn background() -> Self {
        Self { token: CancellationToken::new(), deadline: None, request_id: None }
    }

    /// Child context that can be cancelled independently of `self`.
    pub fn with_cancel(&self) -> Self {
        Self {
            token: self.token.child_token(),
            deadline: self.deadline,
            request_id: self.request_id.clone(),
        }
    }

    /// Child context whose deadline is the earlier of the parent's deadline
    /// and `now + timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        self.with_deadline(candidate)
    }

    /// Child context expiring at `deadline` (or the parent's, if earlier).
    pub fn with_deadline(&self, deadline: Instant) -> Self {
        let deadline = match self.deadline {
            Some(parent) if parent < deadline => parent,
            _ => deadline,
        };
        Self {
            token: self.token.child_token(),
            deadline: Some(deadline),
            request_id: self.request_id.clone(),
        }
    }

    /// Copy of this context tagged with a caller-supplied request id, used
    /// in log records.
    pub fn with_request_id(&self, request_id: impl Into<String>) -> Self {
        Self {
            token: self.token.clone(),
            deadline: self.deadline,
            request_id: Some(Arc::from(request_id.into())),
        }
    }

    /// Cancel this context and all contexts derived from it.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn request_id(&self) -> Option<&str> {
        self.request_id.as_deref()
    }

    /// Time left before the deadline; `None` when there is no deadline.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline.map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// The reason this context is done, if it is.
    ///
    /// Explicit cancellation takes precedence over an expired deadline.
    pub fn err(&self) -> Option<RestError> {
        if self.token.is_cancelled() {
            return Some(RestError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(RestError::DeadlineExceeded),
            _ => None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Resolve once the context is cancelled or its deadline passes,
    /// yielding the corresponding error.
    pub async fn done(&self) -> RestError {
        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    biased;
                    () = self.token.cancelled() => RestError::Cancelled,
                    () = tokio::time::sleep_until(deadline) => RestError::DeadlineExceeded,
                }
            }
            None => {
                self.token.cancelled().await;
                RestError::Cancelled
            }
        }
    }

    /// Drive `future` to completion unless the context finishes first.
    pub async fn run<F>(&self, future: F) -> Result<F::Output, RestError>
    where
        F: Future,
    {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            output = future => Ok(output),
        }
    }
}
