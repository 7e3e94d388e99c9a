//! Retry kernel with injectable stop, delay and failure-hook policies
//!
//! The kernel owns no timing or attempt budget of its own: callers supply
//! `should_stop` (usually "is the context done?"), a per-attempt `delay`,
//! and an optional `on_failed_attempt` hook. An error can veto further
//! attempts by implementing [`RetryVeto`].
//!
//! Loop, per iteration:
//! 1. `should_stop()` true: return the last error, or
//!    [`RetryError::NotAttempted`] if nothing ran yet.
//! 2. Run the attempt; success ends the loop.
//! 3. A vetoing error is returned immediately, skipping the hook and delay.
//! 4. Call `on_failed_attempt(&error)`.
//! 5. If `should_stop()` is still false, sleep `delay(retry_count)`.
//! 6. Increment `retry_count` and loop.

use std::future::Future;
use std::time::Duration;

use agora_rest_domain::RestError;
use thiserror::Error;
use tracing::debug;

/// Errors that can veto further retries.
pub trait RetryVeto {
    /// `true` stops the kernel immediately with this error.
    fn vetoes_retry(&self) -> bool;
}

impl RetryVeto for RestError {
    fn vetoes_retry(&self) -> bool {
        RestError::vetoes_retry(self)
    }
}

/// Why the kernel gave up
#[derive(Debug, Error)]
pub enum RetryError<E> {
    /// `should_stop` was already true before the first attempt.
    #[error("retry stopped before the first attempt")]
    NotAttempted,

    /// The attempt returned an error that vetoes retry.
    #[error("{0}")]
    Vetoed(E),

    /// `should_stop` turned true after at least one failed attempt.
    #[error("retry stopped after {attempts} attempts: {last}")]
    Stopped { attempts: u32, last: E },
}

impl<E> RetryError<E> {
    /// The last error observed from an attempt, if any attempt ran.
    pub fn into_last_error(self) -> Option<E> {
        match self {
            Self::NotAttempted => None,
            Self::Vetoed(error) | Self::Stopped { last: error, .. } => Some(error),
        }
    }
}

/// Result type for retry operations
pub type RetryResult<T, E> = Result<T, RetryError<E>>;

type StopFn<'a> = Box<dyn Fn() -> bool + Send + Sync + 'a>;
type DelayFn<'a> = Box<dyn Fn(u32) -> Duration + Send + Sync + 'a>;
type FailedAttemptFn<'a, E> = Box<dyn FnMut(&E) + Send + 'a>;

/// Policy bundle driving one retry loop.
///
/// ```
/// # let runtime = tokio::runtime::Runtime::new().unwrap();
/// # runtime.block_on(async {
/// use std::time::Duration;
///
/// use agora_rest_common::resilience::RetryPolicy;
/// use agora_rest_domain::RestError;
///
/// let mut calls = 0;
/// let result = RetryPolicy::<RestError>::new(|| false)
///     .delay(|_| Duration::ZERO)
///     .run(|retry_count| {
///         calls += 1;
///         async move {
///             if retry_count < 2 {
///                 Err(RestError::Network("connection reset".into()))
///             } else {
///                 Ok(retry_count)
///             }
///         }
///     })
///     .await;
/// assert_eq!(result.ok(), Some(2));
/// assert_eq!(calls, 3);
/// # });
/// ```
pub struct RetryPolicy<'a, E> {
    should_stop: StopFn<'a>,
    delay: DelayFn<'a>,
    on_failed_attempt: Option<FailedAttemptFn<'a, E>>,
}

impl<'a, E> RetryPolicy<'a, E>
where
    E: RetryVeto,
{
    /// Policy that stops when `should_stop` returns true and never delays.
    pub fn new<S>(should_stop: S) -> Self
    where
        S: Fn() -> bool + Send + Sync + 'a,
    {
        Self {
            should_stop: Box::new(should_stop),
            delay: Box::new(|_| Duration::ZERO),
            on_failed_attempt: None,
        }
    }

    /// Delay to sleep after the failed attempt numbered `retry_count`.
    pub fn delay<D>(mut self, delay: D) -> Self
    where
        D: Fn(u32) -> Duration + Send + Sync + 'a,
    {
        self.delay = Box::new(delay);
        self
    }

    /// Hook invoked with every non-vetoing failure.
    pub fn on_failed_attempt<H>(mut self, hook: H) -> Self
    where
        H: FnMut(&E) + Send + 'a,
    {
        self.on_failed_attempt = Some(Box::new(hook));
        self
    }

    /// Run `attempt(retry_count)` until it succeeds, vetoes, or the stop
    /// condition holds.
    pub async fn run<T, F, Fut>(mut self, mut attempt: F) -> RetryResult<T, E>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut retry_count: u32 = 0;
        let mut last_error: Option<E> = None;

        loop {
            if (self.should_stop)() {
                debug!(attempts = retry_count, "retry stop condition reached");
                return Err(match last_error {
                    Some(last) => RetryError::Stopped { attempts: retry_count, last },
                    None => RetryError::NotAttempted,
                });
            }

            let error = match attempt(retry_count).await {
                Ok(value) => {
                    if retry_count > 0 {
                        debug!(retries = retry_count, "operation succeeded after retries");
                    }
                    return Ok(value);
                }
                Err(error) => error,
            };

            if error.vetoes_retry() {
                debug!(attempt = retry_count, "retry vetoed by error");
                return Err(RetryError::Vetoed(error));
            }

            if let Some(hook) = self.on_failed_attempt.as_mut() {
                hook(&error);
            }
            last_error = Some(error);

            if !(self.should_stop)() {
                let delay = (self.delay)(retry_count);
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }

            retry_count = retry_count.saturating_add(1);
        }
    }
}

/// Delay policy: nothing after the first failure, `delay` after the rest.
pub fn delay_after_first(delay: Duration) -> impl Fn(u32) -> Duration + Send + Sync + Clone {
    move |retry_count| if retry_count == 0 { Duration::ZERO } else { delay }
}
