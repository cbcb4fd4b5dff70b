//! Context-bound async tasks with cooperative cancellation
//!
//! A [`Context`] is the environment every [`Task`] runs in. It carries a
//! cancellation signal (a `tokio_util` [`CancellationToken`]) together with the
//! cause that was recorded when it fired. Contexts form a tree: cancelling a
//! parent cancels all of its children, and a child cancelled through its parent
//! reports the parent's cause.
//!
//! Cancellation is cooperative. Nothing here aborts a running future; instead
//! the retry machinery checks the context at well-defined points:
//!
//! - before every step of [`TaskMonad`]'s tail-recursive loop, which is
//!   immediately before each attempt of a retry loop, and
//! - before every delay, and while waiting: [`sleep`] races the timer against
//!   the cancellation signal.
//!
//! # Example
//!
//! ```rust
//! use eddy::context::{self, Context, Task, Cancelled};
//! use eddy::retry::{RetryPolicy, RetryStatus};
//! use std::time::Duration;
//!
//! #[derive(Debug, PartialEq)]
//! enum FetchError {
//!     Unavailable,
//!     Cancelled(Cancelled),
//! }
//!
//! impl From<Cancelled> for FetchError {
//!     fn from(err: Cancelled) -> Self {
//!         FetchError::Cancelled(err)
//!     }
//! }
//!
//! # tokio_test::block_on(async {
//! let policy = RetryPolicy::limit_retries(3)
//!     .concat(RetryPolicy::constant_delay(Duration::from_millis(1)));
//!
//! let fetch = context::retrying(
//!     policy,
//!     |status: RetryStatus| {
//!         Task::new(move |_ctx: Context| async move {
//!             if status.iter_number < 2 {
//!                 Err(FetchError::Unavailable)
//!             } else {
//!                 Ok("payload")
//!             }
//!         })
//!     },
//!     |result: &Result<&str, FetchError>| matches!(result, Err(FetchError::Unavailable)),
//! );
//!
//! let result = fetch(RetryStatus::default()).run(Context::background()).await;
//! assert_eq!(result, Ok("payload"));
//! # });
//! ```

mod ap;
mod error;
mod retry;
mod task;

pub use ap::ap_par;
pub use error::{CancelCause, Cancelled};
pub use retry::retrying;
pub use task::{Task, TaskMonad};

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// The environment of a [`Task`]: a cancellation signal plus its cause.
///
/// Cloning is cheap and clones observe the same signal.
#[derive(Debug, Clone)]
pub struct Context {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    token: CancellationToken,
    cause: OnceLock<CancelCause>,
    parent: Option<Context>,
}

/// Cancels the [`Context`] it was created with.
///
/// Dropping the handle does not cancel anything.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    ctx: Context,
}

impl Context {
    /// A root context that is never cancelled on its own.
    pub fn background() -> Self {
        Context {
            inner: Arc::new(Inner {
                token: CancellationToken::new(),
                cause: OnceLock::new(),
                parent: None,
            }),
        }
    }

    /// Derive a child context and the handle that cancels it.
    ///
    /// The child is also cancelled whenever `self` is.
    ///
    /// ```rust
    /// use eddy::context::{CancelCause, Context};
    ///
    /// let parent = Context::background();
    /// let (child, handle) = parent.with_cancel();
    ///
    /// handle.cancel_with(CancelCause::Reason("shutting down".into()));
    /// assert!(child.is_cancelled());
    /// assert!(!parent.is_cancelled());
    /// assert_eq!(child.cause(), Some(CancelCause::Reason("shutting down".into())));
    /// ```
    pub fn with_cancel(&self) -> (Context, CancelHandle) {
        let child = Context {
            inner: Arc::new(Inner {
                token: self.inner.token.child_token(),
                cause: OnceLock::new(),
                parent: Some(self.clone()),
            }),
        };
        let handle = CancelHandle { ctx: child.clone() };
        (child, handle)
    }

    /// Derive a child context that cancels itself with
    /// [`CancelCause::DeadlineExceeded`] once `timeout` has elapsed.
    ///
    /// The timer task ends as soon as the child is cancelled by any means.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub fn with_timeout(&self, timeout: Duration) -> (Context, CancelHandle) {
        let (child, handle) = self.with_cancel();
        let watched = child.clone();
        tokio::spawn(async move {
            tokio::select! {
                () = watched.cancelled() => {}
                () = tokio::time::sleep(timeout) => watched.cancel(CancelCause::DeadlineExceeded),
            }
        });
        (child, handle)
    }

    /// Returns true once the context (or any ancestor) has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.inner.token.is_cancelled()
    }

    /// Wait until the context is cancelled.
    pub async fn cancelled(&self) {
        self.inner.token.cancelled().await
    }

    /// The cancellation cause, or `None` while the context is live.
    ///
    /// The first recorded cause wins. A context cancelled through an ancestor
    /// reports the nearest recorded cause up the chain.
    pub fn cause(&self) -> Option<CancelCause> {
        if !self.is_cancelled() {
            return None;
        }
        let mut current = self;
        loop {
            if let Some(cause) = current.inner.cause.get() {
                return Some(cause.clone());
            }
            match &current.inner.parent {
                Some(parent) if parent.is_cancelled() => current = parent,
                _ => return Some(CancelCause::Canceled),
            }
        }
    }

    /// The cancellation as an error, or `None` while the context is live.
    pub fn error(&self) -> Option<Cancelled> {
        self.cause().map(Cancelled::new)
    }

    /// The underlying token, for interop with other `tokio_util` users.
    pub fn token(&self) -> &CancellationToken {
        &self.inner.token
    }

    fn cancel(&self, cause: CancelCause) {
        // a context cancelled through an ancestor keeps reporting that cause
        if self.is_cancelled() {
            return;
        }
        let _ = self.inner.cause.set(cause);
        self.inner.token.cancel();
    }
}

impl Default for Context {
    fn default() -> Self {
        Context::background()
    }
}

impl CancelHandle {
    /// Cancel with [`CancelCause::Canceled`].
    pub fn cancel(&self) {
        self.ctx.cancel(CancelCause::Canceled);
    }

    /// Cancel with a specific cause. Ignored if already cancelled.
    pub fn cancel_with(&self, cause: CancelCause) {
        self.ctx.cancel(cause);
    }

    /// Returns true once the controlled context is cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.ctx.is_cancelled()
    }
}

/// Wait `duration` unless `ctx` is cancelled first.
///
/// Refuses to start on an already cancelled context. While waiting, the timer
/// races the cancellation signal; whichever side loses is dropped, so no timer
/// outlives the call.
pub async fn sleep(ctx: &Context, duration: Duration) -> Result<(), Cancelled> {
    if let Some(err) = ctx.error() {
        return Err(err);
    }
    if duration.is_zero() {
        return Ok(());
    }
    tokio::select! {
        biased;
        () = ctx.cancelled() => Err(ctx.error().unwrap_or_else(|| Cancelled::new(CancelCause::Canceled))),
        () = tokio::time::sleep(duration) => Ok(()),
    }
}

#[cfg(feature = "tracing")]
fn log_cancelled(err: &Cancelled, at: &'static str) {
    tracing::debug!(cause = %err, at, "context cancelled, short-circuiting");
}

#[cfg(not(feature = "tracing"))]
fn log_cancelled(_err: &Cancelled, _at: &'static str) {}
