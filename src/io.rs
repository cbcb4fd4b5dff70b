//! Lazy synchronous computations
//!
//! [`IO<T>`] wraps a deferred computation that produces a `T` when [`run`](IO::run)
//! is called. Nothing happens at construction time, so an `IO` value can be
//! built, composed, and handed to a retry loop before any side effect occurs.
//!
//! [`IoMonad`] is the matching dictionary: `tail_rec_m` drives its step inside
//! a single thunk with an explicit loop, and `delay` blocks the running thread
//! before executing the wrapped computation.
//!
//! # Example
//!
//! ```
//! use eddy::io::{self, IO};
//! use eddy::retry::{RetryPolicy, RetryStatus};
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::limit_retries(3).concat(RetryPolicy::constant_delay(Duration::ZERO));
//!
//! // Pretend the service comes up on the third attempt
//! let poll = io::retrying(
//!     policy,
//!     |status: RetryStatus| IO::new(move || status.iter_number >= 2),
//!     |up: &bool| !*up,
//! );
//!
//! assert!(poll(RetryStatus::default()).run());
//! ```

use std::fmt;
use std::time::Duration;

use crate::monad::{block_for, Monad, MonadDelay, MonadRec};
use crate::retry::{self, RetryPolicy, RetryStatus};
use crate::trampoline::Trampoline;

/// A deferred synchronous computation.
pub struct IO<T> {
    thunk: Box<dyn FnOnce() -> T + Send>,
}

impl<T> IO<T> {
    /// Defer `f` until the computation is run.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        IO { thunk: Box::new(f) }
    }

    /// Execute the computation.
    pub fn run(self) -> T {
        (self.thunk)()
    }
}

impl<T: Send + 'static> IO<T> {
    /// A computation that yields `value`.
    pub fn of(value: T) -> Self {
        IO::new(move || value)
    }

    /// Transform the produced value.
    pub fn map<U, F>(self, f: F) -> IO<U>
    where
        F: FnOnce(T) -> U + Send + 'static,
    {
        IO::new(move || f(self.run()))
    }

    /// Sequence with a computation that depends on the produced value.
    pub fn and_then<U, F>(self, f: F) -> IO<U>
    where
        F: FnOnce(T) -> IO<U> + Send + 'static,
    {
        IO::new(move || f(self.run()).run())
    }

    /// Wait `duration` before running.
    pub fn delayed(self, duration: Duration) -> Self {
        IO::new(move || {
            block_for(duration);
            self.run()
        })
    }
}

impl<T> fmt::Debug for IO<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("IO(<deferred>)")
    }
}

/// Dictionary for [`IO`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IoMonad;

impl Monad for IoMonad {
    type Of<T> = IO<T>;

    fn of<T>(&self, value: T) -> IO<T>
    where
        T: Send + 'static,
    {
        IO::of(value)
    }

    fn chain<X, Y, F>(&self, ma: IO<X>, f: F) -> IO<Y>
    where
        X: Send + 'static,
        Y: Send + 'static,
        F: FnOnce(X) -> IO<Y> + Send + 'static,
    {
        ma.and_then(f)
    }
}

impl MonadRec for IoMonad {
    fn tail_rec_m<S, R, F>(&self, initial: S, mut step: F) -> IO<R>
    where
        S: Send + 'static,
        R: Send + 'static,
        F: FnMut(S) -> IO<Trampoline<S, R>> + Send + 'static,
    {
        IO::new(move || {
            let mut state = initial;
            loop {
                match step(state).run() {
                    Trampoline::Bounce(next) => state = next,
                    Trampoline::Land(result) => return result,
                }
            }
        })
    }
}

impl MonadDelay for IoMonad {
    fn delay<X>(&self, duration: Duration, ma: IO<X>) -> IO<X>
    where
        X: Send + 'static,
    {
        ma.delayed(duration)
    }
}

/// [`retry::retrying`] instantiated for [`IO`].
///
/// Failures are ordinary values here: use `A = Result<T, E>` and inspect the
/// error in `check` to decide whether another attempt is worthwhile.
pub fn retrying<A, Act, Chk>(
    policy: RetryPolicy,
    action: Act,
    check: Chk,
) -> impl Fn(RetryStatus) -> IO<A> + Clone + Send + Sync + 'static
where
    A: Send + 'static,
    Act: Fn(RetryStatus) -> IO<A> + Send + Sync + 'static,
    Chk: Fn(&A) -> bool + Send + Sync + 'static,
{
    retry::retrying(IoMonad, policy, action, check)
}
