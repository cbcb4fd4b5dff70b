//! Testing utilities for retry loops
//!
//! [`Recorded`] wraps any monad dictionary and records every delay the retry
//! loop asks for. By default it skips the actual wait, which keeps tests fast
//! while still checking the exact delay sequence.
//!
//! # Example
//!
//! ```rust
//! use eddy::monad::Identity;
//! use eddy::retry::{retrying, RetryPolicy, RetryStatus};
//! use eddy::testing::Recorded;
//! use std::time::Duration;
//!
//! let dict = Recorded::new(Identity);
//! let policy = RetryPolicy::limit_retries(3)
//!     .concat(RetryPolicy::exponential_backoff(Duration::from_secs(1)));
//!
//! // Always asks for a retry; finishes instantly because waits are skipped
//! let run = retrying(dict.clone(), policy, |s: RetryStatus| s.iter_number, |_: &u32| true);
//!
//! assert_eq!(run(RetryStatus::default()), 3);
//! assert_eq!(
//!     dict.delays(),
//!     vec![Duration::from_secs(1), Duration::from_secs(2), Duration::from_secs(4)]
//! );
//! ```

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use crate::monad::{Monad, MonadDelay, MonadRec};
use crate::monoid::{fold_all, Sum};
use crate::trampoline::Trampoline;

/// A dictionary wrapper that records requested delays.
///
/// Clones share the same log.
#[derive(Debug, Clone)]
pub struct Recorded<D> {
    inner: D,
    log: Arc<Mutex<Vec<Duration>>>,
    wait: bool,
}

impl<D> Recorded<D> {
    /// Record delays and skip the waiting (the inner `delay` runs with zero).
    pub fn new(inner: D) -> Self {
        Recorded {
            inner,
            log: Arc::new(Mutex::new(Vec::new())),
            wait: false,
        }
    }

    /// Record delays and still wait them out through the inner dictionary.
    pub fn waiting(inner: D) -> Self {
        Recorded {
            wait: true,
            ..Recorded::new(inner)
        }
    }

    /// Delays recorded so far, in order.
    pub fn delays(&self) -> Vec<Duration> {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Sum of the recorded delays.
    pub fn total(&self) -> Duration {
        fold_all(self.delays().into_iter().map(Sum)).0
    }

    /// Forget recorded delays.
    pub fn clear(&self) {
        self.log
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// The wrapped dictionary.
    pub fn inner(&self) -> &D {
        &self.inner
    }
}

impl<D: Monad> Monad for Recorded<D> {
    type Of<T> = D::Of<T>;

    fn of<T>(&self, value: T) -> D::Of<T>
    where
        T: Send + 'static,
    {
        self.inner.of(value)
    }

    fn chain<X, Y, F>(&self, ma: D::Of<X>, f: F) -> D::Of<Y>
    where
        X: Send + 'static,
        Y: Send + 'static,
        F: FnOnce(X) -> D::Of<Y> + Send + 'static,
    {
        self.inner.chain(ma, f)
    }
}

impl<D: MonadRec> MonadRec for Recorded<D> {
    fn tail_rec_m<S, R, F>(&self, initial: S, step: F) -> D::Of<R>
    where
        S: Send + 'static,
        R: Send + 'static,
        F: FnMut(S) -> D::Of<Trampoline<S, R>> + Send + 'static,
    {
        self.inner.tail_rec_m(initial, step)
    }
}

impl<D: MonadDelay> MonadDelay for Recorded<D> {
    fn delay<X>(&self, duration: Duration, ma: D::Of<X>) -> D::Of<X>
    where
        X: Send + 'static,
    {
        let log = Arc::clone(&self.log);
        let recorded = self.inner.map(ma, move |x| {
            log.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(duration);
            x
        });
        let wait = if self.wait { duration } else { Duration::ZERO };
        self.inner.delay(wait, recorded)
    }
}

/// Proptest strategy producing plausible retry statuses.
#[cfg(feature = "proptest")]
pub fn arb_status() -> impl proptest::strategy::Strategy<Value = crate::retry::RetryStatus> {
    use proptest::prelude::*;

    (0u32..1_000, 0u64..3_600_000, proptest::option::of(0u64..60_000)).prop_map(
        |(iter_number, cumulative, previous)| crate::retry::RetryStatus {
            iter_number,
            cumulative_delay: Duration::from_millis(cumulative),
            previous_delay: previous.map(Duration::from_millis),
        },
    )
}
