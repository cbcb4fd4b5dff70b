use std::fmt;
use std::marker::PhantomData;
use std::time::Duration;

use super::{block_for, Monad, MonadDelay, MonadRec};
use crate::trampoline::Trampoline;

/// Dictionary for `Result<T, E>` with a fixed error type.
///
/// `chain` and `tail_rec_m` stop at the first `Err`, so a failing action
/// bypasses the rest of a retry loop built on this dictionary. Use
/// [`Identity`](super::Identity) with `A = Result<T, E>` when failures should
/// be visible to the retry check instead.
pub struct ResultMonad<E>(PhantomData<fn() -> E>);

impl<E> ResultMonad<E> {
    /// Create the dictionary.
    pub const fn new() -> Self {
        ResultMonad(PhantomData)
    }
}

impl<E> Default for ResultMonad<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for ResultMonad<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for ResultMonad<E> {}

impl<E> fmt::Debug for ResultMonad<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ResultMonad")
    }
}

impl<E: Send + 'static> Monad for ResultMonad<E> {
    type Of<T> = Result<T, E>;

    #[inline]
    fn of<T>(&self, value: T) -> Result<T, E> {
        Ok(value)
    }

    #[inline]
    fn chain<X, Y, F>(&self, ma: Result<X, E>, f: F) -> Result<Y, E>
    where
        F: FnOnce(X) -> Result<Y, E>,
    {
        ma.and_then(f)
    }
}

impl<E: Send + 'static> MonadRec for ResultMonad<E> {
    fn tail_rec_m<S, R, F>(&self, initial: S, mut step: F) -> Result<R, E>
    where
        F: FnMut(S) -> Result<Trampoline<S, R>, E>,
    {
        let mut state = initial;
        loop {
            match step(state)? {
                Trampoline::Bounce(next) => state = next,
                Trampoline::Land(result) => return Ok(result),
            }
        }
    }
}

impl<E: Send + 'static> MonadDelay for ResultMonad<E> {
    fn delay<X>(&self, duration: Duration, ma: Result<X, E>) -> Result<X, E> {
        if ma.is_ok() {
            block_for(duration);
        }
        ma
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_tail_rec_stack_safe() {
        let dict = ResultMonad::<String>::new();
        let result = dict.tail_rec_m(100_000u64, |n| {
            Ok(if n == 0 {
                Trampoline::Land("landed")
            } else {
                Trampoline::Bounce(n - 1)
            })
        });
        assert_eq!(result, Ok("landed"));
    }

    #[test]
    fn test_tail_rec_propagates_failure_without_further_steps() {
        let dict = ResultMonad::<&str>::new();
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let result: Result<(), _> = dict.tail_rec_m(0u32, move |n| {
            counter.fetch_add(1, Ordering::SeqCst);
            if n == 5 {
                Err("boom")
            } else {
                Ok(Trampoline::Bounce(n + 1))
            }
        });
        assert_eq!(result, Err("boom"));
        assert_eq!(calls.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_chain_short_circuits() {
        let dict = ResultMonad::<&str>::new();
        let failed: Result<i32, &str> = Err("nope");
        let called = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&called);
        let out = dict.chain(failed, move |x| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(x + 1)
        });
        assert_eq!(out, Err("nope"));
        assert_eq!(called.load(Ordering::SeqCst), 0);
    }
}
