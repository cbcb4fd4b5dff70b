use std::time::Duration;

use super::{block_for, Monad, MonadDelay, MonadRec};
use crate::trampoline::{self, Trampoline};

/// Dictionary for plain, eagerly evaluated values (`Of<T> = T`).
///
/// `delay` blocks the current thread.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

impl Monad for Identity {
    type Of<T> = T;

    #[inline]
    fn of<T>(&self, value: T) -> T {
        value
    }

    #[inline]
    fn chain<X, Y, F>(&self, ma: X, f: F) -> Y
    where
        F: FnOnce(X) -> Y,
    {
        f(ma)
    }
}

impl MonadRec for Identity {
    fn tail_rec_m<S, R, F>(&self, initial: S, step: F) -> R
    where
        F: FnMut(S) -> Trampoline<S, R>,
    {
        trampoline::run(initial, step)
    }
}

impl MonadDelay for Identity {
    fn delay<X>(&self, duration: Duration, ma: X) -> X {
        block_for(duration);
        ma
    }
}
