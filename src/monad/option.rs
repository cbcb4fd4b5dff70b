use std::time::Duration;

use super::{block_for, Monad, MonadDelay, MonadRec};
use crate::trampoline::Trampoline;

/// Dictionary for `Option<T>`.
///
/// `chain` and `tail_rec_m` stop at the first `None`. `delay` only waits when
/// there is a value to yield.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OptionMonad;

impl Monad for OptionMonad {
    type Of<T> = Option<T>;

    #[inline]
    fn of<T>(&self, value: T) -> Option<T> {
        Some(value)
    }

    #[inline]
    fn chain<X, Y, F>(&self, ma: Option<X>, f: F) -> Option<Y>
    where
        F: FnOnce(X) -> Option<Y>,
    {
        ma.and_then(f)
    }
}

impl MonadRec for OptionMonad {
    fn tail_rec_m<S, R, F>(&self, initial: S, mut step: F) -> Option<R>
    where
        F: FnMut(S) -> Option<Trampoline<S, R>>,
    {
        let mut state = initial;
        loop {
            match step(state)? {
                Trampoline::Bounce(next) => state = next,
                Trampoline::Land(result) => return Some(result),
            }
        }
    }
}

impl MonadDelay for OptionMonad {
    fn delay<X>(&self, duration: Duration, ma: Option<X>) -> Option<X> {
        if ma.is_some() {
            block_for(duration);
        }
        ma
    }
}
