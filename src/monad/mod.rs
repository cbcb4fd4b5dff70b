//! Monad dictionaries: the operations the retry engine needs from an effect type
//!
//! Rust has no higher-kinded types, so an effect type constructor `M<_>` is
//! represented by a *dictionary* value whose generic associated type
//! [`Monad::Of`] maps a value type `T` to `M<T>`. Code that is generic over the
//! effect takes a dictionary `D: Monad` and only ever talks about `D::Of<T>`.
//!
//! | Trait | Operation | Meaning |
//! |-------|-----------|---------|
//! | [`Monad`] | `of`, `chain`, `map` | lift a value, sequence two computations |
//! | [`MonadRec`] | `tail_rec_m` | run a `S -> M<Trampoline<S, R>>` step in a loop |
//! | [`MonadDelay`] | `delay` | wait before yielding the wrapped computation |
//!
//! # Shipped dictionaries
//!
//! - [`Identity`]: plain values, evaluated eagerly.
//! - [`OptionMonad`]: `Option<T>`, stops on the first `None`.
//! - [`ResultMonad`]: `Result<T, E>`, stops on the first `Err`.
//! - [`IoMonad`](crate::io::IoMonad): lazy synchronous thunks.
//! - `TaskMonad` (feature `async`): context-bound async tasks with cooperative
//!   cancellation, see [`crate::context`].
//!
//! # Example
//!
//! ```
//! use eddy::monad::{tail_rec, Monad, OptionMonad};
//! use eddy::trampoline::Trampoline;
//!
//! let countdown = tail_rec(OptionMonad, |n: u32| {
//!     if n == 0 {
//!         Some(Trampoline::Land("liftoff"))
//!     } else {
//!         Some(Trampoline::Bounce(n - 1))
//!     }
//! });
//!
//! assert_eq!(countdown(50_000), Some("liftoff"));
//! assert_eq!(OptionMonad.map(Some(2), |x| x + 1), Some(3));
//! ```

mod identity;
mod option;
mod result;

pub use identity::Identity;
pub use option::OptionMonad;
pub use result::ResultMonad;

use std::sync::Arc;
use std::time::Duration;

use crate::trampoline::Trampoline;

/// Dictionary for an effect type `Self::Of<_>`.
///
/// # Laws
///
/// ```text
/// chain(of(a), f)      == f(a)                          (left identity)
/// chain(m, of)         == m                             (right identity)
/// chain(chain(m, f), g) == chain(m, |x| chain(f(x), g))  (associativity)
/// ```
///
/// Dictionaries are small `Clone` values (usually zero-sized) so they can be
/// captured by the continuations they build.
pub trait Monad: Clone + Send + Sync + 'static {
    /// The effect type applied to `T`.
    type Of<T>;

    /// Lift a plain value into the effect.
    fn of<T>(&self, value: T) -> Self::Of<T>
    where
        T: Send + 'static;

    /// Sequence `ma` with a continuation that produces the next computation.
    fn chain<X, Y, F>(&self, ma: Self::Of<X>, f: F) -> Self::Of<Y>
    where
        X: Send + 'static,
        Y: Send + 'static,
        F: FnOnce(X) -> Self::Of<Y> + Send + 'static;

    /// Transform the value produced by `ma`.
    fn map<X, Y, F>(&self, ma: Self::Of<X>, f: F) -> Self::Of<Y>
    where
        X: Send + 'static,
        Y: Send + 'static,
        F: FnOnce(X) -> Y + Send + 'static,
    {
        let dict = self.clone();
        self.chain(ma, move |x| dict.of(f(x)))
    }
}

/// Stack-safe tail recursion for an effect type.
///
/// Implementations must drive `step` with an explicit loop and never recurse,
/// so that any number of bounces runs in constant stack space. Effect types
/// that can fail stop at the first failure without calling `step` again.
pub trait MonadRec: Monad {
    /// Run `step` from `initial` until it lands.
    fn tail_rec_m<S, R, F>(&self, initial: S, step: F) -> Self::Of<R>
    where
        S: Send + 'static,
        R: Send + 'static,
        F: FnMut(S) -> Self::Of<Trampoline<S, R>> + Send + 'static;
}

/// Delayed execution for an effect type.
pub trait MonadDelay: Monad {
    /// Wait `duration`, then yield whatever `ma` yields.
    fn delay<X>(&self, duration: Duration, ma: Self::Of<X>) -> Self::Of<X>
    where
        X: Send + 'static;
}

/// Turn a step function into a stack-safe Kleisli arrow `S -> M<R>`.
///
/// The returned function can be called any number of times; each call starts a
/// fresh loop from the given state.
pub fn tail_rec<D, S, R, F>(dict: D, step: F) -> impl Fn(S) -> D::Of<R> + Clone + Send + Sync + 'static
where
    D: MonadRec,
    S: Send + 'static,
    R: Send + 'static,
    F: Fn(S) -> D::Of<Trampoline<S, R>> + Send + Sync + 'static,
{
    let step = Arc::new(step);
    move |initial: S| {
        let step = Arc::clone(&step);
        dict.tail_rec_m(initial, move |state: S| step(state))
    }
}

/// Blocking sleep shared by the synchronous dictionaries.
pub(crate) fn block_for(duration: Duration) {
    if !duration.is_zero() {
        std::thread::sleep(duration);
    }
}
