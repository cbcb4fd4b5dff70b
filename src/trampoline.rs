//! Trampolines for stack-safe recursion
//!
//! A recursive function that calls itself in tail position can be rewritten as
//! a *step* function that returns a [`Trampoline`]: either [`Trampoline::Bounce`]
//! with the arguments for the next call, or [`Trampoline::Land`] with the final
//! result. An executor then drives the step function in a plain `loop`, so the
//! call stack stays flat no matter how many bounces happen.
//!
//! This module holds the tagged union itself and [`run`], the executor for
//! pure step functions. Effectful step functions (returning `M<Trampoline<S, R>>`
//! for some effect `M`) are driven by [`MonadRec::tail_rec_m`](crate::monad::MonadRec::tail_rec_m).
//!
//! # Example
//!
//! ```
//! use eddy::trampoline::{self, Trampoline};
//!
//! // Sum 1..=n without recursion depth proportional to n
//! let total = trampoline::run((100_000u64, 0u64), |(n, acc)| {
//!     if n == 0 {
//!         Trampoline::Land(acc)
//!     } else {
//!         Trampoline::Bounce((n - 1, acc + n))
//!     }
//! });
//!
//! assert_eq!(total, 5_000_050_000);
//! ```

/// The result of one step of a tail-recursive computation.
///
/// Exactly one of the two variants is ever present: `Bounce` continues the
/// loop with a new state, `Land` terminates it with a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trampoline<S, R> {
    /// Continue with the next state.
    Bounce(S),
    /// Terminate with the final result.
    Land(R),
}

impl<S, R> Trampoline<S, R> {
    /// Continue with `state`.
    #[inline]
    pub fn bounce(state: S) -> Self {
        Trampoline::Bounce(state)
    }

    /// Terminate with `result`.
    #[inline]
    pub fn land(result: R) -> Self {
        Trampoline::Land(result)
    }

    /// Returns `true` if this is a `Land`.
    #[inline]
    pub fn is_land(&self) -> bool {
        matches!(self, Trampoline::Land(_))
    }

    /// Returns `true` if this is a `Bounce`.
    #[inline]
    pub fn is_bounce(&self) -> bool {
        matches!(self, Trampoline::Bounce(_))
    }

    /// Transform the landed result, leaving a bounce untouched.
    ///
    /// ```
    /// use eddy::trampoline::Trampoline;
    ///
    /// let t: Trampoline<u32, u32> = Trampoline::Land(2);
    /// assert_eq!(t.map_land(|r| r * 10), Trampoline::Land(20));
    ///
    /// let t: Trampoline<u32, u32> = Trampoline::Bounce(2);
    /// assert_eq!(t.map_land(|r| r * 10), Trampoline::Bounce(2));
    /// ```
    pub fn map_land<R2, F>(self, f: F) -> Trampoline<S, R2>
    where
        F: FnOnce(R) -> R2,
    {
        match self {
            Trampoline::Bounce(s) => Trampoline::Bounce(s),
            Trampoline::Land(r) => Trampoline::Land(f(r)),
        }
    }

    /// Extract the landed result, if any.
    pub fn into_land(self) -> Option<R> {
        match self {
            Trampoline::Land(r) => Some(r),
            Trampoline::Bounce(_) => None,
        }
    }
}

/// Drive a pure step function until it lands.
///
/// Uses constant stack space regardless of the number of bounces.
pub fn run<S, R, F>(initial: S, mut step: F) -> R
where
    F: FnMut(S) -> Trampoline<S, R>,
{
    let mut state = initial;
    loop {
        match step(state) {
            Trampoline::Bounce(next) => state = next,
            Trampoline::Land(result) => return result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_lands_immediately() {
        let result = run(7, |s: i32| Trampoline::<i32, i32>::Land(s * 2));
        assert_eq!(result, 14);
    }

    #[test]
    fn test_run_counts_bounces() {
        let mut calls = 0;
        let result = run(0u32, |s| {
            calls += 1;
            if s == 10 {
                Trampoline::Land("done")
            } else {
                Trampoline::Bounce(s + 1)
            }
        });
        assert_eq!(result, "done");
        assert_eq!(calls, 11);
    }

    #[test]
    fn test_run_is_stack_safe() {
        let result = run(1_000_000u64, |n| {
            if n == 0 {
                Trampoline::Land(true)
            } else {
                Trampoline::Bounce(n - 1)
            }
        });
        assert!(result);
    }

    #[test]
    fn test_predicates() {
        let bounce: Trampoline<i32, &str> = Trampoline::bounce(1);
        let land: Trampoline<i32, &str> = Trampoline::land("x");
        assert!(bounce.is_bounce());
        assert!(!bounce.is_land());
        assert!(land.is_land());
        assert_eq!(land.into_land(), Some("x"));
        assert_eq!(bounce.into_land(), None);
    }
}
