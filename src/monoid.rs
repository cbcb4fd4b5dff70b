//! Monoid trait for types with identity elements
//!
//! A `Monoid` extends `Semigroup` by adding an identity element, which makes it
//! possible to fold any number of values, including none.
//!
//! # Mathematical Properties
//!
//! 1. **Associativity** (from Semigroup):
//!    ```text
//!    a.combine(b).combine(c) == a.combine(b.combine(c))
//!    ```
//! 2. **Right Identity**: `a.combine(M::empty()) == a`
//! 3. **Left Identity**: `M::empty().combine(a) == a`
//!
//! # Retry policies
//!
//! [`RetryPolicy`](crate::retry::RetryPolicy) is a monoid whose identity always
//! allows another attempt with zero delay, so folding a list of policies gives
//! their conjunction:
//!
//! ```
//! use eddy::monoid::fold_all;
//! use eddy::retry::{RetryPolicy, RetryStatus};
//! use std::time::Duration;
//!
//! let policy: RetryPolicy = fold_all([
//!     RetryPolicy::limit_retries(3),
//!     RetryPolicy::exponential_backoff(Duration::from_millis(10)),
//!     RetryPolicy::constant_delay(Duration::from_millis(1)),
//! ]);
//!
//! assert_eq!(policy.evaluate(RetryStatus::default()), Some(Duration::from_millis(11)));
//!
//! // Folding nothing yields the identity
//! let identity: RetryPolicy = fold_all(Vec::new());
//! assert_eq!(identity.evaluate(RetryStatus::default()), Some(Duration::ZERO));
//! ```

use crate::Semigroup;
use std::ops::Add;

/// A `Monoid` is a `Semigroup` with an identity element.
///
/// # Laws
///
/// ```text
/// a.combine(M::empty()) == a           (right identity)
/// M::empty().combine(a) == a           (left identity)
/// ```
pub trait Monoid: Semigroup {
    /// The identity element for this monoid.
    fn empty() -> Self;
}

/// Monoid for numeric types (and `Duration`) under addition.
///
/// Identity: `T::default()`
///
/// ```
/// use eddy::monoid::{fold_all, Sum};
/// use std::time::Duration;
///
/// let total = fold_all([Sum(Duration::from_millis(100)), Sum(Duration::from_millis(200))]);
/// assert_eq!(total, Sum(Duration::from_millis(300)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Sum<T>(pub T);

impl<T: Add<Output = T>> Semigroup for Sum<T> {
    fn combine(self, other: Self) -> Self {
        Sum(self.0 + other.0)
    }
}

impl<T: Add<Output = T> + Default> Monoid for Sum<T> {
    fn empty() -> Self {
        Sum(T::default())
    }
}

/// Fold an iterator using the Monoid instance, starting with `empty()`.
pub fn fold_all<M, I>(iter: I) -> M
where
    M: Monoid,
    I: IntoIterator<Item = M>,
{
    iter.into_iter().fold(M::empty(), |acc, x| acc.combine(x))
}
