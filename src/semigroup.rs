//! Semigroup trait for associative operations
//!
//! A Semigroup is a type with an associative binary operation. Retry policies
//! are the main instance in this crate: combining two policies yields a policy
//! that stops as soon as either one stops and otherwise waits for the sum of
//! both delays.
//!
//! # Mathematical Properties
//!
//! For a type to be a valid Semigroup, the `combine` operation must be associative:
//! ```text
//! a.combine(b).combine(c) == a.combine(b.combine(c))
//! ```
//!
//! # Examples
//!
//! ```
//! use eddy::Semigroup;
//! use eddy::retry::{RetryPolicy, RetryStatus};
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::limit_retries(2)
//!     .combine(RetryPolicy::constant_delay(Duration::from_millis(50)));
//!
//! let first = RetryStatus::default();
//! assert_eq!(policy.evaluate(first), Some(Duration::from_millis(50)));
//!
//! let third = policy.apply(policy.apply(first));
//! assert_eq!(policy.evaluate(third), None);
//! ```

/// A type that supports an associative binary operation
///
/// # Laws
///
/// Implementations must satisfy the associativity law:
/// ```text
/// a.combine(b).combine(c) == a.combine(b.combine(c))
/// ```
///
/// `combine` takes both operands by value; clone first if the originals are
/// still needed.
pub trait Semigroup: Sized {
    /// Combine this value with another value associatively
    fn combine(self, other: Self) -> Self;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monoid::Sum;
    use crate::retry::{RetryPolicy, RetryStatus};
    use std::time::Duration;

    #[test]
    fn test_sum_combine() {
        let total = Sum(Duration::from_millis(30)).combine(Sum(Duration::from_millis(12)));
        assert_eq!(total, Sum(Duration::from_millis(42)));
    }

    #[test]
    fn test_policy_combine_stops_when_either_stops() {
        let policy = RetryPolicy::constant_delay(Duration::from_millis(5))
            .combine(RetryPolicy::limit_retries(1));
        let first = RetryStatus::default();
        assert_eq!(policy.evaluate(first), Some(Duration::from_millis(5)));
        assert_eq!(policy.evaluate(policy.apply(first)), None);
    }

    #[test]
    fn test_sum_associativity() {
        let (a, b, c) = (Sum(1u32), Sum(2u32), Sum(3u32));
        assert_eq!(a.combine(b).combine(c), a.combine(b.combine(c)));
    }
}
