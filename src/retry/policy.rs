//! Retry policies: pure functions from a status to an optional delay.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use super::RetryStatus;
use crate::monoid::Monoid;
use crate::semigroup::Semigroup;

type Decide = dyn Fn(RetryStatus) -> Option<Duration> + Send + Sync;

/// Decides whether another attempt should be made, and after how long.
///
/// A policy is a pure function `RetryStatus -> Option<Duration>`:
/// `Some(d)` means "wait `d`, then retry" and `None` means "stop". Policies
/// never perform I/O themselves; the retry loop hands the delay to the effect
/// dictionary it runs under.
///
/// Policies form a monoid under [`concat`](RetryPolicy::concat): the combined
/// policy stops when either side stops, and otherwise waits for the sum of
/// both delays. The identity always allows a retry with zero delay.
///
/// # Examples
///
/// ```rust
/// use eddy::retry::{RetryPolicy, RetryStatus};
/// use std::time::Duration;
///
/// // Exponential backoff, capped, at most 5 retries
/// let policy = RetryPolicy::limit_retries(5)
///     .concat(RetryPolicy::exponential_backoff(Duration::from_millis(100)))
///     .cap_delay(Duration::from_millis(300));
///
/// let delays: Vec<_> = policy
///     .simulate(RetryStatus::default())
///     .filter_map(|status| status.previous_delay)
///     .collect();
///
/// assert_eq!(
///     delays,
///     [100, 200, 300, 300, 300].map(Duration::from_millis).to_vec()
/// );
/// ```
#[derive(Clone)]
pub struct RetryPolicy {
    decide: Arc<Decide>,
}

impl RetryPolicy {
    /// Build a policy from a function.
    ///
    /// ```rust
    /// use eddy::retry::{RetryPolicy, RetryStatus};
    /// use std::time::Duration;
    ///
    /// // Retry only on even attempts
    /// let policy = RetryPolicy::new(|status: RetryStatus| {
    ///     (status.iter_number % 2 == 0).then_some(Duration::ZERO)
    /// });
    /// assert!(policy.evaluate(RetryStatus::default()).is_some());
    /// ```
    pub fn new<F>(decide: F) -> Self
    where
        F: Fn(RetryStatus) -> Option<Duration> + Send + Sync + 'static,
    {
        RetryPolicy {
            decide: Arc::new(decide),
        }
    }

    /// The identity policy: always retry, never wait.
    pub fn identity() -> Self {
        RetryPolicy::new(|_| Some(Duration::ZERO))
    }

    /// Ask the policy about `status`.
    pub fn evaluate(&self, status: RetryStatus) -> Option<Duration> {
        (self.decide)(status)
    }

    /// Advance `status` by one iteration, recording the policy's decision.
    ///
    /// The iteration number increments even when the policy says stop; in that
    /// case `previous_delay` is `None` and the cumulative delay is unchanged.
    pub fn apply(&self, status: RetryStatus) -> RetryStatus {
        status.advance(self.evaluate(status))
    }

    /// Combine two policies: stop if either stops, otherwise add the delays.
    ///
    /// `other` is not consulted once `self` has said stop.
    pub fn concat(self, other: RetryPolicy) -> Self {
        RetryPolicy::new(move |status| {
            let first = self.evaluate(status)?;
            let second = other.evaluate(status)?;
            Some(first.saturating_add(second))
        })
    }

    /// Allow `limit` retries (so `limit + 1` attempts in total), without delay.
    ///
    /// ```rust
    /// use eddy::retry::{RetryPolicy, RetryStatus};
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::limit_retries(2);
    /// let s0 = RetryStatus::default();
    /// let s1 = policy.apply(s0);
    /// let s2 = policy.apply(s1);
    ///
    /// assert_eq!(policy.evaluate(s0), Some(Duration::ZERO));
    /// assert_eq!(policy.evaluate(s1), Some(Duration::ZERO));
    /// assert_eq!(policy.evaluate(s2), None);
    /// ```
    pub fn limit_retries(limit: u32) -> Self {
        RetryPolicy::new(move |status| (status.iter_number < limit).then_some(Duration::ZERO))
    }

    /// Always retry after `delay`. Unbounded on its own.
    pub fn constant_delay(delay: Duration) -> Self {
        RetryPolicy::new(move |_| Some(delay))
    }

    /// Delay grows linearly: `base * (attempt + 1)`. Unbounded on its own.
    pub fn linear_backoff(base: Duration) -> Self {
        RetryPolicy::new(move |status| {
            Some(base.saturating_mul(status.iter_number.saturating_add(1)))
        })
    }

    /// Delay doubles: `base * 2^attempt`. Unbounded on its own.
    ///
    /// ```rust
    /// use eddy::retry::{RetryPolicy, RetryStatus};
    /// use std::time::Duration;
    ///
    /// let policy = RetryPolicy::exponential_backoff(Duration::from_millis(100));
    /// let s0 = RetryStatus::default();
    /// let s1 = policy.apply(s0);
    /// let s2 = policy.apply(s1);
    ///
    /// assert_eq!(policy.evaluate(s0), Some(Duration::from_millis(100)));
    /// assert_eq!(policy.evaluate(s1), Some(Duration::from_millis(200)));
    /// assert_eq!(policy.evaluate(s2), Some(Duration::from_millis(400)));
    /// ```
    pub fn exponential_backoff(base: Duration) -> Self {
        RetryPolicy::new(move |status| {
            Some(base.saturating_mul(2u32.saturating_pow(status.iter_number)))
        })
    }

    /// Delay follows the Fibonacci sequence: `base * fib(attempt + 1)`.
    /// Unbounded on its own.
    pub fn fibonacci_backoff(base: Duration) -> Self {
        RetryPolicy::new(move |status| {
            Some(base.saturating_mul(fibonacci(status.iter_number.saturating_add(1))))
        })
    }

    /// Never wait longer than `max`.
    pub fn cap_delay(self, max: Duration) -> Self {
        RetryPolicy::new(move |status| self.evaluate(status).map(|delay| delay.min(max)))
    }

    /// Stop once the requested delay reaches `max`.
    pub fn limit_retries_by_delay(self, max: Duration) -> Self {
        RetryPolicy::new(move |status| self.evaluate(status).filter(|delay| *delay < max))
    }

    /// Stop once the total time spent waiting would exceed `max`.
    pub fn limit_retries_by_cumulative_delay(self, max: Duration) -> Self {
        RetryPolicy::new(move |status| {
            self.evaluate(status)
                .filter(|delay| status.cumulative_delay.saturating_add(*delay) <= max)
        })
    }

    /// Step through the statuses this policy would produce, starting at `from`,
    /// without waiting.
    ///
    /// Each yielded status is the one a retry loop would see on its next
    /// attempt; iteration ends when the policy says stop. Unbounded policies
    /// yield forever, so pair them with `take`.
    pub fn simulate(&self, from: RetryStatus) -> Simulate<'_> {
        Simulate {
            policy: self,
            status: Some(from),
        }
    }

    /// Randomize each delay uniformly between zero and the computed delay.
    #[cfg(feature = "jitter")]
    pub fn with_full_jitter(self) -> Self {
        RetryPolicy::new(move |status| self.evaluate(status).map(jitter::full))
    }

    /// Randomize each delay by up to ±`factor` (clamped to `[0, 1]`; a
    /// non-finite factor means no jitter).
    #[cfg(feature = "jitter")]
    pub fn with_proportional_jitter(self, factor: f64) -> Self {
        let factor = if factor.is_finite() {
            factor.clamp(0.0, 1.0)
        } else {
            0.0
        };
        RetryPolicy::new(move |status| {
            self.evaluate(status)
                .map(|delay| jitter::proportional(delay, factor))
        })
    }

    /// Pick each delay between the computed delay and three times the
    /// previous one (AWS "decorrelated" jitter).
    #[cfg(feature = "jitter")]
    pub fn with_decorrelated_jitter(self) -> Self {
        RetryPolicy::new(move |status| {
            self.evaluate(status)
                .map(|base| jitter::decorrelated(base, status.previous_delay))
        })
    }

    /// Exponential backoff with full jitter.
    #[cfg(feature = "jitter")]
    pub fn full_jitter_backoff(base: Duration) -> Self {
        RetryPolicy::exponential_backoff(base).with_full_jitter()
    }

    /// Constant base with decorrelated jitter.
    #[cfg(feature = "jitter")]
    pub fn decorrelated_jitter_backoff(base: Duration) -> Self {
        RetryPolicy::constant_delay(base).with_decorrelated_jitter()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::identity()
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy").finish_non_exhaustive()
    }
}

impl Semigroup for RetryPolicy {
    fn combine(self, other: Self) -> Self {
        self.concat(other)
    }
}

impl Monoid for RetryPolicy {
    fn empty() -> Self {
        RetryPolicy::identity()
    }
}

/// Iterator returned by [`RetryPolicy::simulate`].
#[derive(Debug)]
pub struct Simulate<'a> {
    policy: &'a RetryPolicy,
    status: Option<RetryStatus>,
}

impl Iterator for Simulate<'_> {
    type Item = RetryStatus;

    fn next(&mut self) -> Option<RetryStatus> {
        let current = self.status.take()?;
        let delay = self.policy.evaluate(current)?;
        let next = current.advance(Some(delay));
        self.status = Some(next);
        Some(next)
    }
}

#[cfg(feature = "jitter")]
mod jitter {
    use rand::Rng;
    use std::time::Duration;

    fn nanos(d: Duration) -> u64 {
        u64::try_from(d.as_nanos()).unwrap_or(u64::MAX)
    }

    pub(super) fn full(delay: Duration) -> Duration {
        let max = nanos(delay);
        if max == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(rand::rng().random_range(0..=max))
    }

    pub(super) fn proportional(delay: Duration, factor: f64) -> Duration {
        let secs = delay.as_secs_f64();
        let spread = secs * factor;
        let low = (secs - spread).max(0.0);
        let high = secs + spread;
        if high.is_nan() || high <= low {
            return delay;
        }
        let picked = rand::rng().random_range(low..=high);
        Duration::try_from_secs_f64(picked).unwrap_or(delay)
    }

    pub(super) fn decorrelated(base: Duration, previous: Option<Duration>) -> Duration {
        let low = nanos(base);
        let high = nanos(previous.unwrap_or(base).saturating_mul(3));
        if high <= low {
            return base;
        }
        Duration::from_nanos(rand::rng().random_range(low..=high))
    }
}

/// Calculate the nth Fibonacci number, saturating at `u32::MAX`.
fn fibonacci(n: u32) -> u32 {
    if n == 0 {
        return 0;
    }
    let mut a = 0u32;
    let mut b = 1u32;
    for _ in 1..n {
        let temp = a.saturating_add(b);
        a = b;
        b = temp;
    }
    b
}
