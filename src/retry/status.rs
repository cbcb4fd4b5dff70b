//! Per-attempt retry counters.

use std::time::Duration;

/// Where a retry loop currently stands.
///
/// A status is never mutated in place: every iteration produces a new value
/// via [`RetryStatus::advance`] (usually through
/// [`RetryPolicy::apply`](super::RetryPolicy::apply)).
///
/// # Examples
///
/// ```rust
/// use eddy::retry::RetryStatus;
/// use std::time::Duration;
///
/// let start = RetryStatus::default();
/// assert_eq!(start.iter_number, 0);
///
/// let next = start.advance(Some(Duration::from_millis(100)));
/// assert_eq!(next.iter_number, 1);
/// assert_eq!(next.cumulative_delay, Duration::from_millis(100));
/// assert_eq!(next.previous_delay, Some(Duration::from_millis(100)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetryStatus {
    /// Zero-based attempt number; `0` is the initial attempt.
    pub iter_number: u32,
    /// Sum of all delays waited so far.
    pub cumulative_delay: Duration,
    /// The delay waited before this attempt, if any.
    pub previous_delay: Option<Duration>,
}

impl RetryStatus {
    /// The status of the initial attempt.
    pub const fn new() -> Self {
        RetryStatus {
            iter_number: 0,
            cumulative_delay: Duration::ZERO,
            previous_delay: None,
        }
    }

    /// Produce the status of the next attempt.
    ///
    /// The iteration number always increments. A `None` delay records that no
    /// wait was scheduled and leaves the cumulative delay unchanged.
    pub fn advance(self, delay: Option<Duration>) -> Self {
        RetryStatus {
            iter_number: self.iter_number.saturating_add(1),
            cumulative_delay: self
                .cumulative_delay
                .saturating_add(delay.unwrap_or(Duration::ZERO)),
            previous_delay: delay,
        }
    }

    /// Returns `true` for the initial attempt.
    pub fn is_first(&self) -> bool {
        self.iter_number == 0
    }
}
