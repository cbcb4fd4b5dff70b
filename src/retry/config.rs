//! Declarative retry configuration.

use std::time::Duration;

use super::{ConfigError, RetryPolicy};

/// A retry policy described as plain data.
///
/// Configs are easy to log, compare, and (with the `serde` feature) load from
/// configuration files. [`build`](RetryConfig::build) turns one into a
/// [`RetryPolicy`] made of the usual combinators.
///
/// # Bounds
///
/// At least one bound must be set before building:
/// - `max_retries`: maximum number of retries (not counting the initial attempt)
/// - `max_cumulative_delay`: maximum total time spent waiting
///
/// `max_delay` caps individual delays but does not bound the number of retries.
///
/// # Examples
///
/// ```rust
/// use eddy::retry::{RetryConfig, RetryStatus};
/// use std::time::Duration;
///
/// let policy = RetryConfig::exponential(Duration::from_millis(100))
///     .with_max_retries(5)
///     .with_max_delay(Duration::from_millis(300))
///     .build()
///     .unwrap();
///
/// let delays: Vec<_> = policy
///     .simulate(RetryStatus::default())
///     .filter_map(|s| s.previous_delay)
///     .collect();
/// assert_eq!(delays.len(), 5);
/// assert_eq!(delays[3], Duration::from_millis(300));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RetryConfig {
    strategy: Backoff,
    max_retries: Option<u32>,
    max_delay: Option<Duration>,
    max_cumulative_delay: Option<Duration>,
    #[cfg_attr(feature = "serde", serde(default))]
    jitter: Jitter,
}

/// The backoff strategy for retry delays.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Backoff {
    /// Fixed delay between attempts.
    Constant {
        /// Delay before every retry.
        delay: Duration,
    },
    /// Delay increases linearly: base * (attempt + 1).
    Linear {
        /// Base delay duration.
        base: Duration,
    },
    /// Delay doubles: base * 2^attempt.
    Exponential {
        /// Base delay duration.
        base: Duration,
    },
    /// Delay follows Fibonacci sequence: fib(attempt + 1) * base.
    Fibonacci {
        /// Base delay duration.
        base: Duration,
    },
}

/// Strategy for adding randomness to delays.
///
/// Only takes effect with the `jitter` feature; otherwise it is accepted and
/// ignored.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum Jitter {
    /// No jitter applied.
    #[default]
    None,
    /// Add ±factor randomness to delay.
    Proportional {
        /// Fraction of the delay, in `[0, 1]`.
        factor: f64,
    },
    /// Random delay between 0 and calculated delay (AWS recommended).
    Full,
    /// Decorrelated jitter (AWS style).
    Decorrelated,
}

impl RetryConfig {
    fn with_strategy(strategy: Backoff) -> Self {
        RetryConfig {
            strategy,
            max_retries: None,
            max_delay: None,
            max_cumulative_delay: None,
            jitter: Jitter::None,
        }
    }

    /// Constant delay between retries.
    pub fn constant(delay: Duration) -> Self {
        Self::with_strategy(Backoff::Constant { delay })
    }

    /// Linearly increasing delay.
    pub fn linear(base: Duration) -> Self {
        Self::with_strategy(Backoff::Linear { base })
    }

    /// Exponentially increasing delay.
    pub fn exponential(base: Duration) -> Self {
        Self::with_strategy(Backoff::Exponential { base })
    }

    /// Fibonacci-based delay.
    pub fn fibonacci(base: Duration) -> Self {
        Self::with_strategy(Backoff::Fibonacci { base })
    }

    /// Set the maximum number of retries.
    ///
    /// `with_max_retries(3)` means up to 4 attempts in total.
    pub fn with_max_retries(mut self, n: u32) -> Self {
        self.max_retries = Some(n);
        self
    }

    /// Cap every individual delay at `d`.
    pub fn with_max_delay(mut self, d: Duration) -> Self {
        self.max_delay = Some(d);
        self
    }

    /// Stop once the total time spent waiting would exceed `d`.
    pub fn with_max_cumulative_delay(mut self, d: Duration) -> Self {
        self.max_cumulative_delay = Some(d);
        self
    }

    /// Add proportional jitter; `0.25` means ±25%.
    pub fn with_jitter(mut self, factor: f64) -> Self {
        self.jitter = Jitter::Proportional { factor };
        self
    }

    /// Use full jitter.
    pub fn with_full_jitter(mut self) -> Self {
        self.jitter = Jitter::Full;
        self
    }

    /// Use decorrelated jitter.
    pub fn with_decorrelated_jitter(mut self) -> Self {
        self.jitter = Jitter::Decorrelated;
        self
    }

    /// Get the backoff strategy.
    pub fn strategy(&self) -> &Backoff {
        &self.strategy
    }

    /// Get the maximum number of retries.
    pub fn max_retries(&self) -> Option<u32> {
        self.max_retries
    }

    /// Get the per-delay cap.
    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// Get the cumulative delay budget.
    pub fn max_cumulative_delay(&self) -> Option<Duration> {
        self.max_cumulative_delay
    }

    /// Get the jitter strategy.
    pub fn jitter(&self) -> &Jitter {
        &self.jitter
    }

    /// Check that the config is bounded and its jitter factor is sane.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries.is_none() && self.max_cumulative_delay.is_none() {
            return Err(ConfigError::Unbounded);
        }
        if let Jitter::Proportional { factor } = self.jitter {
            if !(0.0..=1.0).contains(&factor) {
                return Err(ConfigError::InvalidJitterFactor(factor));
            }
        }
        Ok(())
    }

    /// Build the policy.
    ///
    /// Jitter is applied to the raw backoff, then the delay cap, then the
    /// retry and cumulative-delay limits.
    pub fn build(&self) -> Result<RetryPolicy, ConfigError> {
        self.validate()?;

        let backoff = match self.strategy {
            Backoff::Constant { delay } => RetryPolicy::constant_delay(delay),
            Backoff::Linear { base } => RetryPolicy::linear_backoff(base),
            Backoff::Exponential { base } => RetryPolicy::exponential_backoff(base),
            Backoff::Fibonacci { base } => RetryPolicy::fibonacci_backoff(base),
        };

        let mut policy = with_jitter(backoff, &self.jitter);
        if let Some(max) = self.max_delay {
            policy = policy.cap_delay(max);
        }
        if let Some(n) = self.max_retries {
            policy = RetryPolicy::limit_retries(n).concat(policy);
        }
        if let Some(total) = self.max_cumulative_delay {
            policy = policy.limit_retries_by_cumulative_delay(total);
        }
        Ok(policy)
    }
}

impl TryFrom<RetryConfig> for RetryPolicy {
    type Error = ConfigError;

    fn try_from(config: RetryConfig) -> Result<Self, Self::Error> {
        config.build()
    }
}

#[cfg(feature = "jitter")]
fn with_jitter(policy: RetryPolicy, jitter: &Jitter) -> RetryPolicy {
    match jitter {
        Jitter::None => policy,
        Jitter::Proportional { factor } => policy.with_proportional_jitter(*factor),
        Jitter::Full => policy.with_full_jitter(),
        Jitter::Decorrelated => policy.with_decorrelated_jitter(),
    }
}

#[cfg(not(feature = "jitter"))]
fn with_jitter(policy: RetryPolicy, _jitter: &Jitter) -> RetryPolicy {
    policy
}
