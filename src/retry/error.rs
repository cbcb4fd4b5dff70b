//! Error types for retry configuration.

use std::fmt;

/// Error returned when a [`RetryConfig`](super::RetryConfig) cannot be turned
/// into a policy.
///
/// # Examples
///
/// ```rust
/// use eddy::retry::{ConfigError, RetryConfig};
/// use std::time::Duration;
///
/// let unbounded = RetryConfig::constant(Duration::from_millis(100));
/// assert_eq!(unbounded.validate(), Err(ConfigError::Unbounded));
///
/// let bounded = unbounded.with_max_retries(3);
/// assert!(bounded.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Neither `max_retries` nor `max_cumulative_delay` is set.
    Unbounded,
    /// A proportional jitter factor outside `[0, 1]` (or NaN).
    InvalidJitterFactor(f64),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Unbounded => write!(
                f,
                "retry config must have at least one bound (max_retries or max_cumulative_delay)"
            ),
            ConfigError::InvalidJitterFactor(factor) => {
                write!(f, "jitter factor {} is outside [0, 1]", factor)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod error_tests {
    use super::*;

    #[test]
    fn test_display() {
        assert!(ConfigError::Unbounded.to_string().contains("at least one bound"));
        assert!(ConfigError::InvalidJitterFactor(1.5)
            .to_string()
            .contains("1.5"));
    }

    #[test]
    fn test_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(ConfigError::Unbounded);
        assert!(err.source().is_none());
    }
}
