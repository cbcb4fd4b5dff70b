//! Policy-driven retries, generic over the effect type.
//!
//! This module follows the "pure core, imperative shell" split:
//!
//! - **Pure core**: [`RetryPolicy`] is a pure function from [`RetryStatus`] to
//!   an optional delay. Policies compose as a monoid and can be
//!   [simulated](RetryPolicy::simulate) without waiting.
//! - **Generic loop**: [`retrying`] drives an action under a policy using only
//!   the operations of a monad dictionary (`of`, `chain`, `tail_rec_m`,
//!   `delay`). The same loop serves plain values, `Option`, `Result`, lazy
//!   [`IO`](crate::io::IO), and cancellable async tasks.
//! - **Shell**: waiting is done by the dictionary's `delay`, never by the loop.
//!
//! # Quick Start
//!
//! ```rust
//! use eddy::monad::Identity;
//! use eddy::retry::{retrying, RetryPolicy, RetryStatus};
//! use std::time::Duration;
//!
//! let policy = RetryPolicy::limit_retries(5)
//!     .concat(RetryPolicy::constant_delay(Duration::from_millis(1)));
//!
//! // Fails on the first two attempts, then succeeds
//! let run = retrying(
//!     Identity,
//!     policy,
//!     |status: RetryStatus| {
//!         if status.iter_number < 2 {
//!             Err("transient")
//!         } else {
//!             Ok(status.iter_number)
//!         }
//!     },
//!     |result: &Result<u32, &str>| result.is_err(),
//! );
//!
//! assert_eq!(run(RetryStatus::default()), Ok(2));
//! ```
//!
//! # Policies
//!
//! - [`RetryPolicy::limit_retries`]: bound the number of retries
//! - [`RetryPolicy::constant_delay`], [`linear_backoff`](RetryPolicy::linear_backoff),
//!   [`exponential_backoff`](RetryPolicy::exponential_backoff),
//!   [`fibonacci_backoff`](RetryPolicy::fibonacci_backoff): delay shapes
//! - [`cap_delay`](RetryPolicy::cap_delay),
//!   [`limit_retries_by_delay`](RetryPolicy::limit_retries_by_delay),
//!   [`limit_retries_by_cumulative_delay`](RetryPolicy::limit_retries_by_cumulative_delay):
//!   transformers
//! - [`RetryConfig`]: the same, described as data
//!
//! # Jitter Support
//!
//! Enable the `jitter` feature for `with_full_jitter`, `with_proportional_jitter`
//! and `with_decorrelated_jitter`:
//!
//! ```toml
//! eddy = { version = "...", features = ["jitter"] }
//! ```

mod config;
mod engine;
mod error;
mod policy;
mod status;

pub use config::{Backoff, Jitter, RetryConfig};
pub use engine::{apply_and_delay, retrying};
pub use error::ConfigError;
pub use policy::{RetryPolicy, Simulate};
pub use status::RetryStatus;
