//! # Eddy
//!
//! Policy-driven retries that are generic over the effect type and stack-safe
//! no matter how many attempts they make.
//!
//! ## Philosophy
//!
//! **Eddy** keeps a **pure core, imperative shell**:
//! - **Policies** are pure functions from a [`RetryStatus`] to an optional
//!   delay. They compose as a monoid and can be simulated without waiting.
//! - **Effects** are described by small monad dictionaries. The retry loop is
//!   written once against those dictionaries and runs unchanged over plain
//!   values, `Option`, `Result`, lazy [`IO`], and cancellable async tasks.
//!
//! ## Quick Example
//!
//! ```rust
//! use eddy::prelude::*;
//! use std::time::Duration;
//!
//! // Up to 5 retries, exponential backoff capped at one second
//! let policy = RetryPolicy::limit_retries(5)
//!     .concat(RetryPolicy::exponential_backoff(Duration::from_millis(1)))
//!     .cap_delay(Duration::from_secs(1));
//!
//! // See the schedule without waiting for it
//! let delays: Vec<_> = policy.simulate(RetryStatus::default()).map(|s| s.cumulative_delay).collect();
//! assert_eq!(delays.len(), 5);
//!
//! let run = retrying(
//!     Identity,
//!     policy,
//!     |status: RetryStatus| status.iter_number,
//!     |attempt: &u32| *attempt < 2,
//! );
//! assert_eq!(run(RetryStatus::default()), 2);
//! ```
//!
//! ## Modules
//!
//! - [`retry`]: policies, status, declarative config, and the generic loop
//! - [`monad`]: the dictionary traits and the synchronous dictionaries
//! - [`trampoline`]: the step type behind every stack-safe loop
//! - [`io`]: lazy synchronous effects
//! - [`context`]: context-bound async tasks with cancellation (feature `async`)
//! - [`semigroup`], [`monoid`]: the algebra policies compose with
//! - [`testing`]: a delay-recording dictionary for tests

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

#[cfg(feature = "async")]
pub mod context;
pub mod io;
pub mod monad;
pub mod monoid;
pub mod retry;
pub mod semigroup;
pub mod testing;
pub mod trampoline;

// Re-exports
pub use io::IO;
pub use monad::{Monad, MonadDelay, MonadRec};
pub use monoid::Monoid;
pub use retry::{retrying, RetryConfig, RetryPolicy, RetryStatus};
pub use semigroup::Semigroup;
pub use trampoline::Trampoline;

/// Prelude module for convenient imports
pub mod prelude {
    #[cfg(feature = "async")]
    pub use crate::context::{ap_par, CancelCause, Cancelled, Context, Task, TaskMonad};
    pub use crate::io::{IoMonad, IO};
    pub use crate::monad::{Identity, Monad, MonadDelay, MonadRec, OptionMonad, ResultMonad};
    pub use crate::monoid::Monoid;
    pub use crate::retry::{retrying, RetryConfig, RetryPolicy, RetryStatus};
    pub use crate::semigroup::Semigroup;
    pub use crate::trampoline::Trampoline;
}
