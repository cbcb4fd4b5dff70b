//! Cancellation causes and the error reported when a context is cancelled.

use std::fmt;

/// Why a [`Context`](super::Context) was cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CancelCause {
    /// Cancelled explicitly, without a reason.
    Canceled,
    /// A timeout elapsed.
    DeadlineExceeded,
    /// Cancelled explicitly with a reason.
    Reason(String),
}

impl fmt::Display for CancelCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CancelCause::Canceled => write!(f, "context canceled"),
            CancelCause::DeadlineExceeded => write!(f, "context deadline exceeded"),
            CancelCause::Reason(reason) => write!(f, "context canceled: {}", reason),
        }
    }
}

/// Error produced when work is refused or interrupted by cancellation.
///
/// Error types used with [`Task`](super::Task) retries implement
/// `From<Cancelled>` so the cause can be reported through them.
///
/// # Examples
///
/// ```rust
/// use eddy::context::{CancelCause, Cancelled};
///
/// let err = Cancelled::new(CancelCause::DeadlineExceeded);
/// assert!(err.is_deadline_exceeded());
/// assert_eq!(err.to_string(), "context deadline exceeded");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cancelled {
    cause: CancelCause,
}

impl Cancelled {
    /// Create the error for `cause`.
    pub fn new(cause: CancelCause) -> Self {
        Cancelled { cause }
    }

    /// The recorded cause.
    pub fn cause(&self) -> &CancelCause {
        &self.cause
    }

    /// Extract the cause.
    pub fn into_cause(self) -> CancelCause {
        self.cause
    }

    /// Returns true if a timeout caused the cancellation.
    pub fn is_deadline_exceeded(&self) -> bool {
        matches!(self.cause, CancelCause::DeadlineExceeded)
    }
}

impl fmt::Display for Cancelled {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.cause, f)
    }
}

impl std::error::Error for Cancelled {}
