//! The generic retry loop.
//!
//! Both functions here are written once against the dictionary traits in
//! [`crate::monad`] and never name a concrete effect type. Whatever waiting,
//! laziness, or failure semantics an effect has come from its dictionary.

use std::sync::Arc;
use std::time::Duration;

use super::{RetryPolicy, RetryStatus};
use crate::monad::{MonadDelay, MonadRec};
use crate::trampoline::Trampoline;

type Step<A> = Trampoline<RetryStatus, A>;

/// Advance `status` under `policy`, waiting through `dict` when the policy
/// asks for a delay.
///
/// The yielded status always has `iter_number + 1`. When the policy says stop,
/// no delay is requested and the yielded status has no `previous_delay`; the
/// retry loop reads that as "give up".
///
/// ```rust
/// use eddy::monad::Identity;
/// use eddy::retry::{apply_and_delay, RetryPolicy, RetryStatus};
/// use std::time::Duration;
///
/// let policy = RetryPolicy::limit_retries(1);
/// let next = apply_and_delay(&Identity, &policy, RetryStatus::default());
/// assert_eq!(next.previous_delay, Some(Duration::ZERO));
///
/// let stop = apply_and_delay(&Identity, &policy, next);
/// assert_eq!(stop.iter_number, 2);
/// assert_eq!(stop.previous_delay, None);
/// ```
pub fn apply_and_delay<D>(dict: &D, policy: &RetryPolicy, status: RetryStatus) -> D::Of<RetryStatus>
where
    D: MonadDelay,
{
    let next = policy.apply(status);
    match next.previous_delay {
        Some(delay) => {
            log_scheduled(status, delay);
            dict.delay(delay, dict.of(next))
        }
        None => dict.of(next),
    }
}

/// Retry `action` under `policy` until `check` accepts its result.
///
/// - `action` receives the status of the current attempt.
/// - `check` returns `true` to ask for another attempt, `false` to accept.
///
/// When the policy stops, the last value produced by `action` is returned
/// unchanged: exhaustion is not an error of its own, so "the loop finished"
/// does not imply "the action succeeded". Failures that the effect itself
/// short-circuits on (an `Err` under [`ResultMonad`](crate::monad::ResultMonad),
/// a cancelled context under `TaskMonad`) end the loop immediately.
///
/// The loop runs through [`MonadRec::tail_rec_m`], so thousands of retries
/// use constant stack space.
///
/// # Example
///
/// ```rust
/// use eddy::monad::Identity;
/// use eddy::retry::{retrying, RetryPolicy, RetryStatus};
///
/// let run = retrying(
///     Identity,
///     RetryPolicy::limit_retries(10),
///     |status: RetryStatus| status.iter_number * 10,
///     |value: &u32| *value < 30,
/// );
///
/// assert_eq!(run(RetryStatus::default()), 30);
/// ```
pub fn retrying<D, A, Act, Chk>(
    dict: D,
    policy: RetryPolicy,
    action: Act,
    check: Chk,
) -> impl Fn(RetryStatus) -> D::Of<A> + Clone + Send + Sync + 'static
where
    D: MonadRec + MonadDelay,
    A: Send + 'static,
    Act: Fn(RetryStatus) -> D::Of<A> + Send + Sync + 'static,
    Chk: Fn(&A) -> bool + Send + Sync + 'static,
{
    let action = Arc::new(action);
    let check = Arc::new(check);

    move |initial: RetryStatus| {
        let step_dict = dict.clone();
        let policy = policy.clone();
        let action = Arc::clone(&action);
        let check = Arc::clone(&check);

        dict.tail_rec_m::<RetryStatus, A, _>(initial, move |status: RetryStatus| {
            let dict = step_dict.clone();
            let policy = policy.clone();
            let check = Arc::clone(&check);

            step_dict.chain::<A, Step<A>, _>(action(status), move |value: A| {
                if !check(&value) {
                    return dict.of::<Step<A>>(Trampoline::Land(value));
                }
                let next = apply_and_delay(&dict, &policy, status);
                dict.map::<RetryStatus, Step<A>, _>(next, move |next: RetryStatus| {
                    decide(status, next, value)
                })
            })
        })
    }
}

fn decide<A>(current: RetryStatus, next: RetryStatus, value: A) -> Step<A> {
    match next.previous_delay {
        Some(_) => Trampoline::Bounce(next),
        None => {
            log_exhausted(current);
            Trampoline::Land(value)
        }
    }
}

#[cfg(feature = "tracing")]
fn log_scheduled(current: RetryStatus, delay: Duration) {
    tracing::debug!(
        attempt = current.iter_number,
        delay = ?delay,
        cumulative_delay = ?current.cumulative_delay.saturating_add(delay),
        "retry scheduled"
    );
}

#[cfg(not(feature = "tracing"))]
fn log_scheduled(_current: RetryStatus, _delay: Duration) {}

#[cfg(feature = "tracing")]
fn log_exhausted(current: RetryStatus) {
    tracing::debug!(
        attempts = current.iter_number.saturating_add(1),
        cumulative_delay = ?current.cumulative_delay,
        "retry policy exhausted, returning last result"
    );
}

#[cfg(not(feature = "tracing"))]
fn log_exhausted(_current: RetryStatus) {}
