use super::{Cancelled, Context, Task, TaskMonad};
use crate::retry::{self, RetryPolicy, RetryStatus};

/// Retry a context-bound task under `policy`.
///
/// Unlike the generic [`retry::retrying`] over [`TaskMonad`], the action's
/// failures are visible to `check`: it receives the whole `Result` of each
/// attempt and returns `true` to ask for another one. Cancellation of the
/// context is never subject to `check`. It stops the loop before the next
/// attempt or in the middle of a delay and is reported as `E::from(Cancelled)`.
///
/// When the policy gives up, the last attempt's result is returned unchanged.
///
/// # Examples
///
/// ```rust
/// use eddy::context::{self, Cancelled, Context, Task};
/// use eddy::retry::{RetryPolicy, RetryStatus};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let flaky = context::retrying(
///     RetryPolicy::limit_retries(2).concat(RetryPolicy::constant_delay(Duration::from_millis(1))),
///     |status: RetryStatus| Task::<u32, Cancelled>::of(status.iter_number),
///     |result: &Result<u32, Cancelled>| matches!(result, Ok(n) if *n < 10),
/// );
///
/// // every attempt asks for another one; the policy stops after two retries
/// assert_eq!(flaky(RetryStatus::default()).run(Context::background()).await, Ok(2));
/// # });
/// ```
pub fn retrying<A, E, Act, Chk>(
    policy: RetryPolicy,
    action: Act,
    check: Chk,
) -> impl Fn(RetryStatus) -> Task<A, E> + Clone + Send + Sync + 'static
where
    A: Send + 'static,
    E: From<Cancelled> + Send + 'static,
    Act: Fn(RetryStatus) -> Task<A, E> + Send + Sync + 'static,
    Chk: Fn(&Result<A, E>) -> bool + Send + Sync + 'static,
{
    // Attempts always succeed in the outer channel, carrying their own result
    // as the value. Only cancellation fails the outer task.
    let attempt = move |status: RetryStatus| {
        let task = action(status);
        Task::new(move |ctx: Context| async move { Ok::<_, E>(task.run(ctx).await) })
    };
    let run = retry::retrying(TaskMonad::<E>::new(), policy, attempt, check);

    move |status: RetryStatus| {
        let outcome = run(status);
        Task::new(move |ctx: Context| async move { outcome.run(ctx).await? })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CancelCause;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum CallError {
        Transient,
        Fatal,
        Cancelled(Cancelled),
    }

    impl From<Cancelled> for CallError {
        fn from(err: Cancelled) -> Self {
            CallError::Cancelled(err)
        }
    }

    fn is_transient(result: &Result<u32, CallError>) -> bool {
        matches!(result, Err(CallError::Transient))
    }

    fn counted(
        calls: &Arc<AtomicU32>,
        outcome: fn(RetryStatus) -> Result<u32, CallError>,
    ) -> impl Fn(RetryStatus) -> Task<u32, CallError> + Send + Sync + 'static {
        let calls = Arc::clone(calls);
        move |status: RetryStatus| {
            let calls = Arc::clone(&calls);
            Task::new(move |_ctx: Context| async move {
                calls.fetch_add(1, Ordering::SeqCst);
                outcome(status)
            })
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_retries_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let run = retrying(
            RetryPolicy::limit_retries(5).concat(RetryPolicy::constant_delay(Duration::from_millis(100))),
            counted(&calls, |status| {
                if status.iter_number < 2 {
                    Err(CallError::Transient)
                } else {
                    Ok(status.iter_number)
                }
            }),
            is_transient,
        );

        let start = tokio::time::Instant::now();
        assert_eq!(run(RetryStatus::default()).run(Context::background()).await, Ok(2));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert!(start.elapsed() >= Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_non_retryable_failure_is_returned() {
        let calls = Arc::new(AtomicU32::new(0));
        let run = retrying(
            RetryPolicy::limit_retries(5),
            counted(&calls, |_| Err(CallError::Fatal)),
            is_transient,
        );

        let result = run(RetryStatus::default()).run(Context::background()).await;
        assert_eq!(result, Err(CallError::Fatal));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_returns_last_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let run = retrying(
            RetryPolicy::limit_retries(3),
            counted(&calls, |_| Err(CallError::Transient)),
            is_transient,
        );

        let result = run(RetryStatus::default()).run(Context::background()).await;
        assert_eq!(result, Err(CallError::Transient));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_during_delay_returns_promptly() {
        let calls = Arc::new(AtomicU32::new(0));
        let run = retrying(
            RetryPolicy::limit_retries(10).concat(RetryPolicy::constant_delay(Duration::from_secs(1))),
            counted(&calls, |_| Err(CallError::Transient)),
            is_transient,
        );

        let (ctx, handle) = Context::background().with_cancel();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(1_500)).await;
            handle.cancel_with(CancelCause::Reason("shutdown".into()));
        });

        let start = tokio::time::Instant::now();
        let result = run(RetryStatus::default()).run(ctx).await;

        assert_eq!(
            result,
            Err(CallError::Cancelled(Cancelled::new(CancelCause::Reason("shutdown".into()))))
        );
        // attempts at t=0 and t=1s, then cancelled halfway through the second delay
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(start.elapsed() < Duration::from_secs(2));
    }

    #[tokio::test]
    async fn test_cancelled_before_start_never_calls_action() {
        let calls = Arc::new(AtomicU32::new(0));
        let run = retrying(
            RetryPolicy::limit_retries(3),
            counted(&calls, |_| Ok(1)),
            is_transient,
        );

        let (ctx, handle) = Context::background().with_cancel();
        handle.cancel();

        let result = run(RetryStatus::default()).run(ctx).await;
        assert_eq!(result, Err(CallError::Cancelled(Cancelled::new(CancelCause::Canceled))));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_surfaces_deadline_exceeded() {
        let calls = Arc::new(AtomicU32::new(0));
        let run = retrying(
            RetryPolicy::exponential_backoff(Duration::from_millis(10)),
            counted(&calls, |_| Err(CallError::Transient)),
            is_transient,
        );

        let (ctx, _handle) = Context::background().with_timeout(Duration::from_millis(100));
        let result = run(RetryStatus::default()).run(ctx).await;

        assert!(matches!(result, Err(CallError::Cancelled(ref err)) if err.is_deadline_exceeded()));
        // attempts at 0, 10, 30, 70ms; the 80ms delay after that is cut short
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_action_observing_cancellation_is_not_retried() {
        let (ctx, handle) = Context::background().with_cancel();
        let handle = Arc::new(handle);
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);

        let run = retrying(
            RetryPolicy::limit_retries(5),
            move |_: RetryStatus| {
                let handle = Arc::clone(&handle);
                let counter = Arc::clone(&counter);
                Task::new(move |ctx: Context| async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    handle.cancel();
                    Err::<u32, _>(CallError::from(ctx.error().unwrap_or_else(|| {
                        Cancelled::new(CancelCause::Canceled)
                    })))
                })
            },
            |result: &Result<u32, CallError>| !matches!(result, Err(CallError::Cancelled(_))),
        );

        let result = run(RetryStatus::default()).run(ctx).await;
        assert_eq!(result, Err(CallError::Cancelled(Cancelled::new(CancelCause::Canceled))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
