use super::{CancelCause, Cancelled, Context, Task};

/// Run a function task and an argument task concurrently, then apply one to
/// the other.
///
/// Both tasks run on a child of the caller's context. The first failure
/// cancels that child so the sibling can stop early, but both are always
/// joined before this task completes. If both fail, the function side's error
/// is returned. A context that is already cancelled starts neither task.
///
/// # Examples
///
/// ```rust
/// use eddy::context::{ap_par, Cancelled, Context, Task};
///
/// # tokio_test::block_on(async {
/// let add_one = Task::<_, Cancelled>::of(|x: i32| x + 1);
/// let answer = ap_par(add_one, Task::of(41));
/// assert_eq!(answer.run(Context::background()).await, Ok(42));
/// # });
/// ```
pub fn ap_par<A, B, F, E>(fab: Task<F, E>, fa: Task<A, E>) -> Task<B, E>
where
    A: Send + 'static,
    B: Send + 'static,
    F: FnOnce(A) -> B + Send + 'static,
    E: From<Cancelled> + Send + 'static,
{
    Task::new(move |ctx: Context| async move {
        if let Some(err) = ctx.error() {
            return Err(E::from(err));
        }

        let (child, handle) = ctx.with_cancel();
        let sibling_failed = || handle.cancel_with(CancelCause::Reason("sibling task failed".into()));

        let left = async {
            let result = fab.with_context().run(child.clone()).await;
            if result.is_err() {
                sibling_failed();
            }
            result
        };
        let right = async {
            let result = fa.with_context().run(child.clone()).await;
            if result.is_err() {
                sibling_failed();
            }
            result
        };

        let (f, a) = futures::join!(left, right);
        handle.cancel();

        let f = f?;
        let a = a?;
        Ok(f(a))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[derive(Debug, Clone, PartialEq)]
    enum JobError {
        Failed(&'static str),
        Cancelled(CancelCause),
    }

    impl From<Cancelled> for JobError {
        fn from(err: Cancelled) -> Self {
            JobError::Cancelled(err.into_cause())
        }
    }

    /// Sleeps for `duration` unless its context is cancelled first.
    fn slow<T: Send + 'static>(duration: Duration, value: T, stopped: Arc<AtomicBool>) -> Task<T, JobError> {
        Task::new(move |ctx: Context| async move {
            tokio::select! {
                () = tokio::time::sleep(duration) => Ok(value),
                () = ctx.cancelled() => {
                    stopped.store(true, Ordering::SeqCst);
                    Err(JobError::Cancelled(ctx.cause().unwrap_or(CancelCause::Canceled)))
                }
            }
        })
    }

    #[tokio::test]
    async fn test_applies_function_to_argument() {
        let task = ap_par(
            Task::<_, JobError>::of(|s: &str| s.len()),
            Task::of("four"),
        );
        assert_eq!(task.run(Context::background()).await, Ok(4));
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_concurrently() {
        let unused = Arc::new(AtomicBool::new(false));
        let task = ap_par(
            slow(Duration::from_secs(1), |x: u32| x * 2, Arc::clone(&unused)),
            slow(Duration::from_secs(1), 21, unused),
        );

        let start = tokio::time::Instant::now();
        assert_eq!(task.run(Context::background()).await, Ok(42));
        assert!(start.elapsed() < Duration::from_millis(1_500));
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_cancels_sibling() {
        let stopped = Arc::new(AtomicBool::new(false));
        let failing: Task<fn(u32) -> u32, JobError> = Task::new(|_| async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            Err(JobError::Failed("fetch config"))
        });
        let task = ap_par(failing, slow(Duration::from_secs(3600), 1, Arc::clone(&stopped)));

        let start = tokio::time::Instant::now();
        let result = task.run(Context::background()).await;

        assert_eq!(result, Err(JobError::Failed("fetch config")));
        assert!(stopped.load(Ordering::SeqCst));
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_function_side_error_takes_precedence() {
        let stopped = Arc::new(AtomicBool::new(false));
        let task = ap_par(
            slow(Duration::from_secs(3600), |x: u32| x, Arc::clone(&stopped)),
            Task::fail(JobError::Failed("load user")),
        );

        // the function side stops with the cancellation its sibling caused
        let result = task.run(Context::background()).await;
        assert!(stopped.load(Ordering::SeqCst));
        assert_eq!(
            result,
            Err(JobError::Cancelled(CancelCause::Reason("sibling task failed".into())))
        );
    }

    #[tokio::test]
    async fn test_cancelled_context_starts_nothing() {
        let started = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&started);
        let (ctx, handle) = Context::background().with_cancel();
        handle.cancel();

        let task = ap_par(
            Task::<_, JobError>::of(|x: u32| x),
            Task::new(move |_| async move {
                flag.store(true, Ordering::SeqCst);
                Ok(1)
            }),
        );

        assert_eq!(task.run(ctx).await, Err(JobError::Cancelled(CancelCause::Canceled)));
        assert!(!started.load(Ordering::SeqCst));
    }
}
