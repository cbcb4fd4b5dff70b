use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::time::Duration;

use futures::future::{BoxFuture, FutureExt};

use super::{log_cancelled, sleep, Cancelled, Context};
use crate::monad::{Monad, MonadDelay, MonadRec};
use crate::trampoline::Trampoline;

/// A lazy async computation that needs a [`Context`] to run.
///
/// Nothing happens until [`run`](Task::run) is awaited. A task runs at most
/// once.
///
/// # Examples
///
/// ```rust
/// use eddy::context::{Context, Task};
///
/// # tokio_test::block_on(async {
/// let task = Task::<i32, String>::of(20)
///     .map(|x| x + 1)
///     .and_then(|x| Task::of(x * 2));
///
/// assert_eq!(task.run(Context::background()).await, Ok(42));
/// # });
/// ```
pub struct Task<T, E> {
    thunk: Box<dyn FnOnce(Context) -> BoxFuture<'static, Result<T, E>> + Send>,
}

impl<T, E> Task<T, E> {
    /// Build a task from an async function of the context.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: FnOnce(Context) -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
    {
        Task {
            thunk: Box::new(move |ctx| f(ctx).boxed()),
        }
    }

    /// Run the task under `ctx`.
    pub async fn run(self, ctx: Context) -> Result<T, E> {
        (self.thunk)(ctx).await
    }
}

impl<T: Send + 'static, E: Send + 'static> Task<T, E> {
    /// A task that succeeds with `value`.
    pub fn of(value: T) -> Self {
        Task::new(move |_| async move { Ok(value) })
    }

    /// A task that fails with `error`.
    pub fn fail(error: E) -> Self {
        Task::new(move |_| async move { Err(error) })
    }

    /// A task that yields `result`.
    pub fn from_result(result: Result<T, E>) -> Self {
        Task::new(move |_| async move { result })
    }

    /// Transform the success value.
    pub fn map<U, F>(self, f: F) -> Task<U, E>
    where
        U: Send + 'static,
        F: FnOnce(T) -> U + Send + 'static,
    {
        Task::new(move |ctx| async move { self.run(ctx).await.map(f) })
    }

    /// Transform the error.
    pub fn map_err<E2, F>(self, f: F) -> Task<T, E2>
    where
        E2: Send + 'static,
        F: FnOnce(E) -> E2 + Send + 'static,
    {
        Task::new(move |ctx| async move { self.run(ctx).await.map_err(f) })
    }

    /// Sequence with a task built from the success value. Both run under the
    /// same context.
    pub fn and_then<U, F>(self, f: F) -> Task<U, E>
    where
        U: Send + 'static,
        F: FnOnce(T) -> Task<U, E> + Send + 'static,
    {
        Task::new(move |ctx: Context| async move {
            let value = self.run(ctx.clone()).await?;
            f(value).run(ctx).await
        })
    }
}

impl<T: Send + 'static, E: From<Cancelled> + Send + 'static> Task<T, E> {
    /// Refuse to start when the context is already cancelled.
    pub fn with_context(self) -> Self {
        Task::new(move |ctx: Context| async move {
            if let Some(err) = ctx.error() {
                log_cancelled(&err, "start");
                return Err(E::from(err));
            }
            self.run(ctx).await
        })
    }
}

impl<T, E> fmt::Debug for Task<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").finish_non_exhaustive()
    }
}

/// Dictionary for [`Task<T, E>`] with a fixed error type.
///
/// The loop and delay operations observe the task's context:
///
/// - `tail_rec_m` checks for cancellation before every step and fails with the
///   cancellation cause instead of stepping again;
/// - `delay` refuses to start on a cancelled context and cuts the wait short
///   when cancellation arrives mid-delay.
///
/// A failing step stops the loop with that failure.
pub struct TaskMonad<E>(PhantomData<fn() -> E>);

impl<E> TaskMonad<E> {
    /// Create the dictionary.
    pub const fn new() -> Self {
        TaskMonad(PhantomData)
    }
}

impl<E> Default for TaskMonad<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for TaskMonad<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for TaskMonad<E> {}

impl<E> fmt::Debug for TaskMonad<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TaskMonad")
    }
}

impl<E: Send + 'static> Monad for TaskMonad<E> {
    type Of<T> = Task<T, E>;

    fn of<T>(&self, value: T) -> Task<T, E>
    where
        T: Send + 'static,
    {
        Task::of(value)
    }

    fn chain<X, Y, F>(&self, ma: Task<X, E>, f: F) -> Task<Y, E>
    where
        X: Send + 'static,
        Y: Send + 'static,
        F: FnOnce(X) -> Task<Y, E> + Send + 'static,
    {
        ma.and_then(f)
    }

    fn map<X, Y, F>(&self, ma: Task<X, E>, f: F) -> Task<Y, E>
    where
        X: Send + 'static,
        Y: Send + 'static,
        F: FnOnce(X) -> Y + Send + 'static,
    {
        ma.map(f)
    }
}

impl<E: From<Cancelled> + Send + 'static> MonadRec for TaskMonad<E> {
    fn tail_rec_m<S, R, F>(&self, initial: S, step: F) -> Task<R, E>
    where
        S: Send + 'static,
        R: Send + 'static,
        F: FnMut(S) -> Task<Trampoline<S, R>, E> + Send + 'static,
    {
        Task::new(move |ctx: Context| async move {
            let mut step = step;
            let mut state = initial;
            loop {
                if let Some(err) = ctx.error() {
                    log_cancelled(&err, "step");
                    return Err(E::from(err));
                }
                match step(state).run(ctx.clone()).await? {
                    Trampoline::Bounce(next) => state = next,
                    Trampoline::Land(result) => return Ok(result),
                }
            }
        })
    }
}

impl<E: From<Cancelled> + Send + 'static> MonadDelay for TaskMonad<E> {
    fn delay<X>(&self, duration: Duration, ma: Task<X, E>) -> Task<X, E>
    where
        X: Send + 'static,
    {
        Task::new(move |ctx: Context| async move {
            if let Err(err) = sleep(&ctx, duration).await {
                log_cancelled(&err, "delay");
                return Err(E::from(err));
            }
            ma.run(ctx).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::CancelCause;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    type TestTask<T> = Task<T, Cancelled>;

    #[tokio::test]
    async fn test_task_is_lazy() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let task: TestTask<u32> = Task::new(move |_| async move {
            Ok(counter.fetch_add(1, Ordering::SeqCst) + 1)
        });

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(task.run(Context::background()).await, Ok(1));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_and_then_short_circuits() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&calls);
        let task = Task::<u32, String>::fail("boom".to_string()).and_then(move |x| {
            counter.fetch_add(1, Ordering::SeqCst);
            Task::of(x + 1)
        });

        assert_eq!(task.run(Context::background()).await, Err("boom".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_with_context_refuses_cancelled() {
        let (ctx, handle) = Context::background().with_cancel();
        handle.cancel_with(CancelCause::Reason("closed".into()));

        let result = TestTask::of(1).with_context().run(ctx).await;
        assert_eq!(result, Err(Cancelled::new(CancelCause::Reason("closed".into()))));
    }

    #[tokio::test]
    async fn test_tail_rec_stack_safe() {
        let dict = TaskMonad::<Cancelled>::new();
        let task = dict.tail_rec_m(100_000u32, |n| {
            Task::of(if n == 0 {
                Trampoline::Land("done")
            } else {
                Trampoline::Bounce(n - 1)
            })
        });
        assert_eq!(task.run(Context::background()).await, Ok("done"));
    }

    #[tokio::test]
    async fn test_tail_rec_stops_when_cancelled_mid_loop() {
        let (ctx, handle) = Context::background().with_cancel();
        let steps = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&steps);

        let task: TestTask<()> = TaskMonad::new().tail_rec_m(0u32, move |n| {
            counter.fetch_add(1, Ordering::SeqCst);
            if n == 3 {
                handle.cancel();
            }
            Task::of(Trampoline::Bounce(n + 1))
        });

        let result = task.run(ctx).await;
        assert_eq!(result, Err(Cancelled::new(CancelCause::Canceled)));
        assert_eq!(steps.load(Ordering::SeqCst), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_waits() {
        let start = tokio::time::Instant::now();
        let task: TestTask<i32> = TaskMonad::new().delay(Duration::from_secs(5), Task::of(9));
        assert_eq!(task.run(Context::background()).await, Ok(9));
        assert!(start.elapsed() >= Duration::from_secs(5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_interrupted_skips_wrapped_task() {
        let (ctx, _handle) = Context::background().with_timeout(Duration::from_millis(20));
        let ran = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&ran);
        let inner: TestTask<()> = Task::new(move |_| async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });

        let result = TaskMonad::new().delay(Duration::from_secs(60), inner).run(ctx).await;

        assert!(matches!(result, Err(ref err) if err.is_deadline_exceeded()));
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }
}
