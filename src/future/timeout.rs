use std::fmt;
use std::future::{Future, IntoFuture};
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::task::{timeout_in_with, CancelableFuture};
use crate::time::Duration;
use crate::Error;

/// The work raced by [`run_with_timeout`]: either a future that is already
/// running, or a factory which starts one.
#[derive(Debug)]
pub enum Task<Fut, F = fn() -> Fut> {
    /// A future that has already been created.
    Running(Fut),
    /// A function called once to create the future.
    Factory(F),
}

impl<Fut> Task<Fut> {
    /// Race a future that has already been created.
    pub fn running(future: Fut) -> Self {
        Task::Running(future)
    }
}

impl<Fut, F> Task<Fut, F>
where
    F: FnOnce() -> Fut,
{
    /// Race the future created by `factory`. The factory is called right away.
    pub fn factory(factory: F) -> Self {
        Task::Factory(factory)
    }
}

impl<Fut, F> IntoFuture for Task<Fut, F>
where
    Fut: Future,
    F: FnOnce() -> Fut,
{
    type Output = Fut::Output;

    type IntoFuture = Fut;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Task::Running(future) => future,
            Task::Factory(factory) => factory(),
        }
    }
}

/// Race `task` against a deadline of `dur`.
///
/// If the deadline elapses before the task settles this resolves with
/// `"timed out after {ms}ms"` converted into the task's error type. Otherwise
/// the task's own result is returned unchanged. With no deadline, a zero
/// deadline or [`Duration::MAX`] the task is simply awaited.
///
/// # Cancellation
///
/// Dropping a future cancels it, so a timed out task only keeps running if
/// the caller keeps it. After a timeout the unfinished task is still held by
/// the returned [`RunWithTimeout`]: await it by `&mut` and take the task back
/// with [`RunWithTimeout::into_task`] to let it finish. A plain `.await`
/// drops the race, and with it the task, as soon as the deadline wins.
///
/// # Examples
///
/// ```
/// use futures_flow::future::{run_with_timeout, Task};
/// use futures_flow::task::wait;
/// use futures_flow::time::Duration;
/// use futures_flow::Error;
///
/// futures_flow::runtime::block_on(async {
///     let slow = Task::factory(|| async {
///         wait(Duration::from_millis(100)).await;
///         Ok::<_, Error>("meow")
///     });
///     let res = run_with_timeout(slow, Duration::from_millis(10)).await;
///     assert!(res.unwrap_err().is_timeout());
/// });
/// ```
pub fn run_with_timeout<Fut, F, T, E>(
    task: Task<Fut, F>,
    dur: impl Into<Option<Duration>>,
) -> RunWithTimeout<Fut, E>
where
    Fut: Future<Output = Result<T, E>>,
    F: FnOnce() -> Fut,
    E: From<Error>,
{
    let deadline = effective(dur.into()).map(|dur| {
        CancelableFuture::new(dur, move || Err(E::from(Error::timed_out_after(dur))))
            .on_cancel(|| Ok(()))
    });
    RunWithTimeout::new(task.into_future(), deadline)
}

/// Like [`run_with_timeout`], timing out with `message`.
pub fn run_with_timeout_message<Fut, F, T, E>(
    task: Task<Fut, F>,
    dur: impl Into<Option<Duration>>,
    message: impl Into<String>,
) -> RunWithTimeout<Fut, E>
where
    Fut: Future<Output = Result<T, E>>,
    F: FnOnce() -> Fut,
    E: From<Error>,
{
    let message = message.into();
    let deadline = effective(dur.into()).map(|dur| {
        CancelableFuture::new(dur, move || Err(E::from(Error::Timeout(message))))
            .on_cancel(|| Ok(()))
    });
    RunWithTimeout::new(task.into_future(), deadline)
}

/// Like [`run_with_timeout`], timing out with the error built by
/// `make_error`.
pub fn run_with_timeout_with<Fut, F, T, E, M>(
    task: Task<Fut, F>,
    dur: impl Into<Option<Duration>>,
    make_error: M,
) -> RunWithTimeout<Fut, E>
where
    Fut: Future<Output = Result<T, E>>,
    F: FnOnce() -> Fut,
    M: FnOnce() -> E + Send + 'static,
{
    let deadline = effective(dur.into()).map(|dur| timeout_in_with(dur, make_error));
    RunWithTimeout::new(task.into_future(), deadline)
}

/// Deadlines which can never elapse, or have nothing to wait for, are
/// dropped.
fn effective(dur: Option<Duration>) -> Option<Duration> {
    dur.filter(|dur| !dur.is_zero() && !dur.is_max())
}

/// A future that races a task against a deadline.
///
/// This `struct` is created by [`run_with_timeout`] and
/// [`FutureExt::timeout`]. See their documentation for more.
///
/// [`FutureExt::timeout`]: crate::future::FutureExt::timeout
#[must_use = "futures do nothing unless polled or .awaited"]
pub struct RunWithTimeout<Fut, E> {
    future: Option<Pin<Box<Fut>>>,
    deadline: Option<Pin<Box<CancelableFuture<Result<(), E>>>>>,
    completed: bool,
}

impl<Fut, E> RunWithTimeout<Fut, E> {
    pub(crate) fn new(future: Fut, deadline: Option<CancelableFuture<Result<(), E>>>) -> Self {
        Self {
            future: Some(Box::pin(future)),
            deadline: deadline.map(Box::pin),
            completed: false,
        }
    }

    /// Take back the raced task if it has not finished.
    ///
    /// After a timeout the task is still held here, exactly where the race
    /// left it. Await it, or hand it to an executor, to let it run to
    /// completion. Returns `None` once the task itself has finished.
    ///
    /// # Examples
    ///
    /// ```
    /// use futures_flow::future::{run_with_timeout, Task};
    /// use futures_flow::task::wait;
    /// use futures_flow::time::Duration;
    /// use futures_flow::Error;
    ///
    /// futures_flow::runtime::block_on(async {
    ///     let mut race = run_with_timeout(
    ///         Task::running(async {
    ///             wait(Duration::from_millis(30)).await;
    ///             Ok::<_, Error>("late")
    ///         }),
    ///         Duration::from_millis(5),
    ///     );
    ///     assert!((&mut race).await.unwrap_err().is_timeout());
    ///
    ///     let task = race.into_task().unwrap();
    ///     assert_eq!(task.await.unwrap(), "late");
    /// });
    /// ```
    pub fn into_task(self) -> Option<Pin<Box<Fut>>> {
        self.future
    }
}

// Both the task and the deadline are boxed.
impl<Fut, E> Unpin for RunWithTimeout<Fut, E> {}

impl<Fut, E> fmt::Debug for RunWithTimeout<Fut, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RunWithTimeout")
            .field("task_pending", &self.future.is_some())
            .field("deadline", &self.deadline)
            .field("completed", &self.completed)
            .finish()
    }
}

impl<Fut, T, E> Future for RunWithTimeout<Fut, E>
where
    Fut: Future<Output = Result<T, E>>,
{
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;

        assert!(!this.completed, "future polled after completing");

        if let Some(future) = this.future.as_mut() {
            if let Poll::Ready(output) = future.as_mut().poll(cx) {
                this.completed = true;
                this.future = None;
                if let Some(deadline) = this.deadline.take() {
                    deadline.cancel();
                }
                return Poll::Ready(output);
            }
        }

        let expired = match this.deadline.as_mut() {
            Some(deadline) => deadline.as_mut().poll(cx),
            None => return Poll::Pending,
        };
        match expired {
            Poll::Ready(Err(err)) => {
                // The task stays put so `into_task` can hand it back.
                tracing::debug!("task timed out");
                this.completed = true;
                this.deadline = None;
                Poll::Ready(Err(err))
            }
            // The deadline's cancel handle never leaves this future, so it
            // cannot resolve `Ok` from here. Keep waiting on the task.
            Poll::Ready(Ok(())) => {
                this.deadline = None;
                Poll::Pending
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::{timeout_in, wait};
    use futures_lite::future::block_on;
    use std::cell::Cell;

    async fn meow_after(ms: u64) -> Result<&'static str, Error> {
        wait(Duration::from_millis(ms)).await;
        Ok("meow")
    }

    #[test]
    fn task_wins_the_race() {
        let res = block_on(run_with_timeout(
            Task::factory(|| meow_after(10)),
            Duration::from_millis(200),
        ));
        assert_eq!(res, Ok("meow"));
    }

    #[test]
    fn deadline_wins_the_race() {
        let res = block_on(run_with_timeout(
            Task::running(meow_after(200)),
            Duration::from_millis(10),
        ));
        assert_eq!(res, Err(Error::Timeout("timed out after 10ms".into())));
    }

    #[test]
    fn task_errors_pass_through() {
        let res = block_on(run_with_timeout(
            Task::running(async { Err::<(), _>(Error::invalid_argument("bad")) }),
            Duration::from_millis(50),
        ));
        assert_eq!(res, Err(Error::InvalidArgument("bad".into())));
    }

    #[test]
    fn degenerate_deadlines_just_await() {
        for dur in [None, Some(Duration::ZERO), Some(Duration::MAX)] {
            let res = block_on(run_with_timeout(Task::factory(|| meow_after(5)), dur));
            assert_eq!(res, Ok("meow"));
        }
    }

    #[test]
    fn custom_timeout_errors() {
        let res = block_on(run_with_timeout_message(
            Task::running(meow_after(200)),
            Duration::from_millis(5),
            "took too long",
        ));
        assert_eq!(res, Err(Error::Timeout("took too long".into())));

        let res: Result<(), u32> = block_on(run_with_timeout_with(
            Task::running(async {
                wait(Duration::from_millis(200)).await;
                Ok(())
            }),
            Duration::from_millis(5),
            || 7,
        ));
        assert_eq!(res, Err(7));
    }

    #[test]
    fn winning_the_race_disarms_the_deadline() {
        let deadline = timeout_in(Duration::from_secs(5));
        let handle = deadline.cancel_handle();
        let res = block_on(RunWithTimeout::new(meow_after(1), Some(deadline)));
        assert_eq!(res, Ok("meow"));
        assert!(handle.is_canceled());
    }

    #[test]
    fn timed_out_task_can_still_finish() {
        let finished = Cell::new(false);
        block_on(async {
            let mut race = run_with_timeout(
                Task::running(async {
                    wait(Duration::from_millis(30)).await;
                    finished.set(true);
                    Ok::<_, Error>("late")
                }),
                Duration::from_millis(5),
            );
            assert!((&mut race).await.unwrap_err().is_timeout());
            assert!(!finished.get());

            let task = race.into_task().unwrap();
            assert_eq!(task.await, Ok("late"));
        });
        assert!(finished.get());
    }

    #[test]
    fn finished_task_is_not_handed_back() {
        let mut race = run_with_timeout(Task::running(meow_after(1)), Duration::from_secs(5));
        assert_eq!(block_on(&mut race), Ok("meow"));
        assert!(race.into_task().is_none());
    }
}
