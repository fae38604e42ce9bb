use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use async_channel::{Receiver, Sender};
use async_io::Timer;
use futures_core::Stream;
use pin_project_lite::pin_project;

use crate::time::Duration;

type Callback<T> = Box<dyn FnOnce() -> T + Send + 'static>;

/// Schedule `on_fire` to run after `delay`, or `on_cancel` if the returned
/// future is canceled first.
///
/// Whichever callback runs decides the output of the future. Return a
/// `Result` from both callbacks to model a task that can resolve or reject.
///
/// # Examples
///
/// ```
/// use futures_flow::task::schedule;
/// use futures_flow::time::Duration;
///
/// futures_flow::runtime::block_on(async {
///     let task = schedule(Duration::from_secs(60), || "fired", || "canceled");
///     task.cancel();
///     assert_eq!(task.await, "canceled");
/// });
/// ```
pub fn schedule<T, F, C>(delay: Duration, on_fire: F, on_cancel: C) -> CancelableFuture<T>
where
    F: FnOnce() -> T + Send + 'static,
    C: FnOnce() -> T + Send + 'static,
{
    CancelableFuture::new(delay, on_fire).on_cancel(on_cancel)
}

pin_project! {
    /// A timer-driven future which can be canceled before it fires.
    ///
    /// This `struct` is created by [`schedule`], [`wait`] and the
    /// [`timeout_in`] family. Canceling it disarms the timer, so the fire
    /// callback never runs; the cancel callback settles the future instead.
    /// Canceling after the future settled does nothing.
    ///
    /// [`wait`]: crate::task::wait
    /// [`timeout_in`]: crate::task::timeout_in
    #[must_use = "futures do nothing unless polled or .awaited"]
    pub struct CancelableFuture<T> {
        timer: Option<Timer>,
        #[pin]
        canceled: Receiver<()>,
        handle: CancelHandle,
        state: State<T>,
    }
}

/// A deadline past the end of the clock never fires.
fn arm(delay: Duration) -> Timer {
    match std::time::Instant::now().checked_add(delay.into()) {
        Some(deadline) => Timer::at(deadline),
        None => Timer::never(),
    }
}

/// The internal state
enum State<T> {
    Armed {
        on_fire: Callback<T>,
        on_cancel: Option<Callback<T>>,
    },
    /// Canceled without a cancel callback: stays pending forever.
    Abandoned,
    Completed,
}

impl<T> CancelableFuture<T> {
    /// Arm a timer for `delay` which settles the future through `on_fire`.
    ///
    /// Without a call to [`on_cancel`](Self::on_cancel), canceling the
    /// future leaves it pending forever.
    pub fn new<F>(delay: Duration, on_fire: F) -> Self
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let (sender, canceled) = async_channel::bounded(1);
        tracing::trace!(delay_ms = %delay.as_millis(), "timer armed");
        Self {
            timer: Some(arm(delay)),
            canceled,
            handle: CancelHandle { sender },
            state: State::Armed {
                on_fire: Box::new(on_fire),
                on_cancel: None,
            },
        }
    }

    /// Settle the future through `on_cancel` when it is canceled.
    pub fn on_cancel<C>(mut self, on_cancel: C) -> Self
    where
        C: FnOnce() -> T + Send + 'static,
    {
        if let State::Armed { on_cancel: slot, .. } = &mut self.state {
            *slot = Some(Box::new(on_cancel));
        }
        self
    }

    /// Cancel the future.
    ///
    /// The next time the future is polled it disarms its timer and settles
    /// through the cancel callback.
    pub fn cancel(&self) {
        self.handle.cancel();
    }

    /// Returns a handle which can cancel this future while it is being
    /// awaited elsewhere.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.handle.clone()
    }

    /// Returns `true` if [`cancel`](Self::cancel) has been called.
    pub fn is_canceled(&self) -> bool {
        self.handle.is_canceled()
    }
}

impl<T> Future for CancelableFuture<T> {
    type Output = T;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();

        // Any readiness on the channel means a `CancelHandle` closed it.
        let canceled = this.canceled.poll_next(cx).is_ready();
        if !canceled {
            if let Some(timer) = this.timer.as_mut() {
                if Pin::new(timer).poll(cx).is_pending() {
                    return Poll::Pending;
                }
            }
        }
        *this.timer = None;

        match std::mem::replace(this.state, State::Completed) {
            State::Armed { on_cancel, .. } if canceled => {
                tracing::trace!("timer canceled");
                match on_cancel {
                    Some(on_cancel) => Poll::Ready(on_cancel()),
                    None => {
                        *this.state = State::Abandoned;
                        Poll::Pending
                    }
                }
            }
            State::Armed { on_fire, .. } => {
                tracing::trace!("timer fired");
                Poll::Ready(on_fire())
            }
            State::Abandoned => {
                *this.state = State::Abandoned;
                Poll::Pending
            }
            State::Completed => panic!("future polled after completing"),
        }
    }
}

impl<T> fmt::Debug for CancelableFuture<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            State::Armed { .. } => "armed",
            State::Abandoned => "abandoned",
            State::Completed => "completed",
        };
        f.debug_struct("CancelableFuture")
            .field("state", &state)
            .field("canceled", &self.is_canceled())
            .finish()
    }
}

/// Cancels a [`CancelableFuture`] from outside the task awaiting it.
///
/// This `struct` is created by [`CancelableFuture::cancel_handle`].
#[derive(Debug, Clone)]
pub struct CancelHandle {
    sender: Sender<()>,
}

impl CancelHandle {
    /// Cancel the future this handle belongs to. Does nothing once the future
    /// has settled, or if it was already canceled.
    pub fn cancel(&self) {
        self.sender.close();
    }

    /// Returns `true` if the future has been canceled.
    pub fn is_canceled(&self) -> bool {
        self.sender.is_closed()
    }
}
