use core::future::Future;

use super::{RunWithTimeout, Settle};
use crate::time::Duration;
use crate::Error;

/// Extend `Future` with control-flow operations.
pub trait FutureExt: Future {
    /// Return an error if a future does not complete within a given time span.
    ///
    /// The error is [`Error::Timeout`] converted into the future's own error
    /// type. A zero duration or [`Duration::MAX`] disables the deadline.
    ///
    /// Dropping the returned `RunWithTimeout` cancels the future. To let it
    /// finish after a timeout, await the race by `&mut` and take the future
    /// back with [`RunWithTimeout::into_task`].
    ///
    /// # Example
    ///
    /// ```
    /// use futures_flow::prelude::*;
    /// use futures_flow::task::wait;
    /// use futures_flow::time::Duration;
    /// use futures_flow::Error;
    ///
    /// futures_flow::runtime::block_on(async {
    ///     let res = async {
    ///         wait(Duration::from_millis(100)).await; // longer delay
    ///         Ok::<_, Error>("meow")
    ///     }
    ///     .timeout(Duration::from_millis(50)) // shorter timeout
    ///     .await;
    ///     assert!(res.unwrap_err().is_timeout()); // error
    ///
    ///     let res = async {
    ///         wait(Duration::from_millis(50)).await; // shorter delay
    ///         Ok::<_, Error>("meow")
    ///     }
    ///     .timeout(Duration::from_millis(100)) // longer timeout
    ///     .await;
    ///     assert_eq!(res.unwrap(), "meow"); // success
    /// });
    /// ```
    fn timeout<T, E>(self, dur: Duration) -> RunWithTimeout<Self, E>
    where
        Self: Sized + Future<Output = Result<T, E>>,
        E: From<Error>,
    {
        super::run_with_timeout(super::Task::running(self), dur)
    }

    /// Resolve with the [`Outcome`] of this future instead of failing.
    ///
    /// [`Outcome`]: super::Outcome
    fn settle<T, E>(self) -> Settle<Self>
    where
        Self: Sized + Future<Output = Result<T, E>>,
    {
        super::settle(self)
    }
}

impl<F> FutureExt for F where F: Future {}
