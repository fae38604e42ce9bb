use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::error::AggregateError;

/// Resolve with the first future to succeed.
///
/// All futures are polled concurrently. If every one of them fails, this
/// resolves with an [`AggregateError`] holding each error in input order.
/// The remaining futures are dropped as soon as one succeeds.
///
/// # Examples
///
/// ```
/// use futures_flow::future::first_success;
///
/// async fn mirror(name: &'static str, up: bool) -> Result<&'static str, String> {
///     if up { Ok(name) } else { Err(format!("{name} is down")) }
/// }
///
/// futures_flow::runtime::block_on(async {
///     let fastest = first_success(vec![mirror("a", false), mirror("b", true)]).await;
///     assert_eq!(fastest, Ok("b"));
/// });
/// ```
pub fn first_success<I, Fut, T, E>(futures: I) -> FirstSuccess<Fut, E>
where
    I: IntoIterator<Item = Fut>,
    Fut: Future<Output = Result<T, E>>,
{
    let pending: Vec<_> = futures.into_iter().map(|fut| Some(Box::pin(fut))).collect();
    let errors = pending.iter().map(|_| None).collect();
    FirstSuccess {
        pending,
        errors,
        completed: false,
    }
}

/// A future which resolves with the first success among a set of futures.
///
/// This `struct` is created by [`first_success`].
#[must_use = "futures do nothing unless polled or .awaited"]
pub struct FirstSuccess<Fut, E> {
    pending: Vec<Option<Pin<Box<Fut>>>>,
    errors: Vec<Option<E>>,
    completed: bool,
}

// Neither the futures (boxed) nor the errors are ever pinned.
impl<Fut, E> Unpin for FirstSuccess<Fut, E> {}

impl<Fut, T, E> Future for FirstSuccess<Fut, E>
where
    Fut: Future<Output = Result<T, E>>,
{
    type Output = Result<T, AggregateError<E>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        assert!(!this.completed, "future polled after completing");

        for (slot, error) in this.pending.iter_mut().zip(this.errors.iter_mut()) {
            let Some(future) = slot else { continue };
            match future.as_mut().poll(cx) {
                Poll::Ready(Ok(value)) => {
                    this.completed = true;
                    return Poll::Ready(Ok(value));
                }
                Poll::Ready(Err(err)) => {
                    *error = Some(err);
                    *slot = None;
                }
                Poll::Pending => {}
            }
        }

        if this.pending.iter().any(Option::is_some) {
            return Poll::Pending;
        }
        this.completed = true;
        let errors = this.errors.drain(..).flatten().collect();
        Poll::Ready(Err(AggregateError::new(errors)))
    }
}

impl<Fut, E> fmt::Debug for FirstSuccess<Fut, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FirstSuccess")
            .field("pending", &self.pending.iter().filter(|f| f.is_some()).count())
            .field("completed", &self.completed)
            .finish()
    }
}
