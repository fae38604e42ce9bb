use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_concurrency::future::Join;
use futures_core::ready;
use pin_project_lite::pin_project;

/// How a fallible future settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome<T, E> {
    /// The future resolved with `Ok`.
    Fulfilled(T),
    /// The future resolved with `Err`.
    Rejected(E),
}

impl<T, E> Outcome<T, E> {
    /// Returns `true` if the future resolved with `Ok`.
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, Outcome::Fulfilled(_))
    }

    /// Returns `true` if the future resolved with `Err`.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Outcome::Rejected(_))
    }

    /// The value, if the future was fulfilled.
    pub fn value(&self) -> Option<&T> {
        match self {
            Outcome::Fulfilled(value) => Some(value),
            Outcome::Rejected(_) => None,
        }
    }

    /// The error, if the future was rejected.
    pub fn reason(&self) -> Option<&E> {
        match self {
            Outcome::Fulfilled(_) => None,
            Outcome::Rejected(reason) => Some(reason),
        }
    }

    /// Converts back into a `Result`.
    pub fn into_result(self) -> Result<T, E> {
        self.into()
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        match result {
            Ok(value) => Outcome::Fulfilled(value),
            Err(reason) => Outcome::Rejected(reason),
        }
    }
}

impl<T, E> From<Outcome<T, E>> for Result<T, E> {
    fn from(outcome: Outcome<T, E>) -> Self {
        match outcome {
            Outcome::Fulfilled(value) => Ok(value),
            Outcome::Rejected(reason) => Err(reason),
        }
    }
}

/// Turn a fallible future into one that always resolves, with an [`Outcome`].
pub fn settle<Fut>(future: Fut) -> Settle<Fut> {
    Settle { future }
}

pin_project! {
    /// A future that resolves with the [`Outcome`] of another.
    ///
    /// This `struct` is created by [`settle`] and [`FutureExt::settle`].
    ///
    /// [`FutureExt::settle`]: crate::future::FutureExt::settle
    #[derive(Debug)]
    #[must_use = "futures do nothing unless polled or .awaited"]
    pub struct Settle<Fut> {
        #[pin]
        future: Fut,
    }
}

impl<Fut, T, E> Future for Settle<Fut>
where
    Fut: Future<Output = Result<T, E>>,
{
    type Output = Outcome<T, E>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let result = ready!(self.project().future.poll(cx));
        Poll::Ready(result.into())
    }
}

/// Run every future concurrently and collect their outcomes in input order.
///
/// Never fails: errors are returned as [`Outcome::Rejected`].
pub async fn all_settled<I, Fut, T, E>(futures: I) -> Vec<Outcome<T, E>>
where
    I: IntoIterator<Item = Fut>,
    Fut: Future<Output = Result<T, E>>,
{
    futures
        .into_iter()
        .map(settle)
        .collect::<Vec<_>>()
        .join()
        .await
}

/// Run every future to completion, then fail with the first error in input
/// order, if any.
///
/// Unlike a fail-fast join, every future is driven until it settles before
/// the error is returned.
///
/// # Examples
///
/// ```
/// use futures_flow::future::all_settled_reject;
///
/// async fn fetch(name: &'static str) -> Result<&'static str, String> {
///     Ok(name)
/// }
///
/// futures_flow::runtime::block_on(async {
///     let all = all_settled_reject(vec![fetch("a"), fetch("b")]).await;
///     assert_eq!(all, Ok(vec!["a", "b"]));
/// });
/// ```
pub async fn all_settled_reject<I, Fut, T, E>(futures: I) -> Result<Vec<T>, E>
where
    I: IntoIterator<Item = Fut>,
    Fut: Future<Output = Result<T, E>>,
{
    all_settled(futures)
        .await
        .into_iter()
        .map(Outcome::into_result)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::wait;
    use crate::time::Duration;
    use futures_lite::future::block_on;
    use std::cell::Cell;

    async fn after(ms: u64, result: Result<u32, &'static str>) -> Result<u32, &'static str> {
        wait(Duration::from_millis(ms)).await;
        result
    }

    #[test]
    fn settle_never_fails() {
        assert_eq!(block_on(settle(after(1, Ok(1)))), Outcome::Fulfilled(1));
        let outcome = block_on(settle(after(1, Err("no"))));
        assert!(outcome.is_rejected());
        assert_eq!(outcome.reason(), Some(&"no"));
        assert_eq!(outcome.value(), None);
    }

    #[test]
    fn all_settled_keeps_input_order() {
        let outcomes = block_on(all_settled(vec![
            after(30, Ok(1)),
            after(1, Err("fast")),
            after(10, Ok(3)),
        ]));
        assert_eq!(
            outcomes,
            vec![
                Outcome::Fulfilled(1),
                Outcome::Rejected("fast"),
                Outcome::Fulfilled(3)
            ]
        );
    }

    #[test]
    fn all_settled_reject_reports_first_by_input_order() {
        let res = block_on(all_settled_reject(vec![
            after(1, Ok(1)),
            after(30, Err("slow")),
            after(1, Err("fast")),
        ]));
        assert_eq!(res, Err("slow"));
    }

    #[test]
    fn all_settled_reject_lets_slow_futures_finish() {
        let slow_resolved = Cell::new(false);
        let res = block_on(all_settled_reject(vec![
            Box::pin(async { Err::<(), _>("quick") })
                as Pin<Box<dyn Future<Output = Result<(), &str>> + '_>>,
            Box::pin(async {
                wait(Duration::from_millis(30)).await;
                slow_resolved.set(true);
                Ok(())
            }),
        ]));
        assert_eq!(res, Err("quick"));
        assert!(slow_resolved.get());
    }

    #[test]
    fn all_settled_reject_resolves_values() {
        let res = block_on(all_settled_reject(vec![after(1, Ok(1)), after(2, Ok(2))]));
        assert_eq!(res, Ok(vec![1, 2]));
    }
}
