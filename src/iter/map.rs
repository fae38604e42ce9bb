use std::fmt;
use std::future::Future;
use std::num::NonZeroUsize;
use std::pin::Pin;
use std::task::{Context, Poll};

use slab::Slab;

use crate::Error;

/// The maximum number of mapper futures a [`Map`] keeps in flight.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Concurrency {
    /// Start every item right away.
    #[default]
    Unbounded,
    /// Keep at most this many items in flight.
    Limited(NonZeroUsize),
}

impl Concurrency {
    /// One item at a time.
    pub const SERIES: Concurrency = Concurrency::Limited(NonZeroUsize::MIN);

    /// Keep at most `limit` items in flight.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `limit` is zero.
    pub fn new(limit: usize) -> Result<Self, Error> {
        NonZeroUsize::new(limit)
            .map(Concurrency::Limited)
            .ok_or_else(|| Error::invalid_argument("expected concurrency to be a positive integer"))
    }

    /// The limit, or `None` when unbounded.
    pub fn limit(&self) -> Option<usize> {
        match self {
            Concurrency::Unbounded => None,
            Concurrency::Limited(limit) => Some(limit.get()),
        }
    }

    fn admits(&self, in_flight: usize) -> bool {
        match self {
            Concurrency::Unbounded => true,
            Concurrency::Limited(limit) => in_flight < limit.get(),
        }
    }
}

impl TryFrom<usize> for Concurrency {
    type Error = Error;

    fn try_from(limit: usize) -> Result<Self, Self::Error> {
        Concurrency::new(limit)
    }
}

/// Accepts positive whole numbers, with `f64::INFINITY` meaning unbounded.
impl TryFrom<f64> for Concurrency {
    type Error = Error;

    fn try_from(limit: f64) -> Result<Self, Self::Error> {
        if limit == f64::INFINITY {
            return Ok(Concurrency::Unbounded);
        }
        if !(limit >= 1.0) || limit.fract() != 0.0 {
            return Err(Error::invalid_argument(format!(
                "expected concurrency to be a positive integer, got {limit}"
            )));
        }
        Concurrency::new(limit as usize)
    }
}

/// Map every item through `mapper`, keeping at most `concurrency` futures in
/// flight.
///
/// The output is in input order: index `i` always holds the result of
/// `mapper(items[i], i)`, whichever future finished first. The first error to
/// be discovered is returned and no further items are started.
///
/// Dropping the `Map` cancels the mapper futures still in flight, as dropping
/// any future does. To let them finish after a failure, await the `Map` by
/// `&mut` and take them back with [`Map::into_in_flight`].
///
/// Items that are themselves futures are awaited inside the mapper.
///
/// # Examples
///
/// ```
/// use futures_flow::iter::{map, Concurrency};
/// use futures_flow::task::wait;
/// use futures_flow::time::Duration;
///
/// futures_flow::runtime::block_on(async {
///     let delays = vec![30, 10, 20];
///     let doubled = map(
///         delays,
///         |ms, _index| async move {
///             wait(Duration::from_millis(ms)).await;
///             Ok::<_, std::convert::Infallible>(ms * 2)
///         },
///         Concurrency::new(2).unwrap(),
///     )
///     .await;
///     assert_eq!(doubled, Ok(vec![60, 20, 40]));
/// });
/// ```
pub fn map<I, F, Fut>(items: I, mapper: F, concurrency: Concurrency) -> Map<I::Item, F, Fut>
where
    I: IntoIterator,
    F: FnMut(I::Item, usize) -> Fut,
    Fut: Future,
{
    Map::new(items.into_iter().collect(), mapper, concurrency)
}

/// Map every item through `mapper`, one at a time.
///
/// Each item is only started once the previous one has completed.
pub fn map_series<I, F, Fut>(items: I, mapper: F) -> Map<I::Item, F, Fut>
where
    I: IntoIterator,
    F: FnMut(I::Item, usize) -> Fut,
    Fut: Future,
{
    map(items, mapper, Concurrency::SERIES)
}

/// A future which maps a sequence with bounded concurrency.
///
/// This `struct` is created by [`map`] and [`map_series`]. See their
/// documentation for more.
#[must_use = "futures do nothing unless polled or .awaited"]
pub struct Map<T, F, Fut: Future> {
    items: std::iter::Enumerate<std::vec::IntoIter<T>>,
    mapper: F,
    concurrency: Concurrency,
    in_flight: Slab<(usize, Pin<Box<Fut>>)>,
    /// One slot per input index, filled with successful outputs only.
    results: Vec<Option<Fut::Output>>,
    completed: usize,
    state: State,
}

/// The internal state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Running,
    Failed,
    Completed,
}

impl<T, F, Fut: Future> Map<T, F, Fut> {
    fn new(items: Vec<T>, mapper: F, concurrency: Concurrency) -> Self {
        let total = items.len();
        Self {
            items: items.into_iter().enumerate(),
            mapper,
            concurrency,
            in_flight: Slab::new(),
            results: (0..total).map(|_| None).collect(),
            completed: 0,
            state: State::Running,
        }
    }

    /// The number of items being mapped.
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// The number of mapper futures currently in flight.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }

    /// Take back the mapper futures which were still running, each with the
    /// index of its item, in index order.
    ///
    /// After a failure these futures are no longer polled by the `Map`.
    /// Await them, or hand them to an executor, to let them run to
    /// completion.
    pub fn into_in_flight(self) -> Vec<(usize, Pin<Box<Fut>>)> {
        let mut in_flight: Vec<_> = self.in_flight.into_iter().map(|(_, entry)| entry).collect();
        in_flight.sort_by_key(|(index, _)| *index);
        in_flight
    }
}

// The mapper futures are boxed and the results are never pinned.
impl<T, F, Fut: Future> Unpin for Map<T, F, Fut> {}

impl<T, F, Fut, O, E> Future for Map<T, F, Fut>
where
    F: FnMut(T, usize) -> Fut,
    Fut: Future<Output = Result<O, E>>,
{
    type Output = Result<Vec<O>, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        let this = &mut *self;
        match this.state {
            State::Running => {}
            State::Failed | State::Completed => panic!("future polled after completing"),
        }

        let mut finished = Vec::new();
        loop {
            if this.completed == this.results.len() {
                this.state = State::Completed;
                tracing::debug!(total = this.results.len(), "map completed");
                return Poll::Ready(this.results.drain(..).flatten().collect());
            }

            while this.concurrency.admits(this.in_flight.len()) {
                let Some((index, item)) = this.items.next() else {
                    break;
                };
                tracing::trace!(index, in_flight = this.in_flight.len(), "admitting item");
                let future = Box::pin((this.mapper)(item, index));
                this.in_flight.insert((index, future));
            }

            let mut failure = None;
            for (key, (index, future)) in this.in_flight.iter_mut() {
                let Poll::Ready(output) = future.as_mut().poll(cx) else {
                    continue;
                };
                finished.push(key);
                match output {
                    Ok(value) => this.results[*index] = Some(Ok(value)),
                    Err(err) => {
                        tracing::debug!(index = *index, "map failed, admitting no more items");
                        failure = Some(err);
                        break;
                    }
                }
            }

            if finished.is_empty() {
                return Poll::Pending;
            }
            // Only futures that are still running stay in the slab.
            this.completed += finished.len();
            for key in finished.drain(..) {
                this.in_flight.remove(key);
            }
            if let Some(err) = failure {
                this.state = State::Failed;
                return Poll::Ready(Err(err));
            }
        }
    }
}

impl<T, F, Fut: Future> fmt::Debug for Map<T, F, Fut> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Map")
            .field("total", &self.results.len())
            .field("completed", &self.completed)
            .field("in_flight", &self.in_flight.len())
            .field("concurrency", &self.concurrency)
            .field("state", &self.state)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::wait;
    use crate::time::Duration;
    use futures_lite::future::block_on;
    use std::cell::Cell;
    use std::convert::Infallible;

    async fn echo_after(value: u64) -> Result<u64, Infallible> {
        wait(Duration::from_millis(value)).await;
        Ok(value)
    }

    #[test]
    fn concurrency_validation() {
        assert!(Concurrency::new(0).is_err());
        assert_eq!(Concurrency::new(3).unwrap().limit(), Some(3));
        assert_eq!(Concurrency::try_from(f64::INFINITY), Ok(Concurrency::Unbounded));
        assert_eq!(Concurrency::try_from(2.0).unwrap().limit(), Some(2));
        for bad in [0.0, -1.0, 1.5, f64::NAN, f64::NEG_INFINITY] {
            let err = Concurrency::try_from(bad).unwrap_err();
            assert!(matches!(err, Error::InvalidArgument(_)), "{bad}");
        }
    }

    #[test]
    fn output_follows_input_order() {
        for concurrency in [Concurrency::SERIES, Concurrency::new(2).unwrap(), Concurrency::Unbounded] {
            let input = vec![100, 200, 10, 36, 13, 45];
            let res = block_on(map(input.clone(), |v, _| echo_after(v), concurrency));
            assert_eq!(res, Ok(input));
        }
    }

    #[test]
    fn out_of_order_completion() {
        let input = vec![200, 100, 50];
        let res = block_on(map(input.clone(), |v, _| echo_after(v), Concurrency::new(2).unwrap()));
        assert_eq!(res, Ok(input));
    }

    #[test]
    fn empty_input_never_calls_the_mapper() {
        let called = Cell::new(false);
        let res = block_on(map(
            Vec::<u64>::new(),
            |v, _| {
                called.set(true);
                echo_after(v)
            },
            Concurrency::SERIES,
        ));
        assert_eq!(res, Ok(vec![]));
        assert!(!called.get());
    }

    #[test]
    fn running_never_exceeds_the_limit() {
        let running = Cell::new(0);
        let peak = Cell::new(0);
        let res = block_on(map(
            0..40u64,
            |i, _| {
                let (running, peak) = (&running, &peak);
                async move {
                    running.set(running.get() + 1);
                    peak.set(peak.get().max(running.get()));
                    wait(Duration::from_millis(1 + i % 7)).await;
                    running.set(running.get() - 1);
                    Ok::<_, Infallible>(i)
                }
            },
            Concurrency::new(4).unwrap(),
        ));
        assert_eq!(res.unwrap(), (0..40).collect::<Vec<_>>());
        assert_eq!(peak.get(), 4);
    }

    #[test]
    fn first_discovered_failure_wins() {
        let started = Cell::new(0);
        let res = block_on(map(
            vec![(50, Ok(0)), (30, Err("late")), (5, Err("early")), (1, Ok(3))],
            |(ms, result), _| {
                started.set(started.get() + 1);
                async move {
                    wait(Duration::from_millis(ms)).await;
                    result
                }
            },
            Concurrency::new(3).unwrap(),
        ));
        assert_eq!(res, Err("early"));
        // The fourth item is never admitted once the map has failed.
        assert_eq!(started.get(), 3);
    }

    #[test]
    fn indices_are_passed_to_the_mapper() {
        let res = block_on(map(
            vec!["a", "b", "c"],
            |item, index| async move { Ok::<_, Infallible>(format!("{index}{item}")) },
            Concurrency::Unbounded,
        ));
        assert_eq!(res.unwrap(), vec!["0a", "1b", "2c"]);
    }

    #[test]
    fn in_flight_work_can_finish_after_a_failure() {
        let finished = Cell::new(false);
        block_on(async {
            let mut mapping = map(
                vec![(30, Ok(0)), (1, Err("fast"))],
                |(ms, result), _| {
                    let finished = &finished;
                    async move {
                        wait(Duration::from_millis(ms)).await;
                        finished.set(result.is_ok());
                        result
                    }
                },
                Concurrency::Unbounded,
            );
            assert_eq!((&mut mapping).await, Err("fast"));
            assert!(!finished.get());

            let mut rest = mapping.into_in_flight();
            assert_eq!(rest.len(), 1);
            let (index, future) = rest.remove(0);
            assert_eq!(index, 0);
            assert_eq!(future.await, Ok(0));
        });
        assert!(finished.get());
    }
}
