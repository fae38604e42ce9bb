use std::convert::Infallible;
use std::future::Future;

use super::{map, Concurrency};
use crate::future::{settle, Outcome};

/// Map every item concurrently, collecting an [`Outcome`] per item in input
/// order. Never fails.
pub async fn settle_map<I, F, Fut, T, E>(items: I, mapper: F) -> Vec<Outcome<T, E>>
where
    I: IntoIterator,
    F: FnMut(I::Item, usize) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    settled(items, mapper, Concurrency::Unbounded).await
}

/// Map every item one at a time, collecting an [`Outcome`] per item in input
/// order. A failing item does not stop the ones after it.
pub async fn settle_series<I, F, Fut, T, E>(items: I, mapper: F) -> Vec<Outcome<T, E>>
where
    I: IntoIterator,
    F: FnMut(I::Item, usize) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    settled(items, mapper, Concurrency::SERIES).await
}

async fn settled<I, F, Fut, T, E>(
    items: I,
    mut mapper: F,
    concurrency: Concurrency,
) -> Vec<Outcome<T, E>>
where
    I: IntoIterator,
    F: FnMut(I::Item, usize) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let outcomes = map(
        items,
        move |item, index| {
            let outcome = settle(mapper(item, index));
            async move { Ok::<_, Infallible>(outcome.await) }
        },
        concurrency,
    )
    .await;
    match outcomes {
        Ok(outcomes) => outcomes,
        Err(never) => match never {},
    }
}
