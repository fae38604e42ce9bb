use std::future::Future;

use super::{map, settle_map, Concurrency};
use crate::future::Outcome;
use crate::Error;

/// Split `items` into contiguous groups of `size`. The last group is shorter
/// when `size` does not divide the number of items.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `size` is zero.
///
/// # Examples
///
/// ```
/// use futures_flow::iter::chunk;
///
/// let groups = chunk(1..=5, 2).unwrap();
/// assert_eq!(groups, vec![vec![1, 2], vec![3, 4], vec![5]]);
/// ```
pub fn chunk<I>(items: I, size: usize) -> Result<Vec<Vec<I::Item>>, Error>
where
    I: IntoIterator,
{
    if size == 0 {
        return Err(Error::invalid_argument("expected chunk size > 0"));
    }
    let mut groups = Vec::new();
    let mut items = items.into_iter().peekable();
    while items.peek().is_some() {
        groups.push(items.by_ref().take(size).collect());
    }
    Ok(groups)
}

/// Concatenate groups into a single sequence, one level deep.
pub fn flatten<I>(groups: I) -> Vec<<I::Item as IntoIterator>::Item>
where
    I: IntoIterator,
    I::Item: IntoIterator,
{
    groups.into_iter().flatten().collect()
}

/// Split `data` into batches of `batch_size` to be processed one batch at a
/// time.
///
/// # Errors
///
/// Returns [`Error::InvalidArgument`] if `batch_size` is zero.
///
/// # Examples
///
/// ```
/// use futures_flow::iter::batch_process;
///
/// futures_flow::runtime::block_on(async {
///     let squares = batch_process(1..=5u32, 2)
///         .unwrap()
///         .process_one(|n, _index| async move { Ok::<_, String>(n * n) })
///         .await;
///     assert_eq!(squares, Ok(vec![1, 4, 9, 16, 25]));
/// });
/// ```
pub fn batch_process<I>(data: I, batch_size: usize) -> Result<Batches<I::Item>, Error>
where
    I: IntoIterator,
{
    Ok(Batches {
        batches: chunk(data, batch_size)?,
        batch_size,
    })
}

/// Data split into fixed-size batches.
///
/// This `struct` is created by [`batch_process`]. Batches are processed
/// strictly in order: a batch starts only once the previous one has
/// finished, including all of its concurrent work. Outputs are concatenated
/// in batch order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Batches<T> {
    batches: Vec<Vec<T>>,
    batch_size: usize,
}

impl<T> Batches<T> {
    /// The number of batches.
    pub fn len(&self) -> usize {
        self.batches.len()
    }

    /// Returns `true` if there is no data.
    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    /// The size of every batch but possibly the last.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Process every item of a batch concurrently with `process`.
    ///
    /// `process` receives each item with its index in the input data. The
    /// first error stops processing: no later batch is started.
    pub async fn process_one<F, Fut, O, E>(self, mut process: F) -> Result<Vec<O>, E>
    where
        F: FnMut(T, usize) -> Fut,
        Fut: Future<Output = Result<O, E>>,
    {
        let batch_size = self.batch_size;
        let mut outputs = Vec::with_capacity(self.batches.len());
        for (ordinal, batch) in self.batches.into_iter().enumerate() {
            let offset = ordinal * batch_size;
            tracing::debug!(batch = ordinal, len = batch.len(), "processing batch");
            let mapped = map(
                batch,
                |item, index| process(item, offset + index),
                Concurrency::Unbounded,
            )
            .await?;
            tracing::debug!(batch = ordinal, "batch finished");
            outputs.push(mapped);
        }
        Ok(flatten(outputs))
    }

    /// Like [`process_one`](Self::process_one), collecting an [`Outcome`]
    /// per item instead of stopping at the first error.
    pub async fn settle_one<F, Fut, O, E>(self, mut process: F) -> Vec<Outcome<O, E>>
    where
        F: FnMut(T, usize) -> Fut,
        Fut: Future<Output = Result<O, E>>,
    {
        let batch_size = self.batch_size;
        let mut outputs = Vec::with_capacity(self.batches.len());
        for (ordinal, batch) in self.batches.into_iter().enumerate() {
            let offset = ordinal * batch_size;
            tracing::debug!(batch = ordinal, len = batch.len(), "settling batch");
            outputs.push(settle_map(batch, |item, index| process(item, offset + index)).await);
            tracing::debug!(batch = ordinal, "batch settled");
        }
        flatten(outputs)
    }

    /// Hand each whole batch to `process`, along with its ordinal and the
    /// batch size. `process` produces the batch's outputs.
    ///
    /// The first error stops processing: no later batch is started.
    pub async fn process_batch<F, Fut, O, E>(self, mut process: F) -> Result<Vec<O>, E>
    where
        F: FnMut(Vec<T>, usize, usize) -> Fut,
        Fut: Future<Output = Result<Vec<O>, E>>,
    {
        let batch_size = self.batch_size;
        let mut outputs = Vec::with_capacity(self.batches.len());
        for (ordinal, batch) in self.batches.into_iter().enumerate() {
            tracing::debug!(batch = ordinal, len = batch.len(), "processing batch");
            outputs.push(process(batch, ordinal, batch_size).await?);
            tracing::debug!(batch = ordinal, "batch finished");
        }
        Ok(flatten(outputs))
    }
}
