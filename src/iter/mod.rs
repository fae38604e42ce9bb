//! Asynchronous operations over sequences.
//!
//! [`map`] drives a mapper over a sequence with a concurrency ceiling and
//! returns the outputs in input order. Everything else in this module is
//! built on it: [`map_series`] runs one item at a time, the `settle_*`
//! variants collect an [`Outcome`] per item instead of stopping at the first
//! error, and [`batch_process`] runs fixed-size batches one after another.
//!
//! All of the work happens inside the returned future: it polls the mapper
//! futures itself, so nothing is spawned and no executor is assumed.
//!
//! [`Outcome`]: crate::future::Outcome

mod batch;
mod map;
mod settle;

pub use batch::{batch_process, chunk, flatten, Batches};
pub use map::{map, map_series, Concurrency, Map};
pub use settle::{settle_map, settle_series};
