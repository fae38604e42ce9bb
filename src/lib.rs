#![warn(future_incompatible, unreachable_pub)]
#![deny(missing_debug_implementations)]
//#![warn(missing_docs)]

//! Async control-flow primitives
//!
//! This library composes futures: it races them against deadlines, maps
//! sequences through them with a concurrency ceiling, settles groups of them
//! without letting one failure cut the rest short, drives data through them in
//! fixed-size batches, and memoizes them.
//!
//! # Examples
//!
//! **Bounded concurrency**
//!
//! ```rust
//! use futures_flow::iter::{map, Concurrency};
//! use futures_flow::time::Duration;
//!
//! #[futures_flow::main]
//! async fn main() -> Result<(), futures_flow::Error> {
//!     let ids = vec![3, 1, 2];
//!     let names = map(
//!         ids,
//!         |id, _index| async move {
//!             Duration::from_millis(id * 10).await;
//!             Ok::<_, futures_flow::Error>(format!("item-{id}"))
//!         },
//!         Concurrency::new(2)?,
//!     )
//!     .await?;
//!     assert_eq!(names, ["item-3", "item-1", "item-2"]);
//!     Ok(())
//! }
//! ```
//!
//! **Racing a deadline**
//!
//! ```rust
//! use futures_flow::future::{run_with_timeout, Task};
//! use futures_flow::time::Duration;
//! use futures_flow::Error;
//!
//! #[futures_flow::main]
//! async fn main() {
//!     let slow = Task::running(async {
//!         Duration::from_secs(10).await;
//!         Ok::<_, Error>(())
//!     });
//!     let res = run_with_timeout(slow, Duration::from_millis(20)).await;
//!     assert!(res.unwrap_err().is_timeout());
//! }
//! ```
//!
//! # Design Decisions
//!
//! The futures in this library do not depend on an executor. Composite
//! futures such as [`iter::Map`] poll their children themselves, so nothing is
//! spawned and everything runs inside the task that awaits them. Timers are
//! driven by `async-io`'s reactor and never keep a process alive on their own.
//! [`runtime::block_on`] is provided for binaries and tests, and any other
//! executor works as well.
//!
//! Cancellation takes two forms. Dropping a future cancels it, as everywhere
//! in Rust. A [`task::CancelableFuture`] can also be canceled remotely through
//! its [`task::CancelHandle`], which disarms its timer and settles it through
//! its cancel callback.

pub mod error;
pub mod future;
pub mod iter;
pub mod memo;
pub mod runtime;
pub mod task;
pub mod time;

pub use error::{AggregateError, Error, Result};

pub use futures_flow_macro::attr_macro_main as main;
pub use futures_flow_macro::attr_macro_test as test;

pub mod prelude {
    pub use crate::future::FutureExt as _;
}
