//! Asynchronous values.
//!
//! # Settling
//!
//! A fallible future either fulfills with a value or rejects with an error.
//! [`settle`] and [`all_settled`] turn either way of finishing into an
//! [`Outcome`], so a group of independent operations can run to completion
//! without the first failure cutting the rest short.
//!
//! # Cancellation
//!
//! Futures can be cancelled by dropping them before they finish executing.
//! [`run_with_timeout`] resolves with an error once its deadline elapses, and
//! a plain `.await` then drops the race together with the task it raced.
//! Callers who want the task to run to completion await the race by `&mut`
//! and take the task back with [`RunWithTimeout::into_task`].
//!
//! ```
//! use futures_flow::prelude::*;
//! use futures_flow::task::wait;
//! use futures_flow::time::Duration;
//! use futures_flow::Error;
//!
//! futures_flow::runtime::block_on(async {
//!     let value = async {
//!         wait(Duration::from_millis(10)).await;
//!         Ok::<_, Error>("meow")
//!     }
//!     .timeout(Duration::from_millis(100))
//!     .await;
//!
//!     assert_eq!(value.unwrap(), "meow");
//! });
//! ```

mod first_success;
mod future_ext;
mod settle;
mod timeout;

pub use first_success::{first_success, FirstSuccess};
pub use future_ext::FutureExt;
pub use settle::{all_settled, all_settled_reject, settle, Outcome, Settle};
pub use std::future::IntoFuture;
pub use timeout::{
    run_with_timeout, run_with_timeout_message, run_with_timeout_with, RunWithTimeout, Task,
};
