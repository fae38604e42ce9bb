//! Cancelable, timer-driven tasks.
//!
//! Every task in this module is a [`CancelableFuture`]: a future paired with a
//! timer which can be disarmed before it fires. Timers are released when they
//! fire, when they are canceled, and when the future is dropped. They never
//! keep the process alive on their own.

mod cancelable;
mod timeout_in;
mod wait;

pub use cancelable::{schedule, CancelHandle, CancelableFuture};
pub use timeout_in::{timeout_in, timeout_in_with, timeout_in_with_message};
pub use wait::{wait, wait_immediate};
