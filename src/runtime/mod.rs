//! Async event loop support.
//!
//! Everything else in this crate is runtime-agnostic: its futures only rely on
//! the waker they are polled with, and its timers are driven by `async-io`'s
//! reactor thread. [`block_on()`] is the event loop this crate ships for
//! binaries and tests; `#[futures_flow::main]` and `#[futures_flow::test]`
//! expand to a call to it.

#![deny(missing_debug_implementations, nonstandard_style)]
#![warn(missing_docs, unreachable_pub)]

mod block_on;

pub use block_on::block_on;
