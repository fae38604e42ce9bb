use core::future::Future;
use std::cell::Cell;

std::thread_local! {
    static RUNNING: Cell<bool> = const { Cell::new(false) };
}

/// Start the event loop
///
/// Runs `fut` to completion on the current thread, parking it while the
/// future is pending.
///
/// # Panics
///
/// Panics when called from inside another `block_on` on the same thread.
pub fn block_on<Fut>(fut: Fut) -> Fut::Output
where
    Fut: Future,
{
    // Mark the thread as running an event loop:
    if RUNNING.replace(true) {
        panic!("cannot futures_flow::runtime::block_on inside an existing block_on!")
    }
    let _running = Running;

    tracing::trace!("event loop started");
    let res = async_io::block_on(fut);
    tracing::trace!("event loop finished");
    res
}

/// Clears the running flag, also when the future panics.
struct Running;

impl Drop for Running {
    fn drop(&mut self) {
        RUNNING.set(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::wait;
    use crate::time::Duration;

    #[test]
    fn runs_to_completion() {
        let out = block_on(async {
            wait(Duration::from_millis(5)).await;
            "done"
        });
        assert_eq!(out, "done");
    }

    #[test]
    #[should_panic(expected = "inside an existing block_on")]
    fn nesting_panics() {
        block_on(async { block_on(async {}) });
    }

    #[test]
    fn usable_again_after_a_panic() {
        let res = std::panic::catch_unwind(|| block_on(async { panic!("boom") }));
        assert!(res.is_err());
        assert_eq!(block_on(async { 1 }), 1);
    }
}
