use super::CancelableFuture;
use crate::time::Duration;

/// Waits for the specified amount of time.
///
/// Canceling the returned future resolves it right away, so a `wait` always
/// succeeds whether it ran to its deadline or not.
///
/// # Examples
///
/// ```
/// use futures_flow::task::wait;
/// use futures_flow::time::{Duration, Instant};
///
/// futures_flow::runtime::block_on(async {
///     let now = Instant::now();
///     wait(Duration::from_millis(20)).await;
///     assert!(now.elapsed() >= Duration::from_millis(20));
/// });
/// ```
pub fn wait(dur: Duration) -> CancelableFuture<()> {
    CancelableFuture::new(dur, || ()).on_cancel(|| ())
}

/// Yields to the executor once, then resolves.
///
/// Lets other futures in the same task make progress before continuing.
pub async fn wait_immediate() {
    futures_lite::future::yield_now().await
}
