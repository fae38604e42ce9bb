use super::CancelableFuture;
use crate::time::Duration;
use crate::Error;

/// Fails with [`Error::Timeout`] once `dur` has elapsed.
///
/// The error reads `"timed out after {ms}ms"`. Canceling the returned future
/// resolves it with `Ok(())`: a timeout that was called off is not an error.
///
/// # Examples
///
/// ```
/// use futures_flow::task::timeout_in;
/// use futures_flow::time::Duration;
///
/// futures_flow::runtime::block_on(async {
///     let err = timeout_in(Duration::from_millis(10)).await.unwrap_err();
///     assert_eq!(err.to_string(), "timed out after 10ms");
///
///     let deadline = timeout_in(Duration::from_secs(60));
///     deadline.cancel();
///     assert!(deadline.await.is_ok());
/// });
/// ```
pub fn timeout_in(dur: Duration) -> CancelableFuture<Result<(), Error>> {
    timeout_in_with(dur, move || Error::timed_out_after(dur))
}

/// Like [`timeout_in`], failing with `message` instead of the default one.
pub fn timeout_in_with_message(
    dur: Duration,
    message: impl Into<String>,
) -> CancelableFuture<Result<(), Error>> {
    let message = message.into();
    timeout_in_with(dur, move || Error::Timeout(message))
}

/// Like [`timeout_in`], failing with the error built by `make_error`.
pub fn timeout_in_with<E, F>(dur: Duration, make_error: F) -> CancelableFuture<Result<(), E>>
where
    F: FnOnce() -> E + Send + 'static,
{
    CancelableFuture::new(dur, move || Err(make_error())).on_cancel(|| Ok(()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures_lite::future::block_on;

    #[test]
    fn rejects_when_not_canceled() {
        let err = block_on(timeout_in(Duration::from_millis(5))).unwrap_err();
        assert!(err.is_timeout());
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn caller_supplied_errors() {
        let err = block_on(timeout_in_with_message(Duration::from_millis(1), "too slow"));
        assert_eq!(err, Err(Error::Timeout("too slow".into())));

        let err = block_on(timeout_in_with(Duration::from_millis(1), || 42u8));
        assert_eq!(err, Err(42));
    }
}
