//! Error types.

use std::fmt;

use crate::time::Duration;

/// A specialized `Result` type for `futures-flow` operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// The errors raised by this crate itself.
///
/// Errors produced by caller-supplied tasks, mappers and processors are never
/// wrapped in this type; they are propagated as-is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// An argument was rejected before any work started.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// A deadline elapsed before the raced task settled.
    #[error("{0}")]
    Timeout(String),
}

impl Error {
    /// Returns `true` if this is a [`Error::Timeout`].
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    pub(crate) fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    pub(crate) fn timed_out_after(dur: Duration) -> Self {
        Self::Timeout(format!("timed out after {}ms", dur.as_millis()))
    }
}

/// Every task failed.
///
/// Returned by [`first_success`] with each task's error, in input order.
///
/// [`first_success`]: crate::future::first_success
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateError<E> {
    errors: Vec<E>,
}

impl<E> AggregateError<E> {
    pub(crate) fn new(errors: Vec<E>) -> Self {
        Self { errors }
    }

    /// The errors, one per task, in input order.
    pub fn errors(&self) -> &[E] {
        &self.errors
    }

    /// Consumes the aggregate and returns the errors.
    pub fn into_errors(self) -> Vec<E> {
        self.errors
    }
}

impl<E: fmt::Display> fmt::Display for AggregateError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "all {} tasks failed", self.errors.len())?;
        for (index, error) in self.errors.iter().enumerate() {
            write!(f, "\n  [{index}] {error}")?;
        }
        Ok(())
    }
}

impl<E: fmt::Debug + fmt::Display> std::error::Error for AggregateError<E> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_message_names_the_deadline() {
        let err = Error::timed_out_after(Duration::from_millis(250));
        assert_eq!(err.to_string(), "timed out after 250ms");
        assert!(err.is_timeout());
        assert!(!Error::invalid_argument("nope").is_timeout());
    }

    #[test]
    fn aggregate_lists_every_error() {
        let err = AggregateError::new(vec!["a", "b"]);
        assert_eq!(err.to_string(), "all 2 tasks failed\n  [0] a\n  [1] b");
        assert_eq!(err.into_errors(), vec!["a", "b"]);
    }
}
