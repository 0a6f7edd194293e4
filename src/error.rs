//! Rejection reasons.
//!
//! Every rejection carried by a [`Future`](crate::future::Future) is normalized
//! to a single [`Error`] type at the boundary. Handlers may fail with a plain
//! message, a foreign error, or by panicking; all of them end up here.
//!
//! [`AggregateError`] is produced only by
//! [`Future::any`](crate::future::Future::any) when every input rejects.

use std::any::Any;
use std::sync::Arc;

use thiserror::Error as ThisError;

/// The reason a [`Future`](crate::future::Future) was rejected.
///
/// `Error` is cheap to clone: fan-out delivers the same reason to every
/// subscriber of a rejected future.
///
/// # Examples
///
/// ```rust
/// use pledge::error::Error;
///
/// let error = Error::msg("bar");
/// assert_eq!(error.to_string(), "bar");
///
/// let converted: Error = "bar".into();
/// assert_eq!(error, converted);
/// ```
#[derive(Debug, Clone, ThisError)]
pub enum Error {
    /// A plain message.
    #[error("{0}")]
    Message(String),
    /// Every input of [`Future::any`](crate::future::Future::any) rejected.
    #[error(transparent)]
    Aggregate(#[from] AggregateError),
    /// An initializer or handler panicked. Holds the rendered panic payload.
    #[error("panicked: {0}")]
    Panicked(String),
    /// A foreign error.
    #[error(transparent)]
    Source(Arc<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Creates an error from a plain message.
    #[must_use]
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Wraps a foreign error.
    ///
    /// ```rust
    /// use pledge::error::Error;
    ///
    /// let error = Error::new(std::fmt::Error);
    /// assert_eq!(error.to_string(), "an error occurred when formatting an argument");
    /// ```
    #[must_use]
    pub fn new<E>(error: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Source(Arc::new(error))
    }

    /// Converts a payload caught by `catch_unwind` into an error.
    #[must_use]
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let rendered = payload
            .downcast_ref::<&str>()
            .map(|message| (*message).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "opaque panic payload".to_string());
        Self::Panicked(rendered)
    }

    /// Returns the aggregate if this error was produced by `any`.
    #[must_use]
    pub const fn as_aggregate(&self) -> Option<&AggregateError> {
        match self {
            Self::Aggregate(aggregate) => Some(aggregate),
            _ => None,
        }
    }

    /// Returns `true` if the error was caught from a panic.
    #[must_use]
    pub const fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked(_))
    }
}

// Foreign sources have no structural equality; they compare by identity.
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Message(left), Self::Message(right))
            | (Self::Panicked(left), Self::Panicked(right)) => left == right,
            (Self::Aggregate(left), Self::Aggregate(right)) => left == right,
            (Self::Source(left), Self::Source(right)) => Arc::ptr_eq(left, right),
            _ => false,
        }
    }
}

impl From<&str> for Error {
    fn from(message: &str) -> Self {
        Self::msg(message)
    }
}

impl From<String> for Error {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

/// Every input of [`Future::any`](crate::future::Future::any) rejected.
///
/// The causal errors are kept in input order.
///
/// # Examples
///
/// ```rust
/// use pledge::error::{AggregateError, Error};
///
/// let aggregate = AggregateError::new(vec![Error::msg("foo"), Error::msg("bar")]);
/// assert_eq!(aggregate.to_string(), "All Promises rejected");
/// assert_eq!(aggregate.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, ThisError)]
#[error("All Promises rejected")]
pub struct AggregateError {
    errors: Vec<Error>,
}

impl AggregateError {
    /// Creates an aggregate from the collected errors.
    #[must_use]
    pub const fn new(errors: Vec<Error>) -> Self {
        Self { errors }
    }

    /// The collected errors, in input order.
    #[must_use]
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Number of collected errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns `true` if no error was collected (the input was empty).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Consumes the aggregate, returning the collected errors.
    #[must_use]
    pub fn into_errors(self) -> Vec<Error> {
        self.errors
    }
}

static_assertions::assert_impl_all!(Error: Send, Sync, Clone);
static_assertions::assert_impl_all!(AggregateError: Send, Sync, Clone);

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn message_display_is_the_message() {
        assert_eq!(Error::msg("bar").to_string(), "bar");
    }

    #[rstest]
    fn aggregate_display_is_fixed() {
        let error: Error = AggregateError::new(vec![Error::msg("a")]).into();
        assert_eq!(error.to_string(), "All Promises rejected");
        assert_eq!(error.as_aggregate().map(AggregateError::len), Some(1));
    }

    #[rstest]
    #[case::static_str(Box::new("boom"), "panicked: boom")]
    #[case::owned(Box::new(String::from("boom")), "panicked: boom")]
    #[case::opaque(Box::new(7_u8), "panicked: opaque panic payload")]
    fn from_panic_renders_payload(#[case] payload: Box<dyn Any + Send>, #[case] expected: &str) {
        let error = Error::from_panic(payload);
        assert!(error.is_panic());
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    fn sources_compare_by_identity() {
        let first = Error::new(std::fmt::Error);
        let second = Error::new(std::fmt::Error);
        assert_eq!(first, first.clone());
        assert_ne!(first, second);
    }

    #[rstest]
    fn different_variants_are_not_equal() {
        assert_ne!(Error::msg("boom"), Error::Panicked("boom".to_string()));
    }

    #[rstest]
    fn source_forwards_to_foreign_error() {
        use std::error::Error as _;

        let error = Error::new(std::fmt::Error);
        assert!(error.source().is_none());
        assert_eq!(error.to_string(), std::fmt::Error.to_string());
    }

    #[rstest]
    fn into_errors_keeps_order() {
        let aggregate = AggregateError::new(vec![Error::msg("first"), Error::msg("second")]);
        let errors = aggregate.into_errors();
        assert_eq!(errors, vec![Error::msg("first"), Error::msg("second")]);
    }
}
