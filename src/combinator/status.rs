//! Per-input settlement record produced by `all_settled`.

use crate::error::Error;

/// How one input of [`Future::all_settled`](crate::future::Future::all_settled)
/// settled.
///
/// With the `serde` feature this serializes to
/// `{"status": "fulfilled", "value": ...}` or
/// `{"status": "rejected", "reason": "..."}`; the reason is carried as its
/// message.
///
/// # Examples
///
/// ```rust
/// use pledge::combinator::SettlementStatus;
/// use pledge::error::Error;
///
/// let status: SettlementStatus<i32> = Err(Error::msg("bar")).into();
/// assert!(status.is_rejected());
/// assert_eq!(status.reason(), Some(&Error::msg("bar")));
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(tag = "status", rename_all = "lowercase")
)]
pub enum SettlementStatus<T> {
    /// The input fulfilled.
    Fulfilled {
        /// The fulfilled value.
        value: T,
    },
    /// The input rejected.
    Rejected {
        /// The rejection reason.
        #[cfg_attr(feature = "serde", serde(with = "reason"))]
        reason: Error,
    },
}

impl<T> SettlementStatus<T> {
    /// Returns `true` for [`Fulfilled`](Self::Fulfilled).
    #[must_use]
    pub const fn is_fulfilled(&self) -> bool {
        matches!(self, Self::Fulfilled { .. })
    }

    /// Returns `true` for [`Rejected`](Self::Rejected).
    #[must_use]
    pub const fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected { .. })
    }

    /// The value, if fulfilled.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        match self {
            Self::Fulfilled { value } => Some(value),
            Self::Rejected { .. } => None,
        }
    }

    /// The reason, if rejected.
    #[must_use]
    pub const fn reason(&self) -> Option<&Error> {
        match self {
            Self::Fulfilled { .. } => None,
            Self::Rejected { reason } => Some(reason),
        }
    }

    /// Converts back into the outcome it records.
    ///
    /// # Errors
    ///
    /// Returns the reason if the input was rejected.
    pub fn into_result(self) -> Result<T, Error> {
        match self {
            Self::Fulfilled { value } => Ok(value),
            Self::Rejected { reason } => Err(reason),
        }
    }
}

impl<T> From<Result<T, Error>> for SettlementStatus<T> {
    fn from(outcome: Result<T, Error>) -> Self {
        match outcome {
            Ok(value) => Self::Fulfilled { value },
            Err(reason) => Self::Rejected { reason },
        }
    }
}

#[cfg(feature = "serde")]
mod reason {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::error::Error;

    pub fn serialize<S: Serializer>(reason: &Error, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(reason)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Error, D::Error> {
        String::deserialize(deserializer).map(Error::Message)
    }
}
