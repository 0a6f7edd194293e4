//! # pledge
//!
//! Settle-once deferred values for Rust.
//!
//! ## Overview
//!
//! A [`Future<T>`](future::Future) is a container that starts empty, is
//! settled exactly once with either a value or an [`Error`](error::Error), and
//! notifies continuations attached before or after settlement. It includes:
//!
//! - **Future core**: pending/fulfilled/rejected state machine with the
//!   settle-once rule
//! - **Chaining**: `then`, `then_or_else`, `catch`, `finally`, `map`, `and_then`
//! - **Combinators**: `all`, `all_settled`, `any`, `race`
//! - **Deferred scheduling**: an injected FIFO run-later queue through which
//!   every initializer and continuation runs
//!
//! ## Feature Flags
//!
//! - `combinator`: collection combinators (default)
//! - `async`: `.await` support and the tokio `LocalSet` scheduler (default)
//! - `serde`: serialization of settlement records
//! - `full`: Enable all features
//!
//! ## Example
//!
//! ```rust
//! use pledge::prelude::*;
//! use std::rc::Rc;
//!
//! let scheduler = Rc::new(QueueScheduler::new());
//!
//! let future = Future::fulfilled(scheduler.clone(), "foo".to_string())
//!     .then(|_| Err::<String, _>(Error::msg("bar")))
//!     .catch(|error| Err(Error::msg(format!("{error}bar"))))
//!     .catch(|error| Ok(format!("{error}foo")));
//!
//! scheduler.run_until_idle();
//! assert_eq!(future.peek(), Some(Ok("barbarfoo".to_string())));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// Re-exports commonly used types and traits.
///
/// # Usage
///
/// ```rust
/// use pledge::prelude::*;
/// ```
pub mod prelude {
    pub use crate::error::{AggregateError, Error};
    pub use crate::future::{Future, Resolver, SettlementState};
    pub use crate::scheduler::{QueueScheduler, Scheduler, SharedScheduler};

    #[cfg(feature = "combinator")]
    pub use crate::combinator::SettlementStatus;

    #[cfg(feature = "async")]
    pub use crate::scheduler::TokioScheduler;
}

pub mod error;
pub mod future;
pub mod scheduler;

#[cfg(feature = "combinator")]
pub mod combinator;
