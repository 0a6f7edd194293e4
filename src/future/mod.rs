//! Settle-once deferred values.
//!
//! This module provides [`Future<T>`], a container that starts empty, is
//! settled exactly once with a value or an [`Error`](crate::error::Error), and
//! notifies continuations attached before or after settlement.
//!
//! - [`Future`]: the deferred value and its chaining operators
//! - [`Resolver`]: the settling side
//! - [`SettlementState`]: `Pending`, `Fulfilled` or `Rejected`
//! - [`Settled`]: the `.await` adapter (requires the `async` feature)
//!
//! # Invariants
//!
//! - **Settle-once**: the first fulfill or reject wins; later calls are no-ops,
//!   even when both happen synchronously inside the initializer.
//! - **Deferral**: initializers and continuations always run on the injected
//!   scheduler, never inline during construction or attachment.
//! - **Fan-out**: every attached continuation is notified, in attachment order.
//!
//! # Examples
//!
//! ```rust
//! use pledge::future::Future;
//! use pledge::scheduler::QueueScheduler;
//! use std::rc::Rc;
//!
//! let scheduler = Rc::new(QueueScheduler::new());
//!
//! let rejected: Future<String> = Future::new(scheduler.clone(), |resolver| {
//!     resolver.reject("bar");
//!     resolver.fulfill("foo".to_string());
//!     Ok(())
//! });
//! let message = rejected.catch(|error| Ok(error.to_string()));
//!
//! scheduler.run_until_idle();
//! assert_eq!(message.peek(), Some(Ok("bar".to_string())));
//! ```

#[cfg(feature = "async")]
mod bridge;
mod chain;
mod settle;

#[cfg(feature = "async")]
pub use bridge::Settled;
pub use settle::{Future, Resolver, SettlementState};

#[cfg(feature = "combinator")]
pub(crate) use settle::Outcome;
