//! Deferred scheduling.
//!
//! A [`Scheduler`] runs callbacks "later": after the current synchronous work
//! has finished, in the order they were scheduled. Every initializer and every
//! continuation of a [`Future`](crate::future::Future) passes through one.
//!
//! The scheduler is injected, never global. Futures created against the same
//! scheduler share one FIFO; futures created against different schedulers are
//! fully isolated.
//!
//! - [`QueueScheduler`]: a manually drained FIFO queue, for tests and
//!   embedding in an existing event loop.
//! - [`TokioScheduler`]: spawns onto the current tokio `LocalSet`
//!   (requires the `async` feature).
//!
//! # Contract
//!
//! - **FIFO**: tasks run in the order they were scheduled.
//! - **Run-to-completion**: a task is never re-entered or interrupted by
//!   another task. A task may schedule further tasks; they run after every
//!   task already queued.
//! - **Deferral**: `schedule` never runs the task inline.
//!
//! # Examples
//!
//! ```rust
//! use pledge::scheduler::{QueueScheduler, Scheduler};
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let scheduler = QueueScheduler::new();
//! let log = Rc::new(RefCell::new(Vec::new()));
//!
//! for index in 0..3 {
//!     let log = Rc::clone(&log);
//!     scheduler.schedule(Box::new(move || log.borrow_mut().push(index)));
//! }
//! assert!(log.borrow().is_empty());
//!
//! scheduler.run_until_idle();
//! assert_eq!(*log.borrow(), vec![0, 1, 2]);
//! ```

mod queue;
#[cfg(feature = "async")]
mod tokio_local;

use std::rc::Rc;

pub use queue::QueueScheduler;
#[cfg(feature = "async")]
pub use tokio_local::TokioScheduler;

/// A unit of deferred work.
pub type Task = Box<dyn FnOnce() + 'static>;

/// Shared handle to an injected scheduler.
pub type SharedScheduler = Rc<dyn Scheduler>;

/// Runs tasks later, in FIFO order.
///
/// Implementations must never run `task` synchronously inside `schedule`.
pub trait Scheduler {
    /// Enqueues `task` to run after the current synchronous work unwinds.
    fn schedule(&self, task: Task);
}
