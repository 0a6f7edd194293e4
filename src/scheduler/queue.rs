//! Manually drained FIFO scheduler.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;

use super::{Scheduler, Task};

/// A FIFO run-later queue drained by its owner.
///
/// Nothing runs until [`run_one`](Self::run_one),
/// [`run_at_most`](Self::run_at_most) or
/// [`run_until_idle`](Self::run_until_idle) is called, which makes the order
/// of every callback fully deterministic in tests.
///
/// The queue borrow is released before each task runs, so tasks are free to
/// schedule more work; that work lands at the back of the queue.
///
/// Draining is not reentrant. A task that calls a `run_*` method on the
/// scheduler running it gets `false`/`0` back and nothing runs, so a task is
/// never interrupted by another.
///
/// # Dropping
///
/// Queued tasks own the futures they settle, and every future owns its
/// scheduler. Drain with [`run_until_idle`](Self::run_until_idle) or discard
/// with [`clear`](Self::clear) before dropping the last handle; otherwise the
/// queue and the futures it holds are never freed.
///
/// # Thread Safety
///
/// This type is NOT thread-safe. Scheduling is single-threaded cooperative.
///
/// # Examples
///
/// ```rust
/// use pledge::future::Future;
/// use pledge::scheduler::QueueScheduler;
/// use std::rc::Rc;
///
/// let scheduler = Rc::new(QueueScheduler::new());
/// let future = Future::fulfilled(scheduler.clone(), 21).map(|value| value * 2);
///
/// assert!(future.is_pending());
/// scheduler.run_until_idle();
/// assert_eq!(future.peek(), Some(Ok(42)));
/// ```
pub struct QueueScheduler {
    queue: RefCell<VecDeque<Task>>,
    executed: Cell<usize>,
    draining: Cell<bool>,
}

/// Marks a drain in progress; cleared on drop, including during unwinding.
struct DrainGuard<'a>(&'a Cell<bool>);

impl<'a> DrainGuard<'a> {
    fn enter(flag: &'a Cell<bool>) -> Option<Self> {
        if flag.replace(true) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for DrainGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

impl QueueScheduler {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty queue with room for `capacity` tasks.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            queue: RefCell::new(VecDeque::with_capacity(capacity)),
            executed: Cell::new(0),
            draining: Cell::new(false),
        }
    }

    /// Number of tasks waiting to run.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Returns `true` if no task is waiting.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.queue.borrow().is_empty()
    }

    /// Total number of tasks run since creation.
    #[must_use]
    pub fn executed(&self) -> usize {
        self.executed.get()
    }

    /// Returns `true` while a task of this scheduler is running.
    #[must_use]
    pub fn is_draining(&self) -> bool {
        self.draining.get()
    }

    /// Runs the task at the front of the queue.
    ///
    /// Returns `false` if the queue was empty, or if called from inside a
    /// task this scheduler is running.
    pub fn run_one(&self) -> bool {
        let Some(_guard) = DrainGuard::enter(&self.draining) else {
            tracing::trace!("nested drain refused");
            return false;
        };
        // The borrow must end before the task runs: tasks schedule more tasks.
        let next = self.queue.borrow_mut().pop_front();
        match next {
            Some(task) => {
                task();
                self.executed.set(self.executed.get() + 1);
                true
            }
            None => false,
        }
    }

    /// Discards every queued task without running it.
    ///
    /// Returns the number of tasks discarded.
    pub fn clear(&self) -> usize {
        let discarded = std::mem::take(&mut *self.queue.borrow_mut());
        let count = discarded.len();
        drop(discarded);
        tracing::trace!(tasks = count, "scheduler cleared");
        count
    }

    /// Runs up to `limit` tasks, including ones scheduled along the way.
    ///
    /// Returns the number of tasks run.
    pub fn run_at_most(&self, limit: usize) -> usize {
        let mut count = 0;
        while count < limit && self.run_one() {
            count += 1;
        }
        count
    }

    /// Runs tasks until the queue is empty, including ones scheduled along
    /// the way.
    ///
    /// Returns the number of tasks run. Does not return if tasks keep
    /// rescheduling themselves; use [`run_at_most`](Self::run_at_most) to
    /// bound such loops.
    pub fn run_until_idle(&self) -> usize {
        let mut count = 0;
        while self.run_one() {
            count += 1;
        }
        tracing::trace!(tasks = count, "scheduler drained");
        count
    }
}

impl Default for QueueScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for QueueScheduler {
    fn schedule(&self, task: Task) {
        self.queue.borrow_mut().push_back(task);
    }
}

impl fmt::Debug for QueueScheduler {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("QueueScheduler")
            .field("pending", &self.pending())
            .field("executed", &self.executed())
            .field("draining", &self.is_draining())
            .finish()
    }
}

static_assertions::assert_not_impl_any!(QueueScheduler: Send, Sync);
