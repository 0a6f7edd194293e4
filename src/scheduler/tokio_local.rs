//! Scheduler backed by a tokio `LocalSet`.

use super::{Scheduler, Task};

/// Schedules tasks onto the current tokio [`LocalSet`](tokio::task::LocalSet).
///
/// Each task becomes a `spawn_local` task; the `LocalSet` polls its local
/// queue in FIFO order, which preserves the scheduler contract. Combined with
/// the `.await` bridge this lets a future graph be driven by an async runtime
/// instead of a hand-drained queue.
///
/// # Panics
///
/// [`schedule`](Scheduler::schedule) panics when called outside of a
/// `LocalSet` context, as `tokio::task::spawn_local` does.
///
/// # Examples
///
/// ```rust
/// use pledge::future::Future;
/// use pledge::scheduler::TokioScheduler;
/// use std::rc::Rc;
///
/// let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
/// let local = tokio::task::LocalSet::new();
///
/// let value = local.block_on(&runtime, async {
///     let scheduler = Rc::new(TokioScheduler::new());
///     Future::fulfilled(scheduler, 20).map(|value| value + 1).await
/// });
/// assert_eq!(value, Ok(21));
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioScheduler {
    _private: (),
}

impl TokioScheduler {
    /// Creates a scheduler for the `LocalSet` that is current when tasks are
    /// scheduled.
    #[must_use]
    pub const fn new() -> Self {
        Self { _private: () }
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, task: Task) {
        // Detached: the task always runs, the handle is never awaited.
        drop(tokio::task::spawn_local(async move { task() }));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[rstest]
    fn tasks_run_in_schedule_order() {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        let local = tokio::task::LocalSet::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        local.block_on(&runtime, {
            let log = Rc::clone(&log);
            async move {
                let scheduler = TokioScheduler::new();
                for index in 0..4 {
                    let log = Rc::clone(&log);
                    scheduler.schedule(Box::new(move || log.borrow_mut().push(index)));
                }
                assert!(log.borrow().is_empty());
            }
        });
        // Tasks left on the set are driven to completion by awaiting the set.
        runtime.block_on(local);

        assert_eq!(*log.borrow(), vec![0, 1, 2, 3]);
    }
}
