//! The settle-once state machine.

use std::cell::RefCell;
use std::fmt;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::rc::Rc;

use smallvec::SmallVec;

use crate::error::Error;
use crate::scheduler::SharedScheduler;

/// The outcome a future settles with.
pub(crate) type Outcome<T> = Result<T, Error>;

type Callback<T> = Box<dyn FnOnce(&Outcome<T>) + 'static>;

/// Observable settlement state of a [`Future`].
///
/// ```text
/// Pending --fulfill (first call)--> Fulfilled   (terminal)
/// Pending --reject (first call)-->  Rejected    (terminal)
/// Fulfilled/Rejected --fulfill/reject--> no-op
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum SettlementState {
    /// Not settled yet.
    Pending,
    /// Settled with a value.
    Fulfilled,
    /// Settled with an error.
    Rejected,
}

enum State<T> {
    Pending,
    // Shared so dispatch tasks can read the outcome without borrowing the cell.
    Settled(Rc<Outcome<T>>),
}

struct Subscriber<T> {
    callback: Callback<T>,
    handles_rejection: bool,
}

struct Inner<T> {
    state: State<T>,
    subscribers: SmallVec<[Subscriber<T>; 2]>,
    rejection_handled: bool,
}

/// State shared by every handle to one future.
struct Core<T> {
    inner: RefCell<Inner<T>>,
    scheduler: SharedScheduler,
}

impl<T: 'static> Core<T> {
    fn new(scheduler: SharedScheduler) -> Self {
        Self {
            inner: RefCell::new(Inner {
                state: State::Pending,
                subscribers: SmallVec::new(),
                rejection_handled: false,
            }),
            scheduler,
        }
    }

    fn settle(&self, outcome: Outcome<T>) -> bool {
        let (outcome, subscribers) = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            if matches!(inner.state, State::Settled(_)) {
                tracing::trace!("settle ignored: future already settled");
                return false;
            }
            let outcome = Rc::new(outcome);
            inner.state = State::Settled(Rc::clone(&outcome));
            if outcome.is_err() {
                let handled = inner
                    .subscribers
                    .iter()
                    .any(|subscriber| subscriber.handles_rejection);
                inner.rejection_handled |= handled;
            }
            (outcome, std::mem::take(&mut inner.subscribers))
        };

        tracing::trace!(
            fulfilled = outcome.is_ok(),
            subscribers = subscribers.len(),
            "future settled"
        );
        for subscriber in subscribers {
            self.dispatch(Rc::clone(&outcome), subscriber.callback);
        }
        true
    }

    fn subscribe(&self, handles_rejection: bool, callback: Callback<T>) {
        let settled = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            match &inner.state {
                State::Pending => {
                    inner.subscribers.push(Subscriber {
                        callback,
                        handles_rejection,
                    });
                    tracing::trace!(
                        subscribers = inner.subscribers.len(),
                        "continuation attached"
                    );
                    return;
                }
                State::Settled(outcome) => {
                    let outcome = Rc::clone(outcome);
                    if outcome.is_err() {
                        inner.rejection_handled |= handles_rejection;
                    }
                    outcome
                }
            }
        };
        tracing::trace!("continuation attached after settlement");
        self.dispatch(settled, callback);
    }

    fn dispatch(&self, outcome: Rc<Outcome<T>>, callback: Callback<T>) {
        self.scheduler
            .schedule(Box::new(move || callback(outcome.as_ref())));
    }

    fn state(&self) -> SettlementState {
        match &self.inner.borrow().state {
            State::Pending => SettlementState::Pending,
            State::Settled(outcome) if outcome.is_ok() => SettlementState::Fulfilled,
            State::Settled(_) => SettlementState::Rejected,
        }
    }

    /// Reads the outcome; reading a rejection counts as handling it.
    fn observe(&self) -> Option<Rc<Outcome<T>>> {
        let mut guard = self.inner.borrow_mut();
        let inner = &mut *guard;
        match &inner.state {
            State::Pending => None,
            State::Settled(outcome) => {
                inner.rejection_handled |= outcome.is_err();
                Some(Rc::clone(outcome))
            }
        }
    }
}

impl<T> Drop for Core<T> {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();
        if inner.rejection_handled {
            return;
        }
        if let State::Settled(outcome) = &inner.state {
            if let Err(error) = outcome.as_ref() {
                tracing::warn!(%error, "future rejected without a rejection handler");
            }
        }
    }
}

/// Runs a user callback, converting a panic into an [`Error`].
pub(crate) fn guarded<U>(callback: impl FnOnce() -> Outcome<U>) -> Outcome<U> {
    catch_unwind(AssertUnwindSafe(callback))
        .unwrap_or_else(|payload| Err(Error::from_panic(payload)))
}

/// A value that is settled exactly once, later.
///
/// A `Future<T>` starts [`Pending`](SettlementState::Pending) and is settled at
/// most once, either fulfilled with a `T` or rejected with an [`Error`]. The
/// first settle call wins; every later call is a no-op.
///
/// Continuations attached with [`then`](Self::then),
/// [`catch`](Self::catch) or [`finally`](Self::finally) are dispatched through
/// the injected [`Scheduler`](crate::scheduler::Scheduler), never inline. Any
/// number of continuations can be attached to one future; all of them are
/// notified, in attachment order, including those attached after settlement.
///
/// Cloning a `Future` yields another handle to the same settlement.
///
/// # Thread Safety
///
/// `Future` is `!Send` and `!Sync`. The model is single-threaded cooperative,
/// so the settle-once check is a plain `RefCell` update.
///
/// # Examples
///
/// ```rust
/// use pledge::error::Error;
/// use pledge::future::Future;
/// use pledge::scheduler::QueueScheduler;
/// use std::rc::Rc;
///
/// let scheduler = Rc::new(QueueScheduler::new());
///
/// let future = Future::fulfilled(scheduler.clone(), "foo".to_string())
///     .then(|_| Err::<String, _>(Error::msg("bar")))
///     .catch(|error| Err(Error::msg(format!("{error}bar"))))
///     .catch(|error| Ok(format!("{error}foo")));
///
/// scheduler.run_until_idle();
/// assert_eq!(future.peek(), Some(Ok("barbarfoo".to_string())));
/// ```
pub struct Future<T> {
    core: Rc<Core<T>>,
}

/// The settling side of a [`Future`].
///
/// Handed to initializers and returned by [`Future::pending`]. Clones settle
/// the same future; only the first settle call across all clones has an
/// effect.
pub struct Resolver<T> {
    core: Rc<Core<T>>,
}

impl<T: 'static> Future<T> {
    /// Creates a pending future and schedules `initializer` to settle it.
    ///
    /// The initializer never runs inside `new`; it runs when the scheduler
    /// reaches it. If it returns `Err` or panics, the future is rejected with
    /// that error, unless it already settled.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pledge::future::{Future, SettlementState};
    /// use pledge::scheduler::QueueScheduler;
    /// use std::rc::Rc;
    ///
    /// let scheduler = Rc::new(QueueScheduler::new());
    /// let future = Future::new(scheduler.clone(), |resolver| {
    ///     resolver.reject("bar");
    ///     resolver.fulfill("foo");
    ///     Ok(())
    /// });
    ///
    /// assert_eq!(future.state(), SettlementState::Pending);
    /// scheduler.run_until_idle();
    /// assert_eq!(future.state(), SettlementState::Rejected);
    /// ```
    pub fn new<F>(scheduler: SharedScheduler, initializer: F) -> Self
    where
        F: FnOnce(Resolver<T>) -> Result<(), Error> + 'static,
    {
        let (future, resolver) = Self::pending(scheduler);
        future.core.scheduler.schedule(Box::new(move || {
            let handle = resolver.clone();
            if let Err(error) = guarded(move || initializer(handle)) {
                resolver.reject(error);
            }
        }));
        future
    }

    /// Creates a pending future together with its [`Resolver`].
    ///
    /// ```rust
    /// use pledge::future::Future;
    /// use pledge::scheduler::QueueScheduler;
    /// use std::rc::Rc;
    ///
    /// let scheduler = Rc::new(QueueScheduler::new());
    /// let (future, resolver) = Future::pending(scheduler.clone());
    ///
    /// assert!(resolver.fulfill(1));
    /// assert!(!resolver.fulfill(2));
    /// assert_eq!(future.peek(), Some(Ok(1)));
    /// ```
    #[must_use]
    pub fn pending(scheduler: SharedScheduler) -> (Self, Resolver<T>) {
        let core = Rc::new(Core::new(scheduler));
        let resolver = Resolver {
            core: Rc::clone(&core),
        };
        (Self { core }, resolver)
    }

    /// Creates a future already fulfilled with `value`.
    #[must_use]
    pub fn fulfilled(scheduler: SharedScheduler, value: T) -> Self {
        let (future, resolver) = Self::pending(scheduler);
        resolver.fulfill(value);
        future
    }

    /// Creates a future already rejected with `error`.
    #[must_use]
    pub fn rejected(scheduler: SharedScheduler, error: impl Into<Error>) -> Self {
        let (future, resolver) = Self::pending(scheduler);
        resolver.reject(error);
        future
    }

    /// Current settlement state.
    #[must_use]
    pub fn state(&self) -> SettlementState {
        self.core.state()
    }

    /// Returns `true` while the future has not settled.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.state() == SettlementState::Pending
    }

    /// Returns a copy of the outcome if the future has settled.
    ///
    /// A rejection returned here has been observed: the future no longer
    /// reports it as unhandled when dropped. [`state`](Self::state) does not
    /// count as observing.
    #[must_use]
    pub fn peek(&self) -> Option<Result<T, Error>>
    where
        T: Clone,
    {
        self.core.observe().map(|outcome| outcome.as_ref().clone())
    }

    /// The scheduler continuations of this future are dispatched on.
    #[must_use]
    pub fn scheduler(&self) -> &SharedScheduler {
        &self.core.scheduler
    }

    /// Attaches a raw continuation.
    ///
    /// `handles_rejection` marks whether the callback deals with a rejection;
    /// it feeds the unhandled-rejection diagnostic.
    pub(crate) fn subscribe<F>(&self, handles_rejection: bool, callback: F)
    where
        F: FnOnce(&Outcome<T>) + 'static,
    {
        self.core.subscribe(handles_rejection, Box::new(callback));
    }

    /// Settles `resolver` with whatever this future settles with.
    pub(crate) fn forward_to(&self, resolver: Resolver<T>)
    where
        T: Clone,
    {
        self.subscribe(true, move |outcome| {
            resolver.settle(outcome.clone());
        });
    }
}

impl<T: 'static> Resolver<T> {
    /// Fulfills the future with `value`.
    ///
    /// Returns `false` if the future had already settled; the value is then
    /// dropped.
    pub fn fulfill(&self, value: T) -> bool {
        self.settle(Ok(value))
    }

    /// Rejects the future with `error`.
    ///
    /// Returns `false` if the future had already settled.
    pub fn reject(&self, error: impl Into<Error>) -> bool {
        self.settle(Err(error.into()))
    }

    /// Settles the future with `outcome`.
    ///
    /// Returns `false` if the future had already settled.
    pub fn settle(&self, outcome: Result<T, Error>) -> bool {
        self.core.settle(outcome)
    }

    /// Returns `true` once the future has settled.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.core.state() != SettlementState::Pending
    }
}

impl<T> Clone for Future<T> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
        }
    }
}

impl<T> Clone for Resolver<T> {
    fn clone(&self) -> Self {
        Self {
            core: Rc::clone(&self.core),
        }
    }
}

impl<T: 'static> fmt::Debug for Future<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Future")
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl<T: 'static> fmt::Debug for Resolver<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Resolver")
            .field("settled", &self.is_settled())
            .finish()
    }
}

static_assertions::assert_not_impl_any!(Future<i32>: Send, Sync);
static_assertions::assert_not_impl_any!(Resolver<i32>: Send, Sync);
