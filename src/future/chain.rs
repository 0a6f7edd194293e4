//! Chaining: `then`, `catch`, `finally` and friends.
//!
//! Every chaining operator except [`Future::finally`] builds a new future
//! wired to the receiver's eventual outcome. Handler results become the new
//! future's outcome: `Ok` fulfills it, `Err` or a panic rejects it.

use super::settle::{Future, Outcome, guarded};
use crate::error::Error;

impl<T: Clone + 'static> Future<T> {
    /// Wires a new future to both outcomes of this one.
    fn chain<U, F, G>(&self, on_fulfilled: F, on_rejected: G) -> Future<U>
    where
        U: 'static,
        F: FnOnce(T) -> Outcome<U> + 'static,
        G: FnOnce(Error) -> Outcome<U> + 'static,
    {
        let (next, resolver) = Future::pending(self.scheduler().clone());
        self.subscribe(true, move |outcome| {
            let result = match outcome {
                Ok(value) => {
                    let value = value.clone();
                    guarded(move || on_fulfilled(value))
                }
                Err(error) => {
                    let error = error.clone();
                    guarded(move || on_rejected(error))
                }
            };
            resolver.settle(result);
        });
        next
    }

    /// Transforms the fulfilled value; rejections pass through unchanged.
    ///
    /// The returned future fulfills with the handler's `Ok` value, or rejects
    /// with its `Err` (or panic).
    ///
    /// # Examples
    ///
    /// ```rust
    /// use pledge::future::Future;
    /// use pledge::scheduler::QueueScheduler;
    /// use std::rc::Rc;
    ///
    /// let scheduler = Rc::new(QueueScheduler::new());
    /// let length = Future::fulfilled(scheduler.clone(), "foo").then(|text| Ok(text.len()));
    ///
    /// scheduler.run_until_idle();
    /// assert_eq!(length.peek(), Some(Ok(3)));
    /// ```
    pub fn then<U, F>(&self, on_fulfilled: F) -> Future<U>
    where
        U: 'static,
        F: FnOnce(T) -> Result<U, Error> + 'static,
    {
        self.chain(on_fulfilled, Err)
    }

    /// Attaches handlers for both outcomes.
    ///
    /// A rejection handler returning `Ok` recovers: the new future fulfills.
    ///
    /// ```rust
    /// use pledge::future::Future;
    /// use pledge::scheduler::QueueScheduler;
    /// use std::rc::Rc;
    ///
    /// let scheduler = Rc::new(QueueScheduler::new());
    /// let recovered = Future::<i32>::rejected(scheduler.clone(), "bar")
    ///     .then_or_else(|value| Ok(value.to_string()), |error| Ok(format!("recovered {error}")));
    ///
    /// scheduler.run_until_idle();
    /// assert_eq!(recovered.peek(), Some(Ok("recovered bar".to_string())));
    /// ```
    pub fn then_or_else<U, F, G>(&self, on_fulfilled: F, on_rejected: G) -> Future<U>
    where
        U: 'static,
        F: FnOnce(T) -> Result<U, Error> + 'static,
        G: FnOnce(Error) -> Result<U, Error> + 'static,
    {
        self.chain(on_fulfilled, on_rejected)
    }

    /// Handles a rejection; fulfillments pass through unchanged.
    ///
    /// Equivalent to `then_or_else(Ok, on_rejected)`.
    pub fn catch<G>(&self, on_rejected: G) -> Self
    where
        G: FnOnce(Error) -> Result<T, Error> + 'static,
    {
        self.chain(Ok, on_rejected)
    }

    /// Infallible [`then`](Self::then).
    pub fn map<U, F>(&self, transform: F) -> Future<U>
    where
        U: 'static,
        F: FnOnce(T) -> U + 'static,
    {
        self.chain(move |value| Ok(transform(value)), Err)
    }

    /// Chains a handler that itself returns a future, adopting its outcome.
    ///
    /// ```rust
    /// use pledge::future::Future;
    /// use pledge::scheduler::QueueScheduler;
    /// use std::rc::Rc;
    ///
    /// let scheduler = Rc::new(QueueScheduler::new());
    /// let handle = scheduler.clone();
    /// let doubled = Future::fulfilled(scheduler.clone(), 21)
    ///     .and_then(move |value| Future::fulfilled(handle, value * 2));
    ///
    /// scheduler.run_until_idle();
    /// assert_eq!(doubled.peek(), Some(Ok(42)));
    /// ```
    pub fn and_then<U, F>(&self, next: F) -> Future<U>
    where
        U: Clone + 'static,
        F: FnOnce(T) -> Future<U> + 'static,
    {
        let (adopted, resolver) = Future::pending(self.scheduler().clone());
        self.subscribe(true, move |outcome| match outcome {
            Ok(value) => {
                let value = value.clone();
                match guarded(move || Ok(next(value))) {
                    Ok(inner) => inner.forward_to(resolver),
                    Err(error) => {
                        resolver.reject(error);
                    }
                }
            }
            Err(error) => {
                resolver.reject(error.clone());
            }
        });
        adopted
    }
}

impl<T: 'static> Future<T> {
    /// Runs `on_complete` once this future settles, either way.
    ///
    /// The callback neither sees nor changes the outcome, and no new future
    /// is created. Each registered callback runs exactly once, whether it was
    /// registered before or after settlement. A panic inside the callback is
    /// caught and logged.
    ///
    /// ```rust
    /// use pledge::future::Future;
    /// use pledge::scheduler::QueueScheduler;
    /// use std::cell::Cell;
    /// use std::rc::Rc;
    ///
    /// let scheduler = Rc::new(QueueScheduler::new());
    /// let calls = Rc::new(Cell::new(0));
    /// let future = Future::fulfilled(scheduler.clone(), ());
    ///
    /// for _ in 0..3 {
    ///     let calls = Rc::clone(&calls);
    ///     future.finally(move || calls.set(calls.get() + 1));
    /// }
    ///
    /// scheduler.run_until_idle();
    /// assert_eq!(calls.get(), 3);
    /// ```
    pub fn finally<F>(&self, on_complete: F)
    where
        F: FnOnce() + 'static,
    {
        self.subscribe(false, move |_| {
            if let Err(error) = guarded(move || {
                on_complete();
                Ok(())
            }) {
                tracing::error!(%error, "completion callback failed");
            }
        });
    }
}
