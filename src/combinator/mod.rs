//! Collection combinators.
//!
//! Each combinator consumes an ordered collection of futures and returns one
//! future aggregating their outcomes:
//!
//! - [`Future::all`]: every value, or the first rejection
//! - [`Future::all_settled`]: a [`SettlementStatus`] per input, never rejects
//! - [`Future::any`]: the first value, or an
//!   [`AggregateError`] once every input rejected
//! - [`Future::race`]: the first settlement, either way
//!
//! # Ordering
//!
//! Results are written into the slot of the input they came from, so the
//! output order is the input order no matter in which order the inputs
//! settle. The same holds for the errors collected by `any`.
//!
//! # Empty Input
//!
//! `all` and `all_settled` fulfill with an empty `Vec`, `any` rejects with an
//! empty [`AggregateError`], `race` stays pending forever.
//!
//! # Examples
//!
//! ```rust
//! use pledge::future::Future;
//! use pledge::scheduler::QueueScheduler;
//! use std::rc::Rc;
//!
//! let scheduler = Rc::new(QueueScheduler::new());
//! let inputs = ["foo", "bar", "foo"].map(|text| Future::fulfilled(scheduler.clone(), text));
//!
//! let combined = Future::all(scheduler.clone(), inputs);
//! scheduler.run_until_idle();
//! assert_eq!(combined.peek(), Some(Ok(vec!["foo", "bar", "foo"])));
//! ```

mod slots;
mod status;

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{AggregateError, Error};
use crate::future::{Future, Outcome};
use crate::scheduler::SharedScheduler;

use slots::Slots;
pub use status::SettlementStatus;

impl<T: Clone + 'static> Future<T> {
    /// Fulfills with every input's value once all inputs fulfilled; rejects
    /// with the first rejection, ignoring every later outcome.
    ///
    /// ```rust
    /// use pledge::error::Error;
    /// use pledge::future::Future;
    /// use pledge::scheduler::QueueScheduler;
    /// use std::rc::Rc;
    ///
    /// let scheduler = Rc::new(QueueScheduler::new());
    /// let combined = Future::all(
    ///     scheduler.clone(),
    ///     vec![
    ///         Future::fulfilled(scheduler.clone(), "foo"),
    ///         Future::rejected(scheduler.clone(), "bar"),
    ///         Future::fulfilled(scheduler.clone(), "foo"),
    ///     ],
    /// );
    ///
    /// scheduler.run_until_idle();
    /// assert_eq!(combined.peek(), Some(Err(Error::msg("bar"))));
    /// ```
    pub fn all<I>(scheduler: SharedScheduler, futures: I) -> Future<Vec<T>>
    where
        I: IntoIterator<Item = Self>,
    {
        let futures: Vec<Self> = futures.into_iter().collect();
        tracing::trace!(inputs = futures.len(), "all: waiting on inputs");
        if futures.is_empty() {
            return Future::fulfilled(scheduler, Vec::new());
        }

        let (combined, resolver) = Future::pending(scheduler);
        let slots = Rc::new(RefCell::new(Slots::new(futures.len())));
        for (index, future) in futures.iter().enumerate() {
            let slots = Rc::clone(&slots);
            let resolver = resolver.clone();
            future.subscribe(true, move |outcome: &Outcome<T>| match outcome {
                Ok(value) => {
                    let completed = slots.borrow_mut().fill(index, value.clone());
                    if let Some(values) = completed {
                        resolver.fulfill(values);
                    }
                }
                Err(error) => {
                    resolver.reject(error.clone());
                }
            });
        }
        combined
    }

    /// Fulfills with one [`SettlementStatus`] per input once every input
    /// settled. Never rejects.
    pub fn all_settled<I>(
        scheduler: SharedScheduler,
        futures: I,
    ) -> Future<Vec<SettlementStatus<T>>>
    where
        I: IntoIterator<Item = Self>,
    {
        let futures: Vec<Self> = futures.into_iter().collect();
        tracing::trace!(inputs = futures.len(), "all_settled: waiting on inputs");
        if futures.is_empty() {
            return Future::fulfilled(scheduler, Vec::new());
        }

        let (combined, resolver) = Future::pending(scheduler);
        let slots = Rc::new(RefCell::new(Slots::new(futures.len())));
        for (index, future) in futures.iter().enumerate() {
            let slots = Rc::clone(&slots);
            let resolver = resolver.clone();
            future.subscribe(true, move |outcome: &Outcome<T>| {
                let status = SettlementStatus::from(outcome.clone());
                let completed = slots.borrow_mut().fill(index, status);
                if let Some(statuses) = completed {
                    resolver.fulfill(statuses);
                }
            });
        }
        combined
    }

    /// Fulfills with the first input to fulfill. Rejects with an
    /// [`AggregateError`] holding every reason, in input order, if and only if
    /// every input rejects.
    ///
    /// ```rust
    /// use pledge::future::Future;
    /// use pledge::scheduler::QueueScheduler;
    /// use std::rc::Rc;
    ///
    /// let scheduler = Rc::new(QueueScheduler::new());
    /// let inputs: Vec<Future<i32>> = ["a", "b"]
    ///     .into_iter()
    ///     .map(|reason| Future::rejected(scheduler.clone(), reason))
    ///     .collect();
    ///
    /// let combined = Future::any(scheduler.clone(), inputs);
    /// scheduler.run_until_idle();
    ///
    /// let error = combined.peek().unwrap().unwrap_err();
    /// assert_eq!(error.as_aggregate().map(|aggregate| aggregate.len()), Some(2));
    /// ```
    pub fn any<I>(scheduler: SharedScheduler, futures: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let futures: Vec<Self> = futures.into_iter().collect();
        tracing::trace!(inputs = futures.len(), "any: waiting on inputs");
        if futures.is_empty() {
            return Self::rejected(scheduler, AggregateError::new(Vec::new()));
        }

        let (combined, resolver) = Self::pending(scheduler);
        let slots = Rc::new(RefCell::new(Slots::new(futures.len())));
        for (index, future) in futures.iter().enumerate() {
            let slots = Rc::clone(&slots);
            let resolver = resolver.clone();
            future.subscribe(true, move |outcome: &Outcome<T>| match outcome {
                Ok(value) => {
                    resolver.fulfill(value.clone());
                }
                Err(error) => {
                    let completed = slots.borrow_mut().fill(index, error.clone());
                    if let Some(errors) = completed {
                        resolver.reject(Error::Aggregate(AggregateError::new(errors)));
                    }
                }
            });
        }
        combined
    }

    /// Settles like the first input to settle, fulfilled or rejected.
    pub fn race<I>(scheduler: SharedScheduler, futures: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        let (combined, resolver) = Self::pending(scheduler);
        for future in futures {
            future.forward_to(resolver.clone());
        }
        combined
    }
}
