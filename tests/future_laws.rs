#![cfg(feature = "combinator")]
//! Property-based tests for Future laws.
//!
//! This module verifies that Future implementations satisfy:
//!
//! - **Settle-once**: only the first settle call takes effect
//! - **Functor Laws**: identity and composition of `map`
//! - **Monad Laws**: left identity, right identity, associativity of `and_then`
//! - **Ordering**: `all` preserves input order under any settle order

use pledge::prelude::*;
use proptest::prelude::*;
use std::rc::Rc;

fn settle<T: Clone + 'static>(
    scheduler: &Rc<QueueScheduler>,
    future: &Future<T>,
) -> Option<Result<T, Error>> {
    scheduler.run_until_idle();
    future.peek()
}

// =============================================================================
// Settle-once
// =============================================================================

proptest! {
    /// The first of any sequence of settle calls determines the outcome.
    #[test]
    fn prop_first_settlement_wins(calls in prop::collection::vec(any::<Option<i32>>(), 1..16)) {
        let scheduler = Rc::new(QueueScheduler::new());
        let (future, resolver) = Future::pending(scheduler.clone());

        let mut winners = 0;
        for call in &calls {
            let won = match call {
                Some(value) => resolver.fulfill(*value),
                None => resolver.reject("rejected"),
            };
            winners += usize::from(won);
        }

        let expected = match calls[0] {
            Some(value) => Ok(value),
            None => Err(Error::msg("rejected")),
        };
        prop_assert_eq!(winners, 1);
        prop_assert_eq!(settle(&scheduler, &future), Some(expected));
    }
}

// =============================================================================
// Functor Laws
// =============================================================================

proptest! {
    /// Functor Identity Law: future.map(|x| x) == future
    #[test]
    fn prop_future_functor_identity(value in any::<i32>()) {
        let scheduler = Rc::new(QueueScheduler::new());
        let future = Future::fulfilled(scheduler.clone(), value);
        let mapped = future.map(|x| x);

        prop_assert_eq!(settle(&scheduler, &mapped), future.peek());
    }
}

proptest! {
    /// Functor Composition Law: future.map(f).map(g) == future.map(|x| g(f(x)))
    #[test]
    fn prop_future_functor_composition(value in any::<i32>()) {
        let function1 = |n: i32| n.wrapping_add(1);
        let function2 = |n: i32| n.wrapping_mul(2);

        let scheduler = Rc::new(QueueScheduler::new());
        let future = Future::fulfilled(scheduler.clone(), value);
        let left = future.map(function1).map(function2);
        let right = future.map(move |x| function2(function1(x)));

        prop_assert_eq!(settle(&scheduler, &left), settle(&scheduler, &right));
    }
}

// =============================================================================
// Monad Laws
// =============================================================================

proptest! {
    /// Left Identity: fulfilled(a).and_then(f) == f(a)
    #[test]
    fn prop_future_monad_left_identity(value in any::<i32>()) {
        let scheduler = Rc::new(QueueScheduler::new());
        let handle = scheduler.clone();
        let function = move |n: i32| Future::fulfilled(handle.clone(), n.wrapping_mul(3));

        let left = Future::fulfilled(scheduler.clone(), value).and_then(function.clone());
        let right = function(value);

        prop_assert_eq!(settle(&scheduler, &left), settle(&scheduler, &right));
    }
}

proptest! {
    /// Right Identity: future.and_then(fulfilled) == future
    #[test]
    fn prop_future_monad_right_identity(value in any::<i32>(), reject in any::<bool>()) {
        let scheduler = Rc::new(QueueScheduler::new());
        let future = if reject {
            Future::rejected(scheduler.clone(), value.to_string())
        } else {
            Future::fulfilled(scheduler.clone(), value)
        };
        let handle = scheduler.clone();
        let chained = future.and_then(move |x| Future::fulfilled(handle, x));

        prop_assert_eq!(settle(&scheduler, &chained), future.peek());
    }
}

proptest! {
    /// Associativity: m.and_then(f).and_then(g) == m.and_then(|x| f(x).and_then(g))
    #[test]
    fn prop_future_monad_associativity(value in any::<i32>()) {
        let scheduler = Rc::new(QueueScheduler::new());
        let for_f = scheduler.clone();
        let function1 = move |n: i32| Future::fulfilled(for_f.clone(), n.wrapping_add(7));
        let for_g = scheduler.clone();
        let function2 = move |n: i32| {
            if n % 2 == 0 {
                Future::fulfilled(for_g.clone(), n / 2)
            } else {
                Future::rejected(for_g.clone(), "odd")
            }
        };

        let future = Future::fulfilled(scheduler.clone(), value);
        let left = future.and_then(function1.clone()).and_then(function2.clone());
        let right = future.and_then(move |x| function1(x).and_then(function2));

        prop_assert_eq!(settle(&scheduler, &left), settle(&scheduler, &right));
    }
}

// =============================================================================
// Combinator Ordering
// =============================================================================

proptest! {
    /// `all` yields values in input order whatever order inputs settle in.
    #[test]
    fn prop_all_preserves_input_order(
        order in Just((0..8_usize).collect::<Vec<_>>()).prop_shuffle()
    ) {
        let scheduler = Rc::new(QueueScheduler::new());
        let (inputs, resolvers): (Vec<_>, Vec<_>) =
            (0..order.len()).map(|_| Future::pending(scheduler.clone())).unzip();
        let combined = Future::all(scheduler.clone(), inputs);

        for &index in &order {
            let resolver: &Resolver<usize> = &resolvers[index];
            resolver.fulfill(index);
            scheduler.run_until_idle();
        }

        prop_assert_eq!(combined.peek(), Some(Ok((0..order.len()).collect::<Vec<_>>())));
    }
}

proptest! {
    /// `any` rejects iff every input rejects, and the aggregate keeps every reason.
    #[test]
    fn prop_any_aggregates_only_total_rejection(
        outcomes in prop::collection::vec(any::<bool>(), 1..8)
    ) {
        let scheduler = Rc::new(QueueScheduler::new());
        let inputs: Vec<Future<usize>> = outcomes
            .iter()
            .enumerate()
            .map(|(index, &fulfill)| {
                if fulfill {
                    Future::fulfilled(scheduler.clone(), index)
                } else {
                    Future::rejected(scheduler.clone(), index.to_string())
                }
            })
            .collect();
        let combined = Future::any(scheduler.clone(), inputs);

        match settle(&scheduler, &combined) {
            Some(Ok(index)) => prop_assert!(outcomes[index]),
            Some(Err(error)) => {
                prop_assert!(outcomes.iter().all(|fulfill| !fulfill));
                let expected: Vec<Error> = (0..outcomes.len())
                    .map(|index| Error::msg(index.to_string()))
                    .collect();
                prop_assert_eq!(
                    error.as_aggregate().map(AggregateError::errors),
                    Some(expected.as_slice())
                );
            }
            None => prop_assert!(false, "any never settled"),
        }
    }
}
