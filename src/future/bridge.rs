//! `.await` support.
//!
//! A [`Future`] can be awaited from async code when the `async` feature is
//! enabled. The scheduler the future was created with must still be driven,
//! typically by using [`TokioScheduler`](crate::scheduler::TokioScheduler)
//! inside a `LocalSet`.

use std::future::IntoFuture;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use pin_project_lite::pin_project;

use super::settle::Future;
use crate::error::Error;

pin_project! {
    /// An awaitable view of a [`Future`], created by `.await` or
    /// [`IntoFuture::into_future`].
    ///
    /// Resolves to the future's outcome. If the future is dropped while still
    /// pending (every [`Resolver`](super::Resolver) gone), resolves to an
    /// error wrapping [`oneshot::Canceled`].
    #[must_use = "futures do nothing unless polled"]
    pub struct Settled<T> {
        #[pin]
        receiver: oneshot::Receiver<Result<T, Error>>,
    }
}

impl<T> std::future::Future for Settled<T> {
    type Output = Result<T, Error>;

    fn poll(self: Pin<&mut Self>, context: &mut Context<'_>) -> Poll<Self::Output> {
        let this = self.project();
        match std::future::Future::poll(this.receiver, context) {
            Poll::Ready(Ok(outcome)) => Poll::Ready(outcome),
            Poll::Ready(Err(canceled)) => Poll::Ready(Err(Error::new(canceled))),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<T: Clone + 'static> IntoFuture for Future<T> {
    type Output = Result<T, Error>;
    type IntoFuture = Settled<T>;

    fn into_future(self) -> Self::IntoFuture {
        let (sender, receiver) = oneshot::channel();
        self.subscribe(true, move |outcome| {
            // The awaiting side may have gone away; nothing to report then.
            let _ = sender.send(outcome.clone());
        });
        Settled { receiver }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::QueueScheduler;
    use futures::FutureExt;
    use rstest::rstest;
    use std::rc::Rc;

    #[rstest]
    fn resolves_once_scheduler_is_drained() {
        let scheduler = Rc::new(QueueScheduler::new());
        let mut settled = Future::fulfilled(scheduler.clone(), 4).into_future();

        assert!((&mut settled).now_or_never().is_none());
        scheduler.run_until_idle();
        assert_eq!(settled.now_or_never(), Some(Ok(4)));
    }

    #[rstest]
    fn dropped_pending_future_cancels() {
        let scheduler = Rc::new(QueueScheduler::new());
        let (future, resolver) = Future::<i32>::pending(scheduler);
        let settled = future.into_future();
        drop(resolver);

        let outcome = settled.now_or_never();
        assert!(matches!(outcome, Some(Err(Error::Source(_)))));
    }
}
