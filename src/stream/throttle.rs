//! Rate limiting for frame subscriptions

use futures::{Stream, ready};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{Interval, MissedTickBehavior, interval};
use tracing::trace;

/// Extension trait adding latest-wins throttling to any stream
pub trait ThrottleExt: Stream {
    /// Emit at most one item per `period`.
    ///
    /// Items arriving between ticks replace each other; only the newest one is
    /// delivered when the next tick fires.
    fn throttle(self, period: Duration) -> Throttle<Self>
    where
        Self: Sized,
    {
        Throttle::new(self, period)
    }
}

impl<T: Stream> ThrottleExt for T {}

pin_project! {
    /// Stream returned by [`ThrottleExt::throttle`]
    pub struct Throttle<S: Stream> {
        #[pin]
        inner: S,
        ticker: Interval,
        latest: Option<S::Item>,
        replaced: u64,
        done: bool,
    }
}

impl<S: Stream> Throttle<S> {
    pub fn new(inner: S, period: Duration) -> Self {
        let mut ticker = interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { inner, ticker, latest: None, replaced: 0, done: false }
    }

    /// Items dropped because a newer one arrived before the tick.
    pub fn replaced(&self) -> u64 {
        self.replaced
    }
}

impl<S: Stream> Stream for Throttle<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        // Pull everything that is ready so stale items never pile up.
        while !*this.done {
            match this.inner.as_mut().poll_next(cx) {
                Poll::Ready(Some(item)) => {
                    if this.latest.replace(item).is_some() {
                        *this.replaced += 1;
                        trace!(replaced = *this.replaced, "Throttle dropped a stale item");
                    }
                }
                Poll::Ready(None) => *this.done = true,
                Poll::Pending => break,
            }
        }

        if this.latest.is_none() {
            return if *this.done { Poll::Ready(None) } else { Poll::Pending };
        }

        ready!(this.ticker.poll_tick(cx));
        Poll::Ready(this.latest.take())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use tokio::sync::mpsc;
    use tokio_stream::wrappers::ReceiverStream;

    #[tokio::test(start_paused = true)]
    async fn keeps_only_latest_between_ticks() {
        let (tx, rx) = mpsc::channel(16);
        let mut throttled = ReceiverStream::new(rx).throttle(Duration::from_millis(100));

        tx.send(1).await.expect("open");
        // First tick is immediate.
        assert_eq!(throttled.next().await, Some(1));

        for i in 2..=5 {
            tx.send(i).await.expect("open");
        }
        assert_eq!(throttled.next().await, Some(5));
        assert_eq!(throttled.replaced(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn flushes_pending_item_when_stream_ends() {
        let items = futures::stream::iter(vec![1, 2, 3]);
        let collected: Vec<i32> = items.throttle(Duration::from_millis(10)).collect().await;
        assert_eq!(collected, vec![3]);
    }

    #[tokio::test(start_paused = true)]
    async fn waits_for_tick_between_items() {
        let (tx, rx) = mpsc::channel(4);
        let mut throttled = ReceiverStream::new(rx).throttle(Duration::from_millis(100));
        let start = tokio::time::Instant::now();

        tx.send("a").await.expect("open");
        assert_eq!(throttled.next().await, Some("a"));
        tx.send("b").await.expect("open");
        assert_eq!(throttled.next().await, Some("b"));

        assert!(start.elapsed() >= Duration::from_millis(100));
        drop(tx);
        assert_eq!(throttled.next().await, None);
    }
}
