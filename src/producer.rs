//! Single-shot asynchronous result with explicit cancellation.

use crate::error::{RestError, Result};
use futures::future::{BoxFuture, FutureExt};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio_util::sync::CancellationToken;

/// Lazily started operation yielding exactly one terminal result.
///
/// Nothing runs until the producer is awaited (or spawned). Cancelling its
/// token, or dropping the producer, stops the underlying exchange; a
/// cancelled producer resolves to [`RestError::Interrupted`].
#[must_use = "producers do nothing unless awaited"]
pub struct Producer<T> {
    inner: BoxFuture<'static, Result<T>>,
    token: CancellationToken,
}

impl<T: Send + 'static> Producer<T> {
    /// Wrap `work` so it races against this producer's cancellation token
    pub fn new<F>(work: F) -> Self
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let token = CancellationToken::new();
        let cancelled = token.clone();
        let inner = async move {
            tokio::select! {
                biased;
                _ = cancelled.cancelled() => Err(RestError::Interrupted),
                result = work => result,
            }
        }
        .boxed();

        Producer { inner, token }
    }

    /// A producer that is already interrupted
    pub fn interrupted() -> Self {
        Self::new(async { Err(RestError::Interrupted) })
    }

    /// Token cancelling this producer; clone it to cancel from elsewhere
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    /// Cancel the operation
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check whether cancellation was requested
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl<T> Future for Producer<T> {
    type Output = Result<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.poll_unpin(cx)
    }
}

impl<T> std::fmt::Debug for Producer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Producer")
            .field("cancelled", &self.token.is_cancelled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::NormalizedError;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_producer_yields_value() {
        let producer = Producer::new(async { Ok(7) });
        assert_eq!(producer.await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_producer_yields_error() {
        let producer: Producer<()> =
            Producer::new(async { Err(RestError::from(NormalizedError::from_reason("nope"))) });
        let err = producer.await.unwrap_err();
        assert!(!err.is_interrupted());
        assert_eq!(err.normalized().and_then(|e| e.message()), Some("nope"));
    }

    #[tokio::test]
    async fn test_producer_is_lazy() {
        let started = Arc::new(AtomicBool::new(false));
        let flag = started.clone();
        let producer = Producer::new(async move {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });

        tokio::task::yield_now().await;
        assert!(!started.load(Ordering::SeqCst));
        producer.await.unwrap();
        assert!(started.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancel_before_start() {
        let started = Arc::new(AtomicBool::new(false));
        let flag = started.clone();
        let producer = Producer::new(async move {
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });
        producer.cancel();

        assert!(producer.is_cancelled());
        assert!(producer.await.unwrap_err().is_interrupted());
        assert!(!started.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_while_running() {
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();
        let producer = Producer::new(async move {
            tokio::time::sleep(Duration::from_secs(60)).await;
            flag.store(true, Ordering::SeqCst);
            Ok(())
        });
        let token = producer.cancellation_token();
        let task = tokio::spawn(producer);

        tokio::time::sleep(Duration::from_secs(1)).await;
        token.cancel();

        assert!(task.await.unwrap().unwrap_err().is_interrupted());
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_interrupted() {
        let producer: Producer<u8> = Producer::interrupted();
        assert!(producer.await.unwrap_err().is_interrupted());
    }
}
