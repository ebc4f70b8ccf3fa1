//! Single-resolution deferred results.
//!
//! A [`Deferred`] is the settling half, a [`Promise`] the awaitable half.
//! Settling happens exactly once: an optional completion callback sees the
//! outcome first, then the promise receives it. Settling a second time is
//! reported as [`CatalogError::AlreadySettled`] and changes nothing.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use parking_lot::Mutex;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use crate::{CatalogError, CatalogResult};

/// Completion callback observing the terminal state
pub type Callback<T> = Box<dyn FnOnce(&CatalogResult<T>) + Send>;

struct Pending<T> {
    tx: oneshot::Sender<CatalogResult<T>>,
    callback: Option<Callback<T>>,
}

/// Settling half of a deferred result
pub struct Deferred<T> {
    pending: Mutex<Option<Pending<T>>>,
}

impl<T> std::fmt::Debug for Deferred<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Deferred")
            .field("settled", &self.is_settled())
            .finish()
    }
}

impl<T: Send + 'static> Deferred<T> {
    /// Creates a pending deferred and its promise
    pub fn new() -> (Self, Promise<T>) {
        Self::create(None)
    }

    /// Creates a pending deferred whose outcome is also handed to `callback`
    pub fn with_callback<F>(callback: F) -> (Self, Promise<T>)
    where
        F: FnOnce(&CatalogResult<T>) + Send + 'static,
    {
        Self::create(Some(Box::new(callback)))
    }

    fn create(callback: Option<Callback<T>>) -> (Self, Promise<T>) {
        let (tx, rx) = oneshot::channel();
        let deferred = Self {
            pending: Mutex::new(Some(Pending { tx, callback })),
        };
        (deferred, Promise { rx })
    }

    pub fn resolve(&self, value: T) -> CatalogResult<()> {
        self.settle(Ok(value))
    }

    pub fn reject(&self, error: CatalogError) -> CatalogResult<()> {
        self.settle(Err(error))
    }

    /// Resolves or rejects depending on `outcome`
    pub fn settle(&self, outcome: CatalogResult<T>) -> CatalogResult<()> {
        let Some(pending) = self.pending.lock().take() else {
            tracing::warn!("attempt to settle an already settled deferred result");
            return Err(CatalogError::AlreadySettled);
        };
        if let Some(callback) = pending.callback {
            callback(&outcome);
        }
        // The promise may have been dropped; the outcome is simply discarded then.
        let _ = pending.tx.send(outcome);
        Ok(())
    }
}

impl<T> Deferred<T> {
    pub fn is_settled(&self) -> bool {
        self.pending.lock().is_none()
    }
}

impl<T> Drop for Deferred<T> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.get_mut().take() {
            let outcome = Err(CatalogError::Abandoned);
            if let Some(callback) = pending.callback {
                callback(&outcome);
            }
            let _ = pending.tx.send(outcome);
        }
    }
}

/// Awaitable half of a deferred result
#[derive(Debug)]
pub struct Promise<T> {
    rx: oneshot::Receiver<CatalogResult<T>>,
}

impl<T: Send + 'static> Promise<T> {
    /// An already resolved promise
    pub fn resolved(value: T) -> Self {
        let (deferred, promise) = Deferred::new();
        let _ = deferred.resolve(value);
        promise
    }

    /// An already rejected promise
    pub fn rejected(error: CatalogError) -> Self {
        let (deferred, promise) = Deferred::new();
        let _ = deferred.reject(error);
        promise
    }

    /// Drives `future` on the tokio runtime and settles the promise with its output.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn<F>(future: F) -> Self
    where
        F: Future<Output = CatalogResult<T>> + Send + 'static,
    {
        let (deferred, promise) = Deferred::new();
        tokio::spawn(async move {
            let outcome = future.await;
            let _ = deferred.settle(outcome);
        });
        promise
    }

    /// Callback-style consumption: `callback` runs once the promise settles
    pub fn on_complete<F>(self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(CatalogResult<T>) + Send + 'static,
    {
        tokio::spawn(async move {
            callback(self.await);
        })
    }
}

impl<T> Future for Promise<T> {
    type Output = CatalogResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(CatalogError::Abandoned)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_resolve_once() {
        let (deferred, promise) = Deferred::new();
        deferred.resolve(7).unwrap();
        assert!(deferred.is_settled());
        assert_eq!(promise.await.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_second_settlement_is_rejected() {
        let (deferred, promise) = Deferred::new();
        deferred.resolve("first").unwrap();

        assert!(matches!(
            deferred.reject(CatalogError::parse("late")),
            Err(CatalogError::AlreadySettled)
        ));
        assert!(matches!(deferred.resolve("second"), Err(CatalogError::AlreadySettled)));
        assert_eq!(promise.await.unwrap(), "first");
    }

    #[tokio::test]
    async fn test_callback_and_promise_observe_same_outcome() {
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_cb = seen.clone();
        let (deferred, promise) = Deferred::with_callback(move |outcome: &CatalogResult<usize>| {
            if let Ok(value) = outcome {
                seen_cb.store(*value, Ordering::SeqCst);
            }
        });

        deferred.resolve(42).unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 42);
        assert_eq!(promise.await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_rejection_reaches_callback() {
        let rejected = Arc::new(AtomicUsize::new(0));
        let rejected_cb = rejected.clone();
        let (deferred, promise) = Deferred::<()>::with_callback(move |outcome| {
            if outcome.is_err() {
                rejected_cb.fetch_add(1, Ordering::SeqCst);
            }
        });

        deferred.reject(CatalogError::application(404, "gone")).unwrap();
        assert_eq!(rejected.load(Ordering::SeqCst), 1);
        assert!(matches!(promise.await, Err(CatalogError::Application { code: 404, .. })));
    }

    #[tokio::test]
    async fn test_dropped_deferred_rejects() {
        let (deferred, promise) = Deferred::<u8>::new();
        drop(deferred);
        assert!(matches!(promise.await, Err(CatalogError::Abandoned)));
    }

    #[tokio::test]
    async fn test_spawn_and_on_complete() {
        let promise = Promise::spawn(async { Ok::<_, CatalogError>(vec![1, 2, 3]) });
        let (tx, rx) = oneshot::channel();
        promise
            .on_complete(move |outcome| {
                let _ = tx.send(outcome.map(|v| v.len()));
            })
            .await
            .unwrap();
        assert_eq!(rx.await.unwrap().unwrap(), 3);
    }

    #[tokio::test]
    async fn test_ready_promises() {
        assert_eq!(Promise::resolved(1u8).await.unwrap(), 1);
        assert!(Promise::<u8>::rejected(CatalogError::Abandoned).await.is_err());
    }
}
