use std::future::Future;

use tokio::sync::watch;

/// Create a linked cancellation pair.
pub fn cancellation() -> (CancelHandle, Cancellation) {
    let (tx, rx) = watch::channel(false);
    (CancelHandle(tx), Cancellation(Some(rx)))
}

/// Cancels the computations observing the paired [`Cancellation`].
#[derive(Debug)]
pub struct CancelHandle(watch::Sender<bool>);

impl CancelHandle {
    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.send_replace(true);
    }

    /// Returns whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }
}

/// Cooperative cancellation signal observed by the engine.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Option<watch::Receiver<bool>>);

impl Cancellation {
    /// A signal that is never raised.
    pub fn never() -> Self {
        Self(None)
    }

    /// Returns whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.as_ref().is_some_and(|rx| *rx.borrow())
    }

    /// Return [`Error::Cancelled`](crate::Error::Cancelled) if cancellation has been requested.
    pub fn check(&self) -> crate::Result<()> {
        if self.is_cancelled() {
            Err(crate::Error::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Resolves once cancellation is requested.
    ///
    /// Never resolves if the handle is dropped without cancelling.
    pub async fn cancelled(&self) {
        let Some(rx) = self.0.as_ref() else {
            return std::future::pending().await;
        };
        let mut rx = rx.clone();
        let res = rx.wait_for(|cancelled| *cancelled).await.map(|_| ());
        if res.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Drive `fut` to completion unless cancellation is requested first.
    pub async fn run<T>(&self, fut: impl Future<Output = crate::Result<T>>) -> crate::Result<T> {
        self.check()?;
        tokio::select! {
            biased;
            () = self.cancelled() => Err(crate::Error::Cancelled),
            res = fut => res,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn never_cancelled() {
        let cancel = Cancellation::never();
        assert!(!cancel.is_cancelled());
        assert!(cancel.check().is_ok());
    }

    #[test]
    fn cancel_is_observed() {
        let (handle, cancel) = cancellation();
        let cloned = cancel.clone();
        assert!(!cancel.is_cancelled());
        handle.cancel();
        assert!(handle.is_cancelled());
        assert!(cancel.is_cancelled());
        assert!(matches!(cloned.check(), Err(crate::Error::Cancelled)));
    }

    #[tokio::test(start_paused = true)]
    async fn run_aborts_pending_future() {
        let (handle, cancel) = cancellation();
        let task = tokio::spawn(async move {
            cancel
                .run(async {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(())
                })
                .await
        });
        tokio::task::yield_now().await;
        handle.cancel();
        let res = task.await.expect("task panicked");
        assert!(matches!(res, Err(crate::Error::Cancelled)));
    }

    #[tokio::test]
    async fn dropped_handle_never_cancels() {
        let (handle, cancel) = cancellation();
        drop(handle);
        let res = cancel.run(async { Ok(7) }).await;
        assert_eq!(res.unwrap(), 7);
    }
}
