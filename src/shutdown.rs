//! Cooperative shutdown signal
//!
//! A `watch` flag shared between the controller and the engine. Every
//! suspension point in the engine goes through [`Shutdown::race`], so a
//! slow provider or a slow consumer never delays shutdown.

use std::future::Future;
use tokio::sync::watch;

/// Controller side. Dropping it also counts as a shutdown request.
#[derive(Debug)]
pub struct ShutdownHandle {
    tx: watch::Sender<bool>,
}

impl ShutdownHandle {
    pub fn trigger(&self) {
        // Only fails when every receiver is gone, in which case nothing is listening.
        let _ = self.tx.send(true);
    }
}

/// Engine side.
#[derive(Debug, Clone)]
pub struct Shutdown {
    rx: watch::Receiver<bool>,
}

/// Create a connected handle/signal pair.
pub fn channel() -> (ShutdownHandle, Shutdown) {
    let (tx, rx) = watch::channel(false);
    (ShutdownHandle { tx }, Shutdown { rx })
}

impl Shutdown {
    pub fn is_triggered(&self) -> bool {
        *self.rx.borrow()
    }

    /// Resolve once shutdown was requested or the handle was dropped.
    pub async fn triggered(&mut self) {
        let _ = self.rx.wait_for(|stop| *stop).await;
    }

    /// Run `fut` unless shutdown wins first. Returns `None` on shutdown.
    ///
    /// Shutdown is polled first, so an already-triggered signal never lets
    /// `fut` make progress.
    pub async fn race<F: Future>(&mut self, fut: F) -> Option<F::Output> {
        tokio::select! {
            biased;
            _ = self.triggered() => None,
            out = fut => Some(out),
        }
    }

    /// Sleep for `duration` unless shutdown wins first.
    /// Returns `false` when shutdown was requested.
    pub async fn sleep(&mut self, duration: std::time::Duration) -> bool {
        self.race(tokio::time::sleep(duration)).await.is_some()
    }
}
