//! Caller-driven cancellation signal
//!
//! A single [`CancellationToken`] supplied in [`crate::types::PostOptions`]
//! propagates to every in-flight network call across every platform and
//! every mention lookup. There is no independent timeout mechanism;
//! deadlines are caller-driven through this signal.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::{CrosscastError, Result};

/// Cloneable cancellation handle shared between a caller and in-flight work.
///
/// Cancelling is idempotent and permanent: once fired the token can never
/// be reset, and every pending and future [`run_until_cancelled`]
/// invocation rejects promptly with [`CrosscastError::Cancelled`].
///
/// [`run_until_cancelled`]: CancellationToken::run_until_cancelled
#[derive(Debug, Clone)]
pub struct CancellationToken {
    tx: Arc<watch::Sender<bool>>,
    rx: watch::Receiver<bool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        let (tx, rx) = watch::channel(false);
        Self {
            tx: Arc::new(tx),
            rx,
        }
    }

    /// Fire the signal, waking every task waiting on any clone.
    pub fn cancel(&self) {
        // Receivers are held by every clone, so send cannot fail while a
        // token is alive.
        let _ = self.tx.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow()
    }

    /// Wait until the signal fires. Returns immediately if already fired.
    pub async fn cancelled(&self) {
        let mut rx = self.rx.clone();
        if *rx.borrow() {
            return;
        }
        while rx.changed().await.is_ok() {
            if *rx.borrow() {
                return;
            }
        }
        // Every sender dropped without firing: cancellation can no longer
        // happen, so park forever and let the raced future win.
        futures::future::pending::<()>().await;
    }

    /// Race `fut` against the signal.
    ///
    /// Yields `Err(CrosscastError::Cancelled)` if the signal fires first
    /// (or already fired), otherwise the future's output.
    pub async fn run_until_cancelled<F: Future>(&self, fut: F) -> Result<F::Output> {
        tokio::select! {
            biased;
            _ = self.cancelled() => Err(CrosscastError::Cancelled),
            out = fut => Ok(out),
        }
    }
}

impl Default for CancellationToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a fallible future under an optional token.
///
/// With no token the future runs to completion; with one, a fired signal
/// rejects with [`CrosscastError::Cancelled`] instead of the future's output.
pub async fn with_cancel<T, F>(cancel: Option<&CancellationToken>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match cancel {
        Some(token) => token.run_until_cancelled(fut).await?,
        None => fut.await,
    }
}
