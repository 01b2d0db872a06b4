//! Per-turn cancellation handle.
//!
//! A `CancelToken` is created per turn and cloned into each branch. Calling
//! `cancel()` wakes every waiter; the orchestrator aborts the primary path
//! and degrades the alternate branch to "not available".

use tokio::sync::watch;

/// Clonable cancellation handle built on `tokio::sync::watch`.
#[derive(Debug, Clone)]
pub struct CancelToken {
    tx: std::sync::Arc<watch::Sender<bool>>,
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            tx: std::sync::Arc::new(tx),
        }
    }

    /// Signal cancellation. Idempotent; wakes all pending `cancelled()` waits.
    pub fn cancel(&self) {
        // send() is a no-op when no receiver exists (the initial one is
        // dropped in new()); send_replace stores the value regardless.
        self.tx.send_replace(true);
    }

    /// Whether cancellation has been signalled.
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once cancellation is signalled. Never resolves otherwise.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        if *rx.borrow() {
            return;
        }
        // The sender lives inside self, so changed() only errs after drop.
        while rx.changed().await.is_ok() {
            if *rx.borrow() {
                return;
            }
        }
        // Sender dropped without cancelling: park forever rather than
        // reporting a cancellation that never happened.
        std::future::pending::<()>().await;
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;

    #[tokio::test]
    async fn starts_uncancelled() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        let waited = timeout(Duration::from_millis(20), token.cancelled()).await;
        assert!(waited.is_err(), "cancelled() must not resolve early");
    }

    #[tokio::test]
    async fn cancel_wakes_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        let waiter = tokio::spawn(async move { clone.cancelled().await });
        token.cancel();
        assert!(token.is_cancelled());
        timeout(Duration::from_secs(1), waiter)
            .await
            .expect("waiter should wake")
            .unwrap();
    }

    #[tokio::test]
    async fn cancel_is_idempotent() {
        let token = CancelToken::new();
        token.cancel();
        token.cancel();
        assert!(token.is_cancelled());
        timeout(Duration::from_millis(50), token.cancelled())
            .await
            .expect("already-cancelled token resolves immediately");
    }
}
