//! Cancellation utilities.
//!
//! Provides the caller-held handle used to abort an in-flight request. The
//! pipeline polls the token cooperatively at its suspension points; it never
//! forcibly interrupts the transport.

use tokio_util::sync::CancellationToken;

/// A handle that can be used to request cancellation.
///
/// `cancel()` is idempotent: once cancelled, further calls are no-ops and
/// `is_cancelled()` stays true.
#[derive(Clone, Debug, Default)]
pub struct CancelToken {
    token: CancellationToken,
}

impl CancelToken {
    /// Create a fresh, uncancelled token.
    pub fn new() -> Self {
        Self {
            token: CancellationToken::new(),
        }
    }

    /// Request cancellation. A pending dispatch or stub timer observing this
    /// token stops as soon as possible, and no result is delivered.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Check whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// A future that resolves when cancellation is requested.
    pub fn cancelled(&self) -> tokio_util::sync::WaitForCancellationFuture<'_> {
        self.token.cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_idempotent() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());

        token.cancel();
        assert!(token.is_cancelled());

        // A second cancel changes nothing.
        token.cancel();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn cancelled_future_wakes_waiters() {
        let token = CancelToken::new();
        let observer = token.clone();

        let waiter = tokio::spawn(async move { observer.cancelled().await });
        tokio::task::yield_now().await;

        token.cancel();
        tokio::time::timeout(std::time::Duration::from_millis(200), waiter)
            .await
            .expect("cancel should wake the waiting task")
            .expect("task ok");
    }
}
