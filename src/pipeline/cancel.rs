//! Cooperative cancellation shared by every pipeline stage
//!
//! A [`CancellationSignal`] is a cloneable handle around a `watch` channel.
//! Stages race each blocking stream operation against [`CancellationSignal::cancelled`]
//! so that nothing stays parked once the owning call has given up.

use std::sync::Arc;
use tokio::sync::watch;

/// Shared, one-way cancellation flag.
///
/// Once cancelled, a signal stays cancelled. Clones observe the same state.
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl CancellationSignal {
    /// Create a signal in the not-cancelled state
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx: Arc::new(tx) }
    }

    /// Trigger cancellation. Calling this more than once is a no-op.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }

    /// Whether cancellation has been triggered
    pub fn is_cancelled(&self) -> bool {
        *self.tx.borrow()
    }

    /// Resolve once the signal is cancelled.
    ///
    /// Safe to use as a `tokio::select!` branch; dropping the future has no effect
    /// on the signal.
    pub async fn cancelled(&self) {
        let mut rx = self.tx.subscribe();
        // The sender lives as long as `self`, so this only returns once cancelled.
        let _ = rx.wait_for(|cancelled| *cancelled).await;
    }

    /// Guard that cancels this signal when dropped
    pub fn cancel_on_drop(&self) -> CancelOnDrop {
        CancelOnDrop {
            signal: self.clone(),
        }
    }
}

impl Default for CancellationSignal {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancels the wrapped signal when it goes out of scope.
///
/// Ties the lifetime of every stage to the scope of the call that started them,
/// including the case where the caller's future is dropped mid-await.
#[derive(Debug)]
pub struct CancelOnDrop {
    signal: CancellationSignal,
}

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.signal.cancel();
    }
}
