//! Disposal signal shared between an orchestrator and its pending tasks.
//!
//! The orchestrator owns a [`Teardown`]; every task it spawns takes a
//! [`TeardownSignal`] and races its request against it. Dropping the
//! `Teardown` counts as disposal.

use tokio::sync::watch;

/// Owner side of the disposal signal.
#[derive(Debug)]
pub struct Teardown {
    tx: watch::Sender<bool>,
}

impl Default for Teardown {
    fn default() -> Self {
        Self::new()
    }
}

impl Teardown {
    /// Create a live (not disposed) signal.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self { tx }
    }

    /// A receiver for a task about to be spawned.
    pub fn signal(&self) -> TeardownSignal {
        TeardownSignal {
            rx: self.tx.subscribe(),
        }
    }

    /// Signal every task. Idempotent.
    pub fn dispose(&self) {
        self.tx.send_replace(true);
    }

    /// Return `true` once [`dispose`](Self::dispose) was called.
    pub fn is_disposed(&self) -> bool {
        *self.tx.borrow()
    }
}

/// Task side of the disposal signal.
#[derive(Debug, Clone)]
pub struct TeardownSignal {
    rx: watch::Receiver<bool>,
}

impl TeardownSignal {
    /// Resolve once the owner disposes (or is dropped).
    pub async fn disposed(&mut self) {
        // An error means the sender is gone, which is disposal too.
        let _ = self.rx.wait_for(|disposed| *disposed).await;
    }

    /// Return `true` if the owner has disposed or been dropped.
    pub fn is_disposed(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }
}
