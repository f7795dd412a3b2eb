// src/watch/signal.rs

//! The change counter and edge-triggered change signal shared by the
//! filesystem monitor (writer) and the coalescer (reader).
//!
//! Both live in one `tokio::sync::watch` channel: the channel value is the
//! counter, and the receiver's "seen version" is the signal. Reading the
//! counter and clearing the signal happen under the same lock, so an
//! increment that lands after a clear always leaves the signal set again.

use std::sync::Arc;

use anyhow::{Result, anyhow};
use tokio::sync::watch;

/// Writer side: counts relevant filesystem changes.
#[derive(Debug, Clone)]
pub struct ChangeTracker {
    tx: Arc<watch::Sender<u64>>,
}

impl Default for ChangeTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeTracker {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    /// Increment the counter and set the signal for every subscriber.
    ///
    /// Returns the new counter value.
    pub fn record_change(&self) -> u64 {
        let mut value = 0;
        self.tx.send_modify(|count| {
            *count += 1;
            value = *count;
        });
        value
    }

    /// Current counter value. Does not touch any signal.
    pub fn current(&self) -> u64 {
        *self.tx.borrow()
    }

    /// A new signal that starts out clear.
    pub fn subscribe(&self) -> ChangeSignal {
        ChangeSignal {
            rx: self.tx.subscribe(),
        }
    }
}

/// Reader side: "something changed since I last cleared".
#[derive(Debug)]
pub struct ChangeSignal {
    rx: watch::Receiver<u64>,
}

impl ChangeSignal {
    /// Wait until the signal is set. Returns immediately if it already is.
    pub async fn wait(&mut self) -> Result<()> {
        self.rx
            .changed()
            .await
            .map_err(|_| anyhow!("change tracker dropped"))
    }

    pub fn is_set(&self) -> bool {
        self.rx.has_changed().unwrap_or(false)
    }

    /// Clear the signal and return the counter value as of the clear.
    pub fn clear(&mut self) -> u64 {
        *self.rx.borrow_and_update()
    }

    /// Set the signal without changing the counter.
    #[cfg(test)]
    pub fn set(&mut self) {
        self.rx.mark_changed();
    }
}
