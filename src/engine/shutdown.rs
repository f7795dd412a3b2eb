// src/engine/shutdown.rs

//! Coordinated shutdown shared by the monitor, the coalescer and Ctrl-C.

use std::sync::Arc;

use tokio::sync::watch;

/// Why the watch session is ending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShutdownReason {
    /// Ctrl-C or an explicit request.
    Requested,
    /// The filesystem subscription failed while watching.
    MonitorFailed(String),
}

/// Cloneable close handle. The first recorded reason wins.
#[derive(Debug, Clone)]
pub struct ShutdownHandle {
    tx: Arc<watch::Sender<Option<ShutdownReason>>>,
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl ShutdownHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Record a shutdown reason. Returns false if one was already recorded.
    pub fn request(&self, reason: ShutdownReason) -> bool {
        self.tx.send_if_modified(|current| {
            if current.is_some() {
                return false;
            }
            *current = Some(reason);
            true
        })
    }

    pub fn reason(&self) -> Option<ShutdownReason> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> ShutdownListener {
        ShutdownListener {
            rx: self.tx.subscribe(),
        }
    }
}

#[derive(Debug)]
pub struct ShutdownListener {
    rx: watch::Receiver<Option<ShutdownReason>>,
}

impl ShutdownListener {
    /// Resolve once a shutdown reason is recorded (immediately if it
    /// already was). Never resolves if every handle is dropped first.
    pub async fn wait(&mut self) -> ShutdownReason {
        loop {
            let current = self.rx.borrow_and_update().clone();
            if let Some(reason) = current {
                return reason;
            }
            if self.rx.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }

    pub fn is_requested(&self) -> bool {
        self.rx.borrow().is_some()
    }
}
