//! Cooperative cancellation.
//!
//! An `Interrupt` is a shared flag raised asynchronously (by the Ctrl+C
//! listener) and polled by long-running traversals between steps. Clones share
//! the same flag.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct Interrupt {
    flag: Arc<AtomicBool>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the flag.
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Lower the flag, returning whether it was raised.
    pub fn clear(&self) -> bool {
        self.flag.swap(false, Ordering::SeqCst)
    }

    /// Raise the flag on every Ctrl+C for the rest of the process lifetime.
    pub fn listen_for_ctrl_c(&self) {
        let interrupt = self.clone();
        tokio::spawn(async move {
            while tokio::signal::ctrl_c().await.is_ok() {
                tracing::debug!("interrupt received");
                interrupt.trigger();
            }
        });
    }
}
