//! Single-shot timers
//!
//! A timer sends one `SessionSignal` into the signal channel after a delay.
//! Rearming replaces the pending firing; cancelling or dropping aborts it.

use crate::events::{SessionSignal, SignalSender};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::trace;

/// Cancellable, rearmable one-shot timer
#[derive(Debug)]
pub struct SingleShotTimer {
    name: &'static str,
    handle: Option<JoinHandle<()>>,
}

impl SingleShotTimer {
    /// Create an unarmed timer
    pub fn new(name: &'static str) -> Self {
        Self { name, handle: None }
    }

    /// Arm the timer, replacing any pending firing
    ///
    /// Must be called from within a tokio runtime.
    pub fn arm(&mut self, delay: Duration, tx: SignalSender, signal: SessionSignal) {
        self.cancel();
        trace!(timer = self.name, delay_ms = delay.as_millis() as u64, "Arming timer");
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the session is closed
            let _ = tx.send(signal);
        }));
    }

    /// Abort the pending firing, if any
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }

    /// Whether a firing is still pending
    pub fn is_armed(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for SingleShotTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
