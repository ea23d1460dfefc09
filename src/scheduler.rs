use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// A single cancellable, generation-tagged deferred callback.
///
/// Drives both the AI's thinking delay in a battle and the flip-back of a
/// mismatched pair in the memory game. A fired timer yields the generation it
/// was scheduled for, so a caller can drop a timer that outlived a reset.
/// `cancel` aborts the timer outright.
pub struct DeferredTimer {
    tx: mpsc::UnboundedSender<u64>,
    rx: mpsc::UnboundedReceiver<u64>,
    pending: Option<JoinHandle<()>>,
}

impl Default for DeferredTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl DeferredTimer {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self { tx, rx, pending: None }
    }

    /// Replaces any pending timer. Must be called from within a tokio runtime.
    pub fn schedule(&mut self, delay: Duration, generation: u64) {
        self.cancel();
        let tx = self.tx.clone();
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the timer was dropped.
            let _ = tx.send(generation);
        }));
        tracing::trace!(?delay, generation, "deferred timer scheduled");
    }

    pub fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
            tracing::trace!("deferred timer cancelled");
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Waits for the next timer to fire and returns its generation.
    pub async fn fired(&mut self) -> Option<u64> {
        let generation = self.rx.recv().await;
        self.pending = None;
        generation
    }
}

impl Drop for DeferredTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
