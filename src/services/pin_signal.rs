//! Pin-changed signal shared between the listing view and the quick-access store.
//!
//! Subscriptions are explicit: a component subscribes when it mounts and drops its
//! handle when it unmounts.

use tokio::sync::broadcast;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};

const SIGNAL_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PinChange {
    Pinned { path: String },
    Unpinned { path: String },
}

#[derive(Debug, Clone)]
pub struct PinSignal {
    sender: broadcast::Sender<PinChange>,
}

impl Default for PinSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl PinSignal {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(SIGNAL_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> PinSubscription {
        PinSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Returns how many subscribers received the change.
    pub fn emit(&self, change: PinChange) -> usize {
        tracing::debug!(?change, "pin changed");
        self.sender.send(change).unwrap_or(0)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[derive(Debug)]
pub struct PinSubscription {
    receiver: broadcast::Receiver<PinChange>,
}

impl PinSubscription {
    /// Consumes every queued change and returns how many occurred.
    /// Changes dropped because the subscriber lagged are still counted.
    pub fn drain(&mut self) -> usize {
        let mut occurrences = 0;
        loop {
            match self.receiver.try_recv() {
                Ok(_) => occurrences += 1,
                Err(TryRecvError::Lagged(skipped)) => occurrences += skipped as usize,
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return occurrences,
            }
        }
    }

    /// Waits for the next change. `None` once every sender is gone.
    pub async fn changed(&mut self) -> Option<PinChange> {
        loop {
            match self.receiver.recv().await {
                Ok(change) => return Some(change),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "pin subscriber lagged");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }
}
