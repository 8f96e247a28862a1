use std::future::Future;

use tokio::task::JoinHandle;

use crate::error::AppError;
use crate::models::quick_access::QuickAccessEntry;
use crate::services::pin_signal::PinSubscription;

pub const PINS_FAILURE_MESSAGE: &str = "Failed to load pinned folders";

/// Background task that runs `on_change` after every pin change. Changes that
/// arrive while a callback is running are folded into one further call.
/// Dropping the watcher stops the task and releases its subscription.
#[derive(Debug)]
pub struct PinWatcher {
    task: JoinHandle<()>,
}

impl PinWatcher {
    pub fn spawn<F, Fut>(mut subscription: PinSubscription, mut on_change: F) -> Self
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let task = tokio::spawn(async move {
            while let Some(change) = subscription.changed().await {
                let coalesced = subscription.drain();
                tracing::debug!(?change, coalesced, "refetching pinned folders");
                on_change().await;
            }
        });
        Self { task }
    }
}

impl Drop for PinWatcher {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Local mirror of the server's pinned folders.
#[derive(Debug, Default)]
pub struct QuickAccessStore {
    entries: Vec<QuickAccessEntry>,
    watcher: Option<PinWatcher>,
    latest_token: u64,
}

impl QuickAccessStore {
    /// Replaces any previous watcher.
    pub fn attach(&mut self, watcher: PinWatcher) {
        self.watcher = Some(watcher);
    }

    pub fn unmount(&mut self) {
        self.watcher = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.watcher.is_some()
    }

    pub fn entries(&self) -> &[QuickAccessEntry] {
        &self.entries
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.iter().any(|entry| entry.path == path)
    }

    pub fn begin_refresh(&mut self) -> u64 {
        self.latest_token += 1;
        self.latest_token
    }

    /// Replaces the list wholesale. Stale refreshes are ignored; a failed refresh
    /// keeps the previous list and yields the message to show.
    pub fn complete_refresh(
        &mut self,
        token: u64,
        result: Result<Vec<QuickAccessEntry>, AppError>,
    ) -> Result<bool, String> {
        if token != self.latest_token {
            return Ok(false);
        }
        match result {
            Ok(entries) => {
                self.entries = dedupe_by_path(entries);
                Ok(true)
            }
            Err(error) => Err(error.user_message(PINS_FAILURE_MESSAGE)),
        }
    }
}

fn dedupe_by_path(entries: Vec<QuickAccessEntry>) -> Vec<QuickAccessEntry> {
    let mut unique: Vec<QuickAccessEntry> = Vec::with_capacity(entries.len());
    for entry in entries {
        if !unique.iter().any(|kept| kept.path == entry.path) {
            unique.push(entry);
        }
    }
    unique
}
