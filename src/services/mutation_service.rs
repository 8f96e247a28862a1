use std::collections::HashSet;
use std::sync::Mutex;

use crate::api::{FileService, MessageResponse, PathResponse};
use crate::error::{AppError, Result};
use crate::location::BrowseLocation;
use crate::models::entry::Entry;
use crate::models::operation::MutationKind;
use crate::models::quick_access::QuickAccessEntry;
use crate::services::pin_signal::{PinChange, PinSignal};

/// In-flight mutations keyed by kind and target path.
#[derive(Debug, Default)]
pub struct PendingOperations {
    inflight: Mutex<HashSet<(MutationKind, String)>>,
}

pub struct PendingGuard<'a> {
    owner: &'a PendingOperations,
    key: (MutationKind, String),
}

impl PendingOperations {
    fn lock(&self) -> std::sync::MutexGuard<'_, HashSet<(MutationKind, String)>> {
        self.inflight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Fails with `OperationPending` while the same kind/path pair is in flight.
    pub fn acquire(&self, kind: MutationKind, path: &str) -> Result<PendingGuard<'_>> {
        let key = (kind, path.to_string());
        if !self.lock().insert(key.clone()) {
            tracing::warn!(%kind, path, "rejected duplicate mutation");
            return Err(AppError::OperationPending {
                kind,
                path: path.to_string(),
            });
        }
        Ok(PendingGuard { owner: self, key })
    }

    pub fn is_pending(&self, kind: MutationKind, path: &str) -> bool {
        self.lock().contains(&(kind, path.to_string()))
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.owner.lock().remove(&self.key);
    }
}

/// Proof that the user agreed to a delete. Only [`DeleteConfirmation::request`]
/// creates one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfirmation {
    entry: Entry,
}

impl DeleteConfirmation {
    pub fn request(entry: Entry) -> Self {
        Self { entry }
    }

    pub fn entry(&self) -> &Entry {
        &self.entry
    }

    pub fn prompt(&self) -> String {
        if self.entry.is_directory() {
            format!(
                "Delete folder '{}' and everything inside it? This cannot be undone.",
                self.entry.name
            )
        } else {
            format!("Delete '{}'? This cannot be undone.", self.entry.name)
        }
    }
}

pub fn validate_folder_name(name: &str) -> Result<&str> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(
            "Folder name cannot be empty".to_string(),
        ));
    }
    Ok(trimmed)
}

/// `Ok(None)` when the trimmed name equals the current one.
pub fn validate_new_name<'a>(entry: &Entry, new_name: &'a str) -> Result<Option<&'a str>> {
    let trimmed = new_name.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation("Name cannot be empty".to_string()));
    }
    if trimmed == entry.name {
        return Ok(None);
    }
    Ok(Some(trimmed))
}

pub fn validate_pin_target(entry: &Entry) -> Result<()> {
    if !entry.is_directory() {
        return Err(AppError::Validation(format!(
            "Only folders can be pinned: '{}' is a file",
            entry.name
        )));
    }
    Ok(())
}

/// Sends mutations to the file service, one at a time per target.
#[derive(Debug)]
pub struct MutationCoordinator {
    pending: PendingOperations,
    pin_signal: PinSignal,
}

impl MutationCoordinator {
    pub fn new(pin_signal: PinSignal) -> Self {
        Self {
            pending: PendingOperations::default(),
            pin_signal,
        }
    }

    pub fn pending(&self) -> &PendingOperations {
        &self.pending
    }

    pub async fn create_folder<S: FileService>(
        &self,
        service: &S,
        location: &BrowseLocation,
        name: &str,
    ) -> Result<PathResponse> {
        let name = validate_folder_name(name)?;
        let target = location.child(name)?.as_path();
        let _guard = self.pending.acquire(MutationKind::CreateFolder, &target)?;

        let response = service.create_folder(&location.as_path(), name).await?;
        tracing::info!(path = %response.path, "folder created");
        Ok(response)
    }

    /// `Ok(None)` means the name did not change and nothing was sent.
    pub async fn rename<S: FileService>(
        &self,
        service: &S,
        entry: &Entry,
        new_name: &str,
    ) -> Result<Option<PathResponse>> {
        let Some(new_name) = validate_new_name(entry, new_name)? else {
            return Ok(None);
        };
        let _guard = self.pending.acquire(MutationKind::Rename, &entry.path)?;

        let response = service.rename(&entry.path, new_name).await?;
        tracing::info!(from = %entry.path, to = %response.path, "item renamed");
        Ok(Some(response))
    }

    pub async fn delete<S: FileService>(
        &self,
        service: &S,
        confirmation: &DeleteConfirmation,
    ) -> Result<MessageResponse> {
        let entry = confirmation.entry();
        let _guard = self.pending.acquire(MutationKind::Delete, &entry.path)?;

        let response = service.delete(&entry.path).await?;
        tracing::info!(path = %entry.path, "item deleted");
        Ok(response)
    }

    pub async fn pin<S: FileService>(&self, service: &S, entry: &Entry) -> Result<QuickAccessEntry> {
        validate_pin_target(entry)?;
        let _guard = self.pending.acquire(MutationKind::Pin, &entry.path)?;

        let pinned = service.add_pin(&entry.path).await?;
        tracing::info!(path = %pinned.path, "folder pinned");
        self.pin_signal.emit(PinChange::Pinned {
            path: pinned.path.clone(),
        });
        Ok(pinned)
    }

    pub async fn unpin<S: FileService>(&self, service: &S, path: &str) -> Result<MessageResponse> {
        let _guard = self.pending.acquire(MutationKind::Unpin, path)?;

        let response = service.remove_pin(path).await?;
        tracing::info!(path, "folder unpinned");
        self.pin_signal.emit(PinChange::Unpinned {
            path: path.to_string(),
        });
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::fake::{dir, file, Call, FakeFileService};

    fn coordinator() -> (MutationCoordinator, PinSignal) {
        let signal = PinSignal::new();
        (MutationCoordinator::new(signal.clone()), signal)
    }

    #[test]
    fn guard_releases_on_drop() {
        let pending = PendingOperations::default();
        let guard = pending.acquire(MutationKind::Delete, "a").unwrap();
        assert!(pending.is_pending(MutationKind::Delete, "a"));
        assert!(pending.acquire(MutationKind::Delete, "a").is_err());
        assert!(pending.acquire(MutationKind::Rename, "a").is_ok());

        drop(guard);
        assert!(pending.is_empty());
        assert!(pending.acquire(MutationKind::Delete, "a").is_ok());
    }

    #[test]
    fn delete_prompt_mentions_recursive_removal_for_folders() {
        let folder = DeleteConfirmation::request(dir("docs", "docs"));
        assert!(folder.prompt().contains("everything inside it"));

        let doc = DeleteConfirmation::request(file("a.txt", "a.txt", 1));
        assert_eq!(doc.prompt(), "Delete 'a.txt'? This cannot be undone.");
    }

    #[tokio::test]
    async fn blank_folder_names_fail_without_request() {
        let service = FakeFileService::with_sample_tree();
        let (mutations, _) = coordinator();

        for name in ["", "   "] {
            let err = mutations
                .create_folder(&service, &BrowseLocation::root(), name)
                .await
                .unwrap_err();
            assert!(err.is_validation());
        }
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn folder_names_with_slashes_fail_without_request() {
        let service = FakeFileService::with_sample_tree();
        let (mutations, _) = coordinator();

        let err = mutations
            .create_folder(&service, &BrowseLocation::root(), "a/b")
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert!(service.calls().is_empty());
        assert!(mutations.pending().is_empty());
    }

    #[tokio::test]
    async fn create_folder_sends_trimmed_name_under_location() {
        let service = FakeFileService::with_sample_tree();
        let (mutations, _) = coordinator();

        let response = mutations
            .create_folder(&service, &BrowseLocation::from_input("docs"), "  reports ")
            .await
            .unwrap();

        assert_eq!(response.path, "docs/reports");
        assert_eq!(
            service.calls(),
            vec![Call::CreateFolder {
                current_path: "docs".to_string(),
                folder_name: "reports".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn rename_to_same_name_is_a_noop() {
        let service = FakeFileService::with_sample_tree();
        let (mutations, _) = coordinator();
        let doc = file("a.txt", "a.txt", 2048);

        assert_eq!(mutations.rename(&service, &doc, "a.txt").await.unwrap(), None);
        assert_eq!(mutations.rename(&service, &doc, " a.txt  ").await.unwrap(), None);
        assert!(mutations.rename(&service, &doc, "  ").await.unwrap_err().is_validation());
        assert!(service.calls().is_empty());
    }

    #[tokio::test]
    async fn pin_rejects_files_locally() {
        let service = FakeFileService::with_sample_tree();
        let (mutations, signal) = coordinator();
        let mut subscription = signal.subscribe();

        let err = mutations
            .pin(&service, &file("a.txt", "a.txt", 2048))
            .await
            .unwrap_err();

        assert!(err.is_validation());
        assert!(service.calls().is_empty());
        assert_eq!(subscription.drain(), 0);
    }

    #[tokio::test]
    async fn pin_and_unpin_emit_signal_on_success() {
        let service = FakeFileService::with_sample_tree();
        let (mutations, signal) = coordinator();
        let mut subscription = signal.subscribe();

        mutations.pin(&service, &dir("docs", "docs")).await.unwrap();
        mutations.unpin(&service, "docs").await.unwrap();

        assert_eq!(subscription.drain(), 2);
        assert!(service.pins().is_empty());
    }

    #[tokio::test]
    async fn failed_pin_emits_nothing() {
        let service = FakeFileService::with_sample_tree();
        service.fail_next("add_pin", 500, None);
        let (mutations, signal) = coordinator();
        let mut subscription = signal.subscribe();

        assert!(mutations.pin(&service, &dir("docs", "docs")).await.is_err());
        assert_eq!(subscription.drain(), 0);
        assert!(mutations.pending().is_empty());
    }

    #[tokio::test]
    async fn concurrent_delete_of_same_path_is_rejected() {
        let service = FakeFileService::with_sample_tree();
        service.hold("delete:a.txt");
        let (mutations, _) = coordinator();
        let confirmation = DeleteConfirmation::request(file("a.txt", "a.txt", 2048));

        let (first, second) = tokio::join!(mutations.delete(&service, &confirmation), async {
            let second = mutations.delete(&service, &confirmation).await;
            service.release("delete:a.txt");
            second
        });

        assert!(first.is_ok());
        assert!(matches!(
            second,
            Err(AppError::OperationPending {
                kind: MutationKind::Delete,
                ..
            })
        ));
        assert_eq!(service.count(|c| matches!(c, Call::Delete(_))), 1);
    }

    #[tokio::test]
    async fn different_targets_run_side_by_side() {
        let service = FakeFileService::with_sample_tree();
        service.hold("delete:a.txt");
        let (mutations, _) = coordinator();
        let doc = DeleteConfirmation::request(file("a.txt", "a.txt", 2048));
        let docs = DeleteConfirmation::request(dir("docs", "docs"));

        let (first, second) = tokio::join!(mutations.delete(&service, &doc), async {
            let second = mutations.delete(&service, &docs).await;
            service.release("delete:a.txt");
            second
        });

        assert!(first.is_ok());
        assert!(second.is_ok());
    }
}
