//! Scripted in-memory `FileService` for tests.
//!
//! Records every call, keeps a tiny directory tree so mutations are visible on the
//! next listing, and can hold a call behind a gate until the test releases it.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;

use super::{FileService, MessageResponse, PathResponse};
use crate::error::{AppError, Result};
use crate::models::entry::{Entry, EntryKind, SessionInfo};
use crate::models::listing::ListingSort;
use crate::models::quick_access::QuickAccessEntry;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List { path: String, sort: ListingSort },
    FileInfo(String),
    CreateFolder { current_path: String, folder_name: String },
    Rename { path: String, new_name: String },
    Delete(String),
    ListPins,
    AddPin(String),
    RemovePin(String),
}

#[derive(Debug, Clone)]
enum Scripted {
    Status(u16, Option<String>),
    Transport,
}

#[derive(Default)]
struct FakeState {
    listings: HashMap<String, Vec<Entry>>,
    pins: Vec<QuickAccessEntry>,
    calls: Vec<Call>,
    failures: HashMap<String, Scripted>,
    gates: HashMap<String, Arc<Notify>>,
}

#[derive(Default)]
pub struct FakeFileService {
    state: Mutex<FakeState>,
}

pub fn dir(name: &str, path: &str) -> Entry {
    Entry {
        name: name.to_string(),
        path: path.to_string(),
        kind: EntryKind::Directory,
        size: None,
        modified_at: Some("2024-05-01T10:00:00".to_string()),
        created_at: Some("2024-05-01T09:00:00".to_string()),
        is_session_project: false,
        session_info: None,
    }
}

pub fn session_dir(name: &str, path: &str, file_count: u64) -> Entry {
    Entry {
        is_session_project: true,
        session_info: Some(SessionInfo {
            file_count,
            session_file: Some(format!("{name}.session")),
        }),
        ..dir(name, path)
    }
}

pub fn file(name: &str, path: &str, size: u64) -> Entry {
    Entry {
        kind: EntryKind::File,
        size: Some(size),
        ..dir(name, path)
    }
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{parent}/{name}")
    }
}

fn parent_of(path: &str) -> String {
    path.rsplit_once('/')
        .map(|(parent, _)| parent.to_string())
        .unwrap_or_default()
}

fn not_found(path: &str) -> AppError {
    AppError::from_status(404, Some(format!("Path not found: {path}")))
}

impl FakeFileService {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Root holds `docs/` and `a.txt` (2048 bytes); `docs` is empty.
    pub fn with_sample_tree() -> Self {
        let service = Self::new();
        service.set_listing("", vec![dir("docs", "docs"), file("a.txt", "a.txt", 2048)]);
        service.set_listing("docs", Vec::new());
        service
    }

    pub fn set_listing(&self, path: &str, entries: Vec<Entry>) {
        self.lock().listings.insert(path.to_string(), entries);
    }

    pub fn set_pins(&self, pins: Vec<QuickAccessEntry>) {
        self.lock().pins = pins;
    }

    pub fn pins(&self) -> Vec<QuickAccessEntry> {
        self.lock().pins.clone()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.lock().calls.iter().filter(|call| predicate(call)).count()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    /// The next call named `op` fails with `status` and an optional `detail`.
    pub fn fail_next(&self, op: &str, status: u16, detail: Option<&str>) {
        self.lock().failures.insert(
            op.to_string(),
            Scripted::Status(status, detail.map(str::to_string)),
        );
    }

    pub fn fail_next_transport(&self, op: &str) {
        self.lock()
            .failures
            .insert(op.to_string(), Scripted::Transport);
    }

    /// Calls keyed `op:path` wait until [`FakeFileService::release`] is called.
    pub fn hold(&self, key: &str) {
        self.lock()
            .gates
            .insert(key.to_string(), Arc::new(Notify::new()));
    }

    pub fn release(&self, key: &str) {
        if let Some(gate) = self.lock().gates.remove(key) {
            gate.notify_one();
        }
    }

    async fn enter(&self, op: &str, path: &str, call: Call) -> Result<()> {
        let gate = {
            let mut state = self.lock();
            state.calls.push(call);
            state.gates.get(&format!("{op}:{path}")).cloned()
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        match self.lock().failures.remove(op) {
            Some(Scripted::Status(status, detail)) => Err(AppError::from_status(status, detail)),
            Some(Scripted::Transport) => Err(AppError::Transport("connection reset".to_string())),
            None => Ok(()),
        }
    }
}

impl FileService for FakeFileService {
    async fn list(&self, path: &str, sort: ListingSort) -> Result<Vec<Entry>> {
        let call = Call::List {
            path: path.to_string(),
            sort,
        };
        self.enter("list", path, call).await?;
        self.lock()
            .listings
            .get(path)
            .cloned()
            .ok_or_else(|| not_found(path))
    }

    async fn file_info(&self, path: &str) -> Result<Entry> {
        self.enter("file_info", path, Call::FileInfo(path.to_string()))
            .await?;
        let state = self.lock();
        state
            .listings
            .get(&parent_of(path))
            .and_then(|entries| entries.iter().find(|entry| entry.path == path))
            .cloned()
            .ok_or_else(|| not_found(path))
    }

    async fn create_folder(&self, current_path: &str, folder_name: &str) -> Result<PathResponse> {
        let call = Call::CreateFolder {
            current_path: current_path.to_string(),
            folder_name: folder_name.to_string(),
        };
        self.enter("create_folder", current_path, call).await?;
        let path = join(current_path, folder_name);
        let mut state = self.lock();
        let siblings = state
            .listings
            .get_mut(current_path)
            .ok_or_else(|| not_found(current_path))?;
        if siblings.iter().any(|entry| entry.name == folder_name) {
            return Err(AppError::from_status(
                400,
                Some(format!("Folder already exists: {folder_name}")),
            ));
        }
        siblings.push(dir(folder_name, &path));
        state.listings.insert(path.clone(), Vec::new());
        Ok(PathResponse {
            message: "Folder created successfully".to_string(),
            path,
        })
    }

    async fn rename(&self, path: &str, new_name: &str) -> Result<PathResponse> {
        let call = Call::Rename {
            path: path.to_string(),
            new_name: new_name.to_string(),
        };
        self.enter("rename", path, call).await?;
        let parent = parent_of(path);
        let new_path = join(&parent, new_name);
        let mut state = self.lock();
        let entry = state
            .listings
            .get_mut(&parent)
            .and_then(|entries| entries.iter_mut().find(|entry| entry.path == path))
            .ok_or_else(|| not_found(path))?;
        entry.name = new_name.to_string();
        entry.path = new_path.clone();
        if let Some(children) = state.listings.remove(path) {
            state.listings.insert(new_path.clone(), children);
        }
        Ok(PathResponse {
            message: "Item renamed successfully".to_string(),
            path: new_path,
        })
    }

    async fn delete(&self, path: &str) -> Result<MessageResponse> {
        self.enter("delete", path, Call::Delete(path.to_string()))
            .await?;
        let mut state = self.lock();
        let entries = state
            .listings
            .get_mut(&parent_of(path))
            .ok_or_else(|| not_found(path))?;
        let before = entries.len();
        entries.retain(|entry| entry.path != path);
        if entries.len() == before {
            return Err(not_found(path));
        }
        state.listings.remove(path);
        Ok(MessageResponse {
            message: "Item deleted successfully".to_string(),
        })
    }

    async fn list_pins(&self) -> Result<Vec<QuickAccessEntry>> {
        self.enter("list_pins", "", Call::ListPins).await?;
        Ok(self.lock().pins.clone())
    }

    async fn add_pin(&self, path: &str) -> Result<QuickAccessEntry> {
        self.enter("add_pin", path, Call::AddPin(path.to_string()))
            .await?;
        let mut state = self.lock();
        if state.pins.iter().any(|pin| pin.path == path) {
            return Err(AppError::from_status(
                400,
                Some("Folder is already pinned".to_string()),
            ));
        }
        let pin = QuickAccessEntry {
            path: path.to_string(),
            name: path.rsplit('/').next().unwrap_or(path).to_string(),
            pinned_at: Some("2024-05-02T08:00:00".to_string()),
        };
        state.pins.push(pin.clone());
        Ok(pin)
    }

    async fn remove_pin(&self, path: &str) -> Result<MessageResponse> {
        self.enter("remove_pin", path, Call::RemovePin(path.to_string()))
            .await?;
        let mut state = self.lock();
        let before = state.pins.len();
        state.pins.retain(|pin| pin.path != path);
        if state.pins.len() == before {
            return Err(AppError::from_status(
                404,
                Some("Folder not found in Quick Access".to_string()),
            ));
        }
        Ok(MessageResponse {
            message: "Folder unpinned successfully".to_string(),
        })
    }
}
