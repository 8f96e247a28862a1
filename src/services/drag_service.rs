//! In-memory drag and drop between the listing and the quick-access panel.

use serde::Serialize;

use crate::models::entry::{Entry, EntryKind};

/// What travels with a drag. The drop target re-checks it instead of trusting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DragDescriptor {
    pub name: String,
    pub path: String,
    pub kind: EntryKind,
}

impl DragDescriptor {
    /// Only directories can be dragged.
    pub fn from_entry(entry: &Entry) -> Option<Self> {
        if !entry.is_directory() {
            return None;
        }
        Some(Self {
            name: entry.name.clone(),
            path: entry.path.clone(),
            kind: entry.kind,
        })
    }

    /// Minimal entry for the pin request.
    pub fn to_entry(&self) -> Entry {
        Entry {
            name: self.name.clone(),
            path: self.path.clone(),
            kind: self.kind,
            size: None,
            modified_at: None,
            created_at: None,
            is_session_project: false,
            session_info: None,
        }
    }
}

/// Holds the descriptor of the drag in progress, if any.
#[derive(Debug, Default)]
pub struct DragTransfer {
    current: Option<DragDescriptor>,
}

impl DragTransfer {
    /// Returns `false` when the entry cannot be dragged; any earlier drag is dropped.
    pub fn begin(&mut self, entry: &Entry) -> bool {
        self.current = DragDescriptor::from_entry(entry);
        if self.current.is_none() {
            tracing::debug!(name = %entry.name, "drag suppressed for file entry");
        }
        self.current.is_some()
    }

    pub fn peek(&self) -> Option<&DragDescriptor> {
        self.current.as_ref()
    }

    pub fn take(&mut self) -> Option<DragDescriptor> {
        self.current.take()
    }

    pub fn cancel(&mut self) {
        self.current = None;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropDecision {
    Pin(Entry),
    NotADirectory { name: String },
    AlreadyPinned { path: String },
    Invalid,
}

impl DropDecision {
    pub fn rejection_message(&self) -> Option<String> {
        match self {
            Self::Pin(_) => None,
            Self::NotADirectory { name } => {
                Some(format!("Only folders can be pinned: '{name}' is a file"))
            }
            Self::AlreadyPinned { path } => Some(format!("'{path}' is already pinned")),
            Self::Invalid => Some("Nothing to pin in this drop".to_string()),
        }
    }
}

/// Drop-target check for the quick-access panel. `is_pinned` looks up the store.
pub fn evaluate_drop(
    descriptor: &DragDescriptor,
    is_pinned: impl Fn(&str) -> bool,
) -> DropDecision {
    if descriptor.path.trim().is_empty() {
        return DropDecision::Invalid;
    }
    if descriptor.kind != EntryKind::Directory {
        return DropDecision::NotADirectory {
            name: descriptor.name.clone(),
        };
    }
    if is_pinned(&descriptor.path) {
        return DropDecision::AlreadyPinned {
            path: descriptor.path.clone(),
        };
    }
    DropDecision::Pin(descriptor.to_entry())
}
