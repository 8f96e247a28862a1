use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Directory,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "file"),
            Self::Directory => write!(f, "directory"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionInfo {
    pub file_count: u64,
    #[serde(default)]
    pub session_file: Option<String>,
}

/// One child of a directory listing, as sent by the file service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(rename = "modified", default)]
    pub modified_at: Option<String>,
    #[serde(rename = "created", default)]
    pub created_at: Option<String>,
    #[serde(rename = "session", default)]
    pub is_session_project: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_info: Option<SessionInfo>,
}

/// Identity of an entry within a listing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EntryKey {
    pub path: String,
    pub name: String,
}

impl Entry {
    pub fn key(&self) -> EntryKey {
        EntryKey {
            path: self.path.clone(),
            name: self.name.clone(),
        }
    }

    pub fn is_directory(&self) -> bool {
        self.kind == EntryKind::Directory
    }

    /// Plain directories can be entered; session directories and files cannot.
    pub fn is_navigable(&self) -> bool {
        self.is_directory() && !self.is_session_project
    }

    pub fn matches(&self, key: &EntryKey) -> bool {
        self.path == key.path && self.name == key.name
    }

    pub fn session_file_count(&self) -> Option<u64> {
        if !self.is_session_project {
            return None;
        }
        self.session_info.as_ref().map(|info| info.file_count)
    }
}
