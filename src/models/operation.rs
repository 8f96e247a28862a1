use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationKind {
    CreateFolder,
    Rename,
    Delete,
    Pin,
    Unpin,
}

impl MutationKind {
    pub fn failure_message(self) -> &'static str {
        match self {
            Self::CreateFolder => "Failed to create folder",
            Self::Rename => "Failed to rename item",
            Self::Delete => "Failed to delete item",
            Self::Pin => "Failed to pin folder",
            Self::Unpin => "Failed to unpin folder",
        }
    }

    pub fn success_message(self) -> &'static str {
        match self {
            Self::CreateFolder => "Folder created",
            Self::Rename => "Item renamed",
            Self::Delete => "Item deleted",
            Self::Pin => "Folder pinned to Quick Access",
            Self::Unpin => "Folder removed from Quick Access",
        }
    }
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateFolder => write!(f, "create_folder"),
            Self::Rename => write!(f, "rename"),
            Self::Delete => write!(f, "delete"),
            Self::Pin => write!(f, "pin"),
            Self::Unpin => write!(f, "unpin"),
        }
    }
}

impl std::str::FromStr for MutationKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create_folder" => Ok(Self::CreateFolder),
            "rename" => Ok(Self::Rename),
            "delete" => Ok(Self::Delete),
            "pin" => Ok(Self::Pin),
            "unpin" => Ok(Self::Unpin),
            _ => Err(format!("unknown mutation kind: {s}")),
        }
    }
}

/// How a mutation request ended when it did not fail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationOutcome {
    Completed,
    /// Rename to the current name; nothing was sent.
    Unchanged,
    /// Pin target is already in quick access; nothing was sent.
    AlreadyPinned,
}
