use serde::{Deserialize, Serialize};

use crate::location::BrowseLocation;
use crate::models::entry::Entry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    Name,
    Modified,
    Size,
}

impl SortField {
    pub fn as_query(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Modified => "modified",
            Self::Size => "size",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(Self::Name),
            "modified" | "modifiedAt" => Some(Self::Modified),
            "size" => Some(Self::Size),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_query(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Sort requested from the service. No field means the service default order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingSort {
    pub field: Option<SortField>,
    pub order: SortOrder,
}

impl ListingSort {
    pub fn by(field: SortField, order: SortOrder) -> Self {
        Self {
            field: Some(field),
            order,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "message", rename_all = "snake_case")]
pub enum ListingStatus {
    Idle,
    Loading,
    Loaded,
    Failed(String),
}

#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    pub location: BrowseLocation,
    pub sort: ListingSort,
    pub entries: Vec<Entry>,
    pub status: ListingStatus,
}

impl Listing {
    pub fn empty() -> Self {
        Self {
            location: BrowseLocation::root(),
            sort: ListingSort::default(),
            entries: Vec::new(),
            status: ListingStatus::Idle,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == ListingStatus::Loading
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            ListingStatus::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn find(&self, name: &str) -> Option<&Entry> {
        self.entries.iter().find(|entry| entry.name == name)
    }
}
