use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickAccessEntry {
    pub path: String,
    pub name: String,
    #[serde(default)]
    pub pinned_at: Option<String>,
}
