use serde::Serialize;

use crate::error::{AppError, Result};

/// Canonical browse location: a stack of non-empty path segments. Empty is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct BrowseLocation {
    segments: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Breadcrumb {
    pub label: String,
    pub location: BrowseLocation,
}

fn split_segments(raw: &str) -> impl Iterator<Item = String> + '_ {
    raw.split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
}

impl BrowseLocation {
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses user or service input. `//`, leading and trailing slashes collapse away.
    pub fn from_input(raw: &str) -> Self {
        Self {
            segments: split_segments(raw).collect(),
        }
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// The root is its own parent.
    pub fn parent(&self) -> Self {
        let mut segments = self.segments.clone();
        segments.pop();
        Self { segments }
    }

    /// Appends one segment as given. Raw paths go through [`BrowseLocation::from_input`].
    pub fn child(&self, segment: &str) -> Result<Self> {
        if segment.is_empty() || segment.contains('/') {
            return Err(AppError::Validation(format!(
                "'{segment}' is not a valid folder name"
            )));
        }
        let mut segments = self.segments.clone();
        segments.push(segment.to_string());
        Ok(Self { segments })
    }

    /// Service-facing form: segments joined by `/`, empty for the root.
    pub fn as_path(&self) -> String {
        self.segments.join("/")
    }

    pub fn breadcrumbs(&self) -> Vec<Breadcrumb> {
        let mut crumbs = vec![Breadcrumb {
            label: "Root".to_string(),
            location: Self::root(),
        }];
        for (index, segment) in self.segments.iter().enumerate() {
            crumbs.push(Breadcrumb {
                label: segment.clone(),
                location: Self {
                    segments: self.segments[..=index].to_vec(),
                },
            });
        }
        crumbs
    }
}

impl std::fmt::Display for BrowseLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "/{}", self.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_input_discards_empty_segments() {
        assert_eq!(BrowseLocation::from_input("/docs//reports/").segments(), ["docs", "reports"]);
        assert_eq!(BrowseLocation::from_input("docs").as_path(), "docs");
        assert!(BrowseLocation::from_input("").is_root());
        assert!(BrowseLocation::from_input("///").is_root());
    }

    #[test]
    fn parent_of_root_is_root() {
        let root = BrowseLocation::root();
        assert_eq!(root.parent(), root);
        assert_eq!(BrowseLocation::from_input("a/b").parent().as_path(), "a");
    }

    #[test]
    fn child_appends_exactly_one_segment() {
        let loc = BrowseLocation::from_input("a");
        assert_eq!(loc.child("b").unwrap().as_path(), "a/b");
        assert_eq!(loc.child("my docs").unwrap().segments(), ["a", "my docs"]);
    }

    #[test]
    fn child_rejects_raw_paths_and_empty_segments() {
        let loc = BrowseLocation::from_input("a");
        assert!(loc.child("").unwrap_err().is_validation());
        assert!(loc.child("c/d").unwrap_err().is_validation());
        assert!(loc.child("/").unwrap_err().is_validation());
    }

    #[test]
    fn display_is_rooted() {
        assert_eq!(BrowseLocation::root().to_string(), "/");
        assert_eq!(BrowseLocation::from_input("a/b").to_string(), "/a/b");
    }

    #[test]
    fn breadcrumbs_lead_back_to_each_ancestor() {
        let crumbs = BrowseLocation::from_input("a/b").breadcrumbs();
        let labels: Vec<&str> = crumbs.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, ["Root", "a", "b"]);
        assert!(crumbs[0].location.is_root());
        assert_eq!(crumbs[1].location.as_path(), "a");
        assert_eq!(crumbs[2].location.as_path(), "a/b");
    }
}
