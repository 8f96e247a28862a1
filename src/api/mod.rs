//! File service abstraction.
//!
//! `FileService` is the only way the browser talks to the outside world. The HTTP
//! implementation lives in `http`; tests swap in the scripted fake.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::entry::Entry;
use crate::models::listing::ListingSort;
use crate::models::quick_access::QuickAccessEntry;

#[derive(Debug, Clone, Serialize)]
pub struct CreateFolderRequest<'a> {
    pub current_path: &'a str,
    pub folder_name: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct RenameRequest<'a> {
    pub path: &'a str,
    pub new_name: &'a str,
}

#[derive(Debug, Clone, Serialize)]
pub struct PinRequest<'a> {
    pub path: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PathResponse {
    pub message: String,
    pub path: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Body of every non-2xx response.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}

pub trait FileService: Send + Sync {
    /// `GET /files?path=&sort_by=&order=`
    fn list(
        &self,
        path: &str,
        sort: ListingSort,
    ) -> impl Future<Output = Result<Vec<Entry>>> + Send;

    /// `GET /file-info?path=`
    fn file_info(&self, path: &str) -> impl Future<Output = Result<Entry>> + Send;

    /// `POST /folders`
    fn create_folder(
        &self,
        current_path: &str,
        folder_name: &str,
    ) -> impl Future<Output = Result<PathResponse>> + Send;

    /// `POST /rename`
    fn rename(&self, path: &str, new_name: &str)
        -> impl Future<Output = Result<PathResponse>> + Send;

    /// `DELETE /items?path=`
    fn delete(&self, path: &str) -> impl Future<Output = Result<MessageResponse>> + Send;

    /// `GET /quick-access`
    fn list_pins(&self) -> impl Future<Output = Result<Vec<QuickAccessEntry>>> + Send;

    /// `POST /quick-access`
    fn add_pin(&self, path: &str) -> impl Future<Output = Result<QuickAccessEntry>> + Send;

    /// `DELETE /quick-access/{path}`
    fn remove_pin(&self, path: &str) -> impl Future<Output = Result<MessageResponse>> + Send;
}

pub mod http;

#[cfg(test)]
pub(crate) mod fake;
