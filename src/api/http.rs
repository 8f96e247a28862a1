//! `FileService` over JSON/HTTP with reqwest.

use reqwest::{Request, Response, Url};
use serde::de::DeserializeOwned;

use super::{
    CreateFolderRequest, ErrorBody, FileService, MessageResponse, PathResponse, PinRequest,
    RenameRequest,
};
use crate::error::{AppError, Result};
use crate::models::entry::Entry;
use crate::models::listing::ListingSort;
use crate::models::quick_access::QuickAccessEntry;

const USER_AGENT: &str = concat!("file-browser/", env!("CARGO_PKG_VERSION"));

pub struct HttpFileService {
    client: reqwest::Client,
    base: Url,
}

impl HttpFileService {
    /// No request timeout is configured; a hung request stays pending until the
    /// transport gives up.
    pub fn new(api_base: &str) -> Result<Self> {
        let base = Url::parse(api_base)
            .map_err(|e| AppError::Config(format!("invalid api base '{api_base}': {e}")))?;
        if base.cannot_be_a_base() {
            return Err(AppError::Config(format!("api base cannot hold a path: {api_base}")));
        }
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| AppError::General(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, base })
    }

    /// Appends percent-encoded path segments to the base URL.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| AppError::Config(format!("api base cannot hold a path: {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn list_request(&self, path: &str, sort: ListingSort) -> Result<Request> {
        let mut query = vec![("path", path)];
        if let Some(field) = sort.field {
            query.push(("sort_by", field.as_query()));
        }
        query.push(("order", sort.order.as_query()));
        Ok(self
            .client
            .get(self.endpoint(&["files"])?)
            .query(&query)
            .build()?)
    }

    async fn execute<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        tracing::debug!(method = %request.method(), url = %request.url(), "file service request");
        let response = self.client.execute(request).await?;
        decode(response).await
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json::<T>().await?);
    }
    let body = response.json::<ErrorBody>().await.unwrap_or_default();
    tracing::debug!(status = status.as_u16(), detail = ?body.detail, "file service error");
    Err(AppError::from_status(status.as_u16(), body.detail))
}

impl FileService for HttpFileService {
    async fn list(&self, path: &str, sort: ListingSort) -> Result<Vec<Entry>> {
        let request = self.list_request(path, sort)?;
        self.execute(request).await
    }

    async fn file_info(&self, path: &str) -> Result<Entry> {
        let request = self
            .client
            .get(self.endpoint(&["file-info"])?)
            .query(&[("path", path)])
            .build()?;
        self.execute(request).await
    }

    async fn create_folder(&self, current_path: &str, folder_name: &str) -> Result<PathResponse> {
        let request = self
            .client
            .post(self.endpoint(&["folders"])?)
            .json(&CreateFolderRequest {
                current_path,
                folder_name,
            })
            .build()?;
        self.execute(request).await
    }

    async fn rename(&self, path: &str, new_name: &str) -> Result<PathResponse> {
        let request = self
            .client
            .post(self.endpoint(&["rename"])?)
            .json(&RenameRequest { path, new_name })
            .build()?;
        self.execute(request).await
    }

    async fn delete(&self, path: &str) -> Result<MessageResponse> {
        let request = self
            .client
            .delete(self.endpoint(&["items"])?)
            .query(&[("path", path)])
            .build()?;
        self.execute(request).await
    }

    async fn list_pins(&self) -> Result<Vec<QuickAccessEntry>> {
        let request = self.client.get(self.endpoint(&["quick-access"])?).build()?;
        self.execute(request).await
    }

    async fn add_pin(&self, path: &str) -> Result<QuickAccessEntry> {
        let request = self
            .client
            .post(self.endpoint(&["quick-access"])?)
            .json(&PinRequest { path })
            .build()?;
        self.execute(request).await
    }

    async fn remove_pin(&self, path: &str) -> Result<MessageResponse> {
        let request = self
            .client
            .delete(self.endpoint(&["quick-access", path])?)
            .build()?;
        self.execute(request).await
    }
}
