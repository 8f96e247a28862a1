use crate::error::AppError;
use crate::location::BrowseLocation;
use crate::models::entry::Entry;
use crate::models::listing::{Listing, ListingSort, ListingStatus};

pub const LIST_FAILURE_MESSAGE: &str = "Failed to load files";

/// A listing fetch that has been started but not yet applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingRequest {
    pub token: u64,
    pub location: BrowseLocation,
    pub sort: ListingSort,
}

/// Holds the visible listing. Each `begin` supersedes every earlier request; only the
/// response carrying the latest token is applied.
#[derive(Debug)]
pub struct ListingLoader {
    latest_token: u64,
    listing: Listing,
}

impl Default for ListingLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ListingLoader {
    pub fn new() -> Self {
        Self {
            latest_token: 0,
            listing: Listing::empty(),
        }
    }

    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    pub fn begin(&mut self, location: BrowseLocation, sort: ListingSort) -> ListingRequest {
        self.latest_token += 1;
        if self.listing.location != location {
            self.listing.entries.clear();
        }
        self.listing.location = location.clone();
        self.listing.sort = sort;
        self.listing.status = ListingStatus::Loading;
        ListingRequest {
            token: self.latest_token,
            location,
            sort,
        }
    }

    /// Re-issues the stored location and sort.
    pub fn begin_reload(&mut self) -> ListingRequest {
        let location = self.listing.location.clone();
        let sort = self.listing.sort;
        self.begin(location, sort)
    }

    pub fn is_current(&self, request: &ListingRequest) -> bool {
        request.token == self.latest_token
    }

    /// Applies a response. Returns `false` and leaves state alone when the request
    /// was superseded.
    pub fn complete(
        &mut self,
        request: &ListingRequest,
        result: Result<Vec<Entry>, AppError>,
    ) -> bool {
        if !self.is_current(request) {
            return false;
        }
        match result {
            Ok(entries) => {
                self.listing.entries = entries;
                self.listing.status = ListingStatus::Loaded;
            }
            Err(error) => {
                self.listing.entries.clear();
                self.listing.status =
                    ListingStatus::Failed(error.user_message(LIST_FAILURE_MESSAGE));
            }
        }
        true
    }
}
