use serde::Serialize;

use crate::location::{Breadcrumb, BrowseLocation};
use crate::models::entry::Entry;
use crate::models::listing::Listing;
use crate::models::quick_access::QuickAccessEntry;
use crate::services::click_service::ClickDisambiguator;
use crate::services::drag_service::{DragDescriptor, DragTransfer};
use crate::services::listing_service::{ListingLoader, ListingRequest};
use crate::services::notification_service::{Notification, Notifications};
use crate::services::pin_signal::PinSignal;
use crate::services::quick_access_service::QuickAccessStore;

/// Objects shared by every component of one browser window.
#[derive(Debug, Clone, Default)]
pub struct BrowserContext {
    pub pin_signal: PinSignal,
}

/// Everything the controller mutates. Lives behind one mutex so a location change,
/// its selection clear and its listing request land together.
#[derive(Debug)]
pub struct BrowserState {
    pub location: BrowseLocation,
    pub listing: ListingLoader,
    pub selection: Option<Entry>,
    pub clicks: ClickDisambiguator,
    pub quick_access: QuickAccessStore,
    pub drag: DragTransfer,
    pub notifications: Notifications,
    pub busy: usize,
}

impl BrowserState {
    pub fn new(clicks: ClickDisambiguator) -> Self {
        Self {
            location: BrowseLocation::root(),
            listing: ListingLoader::new(),
            selection: None,
            clicks,
            quick_access: QuickAccessStore::default(),
            drag: DragTransfer::default(),
            notifications: Notifications::default(),
            busy: 0,
        }
    }

    /// Moves to `location`, clearing selection and any armed click, and starts the
    /// listing request for it.
    pub fn set_location(&mut self, location: BrowseLocation) -> ListingRequest {
        self.location = location.clone();
        self.selection = None;
        self.clicks.cancel();
        let sort = self.listing.listing().sort;
        self.listing.begin(location, sort)
    }

    pub fn clear_selection(&mut self) {
        self.selection = None;
        self.clicks.cancel();
    }

    /// Forgets `entry` after it was renamed or deleted: the selection when it is
    /// `entry`, and any pending click on it that would otherwise select it later.
    pub fn clear_selection_if(&mut self, entry: &Entry) {
        if self
            .selection
            .as_ref()
            .is_some_and(|selected| selected.matches(&entry.key()))
        {
            self.selection = None;
            self.clicks.cancel();
        }
        if self
            .clicks
            .armed_entry()
            .is_some_and(|armed| armed.path == entry.path)
        {
            self.clicks.cancel();
        }
    }

    pub fn actions(&self) -> ActionState {
        let selected = self.selection.as_ref();
        ActionState {
            can_go_up: !self.location.is_root(),
            can_rename: selected.is_some(),
            can_delete: selected.is_some(),
            can_pin: selected.is_some_and(|entry| {
                entry.is_directory() && !self.quick_access.contains(&entry.path)
            }),
        }
    }

    pub fn view(&self) -> BrowserView {
        BrowserView {
            location: self.location.clone(),
            breadcrumbs: self.location.breadcrumbs(),
            listing: self.listing.listing().clone(),
            selection: self.selection.clone(),
            quick_access: self.quick_access.entries().to_vec(),
            dragging: self.drag.peek().cloned(),
            notifications: self.notifications.items().to_vec(),
            actions: self.actions(),
            loading: self.listing.listing().is_loading() || self.busy > 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActionState {
    pub can_go_up: bool,
    pub can_rename: bool,
    pub can_delete: bool,
    pub can_pin: bool,
}

/// Read-only snapshot handed to renderers.
#[derive(Debug, Clone, Serialize)]
pub struct BrowserView {
    pub location: BrowseLocation,
    pub breadcrumbs: Vec<Breadcrumb>,
    pub listing: Listing,
    pub selection: Option<Entry>,
    pub quick_access: Vec<QuickAccessEntry>,
    pub dragging: Option<DragDescriptor>,
    pub notifications: Vec<Notification>,
    pub actions: ActionState,
    pub loading: bool,
}
