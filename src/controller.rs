//! The browser controller: owns navigation, listing, selection, quick access and
//! drag state for one window, and drives the file service.
//!
//! Methods take `&self` so several requests can be outstanding at once on a single
//! thread. State sits behind one mutex that is never held across an `.await`.
//! While mounted, a background task refetches the pinned folders on every pin change.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use uuid::Uuid;

use crate::api::FileService;
use crate::error::{AppError, Result};
use crate::location::BrowseLocation;
use crate::models::entry::Entry;
use crate::models::listing::ListingSort;
use crate::models::operation::{MutationKind, MutationOutcome};
use crate::services::click_service::{Clock, ClickDisambiguator, ClickOutcome, SystemClock};
use crate::services::drag_service::{evaluate_drop, DragDescriptor, DropDecision};
use crate::services::listing_service::{ListingRequest, LIST_FAILURE_MESSAGE};
use crate::services::mutation_service::{
    validate_pin_target, DeleteConfirmation, MutationCoordinator,
};
use crate::services::notification_service::{Notification, NotificationLevel};
use crate::services::quick_access_service::PinWatcher;
use crate::state::{BrowserContext, BrowserState, BrowserView};

pub const INFO_FAILURE_MESSAGE: &str = "Failed to load file details";

pub struct BrowserController<S> {
    service: Arc<S>,
    context: BrowserContext,
    clock: Arc<dyn Clock>,
    mutations: MutationCoordinator,
    state: Arc<Mutex<BrowserState>>,
}

/// Keeps the loading indicator up while a mutation is in flight, on every exit path.
struct BusyGuard<'a> {
    state: &'a Mutex<BrowserState>,
}

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        let mut state = lock_state(self.state);
        state.busy = state.busy.saturating_sub(1);
    }
}

fn lock_state(state: &Mutex<BrowserState>) -> MutexGuard<'_, BrowserState> {
    state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Refetches the pinned folders into `state`. Failures keep the previous list.
async fn refresh_pins<S: FileService>(service: &S, state: &Mutex<BrowserState>) {
    let token = lock_state(state).quick_access.begin_refresh();
    let result = service.list_pins().await;
    let mut state = lock_state(state);
    if let Err(message) = state.quick_access.complete_refresh(token, result) {
        tracing::warn!(%message, "pinned folders failed to load");
        state.notifications.push(NotificationLevel::Error, message);
    }
}

impl<S: FileService + 'static> BrowserController<S> {
    pub fn new(service: S, context: BrowserContext, double_click_window: Duration) -> Self {
        Self::with_clock(service, context, double_click_window, Arc::new(SystemClock))
    }

    pub fn with_clock(
        service: S,
        context: BrowserContext,
        double_click_window: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mutations = MutationCoordinator::new(context.pin_signal.clone());
        Self {
            service: Arc::new(service),
            context,
            clock,
            mutations,
            state: Arc::new(Mutex::new(BrowserState::new(ClickDisambiguator::new(
                double_click_window,
            )))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, BrowserState> {
        lock_state(&self.state)
    }

    fn busy(&self) -> BusyGuard<'_> {
        self.lock().busy += 1;
        BusyGuard { state: &*self.state }
    }

    fn notify(&self, level: NotificationLevel, message: impl Into<String>) -> Uuid {
        self.lock().notifications.push(level, message)
    }

    pub fn service(&self) -> &S {
        &*self.service
    }

    pub fn context(&self) -> &BrowserContext {
        &self.context
    }

    pub fn view(&self) -> BrowserView {
        self.lock().view()
    }

    pub fn location(&self) -> BrowseLocation {
        self.lock().location.clone()
    }

    pub fn selection(&self) -> Option<Entry> {
        self.lock().selection.clone()
    }

    /// Looks up an entry of the visible listing by name.
    pub fn find_entry(&self, name: &str) -> Option<Entry> {
        self.lock().listing.listing().find(name).cloned()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.items().to_vec()
    }

    pub fn last_notification_id(&self) -> Option<Uuid> {
        self.lock().notifications.last().map(|notification| notification.id)
    }

    pub fn dismiss_notification(&self, id: Uuid) -> bool {
        self.lock().notifications.dismiss(id)
    }

    pub fn clear_notifications(&self) {
        self.lock().notifications.clear();
    }

    /// Loads the current location and, independently, the pinned folders, and starts
    /// listening for pin changes.
    pub async fn mount(&self) {
        let request = {
            let mut state = self.lock();
            if !state.quick_access.is_mounted() {
                state.quick_access.attach(self.watch_pins());
            }
            let location = state.location.clone();
            state.set_location(location)
        };
        tokio::join!(self.fetch_listing(request), self.refresh_quick_access());
    }

    /// The task holds only a weak handle on the state, so dropping the controller
    /// also stops it.
    fn watch_pins(&self) -> PinWatcher {
        let subscription = self.context.pin_signal.subscribe();
        let service = Arc::clone(&self.service);
        let state = Arc::downgrade(&self.state);
        PinWatcher::spawn(subscription, move || {
            let service = Arc::clone(&service);
            let state = state.clone();
            async move {
                if let Some(state) = state.upgrade() {
                    refresh_pins(&*service, &state).await;
                }
            }
        })
    }

    pub fn unmount(&self) {
        let mut state = self.lock();
        state.quick_access.unmount();
        state.clicks.cancel();
        state.drag.cancel();
    }

    // ---- navigation ----

    pub async fn navigate(&self, location: BrowseLocation) {
        let request = self.lock().set_location(location);
        self.fetch_listing(request).await;
    }

    pub async fn navigate_input(&self, raw: &str) {
        self.navigate(BrowseLocation::from_input(raw)).await;
    }

    /// Returns `false` at the root, where going up does nothing.
    pub async fn navigate_up(&self) -> bool {
        let request = {
            let mut state = self.lock();
            if state.location.is_root() {
                return false;
            }
            let parent = state.location.parent();
            state.set_location(parent)
        };
        self.fetch_listing(request).await;
        true
    }

    /// Enters a plain directory. Files and session projects are refused.
    pub async fn enter(&self, entry: &Entry) -> Result<()> {
        if !entry.is_directory() {
            return Err(AppError::Validation(format!("'{}' is not a folder", entry.name)));
        }
        if entry.is_session_project {
            return Err(AppError::Validation(format!(
                "'{}' is a session project and cannot be browsed as a folder",
                entry.name
            )));
        }
        let request = {
            let mut state = self.lock();
            let target = state.location.child(&entry.name)?;
            state.set_location(target)
        };
        self.fetch_listing(request).await;
        Ok(())
    }

    pub async fn navigate_to_pin(&self, path: &str) {
        self.navigate(BrowseLocation::from_input(path)).await;
    }

    pub async fn reload(&self) {
        let request = self.lock().listing.begin_reload();
        self.fetch_listing(request).await;
    }

    /// Re-fetches the current location with a new sort. Selection is kept.
    pub async fn set_sort(&self, sort: ListingSort) {
        let request = {
            let mut state = self.lock();
            let location = state.location.clone();
            state.listing.begin(location, sort)
        };
        self.fetch_listing(request).await;
    }

    /// Returns `false` when the response was superseded and dropped.
    async fn fetch_listing(&self, request: ListingRequest) -> bool {
        tracing::debug!(path = %request.location, token = request.token, "fetching listing");
        let result = self
            .service
            .list(&request.location.as_path(), request.sort)
            .await;

        let mut state = self.lock();
        let failure = result
            .as_ref()
            .err()
            .map(|error| error.user_message(LIST_FAILURE_MESSAGE));
        if !state.listing.complete(&request, result) {
            tracing::warn!(
                path = %request.location,
                token = request.token,
                "discarding stale listing response"
            );
            return false;
        }
        if let Some(message) = failure {
            tracing::warn!(path = %request.location, %message, "listing failed");
            state.notifications.push(NotificationLevel::Error, message);
        }
        true
    }

    // ---- selection ----

    pub async fn click(&self, entry: Entry) -> ClickOutcome {
        let (outcome, request) = {
            let mut state = self.lock();
            let now = self.clock.now();
            if let Some(lapsed) = state.clicks.poll(now) {
                state.selection = Some(lapsed);
            }
            let outcome = state.clicks.click(entry, now);
            let request = match &outcome {
                ClickOutcome::Select(selected) => {
                    state.selection = Some(selected.clone());
                    None
                }
                ClickOutcome::Activate(target) => match state.location.child(&target.name) {
                    Ok(location) => Some(state.set_location(location)),
                    Err(error) => {
                        tracing::warn!(name = %target.name, %error, "cannot open entry");
                        state
                            .notifications
                            .push(NotificationLevel::Warning, error.to_string());
                        None
                    }
                },
                ClickOutcome::Armed { .. } => None,
            };
            (outcome, request)
        };
        if let Some(request) = request {
            self.fetch_listing(request).await;
        }
        outcome
    }

    /// Commits a single click whose double-click window has lapsed.
    pub fn tick(&self) -> Option<Entry> {
        let mut state = self.lock();
        let committed = state.clicks.poll(self.clock.now())?;
        state.selection = Some(committed.clone());
        Some(committed)
    }

    pub fn next_click_deadline(&self) -> Option<Instant> {
        self.lock().clicks.deadline()
    }

    pub fn select(&self, entry: Entry) {
        let mut state = self.lock();
        state.clicks.cancel();
        state.selection = Some(entry);
    }

    pub fn clear_selection(&self) {
        self.lock().clear_selection();
    }

    pub async fn inspect(&self, path: &str) -> Result<Entry> {
        self.service().file_info(path).await.inspect_err(|error| {
            tracing::warn!(path, %error, "file info failed");
            self.notify(
                NotificationLevel::Error,
                error.user_message(INFO_FAILURE_MESSAGE),
            );
        })
    }

    // ---- mutations ----

    fn report_success(&self, kind: MutationKind) {
        self.notify(NotificationLevel::Success, kind.success_message());
    }

    fn report_failure(&self, kind: MutationKind, error: &AppError) {
        let level = if error.is_validation() {
            NotificationLevel::Warning
        } else {
            NotificationLevel::Error
        };
        tracing::warn!(%kind, %error, "mutation failed");
        self.notify(level, error.user_message(kind.failure_message()));
    }

    pub async fn create_folder(&self, name: &str) -> Result<MutationOutcome> {
        let location = self.location();
        let result = {
            let _busy = self.busy();
            self.mutations
                .create_folder(self.service(), &location, name)
                .await
        };
        match result {
            Ok(_) => {
                self.report_success(MutationKind::CreateFolder);
                self.reload().await;
                Ok(MutationOutcome::Completed)
            }
            Err(error) => {
                self.report_failure(MutationKind::CreateFolder, &error);
                Err(error)
            }
        }
    }

    pub async fn rename(&self, entry: &Entry, new_name: &str) -> Result<MutationOutcome> {
        let result = {
            let _busy = self.busy();
            self.mutations.rename(self.service(), entry, new_name).await
        };
        match result {
            Ok(None) => Ok(MutationOutcome::Unchanged),
            Ok(Some(_)) => {
                self.lock().clear_selection_if(entry);
                self.report_success(MutationKind::Rename);
                self.reload().await;
                Ok(MutationOutcome::Completed)
            }
            Err(error) => {
                self.report_failure(MutationKind::Rename, &error);
                Err(error)
            }
        }
    }

    /// First half of a delete: hand the prompt to the user.
    pub fn request_delete(&self, entry: Entry) -> DeleteConfirmation {
        DeleteConfirmation::request(entry)
    }

    pub async fn confirm_delete(&self, confirmation: DeleteConfirmation) -> Result<MutationOutcome> {
        let result = {
            let _busy = self.busy();
            self.mutations.delete(self.service(), &confirmation).await
        };
        match result {
            Ok(_) => {
                self.lock().clear_selection_if(confirmation.entry());
                self.report_success(MutationKind::Delete);
                self.reload().await;
                Ok(MutationOutcome::Completed)
            }
            Err(error) => {
                self.report_failure(MutationKind::Delete, &error);
                Err(error)
            }
        }
    }

    fn report_already_pinned(&self, path: &str) -> MutationOutcome {
        tracing::debug!(path, "pin skipped, already pinned");
        self.notify(NotificationLevel::Info, format!("'{path}' is already pinned"));
        MutationOutcome::AlreadyPinned
    }

    /// Shared by the pin button and drops on the quick-access panel.
    pub async fn pin(&self, entry: &Entry) -> Result<MutationOutcome> {
        if let Err(error) = validate_pin_target(entry) {
            self.report_failure(MutationKind::Pin, &error);
            return Err(error);
        }
        if self.lock().quick_access.contains(&entry.path) {
            return Ok(self.report_already_pinned(&entry.path));
        }
        let result = {
            let _busy = self.busy();
            self.mutations.pin(self.service(), entry).await
        };
        match result {
            Ok(_) => {
                self.report_success(MutationKind::Pin);
                Ok(MutationOutcome::Completed)
            }
            Err(error) => {
                self.report_failure(MutationKind::Pin, &error);
                Err(error)
            }
        }
    }

    pub async fn unpin(&self, path: &str) -> Result<MutationOutcome> {
        let result = {
            let _busy = self.busy();
            self.mutations.unpin(self.service(), path).await
        };
        match result {
            Ok(_) => {
                self.report_success(MutationKind::Unpin);
                Ok(MutationOutcome::Completed)
            }
            Err(error) => {
                self.report_failure(MutationKind::Unpin, &error);
                Err(error)
            }
        }
    }

    // ---- quick access ----

    pub async fn refresh_quick_access(&self) {
        refresh_pins(self.service(), &self.state).await;
    }

    // ---- drag and drop ----

    /// Returns `false` (and drags nothing) for files.
    pub fn begin_drag(&self, entry: &Entry) -> bool {
        self.lock().drag.begin(entry)
    }

    pub fn cancel_drag(&self) {
        self.lock().drag.cancel();
    }

    /// Drops the dragged entry on the quick-access panel.
    pub async fn drop_on_quick_access(&self) -> Result<MutationOutcome> {
        let descriptor = self.lock().drag.take();
        match descriptor {
            Some(descriptor) => self.drop_descriptor(descriptor).await,
            None => {
                let error = AppError::Validation("Nothing is being dragged".to_string());
                self.report_failure(MutationKind::Pin, &error);
                Err(error)
            }
        }
    }

    /// Validates a descriptor delivered to the quick-access panel and pins it.
    pub async fn drop_descriptor(&self, descriptor: DragDescriptor) -> Result<MutationOutcome> {
        let decision = {
            let state = self.lock();
            evaluate_drop(&descriptor, |path| state.quick_access.contains(path))
        };
        match decision {
            DropDecision::Pin(entry) => self.pin(&entry).await,
            DropDecision::AlreadyPinned { path } => Ok(self.report_already_pinned(&path)),
            rejected => {
                let message = rejected
                    .rejection_message()
                    .unwrap_or_else(|| "Drop rejected".to_string());
                tracing::warn!(path = %descriptor.path, %message, "drop rejected");
                self.notify(NotificationLevel::Warning, message.clone());
                Err(AppError::Validation(message))
            }
        }
    }
}
