//! Selection and upload queue manager

use super::cache::ItemCache;
use super::events::{EventBus, QueueEvent};
use super::list::IndexedList;
use crate::database::{SqliteUploadStore, UploadStore};
use crate::models::{Account, Friend, PhotoId, PhotoUpload, Place, UploadQuality, UploadState};
use crate::utils::config::QueueSettings;
use anyhow::Result;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Owns the selected and uploading lists and every state transition between them.
///
/// All state sits behind one lock. Mutations hold the write lock while they
/// persist and publish, so a subscriber reacting to an event always sees the
/// state that produced it.
pub struct QueueManager {
    state: RwLock<QueueState>,
    store: Option<Arc<dyn UploadStore>>,
    events: Arc<dyn EventBus>,
}

#[derive(Default)]
struct QueueState {
    selected: IndexedList,
    uploading: IndexedList,
    cache: ItemCache,
    next_position: u64,
}

impl QueueState {
    /// Give an upload the next insertion position
    fn stamp(&mut self, upload: &mut PhotoUpload) {
        upload.position = self.next_position;
        self.next_position += 1;
    }

    /// Append a stored upload, restamping it if its position collides
    fn restore(&mut self, partition: Partition, mut upload: PhotoUpload) {
        let last = match partition {
            Partition::Selected => self.selected.last_position(),
            Partition::Uploading => self.uploading.last_position(),
        };
        if last.is_some_and(|last| last >= upload.position) {
            self.stamp(&mut upload);
        }
        let list = match partition {
            Partition::Selected => &mut self.selected,
            Partition::Uploading => &mut self.uploading,
        };
        list.push(upload);
    }
}

#[derive(Clone, Copy)]
enum Partition {
    Selected,
    Uploading,
}

impl QueueManager {
    /// Create a manager and hydrate it from `store`.
    ///
    /// Pass `None` to run purely in memory.
    pub async fn new(store: Option<Arc<dyn UploadStore>>, events: Arc<dyn EventBus>) -> Self {
        let manager = Self {
            state: RwLock::new(QueueState::default()),
            store,
            events,
        };
        manager.populate_from_database().await;
        manager
    }

    /// Create a manager backed by the SQLite store named in `settings`
    pub async fn from_settings(settings: &QueueSettings, events: Arc<dyn EventBus>) -> Result<Self> {
        let store: Option<Arc<dyn UploadStore>> = if settings.enable_persistence {
            Some(Arc::new(SqliteUploadStore::open(&settings.database_path).await?))
        } else {
            None
        };
        Ok(Self::new(store, events).await)
    }

    /// Add a photo to the selection, demoting it from the upload list if needed.
    ///
    /// Returns false if it was already selected.
    pub async fn add_selection(&self, upload: PhotoUpload) -> bool {
        let mut guard = self.state.write().await;
        self.add_selection_locked(&mut guard, upload).await
    }

    /// Add many photos to the selection.
    ///
    /// Publishes a single event carrying only the photos that were not
    /// selected before.
    pub async fn add_selections(&self, uploads: Vec<PhotoUpload>) {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let mut selected_ids: HashSet<PhotoId> =
            state.selected.iter().map(|u| u.id().clone()).collect();
        let mut uploading_ids: HashSet<PhotoId> =
            state.uploading.iter().map(|u| u.id().clone()).collect();

        let mut added = Vec::new();
        for mut upload in uploads {
            if !upload.id().is_valid() || selected_ids.contains(upload.id()) {
                continue;
            }

            if uploading_ids.remove(upload.id()) {
                self.remove_upload_locked(state, upload.id()).await;
            }

            upload.set_state(UploadState::Selected);
            state.stamp(&mut upload);
            state.cache.record(&upload);
            selected_ids.insert(upload.id().clone());
            state.selected.push(upload.clone());
            added.push(upload);
        }

        if added.is_empty() {
            return;
        }

        let snapshot = state.selected.to_vec();
        self.persist_all(&snapshot, true).await;

        info!("Added {} photos to selection", added.len());
        self.events.publish(QueueEvent::SelectionAdded(added));
    }

    /// Queue a single photo for upload in state `UploadWaiting`
    pub async fn add_upload(&self, mut upload: PhotoUpload) -> bool {
        if !upload.id().is_valid() {
            return false;
        }

        let mut guard = self.state.write().await;
        let state = &mut *guard;
        if state.uploading.contains(upload.id()) {
            return false;
        }

        upload.set_state(UploadState::UploadWaiting);
        state.stamp(&mut upload);
        state.selected.remove(upload.id());
        state.cache.record(&upload);
        state.uploading.push(upload.clone());

        self.persist(&upload).await;

        debug!("Queued upload {}", upload.id());
        self.events.publish(QueueEvent::UploadsModified);
        true
    }

    /// Promote the whole selection to the upload list.
    ///
    /// Every selected photo gets the account, target and quality (and the place,
    /// when one is given) and moves to the end of the upload list in selection
    /// order.
    pub async fn add_uploads_from_selected(
        &self,
        account: &Account,
        target_id: &str,
        quality: UploadQuality,
        place: Option<&Place>,
    ) {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let mut promoted = state.selected.drain();
        for upload in promoted.iter_mut() {
            upload.set_upload_params(account, target_id, quality);
            upload.set_state(UploadState::UploadWaiting);
            if let Some(place) = place {
                upload.place = Some(place.clone());
            }
            state.stamp(upload);
            state.cache.record(upload);
            state.uploading.push(upload.clone());
        }

        self.persist_all(&promoted, true).await;

        info!(
            "Promoted {} selected photos to uploads for target {}",
            promoted.len(),
            target_id
        );
        self.events.publish(QueueEvent::SelectionRemoved(promoted));
        self.events.publish(QueueEvent::UploadsModified);
    }

    pub async fn clear_selected(&self) {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        if state.selected.is_empty() {
            return;
        }

        let mut removed = state.selected.drain();
        for upload in removed.iter_mut() {
            upload.set_state(UploadState::None);
            state.cache.record(upload);
        }

        if let Some(store) = &self.store {
            if let Err(e) = store.delete_all_selected().await {
                warn!("Failed to delete selected records: {}", e);
            }
        }

        info!("Cleared {} photos from selection", removed.len());
        self.events.publish(QueueEvent::SelectionRemoved(removed));
    }

    /// Returns false if the photo was not selected
    pub async fn remove_selection(&self, id: &PhotoId) -> bool {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let Some(mut upload) = state.selected.remove(id) else {
            return false;
        };
        upload.set_state(UploadState::None);
        state.cache.record(&upload);

        self.persist_delete(id).await;

        debug!("Removed {} from selection", id);
        self.events.publish(QueueEvent::SelectionRemoved(vec![upload]));
        true
    }

    pub async fn remove_upload(&self, id: &PhotoId) {
        let mut guard = self.state.write().await;
        self.remove_upload_locked(&mut guard, id).await;
    }

    /// Move every errored upload back to the selection so it can be retried.
    ///
    /// Returns whether anything moved.
    pub async fn move_failed_to_selected(&self) -> bool {
        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let failed = state
            .uploading
            .extract_if(|u| u.state() == UploadState::UploadError);
        let moved = !failed.is_empty();

        for mut upload in failed {
            upload.set_state(UploadState::Selected);
            self.add_selection_locked(state, upload).await;
        }

        // Incremental checkpoint whether or not anything moved
        let snapshot = state.selected.to_vec();
        self.persist_all(&snapshot, false).await;

        if moved {
            info!("Moved failed uploads back to selection");
            self.events.publish(QueueEvent::UploadsModified);
        }
        moved
    }

    /// Record the outcome an upload worker reports for a queued photo.
    ///
    /// Only upload states are accepted. Returns false if the photo is not on
    /// the upload list or already in `new_state`.
    pub async fn update_upload_state(&self, id: &PhotoId, new_state: UploadState) -> bool {
        if !new_state.is_upload_state() {
            return false;
        }

        let mut guard = self.state.write().await;
        let state = &mut *guard;

        let Some(upload) = state.uploading.get_mut(id) else {
            return false;
        };
        if upload.state() == new_state {
            return false;
        }
        upload.set_state(new_state);
        let snapshot = upload.clone();
        state.cache.record(&snapshot);

        self.persist(&snapshot).await;

        debug!("Upload {} is now {}", id, new_state.as_str());
        self.events.publish(QueueEvent::UploadsModified);
        true
    }

    /// First waiting upload in queue order
    pub async fn get_next_upload(&self) -> Option<PhotoUpload> {
        let state = self.state.read().await;
        let next = state
            .uploading
            .iter()
            .find(|u| u.state() == UploadState::UploadWaiting)
            .cloned();
        next
    }

    /// Uploads still outstanding; errored uploads count until retried or removed
    pub async fn get_active_uploads_count(&self) -> usize {
        let state = self.state.read().await;
        let active = state
            .uploading
            .iter()
            .filter(|u| u.state() != UploadState::UploadCompleted)
            .count();
        active
    }

    pub async fn has_selections(&self) -> bool {
        !self.state.read().await.selected.is_empty()
    }

    pub async fn has_uploads(&self) -> bool {
        !self.state.read().await.uploading.is_empty()
    }

    pub async fn has_waiting_uploads(&self) -> bool {
        let state = self.state.read().await;
        let waiting = state
            .uploading
            .iter()
            .any(|u| u.state() == UploadState::UploadWaiting);
        waiting
    }

    pub async fn has_selections_with_place(&self) -> bool {
        let state = self.state.read().await;
        let with_place = state.selected.iter().any(PhotoUpload::has_place);
        with_place
    }

    pub async fn is_selected(&self, id: &PhotoId) -> bool {
        self.state.read().await.selected.contains(id)
    }

    pub async fn is_on_upload_list(&self, id: &PhotoId) -> bool {
        self.state.read().await.uploading.contains(id)
    }

    pub async fn get_selected_count(&self) -> usize {
        self.state.read().await.selected.len()
    }

    pub async fn get_uploads_count(&self) -> usize {
        self.state.read().await.uploading.len()
    }

    /// Copy of the selection in order
    pub async fn get_selected(&self) -> Vec<PhotoUpload> {
        self.state.read().await.selected.to_vec()
    }

    /// Copy of the upload list in order
    pub async fn get_uploading_uploads(&self) -> Vec<PhotoUpload> {
        self.state.read().await.uploading.to_vec()
    }

    /// Last-known record for a photo, including ones that left both lists
    pub async fn cached(&self, id: &PhotoId) -> Option<PhotoUpload> {
        self.state.read().await.cache.get(id).cloned()
    }

    /// Forget everything: cache, both lists and every stored record
    pub async fn reset(&self) {
        let mut guard = self.state.write().await;
        guard.cache.clear();
        guard.selected.clear();
        guard.uploading.clear();

        if let Some(store) = &self.store {
            if let Err(e) = store.drop_all_data().await {
                warn!("Failed to drop stored uploads: {}", e);
            }
        }

        info!("Queue reset");
    }

    /// Incremental checkpoint of both lists
    pub async fn update_database(&self) {
        let state = self.state.read().await;
        let selected = state.selected.to_vec();
        let uploading = state.uploading.to_vec();
        self.persist_all(&selected, false).await;
        self.persist_all(&uploading, false).await;
    }

    /// Attach full account objects to every tracked upload
    pub async fn populate_from_accounts(&self, accounts: &HashMap<String, Account>) {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        for upload in state.selected.iter_mut().chain(state.uploading.iter_mut()) {
            upload.populate_from_accounts(accounts);
            state.cache.record(upload);
        }
    }

    /// Attach full friend objects to every tracked upload
    pub async fn populate_from_friends(&self, friends: &HashMap<String, Friend>) {
        let mut guard = self.state.write().await;
        let state = &mut *guard;
        for upload in state.selected.iter_mut().chain(state.uploading.iter_mut()) {
            upload.populate_from_friends(friends);
            state.cache.record(upload);
        }
    }

    async fn populate_from_database(&self) {
        let Some(store) = &self.store else {
            return;
        };

        let selected = match store.load_selected().await {
            Ok(uploads) => uploads,
            Err(e) => {
                warn!("Failed to load selected uploads: {}", e);
                Vec::new()
            }
        };
        let uploading = match store.load_uploading().await {
            Ok(uploads) => uploads,
            Err(e) => {
                warn!("Failed to load queued uploads: {}", e);
                Vec::new()
            }
        };

        let mut guard = self.state.write().await;
        let state = &mut *guard;

        // Keep stored positions so later saves stay ordered after older rows
        state.next_position = selected
            .iter()
            .chain(uploading.iter())
            .map(|u| u.position + 1)
            .max()
            .unwrap_or(0);
        state.cache.populate(selected.iter().chain(uploading.iter()));

        for upload in selected {
            state.restore(Partition::Selected, upload);
        }
        for upload in uploading {
            state.restore(Partition::Uploading, upload);
        }

        info!(
            "Restored {} selected and {} queued uploads",
            state.selected.len(),
            state.uploading.len()
        );
    }

    async fn add_selection_locked(&self, state: &mut QueueState, mut upload: PhotoUpload) -> bool {
        if !upload.id().is_valid() || state.selected.contains(upload.id()) {
            return false;
        }

        if state.uploading.contains(upload.id()) {
            self.remove_upload_locked(state, upload.id()).await;
        }

        upload.set_state(UploadState::Selected);
        state.stamp(&mut upload);
        state.cache.record(&upload);
        state.selected.push(upload.clone());

        self.persist(&upload).await;

        debug!("Added {} to selection", upload.id());
        self.events.publish(QueueEvent::SelectionAdded(vec![upload]));
        true
    }

    async fn remove_upload_locked(&self, state: &mut QueueState, id: &PhotoId) -> bool {
        let Some(mut upload) = state.uploading.remove(id) else {
            return false;
        };
        upload.set_state(UploadState::None);
        state.cache.record(&upload);

        self.persist_delete(id).await;

        debug!("Removed {} from uploads", id);
        self.events.publish(QueueEvent::UploadsModified);
        true
    }

    async fn persist(&self, upload: &PhotoUpload) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save(upload).await {
                warn!("Failed to save upload {}: {}", upload.id(), e);
            }
        }
    }

    async fn persist_all(&self, uploads: &[PhotoUpload], force_overwrite: bool) {
        if let Some(store) = &self.store {
            if let Err(e) = store.save_all(uploads, force_overwrite).await {
                warn!("Failed to save {} uploads: {}", uploads.len(), e);
            }
        }
    }

    async fn persist_delete(&self, id: &PhotoId) {
        if let Some(store) = &self.store {
            if let Err(e) = store.delete(id).await {
                warn!("Failed to delete upload {}: {}", id, e);
            }
        }
    }
}
