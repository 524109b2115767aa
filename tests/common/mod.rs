//! Shared test doubles for queue manager tests
#![allow(dead_code)]

use async_trait::async_trait;
use photoqueue::utils::error::Result;
use photoqueue::{EventBus, PhotoId, PhotoQueueError, PhotoUpload, QueueEvent, UploadStore};
use std::sync::{Arc, Mutex};

/// Event bus that remembers everything published to it
#[derive(Default)]
pub struct RecordingEventBus {
    events: Mutex<Vec<QueueEvent>>,
}

impl RecordingEventBus {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn events(&self) -> Vec<QueueEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn take(&self) -> Vec<QueueEvent> {
        std::mem::take(&mut *self.events.lock().unwrap())
    }
}

impl EventBus for RecordingEventBus {
    fn publish(&self, event: QueueEvent) {
        self.events.lock().unwrap().push(event);
    }
}

/// Store whose every operation fails
pub struct FailingStore;

fn unavailable() -> PhotoQueueError {
    PhotoQueueError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        "store unavailable",
    ))
}

#[async_trait]
impl UploadStore for FailingStore {
    async fn save(&self, _upload: &PhotoUpload) -> Result<()> {
        Err(unavailable())
    }

    async fn save_all(&self, _uploads: &[PhotoUpload], _force_overwrite: bool) -> Result<()> {
        Err(unavailable())
    }

    async fn delete(&self, _id: &PhotoId) -> Result<()> {
        Err(unavailable())
    }

    async fn delete_all_selected(&self) -> Result<()> {
        Err(unavailable())
    }

    async fn load_selected(&self) -> Result<Vec<PhotoUpload>> {
        Err(unavailable())
    }

    async fn load_uploading(&self) -> Result<Vec<PhotoUpload>> {
        Err(unavailable())
    }

    async fn drop_all_data(&self) -> Result<()> {
        Err(unavailable())
    }
}

pub fn photo(n: usize) -> PhotoUpload {
    PhotoUpload::new(&format!("content://media/external/images/{}", n))
}

pub fn id(n: usize) -> PhotoId {
    photo(n).id().clone()
}

pub fn ids(uploads: &[PhotoUpload]) -> Vec<String> {
    uploads.iter().map(|u| u.id().to_string()).collect()
}
