//! photoqueue library
//!
//! Tracks photos from selection through upload, mirroring both lists into a
//! SQLite store and announcing every change on an event bus.

pub mod database;
pub mod models;
pub mod queue;
pub mod utils;

// Re-export main types for easier use
pub use database::{SqliteUploadStore, UploadStore};
pub use models::{Account, Friend, PhotoId, PhotoUpload, Place, UploadQuality, UploadState};
pub use queue::{BroadcastEventBus, EventBus, QueueEvent, QueueManager};
pub use utils::{PhotoQueueError, QueueSettings};
