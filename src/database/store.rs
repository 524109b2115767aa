//! Persistence seam between the queue manager and a durable store

use crate::models::{PhotoId, PhotoUpload};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Durable storage of upload records, partitioned by list membership.
///
/// Records in state `Selected` form the selected partition; records in any
/// upload state form the uploading partition. Object-safe so the manager can
/// hold an `Arc<dyn UploadStore>`.
#[async_trait]
pub trait UploadStore: Send + Sync {
    /// Insert or fully replace one record.
    async fn save(&self, upload: &PhotoUpload) -> Result<()>;

    /// Insert or update many records in one transaction.
    ///
    /// With `force_overwrite` every row is replaced. Without it, existing rows
    /// are merge-updated: state and position are refreshed, optional columns
    /// keep their stored value when the new one is absent, and unchanged rows
    /// are left alone.
    async fn save_all(&self, uploads: &[PhotoUpload], force_overwrite: bool) -> Result<()>;

    async fn delete(&self, id: &PhotoId) -> Result<()>;

    async fn delete_all_selected(&self) -> Result<()>;

    /// Selected partition in insertion order
    async fn load_selected(&self) -> Result<Vec<PhotoUpload>>;

    /// Uploading partition in insertion order
    async fn load_uploading(&self) -> Result<Vec<PhotoUpload>>;

    /// Wipe every record the store holds
    async fn drop_all_data(&self) -> Result<()>;
}
