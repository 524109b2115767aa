//! SQLite-backed upload store

use super::schema::initialize_database;
use super::store::UploadStore;
use crate::models::{PhotoId, PhotoUpload, Place, UploadQuality, UploadState};
use crate::utils::error::{PhotoQueueError, Result};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite};
use std::path::Path;
use tracing::{debug, warn};

const REPLACE_SQL: &str = r#"
    INSERT OR REPLACE INTO photo_uploads
    (id, source_uri, state, position, account_id, target_id, quality, place, caption, friend_ids, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

const MERGE_SQL: &str = r#"
    INSERT INTO photo_uploads
    (id, source_uri, state, position, account_id, target_id, quality, place, caption, friend_ids, updated_at)
    VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
    ON CONFLICT(id) DO UPDATE SET
        state = excluded.state,
        position = excluded.position,
        account_id = COALESCE(excluded.account_id, photo_uploads.account_id),
        target_id = COALESCE(excluded.target_id, photo_uploads.target_id),
        quality = COALESCE(excluded.quality, photo_uploads.quality),
        place = COALESCE(excluded.place, photo_uploads.place),
        caption = COALESCE(excluded.caption, photo_uploads.caption),
        friend_ids = excluded.friend_ids,
        updated_at = excluded.updated_at
    WHERE photo_uploads.state IS NOT excluded.state
        OR photo_uploads.position IS NOT excluded.position
        OR photo_uploads.friend_ids IS NOT excluded.friend_ids
        OR (excluded.account_id IS NOT NULL AND photo_uploads.account_id IS NOT excluded.account_id)
        OR (excluded.target_id IS NOT NULL AND photo_uploads.target_id IS NOT excluded.target_id)
        OR (excluded.quality IS NOT NULL AND photo_uploads.quality IS NOT excluded.quality)
        OR (excluded.place IS NOT NULL AND photo_uploads.place IS NOT excluded.place)
        OR (excluded.caption IS NOT NULL AND photo_uploads.caption IS NOT excluded.caption)
"#;

/// Upload store backed by a SQLite pool
#[derive(Debug, Clone)]
pub struct SqliteUploadStore {
    pool: Pool<Sqlite>,
}

impl SqliteUploadStore {
    /// Create new store over an initialized pool
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Open the database file, creating it and its schema if missing
    pub async fn open(db_path: &Path) -> anyhow::Result<Self> {
        let pool = initialize_database(db_path).await?;
        Ok(Self::new(pool))
    }

    async fn load_where(&self, filter: &str) -> Result<Vec<PhotoUpload>> {
        let sql = format!(
            "SELECT * FROM photo_uploads WHERE {} ORDER BY position ASC, rowid ASC",
            filter
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;

        let mut uploads = Vec::with_capacity(rows.len());
        for row in rows {
            match row_into_upload(row) {
                Ok(upload) => uploads.push(upload),
                Err(e) => {
                    // One bad row must not hide the rest of the queue
                    warn!("Skipping unreadable upload record: {}", e);
                }
            }
        }

        Ok(uploads)
    }
}

#[async_trait]
impl UploadStore for SqliteUploadStore {
    async fn save(&self, upload: &PhotoUpload) -> Result<()> {
        self.save_all(std::slice::from_ref(upload), true).await
    }

    async fn save_all(&self, uploads: &[PhotoUpload], force_overwrite: bool) -> Result<()> {
        if uploads.is_empty() {
            return Ok(());
        }

        let sql = if force_overwrite { REPLACE_SQL } else { MERGE_SQL };
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        for upload in uploads {
            let place = upload.place.as_ref().map(serde_json::to_string).transpose()?;
            let friend_ids = serde_json::to_string(&upload.tagged_friend_ids)?;

            sqlx::query(sql)
                .bind(upload.id().as_str())
                .bind(&upload.source_uri)
                .bind(upload.state().as_str())
                .bind(upload.position as i64)
                .bind(&upload.account_id)
                .bind(&upload.target_id)
                .bind(upload.quality.map(|q| q.as_str()))
                .bind(place)
                .bind(&upload.caption)
                .bind(friend_ids)
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        debug!(
            "Saved {} upload records (force_overwrite: {})",
            uploads.len(),
            force_overwrite
        );
        Ok(())
    }

    async fn delete(&self, id: &PhotoId) -> Result<()> {
        sqlx::query("DELETE FROM photo_uploads WHERE id = ?")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;

        debug!("Deleted upload record: {}", id);
        Ok(())
    }

    async fn delete_all_selected(&self) -> Result<()> {
        let result = sqlx::query("DELETE FROM photo_uploads WHERE state = ?")
            .bind(UploadState::Selected.as_str())
            .execute(&self.pool)
            .await?;

        debug!("Deleted {} selected records", result.rows_affected());
        Ok(())
    }

    async fn load_selected(&self) -> Result<Vec<PhotoUpload>> {
        self.load_where("state = 'selected'").await
    }

    async fn load_uploading(&self) -> Result<Vec<PhotoUpload>> {
        self.load_where("state IN ('upload_waiting', 'upload_error', 'upload_completed')")
            .await
    }

    async fn drop_all_data(&self) -> Result<()> {
        sqlx::query("DELETE FROM photo_uploads")
            .execute(&self.pool)
            .await?;
        sqlx::query("VACUUM").execute(&self.pool).await?;

        debug!("Dropped all upload records");
        Ok(())
    }
}

/// Convert database row to upload record
fn row_into_upload(row: sqlx::sqlite::SqliteRow) -> Result<PhotoUpload> {
    let id: String = row.try_get("id")?;

    let state_str: String = row.try_get("state")?;
    let corrupt = |e: PhotoQueueError| PhotoQueueError::CorruptRecord {
        id: id.clone(),
        reason: e.to_string(),
    };

    let state = state_str.parse::<UploadState>().map_err(corrupt)?;

    let quality = row
        .try_get::<Option<String>, _>("quality")?
        .map(|q| q.parse::<UploadQuality>())
        .transpose()
        .map_err(corrupt)?;

    let place = row
        .try_get::<Option<String>, _>("place")?
        .map(|json| serde_json::from_str::<Place>(&json))
        .transpose()?;

    let friend_ids: String = row.try_get("friend_ids")?;
    let tagged_friend_ids: Vec<String> = serde_json::from_str(&friend_ids)?;

    Ok(PhotoUpload::from_record(
        PhotoId::from_uri(&id),
        row.try_get("source_uri")?,
        state,
        row.try_get::<i64, _>("position")?.max(0) as u64,
        row.try_get("account_id")?,
        row.try_get("target_id")?,
        quality,
        place,
        row.try_get("caption")?,
        tagged_friend_ids,
    ))
}
