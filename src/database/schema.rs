//! Database schema

use anyhow::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::path::Path;
use tracing::{debug, info};

/// Open (creating if needed) the database at `db_path` and ensure the schema
pub async fn initialize_database(db_path: &Path) -> Result<Pool<Sqlite>> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }

    debug!("Opening database at: {:?}", db_path);
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await?;

    info!("Running database migrations");
    create_tables(&pool).await?;

    Ok(pool)
}

/// Create database tables
pub(crate) async fn create_tables(pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS photo_uploads (
            id TEXT PRIMARY KEY,
            source_uri TEXT NOT NULL,
            state TEXT NOT NULL,
            position INTEGER NOT NULL,
            account_id TEXT,
            target_id TEXT,
            quality TEXT,
            place TEXT,
            caption TEXT,
            friend_ids TEXT NOT NULL DEFAULT '[]',
            updated_at DATETIME NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_photo_uploads_state ON photo_uploads(state)")
        .execute(pool)
        .await?;

    debug!("Database tables created successfully");
    Ok(())
}
