//! Data directory resolution
//!
//! The store must never land in a relative path: the working directory of a
//! desktop or service launch is not predictable.

use std::path::PathBuf;
use tracing::{debug, warn};

/// Get the application data directory for photoqueue.
///
/// Returns the platform data dir (`~/.local/share/photoqueue` on Linux,
/// `~/Library/Application Support/photoqueue` on macOS). Resolution has no side
/// effects; the store creates the directory when it is opened.
pub fn get_app_data_dir() -> PathBuf {
    let dir = dirs::data_dir()
        .map(|data| data.join("photoqueue"))
        .or_else(|| dirs::home_dir().map(|home| home.join(".photoqueue")))
        .unwrap_or_else(|| {
            warn!("Could not determine a data directory, using the temp dir");
            std::env::temp_dir().join("photoqueue")
        });

    debug!("Data directory: {:?}", dir);
    dir
}

/// Get the database path for photoqueue.
pub fn get_database_path() -> PathBuf {
    get_app_data_dir().join("photoqueue.db")
}
