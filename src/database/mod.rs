//! Database module

pub mod operations;
pub mod schema;
pub mod store;

// Re-export for convenience
pub use operations::SqliteUploadStore;
pub use schema::initialize_database;
pub use store::UploadStore;
