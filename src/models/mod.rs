//! Photo upload records and the value objects attached to them

pub mod params;
pub mod photo;

pub use params::{Account, Friend, Place, UploadQuality};
pub use photo::{PhotoId, PhotoUpload, UploadState};
