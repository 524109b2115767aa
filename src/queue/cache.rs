//! Last-known record for every photo the manager has tracked

use crate::models::{PhotoId, PhotoUpload};
use std::collections::HashMap;

/// Identity-keyed cache owned by one queue manager.
///
/// Records stay cached after leaving both lists (with state `None`) so a
/// producer re-creating an item can see what happened to it. Only `clear`
/// forgets them.
#[derive(Debug, Default)]
pub struct ItemCache {
    items: HashMap<PhotoId, PhotoUpload>,
}

impl ItemCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn populate<'a>(&mut self, uploads: impl IntoIterator<Item = &'a PhotoUpload>) {
        for upload in uploads {
            self.record(upload);
        }
    }

    pub fn record(&mut self, upload: &PhotoUpload) {
        self.items.insert(upload.id().clone(), upload.clone());
    }

    pub fn get(&self, id: &PhotoId) -> Option<&PhotoUpload> {
        self.items.get(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}
