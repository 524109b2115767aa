//! Insertion-ordered list with an identity index.
//!
//! Entries are keyed by the position stamped on each upload, so iteration
//! follows insertion order while lookups and removals go through the index.

use crate::models::{PhotoId, PhotoUpload};
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Default, Clone)]
pub struct IndexedList {
    entries: BTreeMap<u64, PhotoUpload>,
    index: HashMap<PhotoId, u64>,
}

impl IndexedList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an upload. Its position must be greater than any already held.
    ///
    /// Returns false and leaves the list untouched if the identity is present.
    pub fn push(&mut self, upload: PhotoUpload) -> bool {
        if self.index.contains_key(upload.id()) {
            return false;
        }
        debug_assert!(
            self.entries
                .last_key_value()
                .map_or(true, |(last, _)| *last < upload.position),
            "positions must increase"
        );
        self.index.insert(upload.id().clone(), upload.position);
        self.entries.insert(upload.position, upload);
        true
    }

    pub fn remove(&mut self, id: &PhotoId) -> Option<PhotoUpload> {
        let position = self.index.remove(id)?;
        self.entries.remove(&position)
    }

    pub fn contains(&self, id: &PhotoId) -> bool {
        self.index.contains_key(id)
    }

    /// Position of the most recently appended upload
    pub fn last_position(&self) -> Option<u64> {
        self.entries.last_key_value().map(|(pos, _)| *pos)
    }

    pub fn get_mut(&mut self, id: &PhotoId) -> Option<&mut PhotoUpload> {
        let position = *self.index.get(id)?;
        self.entries.get_mut(&position)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhotoUpload> {
        self.entries.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PhotoUpload> {
        self.entries.values_mut()
    }

    /// Remove every upload matching `pred`, returned in list order
    pub fn extract_if<F>(&mut self, mut pred: F) -> Vec<PhotoUpload>
    where
        F: FnMut(&PhotoUpload) -> bool,
    {
        let positions: Vec<u64> = self
            .entries
            .iter()
            .filter(|(_, upload)| pred(upload))
            .map(|(pos, _)| *pos)
            .collect();

        let mut extracted = Vec::with_capacity(positions.len());
        for pos in positions {
            if let Some(upload) = self.entries.remove(&pos) {
                self.index.remove(upload.id());
                extracted.push(upload);
            }
        }
        extracted
    }

    /// Empty the list, returning its contents in order
    pub fn drain(&mut self) -> Vec<PhotoUpload> {
        self.index.clear();
        std::mem::take(&mut self.entries).into_values().collect()
    }

    pub fn to_vec(&self) -> Vec<PhotoUpload> {
        self.entries.values().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}
