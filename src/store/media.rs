use std::path::PathBuf;

use indexmap::IndexSet;

use super::{load_json_or_default, save_json};
use crate::error::StoreError;

/// Ordered, duplicate-free list of media URLs backed by a JSON array.
#[derive(Debug, Clone)]
pub struct MediaStore {
    path: PathBuf,
    items: IndexSet<String>,
}

impl MediaStore {
    /// Loads the store from `path`; missing or malformed files give an empty store.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let items: Vec<String> = load_json_or_default(&path, "media list");
        Self {
            path,
            items: items.into_iter().collect(),
        }
    }

    /// Appends `url` if it is not already stored. Exact string equality.
    ///
    /// `Ok(false)` means it was already present. On `Err` the item is kept in
    /// memory but the file is stale until the next successful save.
    pub fn add(&mut self, url: impl Into<String>) -> Result<bool, StoreError> {
        if !self.items.insert(url.into()) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    pub fn remove(&mut self, url: &str) -> Result<bool, StoreError> {
        // shift keeps the remaining order intact
        if !self.items.shift_remove(url) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    pub fn list(&self) -> Vec<String> {
        self.items.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().map(String::as_str)
    }

    pub fn contains(&self, url: &str) -> bool {
        self.items.contains(url)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// First stored item occurring anywhere inside `content`.
    pub fn find_in(&self, content: &str) -> Option<&str> {
        self.iter().find(|item| content.contains(item))
    }

    pub fn save(&self) -> Result<(), StoreError> {
        save_json(&self.path, &self.items).inspect_err(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "failed to save media list")
        })
    }
}
