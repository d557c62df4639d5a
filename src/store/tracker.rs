use std::path::PathBuf;

use indexmap::{IndexMap, IndexSet};

use super::{load_json_or_default, save_json, MediaStore};
use crate::error::StoreError;

/// Which media each channel has already received.
///
/// Persisted as `{ "<channel id>": ["url", ...] }`.
#[derive(Debug, Clone)]
pub struct PostingTracker {
    path: PathBuf,
    posted: IndexMap<String, IndexSet<String>>,
}

impl PostingTracker {
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let posted = load_json_or_default(&path, "posted tracking");
        Self { path, posted }
    }

    /// Items of `media` not yet posted to `channel`, in store order.
    ///
    /// Creates an empty entry for a channel seen for the first time. The entry
    /// is written out with the next save.
    pub fn unposted(&mut self, channel: &str, media: &MediaStore) -> Vec<String> {
        let posted = self.posted.entry(channel.to_owned()).or_default();
        media
            .iter()
            .filter(|item| !posted.contains(*item))
            .map(String::from)
            .collect()
    }

    /// Records `url` as posted to `channel`. Only saves when something changed.
    pub fn mark_posted(&mut self, channel: &str, url: &str) -> Result<bool, StoreError> {
        let posted = self.posted.entry(channel.to_owned()).or_default();
        if !posted.insert(url.to_owned()) {
            return Ok(false);
        }
        self.save()?;
        Ok(true)
    }

    pub fn clear_channel(&mut self, channel: &str) -> Result<(), StoreError> {
        self.posted.insert(channel.to_owned(), IndexSet::new());
        self.save()
    }

    pub fn clear_all(&mut self) -> Result<(), StoreError> {
        self.posted.clear();
        self.save()
    }

    /// Drops `url` from every channel. Used when the item leaves the media list.
    pub fn forget(&mut self, url: &str) -> Result<bool, StoreError> {
        let mut changed = false;
        for posted in self.posted.values_mut() {
            changed |= posted.shift_remove(url);
        }
        if changed {
            self.save()?;
        }
        Ok(changed)
    }

    pub fn is_tracked(&self, channel: &str) -> bool {
        self.posted.contains_key(channel)
    }

    pub fn posted(&self, channel: &str) -> Vec<String> {
        self.posted
            .get(channel)
            .map(|set| set.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub fn save(&self) -> Result<(), StoreError> {
        save_json(&self.path, &self.posted).inspect_err(|e| {
            tracing::error!(path = %self.path.display(), error = %e, "failed to save posted tracking")
        })
    }
}
