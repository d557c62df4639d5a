use std::time::Duration;

use indexmap::IndexMap;
use tokio::time::Instant;

/// Short-lived map of sent message id -> media URL, used to work out what a
/// deleted message carried. Bounded by `capacity` and by `ttl`.
#[derive(Debug)]
pub struct SentTable {
    capacity: usize,
    ttl: Duration,
    // insertion order == age order
    entries: IndexMap<String, (String, Instant)>,
}

impl SentTable {
    pub fn new(capacity: usize, ttl: Duration) -> Self {
        Self {
            capacity: capacity.max(1),
            ttl,
            entries: IndexMap::new(),
        }
    }

    pub fn insert(&mut self, message_id: impl Into<String>, url: impl Into<String>) {
        let now = Instant::now();
        self.expire(now);

        let message_id = message_id.into();
        self.entries.shift_remove(&message_id);
        self.entries.insert(message_id, (url.into(), now));

        while self.entries.len() > self.capacity {
            self.entries.shift_remove_index(0);
        }
    }

    pub fn get(&mut self, message_id: &str) -> Option<&str> {
        self.expire(Instant::now());
        self.entries.get(message_id).map(|(url, _)| url.as_str())
    }

    /// Removes and returns the URL recorded for `message_id`.
    pub fn take(&mut self, message_id: &str) -> Option<String> {
        self.expire(Instant::now());
        self.entries.shift_remove(message_id).map(|(url, _)| url)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn expire(&mut self, now: Instant) {
        while let Some((_, (_, at))) = self.entries.first() {
            if now.duration_since(*at) < self.ttl {
                break;
            }
            self.entries.shift_remove_index(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_entry_is_evicted_at_capacity() {
        let mut table = SentTable::new(2, Duration::from_secs(60));
        table.insert("m1", "a");
        table.insert("m2", "b");
        table.insert("m3", "c");

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("m1"), None);
        assert_eq!(table.get("m2"), Some("b"));
        assert_eq!(table.get("m3"), Some("c"));
    }

    #[test]
    fn reinsert_refreshes_position() {
        let mut table = SentTable::new(2, Duration::from_secs(60));
        table.insert("m1", "a");
        table.insert("m2", "b");
        table.insert("m1", "a");
        table.insert("m3", "c");

        assert_eq!(table.get("m1"), Some("a"));
        assert_eq!(table.get("m2"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let mut table = SentTable::new(10, Duration::from_secs(5));
        table.insert("old", "a");
        tokio::time::advance(Duration::from_secs(3)).await;
        table.insert("new", "b");
        tokio::time::advance(Duration::from_secs(3)).await;

        assert_eq!(table.get("old"), None);
        assert_eq!(table.get("new"), Some("b"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn take_removes() {
        let mut table = SentTable::new(10, Duration::from_secs(60));
        table.insert("m1", "a");

        assert_eq!(table.take("m1").as_deref(), Some("a"));
        assert!(table.take("m1").is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn clear_empties() {
        let mut table = SentTable::new(10, Duration::from_secs(60));
        table.insert("m1", "a");
        table.clear();
        assert!(table.is_empty());
    }
}
