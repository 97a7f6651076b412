//! Most-recently-used directory list.

use std::collections::VecDeque;

use tracing::warn;

use crate::error::{Result, StoreError};
use crate::store::{KeyValueStore, load_json, save_json};

/// Store key for the persisted directory list.
pub const RECENT_DIRECTORIES_KEY: &str = "recent_directories";

/// Maximum number of remembered directories.
pub const DEFAULT_RECENT_DIRECTORY_LIMIT: usize = 50;

/// Visited directories, most recent first.
///
/// Re-inserting a path moves it to the front; the list never grows beyond
/// its limit.
#[derive(Debug, Clone)]
pub struct RecentDirectories {
    dirs: VecDeque<String>,
    limit: usize,
}

impl RecentDirectories {
    pub fn new(limit: usize) -> Self {
        Self {
            dirs: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    /// Builds a list from paths in most-recent-first order.
    pub fn from_paths(paths: impl IntoIterator<Item = String>, limit: usize) -> Self {
        let mut recent = Self::new(limit);
        let paths: Vec<String> = paths.into_iter().collect();
        for path in paths.into_iter().rev() {
            recent.push(&path);
        }
        recent
    }

    /// Records a visit. Blank paths are ignored and return `false`.
    pub fn push(&mut self, path: &str) -> bool {
        let path = path.trim();
        if path.is_empty() {
            return false;
        }
        if let Some(pos) = self.dirs.iter().position(|d| d == path) {
            self.dirs.remove(pos);
        }
        self.dirs.push_front(path.to_string());
        self.dirs.truncate(self.limit);
        true
    }

    pub fn len(&self) -> usize {
        self.dirs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dirs.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Paths from most to least recent.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.dirs.iter().map(String::as_str)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.dirs)?)
    }

    /// Loads the list from `store`, falling back to empty on any failure.
    pub async fn load(store: &dyn KeyValueStore, limit: usize) -> Self {
        match load_json::<Vec<String>>(store, RECENT_DIRECTORIES_KEY).await {
            Ok(Some(dirs)) => Self::from_paths(dirs, limit),
            Err(err @ StoreError::JsonError(_)) => {
                warn!(error = %err, "Discarding corrupted recent directory list");
                Self::new(limit)
            }
            Ok(None) => Self::new(limit),
            Err(err) => {
                warn!(error = %err, "Failed to read recent directory list");
                Self::new(limit)
            }
        }
    }

    pub async fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        save_json(store, RECENT_DIRECTORIES_KEY, &self.dirs).await
    }
}

impl Default for RecentDirectories {
    fn default() -> Self {
        Self::new(DEFAULT_RECENT_DIRECTORY_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[test]
    fn test_reinsert_moves_to_front() {
        let mut dirs = RecentDirectories::default();
        dirs.push("/a");
        dirs.push("/b");
        dirs.push("/a");
        assert_eq!(dirs.iter().collect::<Vec<_>>(), vec!["/a", "/b"]);
    }

    #[test]
    fn test_cap_drops_least_recent() {
        let mut dirs = RecentDirectories::default();
        for i in 0..60 {
            dirs.push(&format!("/d{i}"));
        }
        assert_eq!(dirs.len(), 50);
        assert_eq!(dirs.iter().next(), Some("/d59"));
        assert!(dirs.iter().all(|d| d != "/d9"));
    }

    #[tokio::test]
    async fn test_persisted_order_survives_reload() {
        let store = MemoryStore::new();
        let mut dirs = RecentDirectories::new(5);
        dirs.push("/x");
        dirs.push("/y");
        dirs.save(&store).await.unwrap();

        let loaded = RecentDirectories::load(&store, 5).await;
        assert_eq!(loaded.iter().collect::<Vec<_>>(), vec!["/y", "/x"]);
    }
}
