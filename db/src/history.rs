//! Bounded command history.

use std::collections::{HashSet, VecDeque};

use shellsense_core::HistoryEntry;
use tracing::warn;

use crate::error::{Result, StoreError};
use crate::store::{KeyValueStore, load_json, save_json};

/// Store key for the persisted history list.
pub const HISTORY_KEY: &str = "history";

/// Maximum number of retained history entries.
pub const DEFAULT_HISTORY_LIMIT: usize = 500;

/// Executed commands, oldest first.
///
/// Inserting a command that is already present moves it to the most-recent
/// position. Once the limit is exceeded the oldest entries are evicted.
///
/// # Examples
///
/// ```
/// use shellsense_core::HistoryEntry;
/// use shellsense_db::CommandHistory;
///
/// let mut history = CommandHistory::new(2);
/// history.push(HistoryEntry::new("ls"));
/// history.push(HistoryEntry::new("pwd"));
/// history.push(HistoryEntry::new("ls"));
/// history.push(HistoryEntry::new("whoami"));
///
/// let recent: Vec<&str> = history.iter_recent().map(|e| e.command.as_str()).collect();
/// assert_eq!(recent, vec!["whoami", "ls"]);
/// ```
#[derive(Debug, Clone)]
pub struct CommandHistory {
    entries: VecDeque<HistoryEntry>,
    limit: usize,
}

impl CommandHistory {
    pub fn new(limit: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            limit: limit.max(1),
        }
    }

    /// Builds a history from entries in oldest-first order, applying
    /// de-duplication and the limit.
    pub fn from_entries(entries: impl IntoIterator<Item = HistoryEntry>, limit: usize) -> Self {
        let mut history = Self::new(limit);
        for entry in entries {
            history.push(entry);
        }
        history
    }

    /// Records an entry. Blank commands are ignored and return `false`.
    pub fn push(&mut self, entry: HistoryEntry) -> bool {
        if entry.command.trim().is_empty() {
            return false;
        }
        if let Some(pos) = self.entries.iter().position(|e| *e == entry) {
            self.entries.remove(pos);
        }
        self.entries.push_back(entry);
        while self.entries.len() > self.limit {
            self.entries.pop_front();
        }
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Entries from most to least recent.
    pub fn iter_recent(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter().rev()
    }

    /// Entries oldest first, as persisted.
    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    /// Distinct program names (first word), most recent first.
    pub fn recent_programs(&self, limit: usize) -> Vec<String> {
        let mut seen = HashSet::new();
        self.iter_recent()
            .filter_map(HistoryEntry::program)
            .filter(|program| seen.insert(*program))
            .take(limit)
            .map(String::from)
            .collect()
    }

    /// Serializes the history as a JSON array, oldest first.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.entries)?)
    }

    /// Loads the history from `store`.
    ///
    /// A missing key, an unreadable store or a corrupted value all yield an
    /// empty history; the latter two are logged.
    pub async fn load(store: &dyn KeyValueStore, limit: usize) -> Self {
        match load_json::<Vec<HistoryEntry>>(store, HISTORY_KEY).await {
            Ok(Some(entries)) => Self::from_entries(entries, limit),
            Err(err @ StoreError::JsonError(_)) => {
                warn!(error = %err, "Discarding corrupted command history");
                Self::new(limit)
            }
            Ok(None) => Self::new(limit),
            Err(err) => {
                warn!(error = %err, "Failed to read command history");
                Self::new(limit)
            }
        }
    }

    /// Writes the history to `store`.
    pub async fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        save_json(store, HISTORY_KEY, &self.entries).await
    }
}

impl Default for CommandHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_LIMIT)
    }
}
