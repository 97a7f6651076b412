//! Persistence and configuration for shell command intelligence.
//!
//! This crate provides the opaque key-value store the engine persists
//! through, the bounded history and recent-directory lists it persists, and
//! the YAML engine configuration.
//!
//! # Quick start
//!
//! ```
//! use shellsense_core::HistoryEntry;
//! use shellsense_db::{CommandHistory, MemoryStore};
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let store = MemoryStore::new();
//!
//! let mut history = CommandHistory::load(&store, 500).await;
//! history.push(HistoryEntry::new("cargo test"));
//! history.save(&store).await.unwrap();
//!
//! let reloaded = CommandHistory::load(&store, 500).await;
//! assert_eq!(reloaded.len(), 1);
//! # });
//! ```

mod config;
mod error;
mod history;
mod recent_dirs;
mod store;

pub use config::EngineConfig;
pub use error::{Result, StoreError};
pub use history::{CommandHistory, DEFAULT_HISTORY_LIMIT, HISTORY_KEY};
pub use recent_dirs::{DEFAULT_RECENT_DIRECTORY_LIMIT, RECENT_DIRECTORIES_KEY, RecentDirectories};
pub use store::{JsonFileStore, KeyValueStore, MemoryStore};
