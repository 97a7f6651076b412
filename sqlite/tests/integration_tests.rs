//! Integration tests for the shellsense-sqlite crate.

use rusqlite::Connection;
use shellsense_core::HistoryEntry;
use shellsense_db::{CommandHistory, HISTORY_KEY, KeyValueStore, RecentDirectories};
use shellsense_sqlite::SqliteStore;

#[tokio::test]
async fn test_history_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shellsense.db");

    {
        let store = SqliteStore::open(&path, "ss_").unwrap();
        let mut history = CommandHistory::new(500);
        history.push(HistoryEntry::new("git status"));
        history.push(HistoryEntry::new("git push").with_exit_code(1));
        history.save(&store).await.unwrap();
    }

    let store = SqliteStore::open(&path, "ss_").unwrap();
    let history = CommandHistory::load(&store, 500).await;
    let commands: Vec<&str> = history.iter_recent().map(|e| e.command.as_str()).collect();
    assert_eq!(commands, vec!["git push", "git status"]);
    assert_eq!(history.iter_recent().next().unwrap().exit_code, Some(1));
}

#[tokio::test]
async fn test_prefixes_isolate_stores_in_one_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("shared.db");

    let work = SqliteStore::open(&path, "work_").unwrap();
    let home = SqliteStore::open(&path, "home_").unwrap();

    let mut dirs = RecentDirectories::new(50);
    dirs.push("/srv/app");
    dirs.save(&work).await.unwrap();

    assert!(RecentDirectories::load(&home, 50).await.is_empty());
    let loaded = RecentDirectories::load(&work, 50).await;
    assert_eq!(loaded.iter().collect::<Vec<_>>(), vec!["/srv/app"]);
}

#[tokio::test]
async fn test_missing_key_loads_empty() {
    let store = SqliteStore::open_in_memory("ss_").unwrap();
    assert_eq!(store.get(HISTORY_KEY).await.unwrap(), None);
    assert!(CommandHistory::load(&store, 500).await.is_empty());
}

#[tokio::test]
async fn test_corrupted_row_loads_empty() {
    let store = SqliteStore::open_in_memory("ss_").unwrap();
    store.put(HISTORY_KEY, "{not json").await.unwrap();
    assert!(CommandHistory::load(&store, 500).await.is_empty());
}

#[test]
fn test_existing_connection_is_migrated() {
    let conn = Connection::open_in_memory().unwrap();
    let store = SqliteStore::new(conn, "app_").unwrap();
    let status = store.status().unwrap();
    assert!(status.tables_exist);
    assert_eq!(status.key_count, 0);
    assert_eq!(store.prefix(), "app_");
}
