//! Narrow interfaces to the outside world.
//!
//! The engine never spawns processes or touches the filesystem directly.
//! Callers hand it a [`CommandRunner`] (used only for `<cmd> --help` probes)
//! and optionally a [`DirectoryFetcher`], so remote directories can be
//! completed exactly like local ones.

use async_trait::async_trait;
use shellsense_core::DirectoryEntry;

use crate::error::Result;

/// Runs a command line and returns its combined output.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn run(&self, command_line: &str) -> Result<String>;
}

/// Lists the entries of one directory.
#[async_trait]
pub trait DirectoryFetcher: Send + Sync {
    async fn list(&self, path: &str) -> Result<Vec<DirectoryEntry>>;
}

/// Lists directories on the local filesystem with `tokio::fs`.
///
/// Symlinks are followed, so a link to a directory completes as a directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalDirectoryFetcher;

#[async_trait]
impl DirectoryFetcher for LocalDirectoryFetcher {
    async fn list(&self, path: &str) -> Result<Vec<DirectoryEntry>> {
        let mut read_dir = tokio::fs::read_dir(path).await?;
        let mut entries = Vec::new();

        while let Some(entry) = read_dir.next_entry().await? {
            let entry_path = entry.path();
            let Ok(metadata) = tokio::fs::metadata(&entry_path).await else {
                // Dangling symlink or a race with deletion.
                continue;
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            let full_path = entry_path.to_string_lossy().into_owned();

            let row = if metadata.is_dir() {
                DirectoryEntry::dir(&name, &full_path)
            } else {
                DirectoryEntry::file(&name, &full_path, metadata.len())
            };
            #[cfg(unix)]
            let row = {
                use std::os::unix::fs::PermissionsExt;
                row.with_permissions(metadata.permissions().mode())
            };
            entries.push(row);
        }

        Ok(entries)
    }
}
