//! Executable search-path scanning.
//!
//! Lists the command names reachable through `PATH`. Directories are read
//! in parallel with rayon; results are de-duplicated and sorted. Because a
//! scan touches many directories, [`PathExecutableCache`] keeps the last
//! result for a configurable time-to-live.

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use rayon::prelude::*;
use tracing::debug;

/// Default cache lifetime for a search-path scan.
pub const DEFAULT_SCAN_TTL: Duration = Duration::from_secs(300);

/// Scans every directory in `PATH`.
pub fn path_executables() -> Vec<String> {
    let Some(path_env) = env::var_os("PATH") else {
        return Vec::new();
    };
    let dirs: Vec<PathBuf> = env::split_paths(&path_env).collect();
    scan_directories(&dirs)
}

/// Lists executable names found directly inside `dirs`.
pub fn scan_directories(dirs: &[PathBuf]) -> Vec<String> {
    let names: BTreeSet<String> = dirs
        .par_iter()
        .map(|dir| executables_in(dir))
        .reduce(BTreeSet::new, |mut left, right| {
            left.extend(right);
            left
        });
    debug!(dirs = dirs.len(), executables = names.len(), "Scanned search path");
    names.into_iter().collect()
}

fn executables_in(dir: &Path) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let Ok(entries) = fs::read_dir(dir) else {
        return names;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if let Some(name) = executable_name(&path) {
            names.insert(name);
        }
    }
    names
}

#[cfg(unix)]
fn executable_name(path: &Path) -> Option<String> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = fs::metadata(path).ok()?;
    if !metadata.is_file() || metadata.permissions().mode() & 0o111 == 0 {
        return None;
    }
    path.file_name()?.to_str().map(String::from)
}

#[cfg(not(unix))]
fn executable_name(path: &Path) -> Option<String> {
    if !path.is_file() {
        return None;
    }
    let extension = path.extension()?.to_str()?.to_ascii_uppercase();
    let pathext = env::var("PATHEXT").unwrap_or_else(|_| ".COM;.EXE;.BAT;.CMD".to_string());
    let allowed = pathext
        .split(';')
        .any(|ext| ext.trim_start_matches('.').eq_ignore_ascii_case(&extension));
    if !allowed {
        return None;
    }
    path.file_stem()?.to_str().map(String::from)
}

struct CachedScan {
    scanned_at: Instant,
    names: Arc<Vec<String>>,
}

/// Time-bounded cache for search-path scan results.
///
/// The cache does not scan on its own; callers check [`fresh`](Self::fresh)
/// and, on a miss, scan (possibly on a blocking thread) and [`store`](Self::store)
/// the result.
pub struct PathExecutableCache {
    ttl: Duration,
    entry: RwLock<Option<CachedScan>>,
}

impl PathExecutableCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entry: RwLock::new(None),
        }
    }

    /// Returns the cached names if they are younger than the TTL.
    pub fn fresh(&self) -> Option<Arc<Vec<String>>> {
        let guard = self.entry.read();
        let cached = guard.as_ref()?;
        if cached.scanned_at.elapsed() < self.ttl {
            Some(Arc::clone(&cached.names))
        } else {
            None
        }
    }

    /// Replaces the cached scan.
    pub fn store(&self, names: Vec<String>) -> Arc<Vec<String>> {
        let names = Arc::new(names);
        *self.entry.write() = Some(CachedScan {
            scanned_at: Instant::now(),
            names: Arc::clone(&names),
        });
        names
    }
}

impl Default for PathExecutableCache {
    fn default() -> Self {
        Self::new(DEFAULT_SCAN_TTL)
    }
}
