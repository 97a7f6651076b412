//! Engine configuration.
//!
//! All fields have defaults, so a partial YAML file (or none at all) is
//! valid.
//!
//! # Example YAML
//!
//! ```yaml
//! debounce_ms: 150
//! history_limit: 1000
//! max_suggestions: 30
//! scan_search_path: false
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Tunables for the suggestion engine and its stores.
///
/// # Examples
///
/// ```
/// use shellsense_db::EngineConfig;
///
/// let config: EngineConfig = serde_yaml::from_str("max_suggestions: 5").unwrap();
/// assert_eq!(config.max_suggestions, 5);
/// assert_eq!(config.history_limit, 500);
/// assert_eq!(config.debounce().as_millis(), 100);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Delay before a keystroke triggers a suggestion query.
    pub debounce_ms: u64,
    /// Maximum retained history entries.
    pub history_limit: usize,
    /// Maximum remembered directories.
    pub recent_directory_limit: usize,
    /// Lifetime of a cached search-path scan.
    pub path_scan_ttl_secs: u64,
    /// Cap on any returned suggestion list.
    pub max_suggestions: usize,
    /// Cap on path completions.
    pub max_path_suggestions: usize,
    /// Path completions appended after flags in contextual mode.
    pub contextual_path_limit: usize,
    /// Results returned by history search.
    pub history_search_limit: usize,
    /// Results returned by directory search.
    pub directory_search_limit: usize,
    /// History-derived names offered during command-name completion.
    pub history_command_limit: usize,
    /// Whether command-name completion scans the executable search path.
    pub scan_search_path: bool,
    /// Timeout for the CLI's local help probe. The engine imposes none.
    pub help_timeout_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 100,
            history_limit: 500,
            recent_directory_limit: 50,
            path_scan_ttl_secs: 300,
            max_suggestions: 20,
            max_path_suggestions: 25,
            contextual_path_limit: 10,
            history_search_limit: 20,
            directory_search_limit: 15,
            history_command_limit: 5,
            scan_search_path: true,
            help_timeout_ms: 5000,
        }
    }
}

impl EngineConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::StoreError::IoError) if the file cannot be
    /// read, or [`YamlError`](crate::StoreError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn path_scan_ttl(&self) -> Duration {
        Duration::from_secs(self.path_scan_ttl_secs)
    }

    pub fn help_timeout(&self) -> Duration {
        Duration::from_millis(self.help_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config: EngineConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.path_scan_ttl(), Duration::from_secs(300));
    }

    #[test]
    fn test_partial_override() {
        let yaml = "history_limit: 10\nscan_search_path: false\n";
        let config: EngineConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.history_limit, 10);
        assert!(!config.scan_search_path);
        assert_eq!(config.directory_search_limit, 15);
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yml");

        let original = EngineConfig {
            debounce_ms: 250,
            max_suggestions: 7,
            ..EngineConfig::default()
        };
        original.save(&path).unwrap();

        assert_eq!(EngineConfig::load(&path).unwrap(), original);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = EngineConfig::load("/definitely/missing/config.yml").unwrap_err();
        assert!(matches!(err, crate::StoreError::IoError(_)));
    }
}
