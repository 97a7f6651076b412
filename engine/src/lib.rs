//! Shell command intelligence: completion, history search and quick fixes.
//!
//! [`SuggestionEngine`] turns a partial command line into a ranked list of
//! [`Suggestion`](shellsense_core::Suggestion)s. It walks the typed tokens
//! down a catalog of known commands, learns unknown ones by parsing their
//! `--help` output, completes paths through a pluggable directory fetcher,
//! and searches persisted history and recently visited directories.
//!
//! Everything that touches the outside world is a caller-supplied
//! collaborator:
//!
//! - [`CommandRunner`]: runs `<cmd> --help` probes.
//! - [`DirectoryFetcher`]: lists directories (local or remote).
//! - [`KeyValueStore`](shellsense_db::KeyValueStore): persists history.
//!
//! Collaborator failures never reach the caller; they only make the
//! suggestion list shorter.
//!
//! # Example
//!
//! ```
//! use shellsense_db::EngineConfig;
//! use shellsense_engine::{Platform, SuggestOptions, SuggestionEngine};
//!
//! # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
//! let config = EngineConfig { scan_search_path: false, ..EngineConfig::default() };
//! let engine = SuggestionEngine::with_platform(config, Platform::Unix);
//!
//! let flags = engine
//!     .suggestions("git commit --am", "/repo", &SuggestOptions::default())
//!     .await;
//! assert_eq!(flags[0].text, "--amend");
//! # });
//! ```

pub mod catalog;
pub mod collaborators;
pub mod debounce;
mod error;
pub mod flags;
pub mod fuzzy;
mod orchestrator;
pub mod paths;
mod platform;
pub mod quickfix;
pub mod resolver;
mod tokenizer;

pub use catalog::CommandCatalog;
pub use collaborators::{CommandRunner, DirectoryFetcher, LocalDirectoryFetcher};
pub use debounce::{Debouncer, SuggestionRefresher, SuggestionUpdate};
pub use error::{CollaboratorError, Result};
pub use orchestrator::{SuggestOptions, SuggestionEngine};
pub use platform::Platform;
pub use quickfix::quick_fixes;
pub use resolver::{Resolution, resolve};
pub use tokenizer::{ends_with_unquoted_space, tokenize};
