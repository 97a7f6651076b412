//! Core data model for the shell command-intelligence engine.
//!
//! This crate defines the types shared by the help-text parser, the
//! suggestion engine, and the persistence layer:
//!
//! - [`CommandInfo`]: what the engine knows about one command key (flags,
//!   subcommands, argument kind, per-flag metadata).
//! - [`ParsedHelpDocument`]: the structured result of parsing `--help` text.
//! - [`Suggestion`] / [`SuggestionType`]: a single ranked completion entry.
//! - [`HistoryEntry`]: one executed command line.
//! - [`QuickFixSuggestion`]: a remedial command derived from failed output.
//! - [`DirectoryEntry`]: one row returned by a directory-listing collaborator.
//!
//! Validation ([`validate_command_info`]) catches structural mistakes in
//! hand-written or learned command entries.
//!
//! # Example
//!
//! ```
//! use shellsense_core::*;
//!
//! let info = CommandInfo::new("Copy files")
//!     .with_flags(&["-r", "-v"])
//!     .with_value_flag("--target-directory", Some("-t"), "Copy into DIRECTORY")
//!     .with_argument_kind(ArgumentKind::Path);
//!
//! assert!(info.has_flag("--target-directory"));
//! assert!(info.flag_metadata("-t").unwrap().expects_value);
//! assert!(validate_command_info(&info).is_empty());
//! ```

mod types;
mod validate;

pub use types::*;
pub use validate::{ValidationError, validate_command_info};
