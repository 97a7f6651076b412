//! Command entry validation.
//!
//! Catches structural mistakes in hand-written catalog entries and learned
//! help output before they reach the suggestion engine: malformed flag
//! tokens, metadata pointing at unknown flags, and empty subcommand names.
//!
//! # Examples
//!
//! ```
//! use shellsense_core::*;
//!
//! let good = CommandInfo::new("List").with_flags(&["-l", "--all"]);
//! assert!(validate_command_info(&good).is_empty());
//!
//! let bad = CommandInfo::new("List").with_flags(&["l"]);
//! assert_eq!(
//!     validate_command_info(&bad),
//!     vec![ValidationError::InvalidFlag("l".to_string())]
//! );
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::CommandInfo;

/// Structural problems found in a [`CommandInfo`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Description is empty or whitespace-only.
    #[error("command description cannot be empty")]
    EmptyDescription,
    /// Flag token has no `-` or `/` prefix, or nothing after the prefix.
    #[error("invalid flag format: {0}")]
    InvalidFlag(String),
    /// The same flag token appears twice.
    #[error("duplicate flag: {0}")]
    DuplicateFlag(String),
    /// Metadata is keyed by a token that is not in the flag list.
    #[error("flag metadata for unknown flag: {0}")]
    OrphanMetadata(String),
    /// Metadata primary form is not one of the command's flags.
    #[error("flag metadata for {token} names unknown primary {primary}")]
    UnknownPrimary { token: String, primary: String },
    /// Subcommand name is empty or contains whitespace.
    #[error("invalid subcommand name: {0:?}")]
    InvalidSubcommand(String),
}

/// Validates a command entry and returns every problem found.
///
/// An empty vector means the entry is well formed. Errors are reported in a
/// deterministic order: description, flags in declaration order, metadata
/// sorted by token, then subcommands.
pub fn validate_command_info(info: &CommandInfo) -> Vec<ValidationError> {
    let mut errors = Vec::new();

    if info.description.trim().is_empty() {
        errors.push(ValidationError::EmptyDescription);
    }

    let mut seen = HashSet::new();
    for flag in &info.flags {
        if !is_valid_flag_token(flag) {
            errors.push(ValidationError::InvalidFlag(flag.clone()));
        }
        if !seen.insert(flag.as_str()) {
            errors.push(ValidationError::DuplicateFlag(flag.clone()));
        }
    }

    let mut tokens: Vec<&String> = info.flag_metadata.keys().collect();
    tokens.sort();
    for token in tokens {
        if !seen.contains(token.as_str()) {
            errors.push(ValidationError::OrphanMetadata(token.clone()));
            continue;
        }
        let primary = &info.flag_metadata[token].primary;
        if !seen.contains(primary.as_str()) {
            errors.push(ValidationError::UnknownPrimary {
                token: token.clone(),
                primary: primary.clone(),
            });
        }
    }

    for name in info.subcommands.keys() {
        if name.trim().is_empty() || name.chars().any(char::is_whitespace) {
            errors.push(ValidationError::InvalidSubcommand(name.clone()));
        }
    }

    errors
}

/// Accepts dash flags (`-l`, `--all`) and Windows slash switches (`/s`,
/// `/-y`).
fn is_valid_flag_token(flag: &str) -> bool {
    if let Some(body) = flag.strip_prefix('/') {
        return !body.is_empty() && !body.starts_with('/') && !body.contains(char::is_whitespace);
    }
    flag.starts_with('-') && flag.trim_start_matches('-').chars().next().is_some()
}
