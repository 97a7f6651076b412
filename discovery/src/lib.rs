//! Help-text parsing and executable discovery.
//!
//! This crate turns raw `--help` output into structured data and provides
//! the local-system plumbing the suggestion engine uses to learn about
//! commands:
//!
//! - [`parse_help_document`]: parse help text into a [`ParsedHelpDocument`].
//! - [`parse_help_text`]: same, converted straight into a [`CommandInfo`].
//! - [`probe::run_shell_command`]: run a command line through the platform
//!   shell with a timeout and capture its combined output.
//! - [`path_scan`]: list executables on the search path, with a TTL cache.
//!
//! # Example
//!
//! ```
//! use shellsense_discovery::parse_help_text;
//!
//! let help = "\
//! Usage: mycli [OPTIONS] <FILE>
//!
//! Options:
//!   -v, --verbose        Enable verbose output
//!   -o, --output <PATH>  Output file
//!   -h, --help           Print help
//! ";
//!
//! let info = parse_help_text(help);
//! assert!(info.has_flag("--verbose"));
//! assert!(info.flag_metadata("-o").unwrap().expects_value);
//! ```

pub mod parser;
pub mod path_scan;
pub mod probe;

use shellsense_core::{CommandInfo, ParsedHelpDocument};

pub use parser::{HelpParser, ParseDiagnostics};

/// Parses help text into a structured document.
///
/// Never fails; unrecognizable text yields a document without entries.
pub fn parse_help_document(help_text: &str) -> ParsedHelpDocument {
    HelpParser::new(help_text).parse()
}

/// Parses help text into a [`CommandInfo`].
///
/// When neither a subcommand nor a flag is recognized, the result is the
/// generic placeholder entry with no flags and no subcommands.
///
/// # Examples
///
/// ```
/// use shellsense_core::GENERIC_DESCRIPTION;
/// use shellsense_discovery::parse_help_text;
///
/// let info = parse_help_text("command not found");
/// assert_eq!(info.description, GENERIC_DESCRIPTION);
/// assert!(info.flags.is_empty() && info.subcommands.is_empty());
/// ```
pub fn parse_help_text(help_text: &str) -> CommandInfo {
    let doc = parse_help_document(help_text);
    if !doc.has_content() {
        return CommandInfo::generic();
    }
    CommandInfo::from_parsed_help(&doc)
}
