//! Help output parser.
//!
//! A line-oriented state machine over three section states (none, commands,
//! options). Section headers are lines ending in `:`; they are classified
//! by a small keyword table. Inside a commands section,
//! `name  description` rows become subcommands. Inside an options section,
//! rows starting with a flag token become flags. Lines indented deeper than
//! the previous row that match neither continue the previous entry's
//! description, and blank lines end that continuation.
//!
//! Parsing is best-effort and never fails: text with no recognizable
//! structure yields an empty [`ParsedHelpDocument`].
//!
//! # Examples
//!
//! ```
//! use shellsense_discovery::parser::HelpParser;
//!
//! let help = "\
//! Usage: tool [OPTIONS] <COMMAND>
//!
//! Commands:
//!   build, b   Compile the project
//!   run        Run a binary
//!
//! Options:
//!   -o, --output <DIR>  Output directory
//!   -q                  Quiet mode
//! ";
//!
//! let mut parser = HelpParser::new(help);
//! let doc = parser.parse();
//! assert_eq!(doc.usage.as_deref(), Some("tool [OPTIONS] <COMMAND>"));
//! assert_eq!(doc.subcommands.len(), 3);
//! assert_eq!(doc.flags[0].name, "--output");
//! assert!(doc.flags[0].expects_value);
//! assert!(parser.diagnostics().coverage() > 0.9);
//! ```

mod commands;
mod diagnostics;
mod flags;
mod normalize;
mod sections;

use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;
use tracing::debug;

use shellsense_core::{ParsedHelpDocument, ParsedSubcommand};

pub use diagnostics::ParseDiagnostics;
pub use flags::{normalize_flag_token, parse_flag_row};
pub use normalize::normalize_help_output;
pub use sections::{HeaderKind, Section, classify_header};

static COLUMN_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\t+| {2,}").expect("static regex must compile"));

/// Splits `left  right` at the first run of two or more spaces (or tabs).
fn split_two_columns(line: &str) -> Option<(&str, &str)> {
    let capture = COLUMN_BREAK.find(line)?;
    let left = line[..capture.start()].trim();
    let right = line[capture.end()..].trim();
    if left.is_empty() || right.is_empty() {
        return None;
    }
    Some((left, right))
}

/// Which entries a deeper-indented line would extend.
#[derive(Debug, Clone, Copy)]
enum Continuation {
    /// All names registered by the last subcommand row.
    Subcommands {
        start: usize,
        end: usize,
        indent: usize,
    },
    Flag { index: usize, indent: usize },
}

/// Parser for CLI help output.
pub struct HelpParser {
    raw_output: String,
    diagnostics: ParseDiagnostics,
}

impl HelpParser {
    /// Creates a parser over the given help output.
    pub fn new(help_output: &str) -> Self {
        Self {
            raw_output: help_output.to_string(),
            diagnostics: ParseDiagnostics::default(),
        }
    }

    /// Diagnostics from the most recent [`parse`](Self::parse).
    pub fn diagnostics(&self) -> &ParseDiagnostics {
        &self.diagnostics
    }

    /// Parses the help output into a structured document.
    pub fn parse(&mut self) -> ParsedHelpDocument {
        let mut doc = ParsedHelpDocument::default();
        let mut diagnostics = ParseDiagnostics::default();

        if self.raw_output.trim().is_empty() {
            self.diagnostics = diagnostics;
            return doc;
        }

        let normalized = normalize::normalize_help_output(&self.raw_output);

        let mut section = Section::None;
        let mut continuation: Option<Continuation> = None;
        let mut awaiting_usage = false;
        let mut seen_subcommands: HashSet<String> = HashSet::new();
        let mut seen_flags: HashSet<String> = HashSet::new();

        for line in normalized.lines() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continuation = None;
                continue;
            }
            diagnostics.relevant_lines += 1;
            let indent = line.len() - line.trim_start().len();

            if let Some(usage) = inline_usage(trimmed) {
                if doc.usage.is_none() {
                    doc.usage = Some(usage.to_string());
                }
                awaiting_usage = false;
                continuation = None;
                diagnostics.recognized_lines += 1;
                continue;
            }

            if let Some(kind) = classify_header(trimmed) {
                match kind {
                    HeaderKind::Enter(next) => {
                        section = next;
                        awaiting_usage = false;
                        continuation = None;
                        diagnostics.recognized_lines += 1;
                    }
                    HeaderKind::Usage => {
                        section = Section::None;
                        awaiting_usage = doc.usage.is_none();
                        continuation = None;
                        diagnostics.recognized_lines += 1;
                    }
                    HeaderKind::Unknown => {
                        diagnostics.unknown_headers.push(trimmed.to_string());
                    }
                }
                continue;
            }

            if awaiting_usage {
                doc.usage = Some(trimmed.to_string());
                awaiting_usage = false;
                diagnostics.recognized_lines += 1;
                continue;
            }

            match section {
                Section::Commands => {
                    if let Some((names, description)) = commands::parse_subcommand_row(line) {
                        let start = doc.subcommands.len();
                        for name in names {
                            if seen_subcommands.insert(name.clone()) {
                                doc.subcommands
                                    .push(ParsedSubcommand::new(&name, &description));
                            }
                        }
                        continuation = Some(Continuation::Subcommands {
                            start,
                            end: doc.subcommands.len(),
                            indent,
                        });
                        diagnostics.recognized_lines += 1;
                        continue;
                    }
                    if let Some(Continuation::Subcommands {
                        start,
                        end,
                        indent: row_indent,
                    }) = continuation
                        && indent > row_indent
                    {
                        for sub in &mut doc.subcommands[start..end] {
                            append_description(&mut sub.description, trimmed);
                        }
                        diagnostics.recognized_lines += 1;
                        continue;
                    }
                }
                Section::Options => {
                    if let Some(flag) = parse_flag_row(trimmed) {
                        if seen_flags.insert(flag.name.clone()) {
                            doc.flags.push(flag);
                            continuation = Some(Continuation::Flag {
                                index: doc.flags.len() - 1,
                                indent,
                            });
                        } else {
                            continuation = None;
                        }
                        diagnostics.recognized_lines += 1;
                        continue;
                    }
                    if let Some(Continuation::Flag {
                        index,
                        indent: row_indent,
                    }) = continuation
                        && indent > row_indent
                    {
                        append_description(&mut doc.flags[index].description, trimmed);
                        diagnostics.recognized_lines += 1;
                        continue;
                    }
                }
                Section::None => {
                    if doc.description.is_none() && is_description_candidate(trimmed) {
                        doc.description = sanitize_description_text(trimmed);
                        diagnostics.recognized_lines += 1;
                    }
                }
            }
        }

        debug!(
            subcommands = doc.subcommands.len(),
            flags = doc.flags.len(),
            coverage = diagnostics.coverage(),
            "Parsed help text"
        );

        self.diagnostics = diagnostics;
        doc
    }
}

/// Returns the synopsis of a `Usage: ...` line, or `None` for other lines.
fn inline_usage(trimmed: &str) -> Option<&str> {
    let prefix = trimmed.get(..6)?;
    if !prefix.eq_ignore_ascii_case("usage:") {
        return None;
    }
    let rest = trimmed[6..].trim();
    if rest.is_empty() { None } else { Some(rest) }
}

fn is_description_candidate(trimmed: &str) -> bool {
    !trimmed.to_ascii_lowercase().starts_with("usage")
        && !trimmed.starts_with('-')
        && !trimmed.starts_with('[')
        && !trimmed.starts_with('<')
}

fn sanitize_description_text(raw: &str) -> Option<String> {
    let cleaned = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.is_empty() { None } else { Some(cleaned) }
}

fn append_description(target: &mut String, text: &str) {
    if !target.is_empty() {
        target.push(' ');
    }
    target.push_str(text);
}
