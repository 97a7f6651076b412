//! Subcommand-row parsing for commands sections.

use regex::Regex;
use std::sync::LazyLock;

// `name  description` or `name, alias  description`.
static SUBCOMMAND_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*([A-Za-z0-9][\w.:+-]*(?:\s*,\s*[A-Za-z0-9][\w.:+-]*)*)(?:\t+|\s{2,})(\S.*)$",
    )
    .expect("static regex must compile")
});

/// Parses a commands-section row into its names and description.
///
/// Comma-separated aliases yield one name each; all share the description.
pub fn parse_subcommand_row(line: &str) -> Option<(Vec<String>, String)> {
    let captures = SUBCOMMAND_ROW.captures(line)?;
    let names = captures[1]
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect::<Vec<_>>();
    if names.is_empty() {
        return None;
    }
    let description = captures[2].trim().to_string();
    Some((names, description))
}
