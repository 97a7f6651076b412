//! Section-header classification.
//!
//! A best-effort classifier over a small closed keyword table. Exact
//! heading names are checked first, then a substring fallback; anything
//! else is left alone so the caller keeps its current section.

/// Parser section state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Section {
    #[default]
    None,
    Commands,
    Options,
}

/// Outcome of inspecting a header-shaped line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    /// Enter the given section.
    Enter(Section),
    /// `Usage:`-like heading; resets the section and may introduce a usage line.
    Usage,
    /// Header-shaped but unknown; section state is unchanged.
    Unknown,
}

const COMMAND_HEADERS: &[&str] = &[
    "commands",
    "subcommands",
    "available commands",
    "common commands",
    "management commands",
];

const OPTION_HEADERS: &[&str] = &[
    "options",
    "flags",
    "arguments",
    "optional arguments",
    "global options",
    "available options",
];

const RESET_HEADERS: &[&str] = &["usage", "examples", "description", "synopsis"];

/// Returns `true` if `trimmed` has the shape of a section header.
pub fn is_header_line(trimmed: &str) -> bool {
    trimmed.len() > 1 && trimmed.ends_with(':') && !trimmed.starts_with('-')
}

/// Classifies a header-shaped line. Returns `None` when the line is not a
/// header at all.
pub fn classify_header(trimmed: &str) -> Option<HeaderKind> {
    if !is_header_line(trimmed) {
        return None;
    }

    let lower = trimmed.trim_end_matches(':').trim().to_lowercase();

    if COMMAND_HEADERS.contains(&lower.as_str()) {
        return Some(HeaderKind::Enter(Section::Commands));
    }
    if OPTION_HEADERS.contains(&lower.as_str()) {
        return Some(HeaderKind::Enter(Section::Options));
    }
    if RESET_HEADERS.contains(&lower.as_str()) {
        return Some(reset_kind(&lower));
    }

    if ["usage", "description", "example"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        return Some(reset_kind(&lower));
    }
    if ["option", "flag", "argument"]
        .iter()
        .any(|needle| lower.contains(needle))
    {
        return Some(HeaderKind::Enter(Section::Options));
    }
    if lower.contains("command") {
        return Some(HeaderKind::Enter(Section::Commands));
    }

    Some(HeaderKind::Unknown)
}

fn reset_kind(lower: &str) -> HeaderKind {
    if lower.starts_with("usage") || lower == "synopsis" {
        HeaderKind::Usage
    } else {
        HeaderKind::Enter(Section::None)
    }
}
