//! Flag-row parsing for options sections.

use regex::Regex;
use std::sync::LazyLock;

use shellsense_core::ParsedFlag;

use super::split_two_columns;

// A placeholder right after the flag word: ` VALUE`, ` [ARG]`, ` <x>`.
static VALUE_AFTER_FLAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+(?:[A-Z][A-Z0-9_-]*(?:\s|$|,|\])|\[|<)").expect("static regex must compile")
});

/// Parses one options-section row such as `-o, --output <FILE>  Write to FILE`.
///
/// The description may be empty when the row carries only the flag column;
/// callers fill it from a continuation line. Returns `None` when the row
/// does not start with a valid flag token.
pub fn parse_flag_row(trimmed: &str) -> Option<ParsedFlag> {
    if !trimmed.starts_with('-') {
        return None;
    }

    let (definition, description) = match split_two_columns(trimmed) {
        Some((left, right)) => (left, right),
        None => (trimmed, ""),
    };

    let mut tokens: Vec<String> = Vec::new();
    let mut expects_value = false;

    for (position, fragment) in definition.split(',').enumerate() {
        let fragment = fragment.trim();
        let Some(word) = fragment.split_whitespace().next() else {
            continue;
        };
        if !word.starts_with('-') {
            if position == 0 {
                return None;
            }
            continue;
        }

        let (token, word_has_value) = normalize_flag_token(word);
        if !is_valid_flag_token(&token) {
            if position == 0 {
                return None;
            }
            continue;
        }

        let remainder = &fragment[word.len()..];
        if word_has_value || VALUE_AFTER_FLAG.is_match(remainder) {
            expects_value = true;
        }

        if !tokens.contains(&token) {
            tokens.push(token);
        }
    }

    let primary = tokens
        .iter()
        .find(|token| token.starts_with("--"))
        .or_else(|| tokens.first())?
        .clone();
    let alias = tokens.iter().find(|token| **token != primary).cloned();

    Some(ParsedFlag {
        name: primary,
        alias,
        description: description.trim().to_string(),
        expects_value,
    })
}

/// Strips any placeholder or `=value` suffix from a raw flag word.
///
/// Returns the bare token and whether the word itself carried a value
/// marker (`=`, `<`, or an optional `[...]`).
pub fn normalize_flag_token(raw: &str) -> (String, bool) {
    let mut word = raw
        .trim()
        .trim_end_matches(',')
        .trim_end_matches(';')
        .to_string();

    if let Some(rest) = word.strip_prefix("--[no-]") {
        word = format!("--{rest}");
    }

    let has_value = word.contains('=') || word.contains('<') || word.contains('[');
    let cut = word.find(['=', '[', '<']).unwrap_or(word.len());
    word.truncate(cut);

    let token = word.trim_end_matches("...").trim_end_matches('.').to_string();
    (token, has_value)
}

fn is_valid_flag_token(token: &str) -> bool {
    let body = token.trim_start_matches('-');
    let dashes = token.len() - body.len();
    (dashes == 1 || dashes == 2)
        && body
            .chars()
            .next()
            .is_some_and(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '?' | '@'))
}
