//! Help-text normalization.

use regex::Regex;
use std::sync::LazyLock;

/// Strips terminal escapes and overstrike sequences and unifies line endings.
pub fn normalize_help_output(raw: &str) -> String {
    static ANSI_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\x1b\[[0-9;?]*[ -/]*[@-~]").expect("static regex must compile")
    });
    static OVERSTRIKE_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r".\x08").expect("static regex must compile"));

    let stripped = ANSI_RE.replace_all(raw, "");
    let mut cleaned = stripped.into_owned();
    while OVERSTRIKE_RE.is_match(&cleaned) {
        cleaned = OVERSTRIKE_RE.replace_all(&cleaned, "").into_owned();
    }
    cleaned.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_ansi_and_overstrike() {
        let raw = "\x1b[1mOptions:\x1b[0m\r\n  -\x08-a\x08a  all";
        assert_eq!(normalize_help_output(raw), "Options:\n  -a  all");
    }
}
