//! Flag suggestions and value-awaiting flag detection.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use shellsense_core::{CommandInfo, FlagMetadata, Suggestion, SuggestionType};

/// Keywords in a flag's name or description that mean its value is a path.
const PATH_KEYWORDS: &[&str] = &[
    "path",
    "dir",
    "directory",
    "file",
    "root",
    "prefix",
    "src",
    "dest",
];

/// Descriptions for flags the static catalog lists without metadata,
/// keyed by `(program, flag)`.
static WELL_KNOWN_FLAGS: LazyLock<HashMap<(&'static str, &'static str), &'static str>> =
    LazyLock::new(|| {
        let entries: &[(&str, &str, &str)] = &[
            ("ls", "-l", "Use a long listing format"),
            ("ls", "-a", "Do not ignore entries starting with ."),
            ("ls", "-A", "Show hidden entries except . and .."),
            ("ls", "-h", "Print human readable sizes"),
            ("ls", "-R", "List subdirectories recursively"),
            ("ls", "-t", "Sort by modification time, newest first"),
            ("ls", "-S", "Sort by file size, largest first"),
            ("ls", "-r", "Reverse order while sorting"),
            ("ls", "-1", "List one file per line"),
            ("ls", "--color", "Colorize the output"),
            ("cat", "-n", "Number all output lines"),
            ("cat", "-b", "Number nonempty output lines"),
            ("cat", "-A", "Show all non-printing characters"),
            ("cat", "-s", "Suppress repeated empty output lines"),
            ("cp", "-r", "Copy directories recursively"),
            ("cp", "-R", "Copy directories recursively"),
            ("cp", "-n", "Do not overwrite an existing file"),
            ("cp", "-p", "Preserve mode, ownership and timestamps"),
            ("cp", "-a", "Archive mode, preserving everything"),
            ("mv", "-n", "Do not overwrite an existing file"),
            ("rm", "-r", "Remove directories and their contents recursively"),
            ("rm", "-R", "Remove directories and their contents recursively"),
            ("rm", "-d", "Remove empty directories"),
            ("mkdir", "-p", "Make parent directories as needed"),
            ("rmdir", "-p", "Remove the directory and its ancestors"),
            ("touch", "-a", "Change only the access time"),
            ("touch", "-m", "Change only the modification time"),
            ("touch", "-c", "Do not create any files"),
            ("chmod", "-R", "Change files and directories recursively"),
            ("chmod", "-c", "Report only when a change is made"),
            ("grep", "-i", "Ignore case distinctions"),
            ("grep", "-r", "Read all files under each directory recursively"),
            ("grep", "-R", "Like -r, but follow all symlinks"),
            ("grep", "-n", "Print line numbers with output lines"),
            ("grep", "-v", "Select non-matching lines"),
            ("grep", "-l", "Print only names of files with matches"),
            ("grep", "-c", "Print only a count of matching lines"),
            ("grep", "-w", "Match only whole words"),
            ("grep", "-E", "Patterns are extended regular expressions"),
            ("grep", "-F", "Patterns are fixed strings"),
            ("tar", "-c", "Create a new archive"),
            ("tar", "-x", "Extract files from an archive"),
            ("tar", "-t", "List the contents of an archive"),
            ("tar", "-z", "Filter the archive through gzip"),
            ("tar", "-j", "Filter the archive through bzip2"),
            ("ssh", "-A", "Enable agent forwarding"),
            ("ssh", "-N", "Do not execute a remote command"),
            ("ssh", "-T", "Disable pseudo-terminal allocation"),
            ("sudo", "-i", "Run a login shell as the target user"),
            ("sudo", "-s", "Run a shell as the target user"),
            ("sudo", "-E", "Preserve the user environment"),
            ("sudo", "-k", "Invalidate cached credentials"),
            ("python", "-u", "Unbuffered binary stdout and stderr"),
            ("python", "-i", "Inspect interactively after running script"),
            ("dir", "/a", "Display files with specified attributes"),
            ("dir", "/b", "Use bare format"),
            ("dir", "/s", "Include subdirectories"),
            ("dir", "/w", "Use wide list format"),
            ("dir", "/o", "Sort the listing"),
            ("del", "/p", "Prompt before deleting each file"),
            ("del", "/f", "Force deleting of read-only files"),
            ("del", "/s", "Delete from all subdirectories"),
            ("del", "/q", "Quiet mode"),
            ("ipconfig", "/all", "Display full configuration information"),
            ("ipconfig", "/flushdns", "Purge the DNS resolver cache"),
        ];
        entries
            .iter()
            .map(|(program, flag, description)| ((*program, *flag), *description))
            .collect()
    });

/// Meaning of a flag that is the same for almost every command.
pub fn generic_flag_meaning(flag: &str) -> Option<&'static str> {
    let meaning = match flag {
        "-h" | "--help" => "Show help",
        "-V" | "--version" => "Show version information",
        "-v" | "--verbose" => "Verbose output",
        "-q" | "--quiet" => "Suppress output",
        "-f" | "--force" => "Force the operation",
        "-i" | "--interactive" => "Prompt before acting",
        "-r" | "-R" | "--recursive" => "Operate recursively",
        "-n" | "--dry-run" => "Show what would be done",
        "-a" | "--all" => "Include everything",
        "-o" | "--output" => "Output destination",
        "-y" | "--yes" => "Assume yes to prompts",
        "-p" | "--port" => "Port number",
        _ => return None,
    };
    Some(meaning)
}

/// Human description for `flag`: help-text metadata first, then the
/// well-known table, then generic meanings.
pub fn describe_flag(info: &CommandInfo, program: &str, flag: &str) -> String {
    if let Some(meta) = info.flag_metadata(flag)
        && !meta.description.is_empty()
    {
        return meta.description.clone();
    }
    WELL_KNOWN_FLAGS
        .get(&(program, flag))
        .copied()
        .or_else(|| generic_flag_meaning(flag))
        .unwrap_or("Flag")
        .to_string()
}

/// Strips an inline value from a typed flag: `--out=x` and Windows-style
/// `/o:n`.
fn flag_name(token: &str) -> &str {
    let separator = if token.starts_with('/') { ':' } else { '=' };
    match token.split_once(separator) {
        Some((name, _)) if name.starts_with('-') || name.starts_with('/') => name,
        _ => token,
    }
}

/// Dash tokens always count as flags. Slash tokens count only when `info`
/// lists them, so a path argument like `/tmp` is not mistaken for a switch.
fn is_flag_token(token: &str, info: &CommandInfo) -> bool {
    if token.len() < 2 {
        return false;
    }
    token.starts_with('-') || (token.starts_with('/') && info.has_flag(flag_name(token)))
}

/// Flags already on the line, including the other spelling of each.
pub fn used_flags(tokens: &[String], info: &CommandInfo) -> HashSet<String> {
    let mut used = HashSet::new();
    for token in tokens.iter().filter(|t| is_flag_token(t, info)) {
        let name = flag_name(token);
        used.insert(name.to_string());
        if let Some(meta) = info.flag_metadata(name) {
            used.insert(meta.primary.clone());
            if let Some(alias) = &meta.alias {
                used.insert(alias.clone());
            }
        }
    }
    used
}

/// Suggests the unused flags of `info` that start with `typed`.
///
/// When `typed` starts with `--`, long flags rank first; otherwise short
/// flags do. Within a rank, flags sort alphabetically.
pub fn flag_suggestions(
    info: &CommandInfo,
    program: &str,
    used: &HashSet<String>,
    typed: &str,
) -> Vec<Suggestion> {
    let prefer_long = typed.starts_with("--");
    let mut seen = HashSet::new();

    let mut suggestions: Vec<Suggestion> = info
        .flags
        .iter()
        .filter(|flag| !used.contains(flag.as_str()))
        .filter(|flag| flag.starts_with(typed))
        .filter(|flag| seen.insert(flag.as_str()))
        .map(|flag| {
            let is_long = flag.starts_with("--");
            let rank = if is_long == prefer_long { 0 } else { 1 };
            let meta = info.flag_metadata(flag);
            let display = meta.map_or_else(|| flag.clone(), |m| m.display.clone());
            Suggestion::new(flag.as_str(), SuggestionType::Flag)
                .with_display(display)
                .with_description(describe_flag(info, program, flag))
                .requiring_value(meta.is_some_and(|m| m.expects_value))
                .ranked(rank, &flag.to_lowercase())
        })
        .collect();

    suggestions.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
    suggestions
}

/// The last flag on the line still waiting for its value.
///
/// A flag is satisfied only when the token right after it is non-empty and
/// does not start with `-`; the value's shape is not checked.
pub fn pending_value_flag<'a>(
    tokens: &[String],
    info: &'a CommandInfo,
) -> Option<&'a FlagMetadata> {
    tokens
        .iter()
        .enumerate()
        .filter(|(_, token)| token.starts_with('-') && !token.contains('='))
        .filter_map(|(index, token)| {
            let meta = info.flag_metadata(token)?;
            if !meta.expects_value {
                return None;
            }
            let satisfied = tokens
                .get(index + 1)
                .is_some_and(|next| !next.is_empty() && !next.starts_with('-'));
            (!satisfied).then_some(meta)
        })
        .last()
}

/// Returns `true` when a flag's value is probably a filesystem path.
pub fn expects_path(meta: &FlagMetadata) -> bool {
    let haystacks = [
        meta.primary.to_lowercase(),
        meta.alias.as_deref().unwrap_or_default().to_lowercase(),
        meta.description.to_lowercase(),
    ];
    haystacks
        .iter()
        .any(|text| PATH_KEYWORDS.iter().any(|keyword| text.contains(keyword)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn install() -> CommandInfo {
        CommandInfo::new("Install")
            .with_value_flag("--short-flag", Some("-s"), "Short flag value")
            .with_flag_entry("--force", Some("-f"), "Force install", false)
            .with_flag_entry("--long-only", None, "Only has a long form", false)
    }

    fn tokens(words: &[&str]) -> Vec<String> {
        words.iter().map(|w| (*w).to_string()).collect()
    }

    fn texts(suggestions: &[Suggestion]) -> Vec<&str> {
        suggestions.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_single_dash_prefers_short() {
        let info = install();
        let out = flag_suggestions(&info, "foo", &HashSet::new(), "-");
        assert_eq!(
            texts(&out),
            vec!["-f", "-s", "--force", "--long-only", "--short-flag"]
        );
    }

    #[test]
    fn test_double_dash_prefers_long() {
        let info = install();
        let out = flag_suggestions(&info, "foo", &HashSet::new(), "--");
        assert!(out[0].text.starts_with("--"));
        assert!(out.iter().all(|s| s.text.starts_with("--")));
    }

    #[test]
    fn test_used_flags_exclude_both_spellings() {
        let info = install();
        let used = used_flags(&tokens(&["foo", "install", "-f", "--short-flag=x"]), &info);
        let out = flag_suggestions(&info, "foo", &used, "-");
        assert_eq!(texts(&out), vec!["--long-only"]);
    }

    #[test]
    fn test_used_flags_include_slash_switches() {
        let dir = CommandInfo::new("List").with_flags(&["/a", "/b", "/o", "/s"]);
        let used = used_flags(&tokens(&["dir", "/a", "/o:n", "/tmp"]), &dir);
        assert!(used.contains("/a"));
        assert!(used.contains("/o"));
        assert!(!used.contains("/tmp"));

        let out = flag_suggestions(&dir, "dir", &used, "/");
        assert_eq!(texts(&out), vec!["/b", "/s"]);
    }

    #[test]
    fn test_suggestion_carries_metadata() {
        let info = install();
        let out = flag_suggestions(&info, "foo", &HashSet::new(), "--sh");
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].display_text, "-s, --short-flag");
        assert_eq!(out[0].description, "Short flag value");
        assert!(out[0].requires_value);
    }

    #[test]
    fn test_description_fallbacks() {
        let ls = CommandInfo::new("List").with_flags(&["-l", "--help", "--zzz"]);
        assert_eq!(describe_flag(&ls, "ls", "-l"), "Use a long listing format");
        assert_eq!(describe_flag(&ls, "ls", "--help"), "Show help");
        assert_eq!(describe_flag(&ls, "ls", "--zzz"), "Flag");
    }

    #[test]
    fn test_pending_flag_detection() {
        let info = install();
        let pending = pending_value_flag(&tokens(&["foo", "install", "--short-flag", ""]), &info);
        assert_eq!(pending.unwrap().primary, "--short-flag");

        let satisfied =
            pending_value_flag(&tokens(&["foo", "install", "-s", "value", ""]), &info);
        assert!(satisfied.is_none());

        // A following flag does not count as a value.
        let still = pending_value_flag(&tokens(&["foo", "install", "-s", "-f", ""]), &info);
        assert!(still.is_some());

        let inline = pending_value_flag(&tokens(&["foo", "install", "--short-flag=1", ""]), &info);
        assert!(inline.is_none());
    }

    #[test]
    fn test_expects_path() {
        let info = CommandInfo::new("x")
            .with_value_flag("--output-dir", None, "Where to write")
            .with_value_flag("--name", None, "Name of the config file")
            .with_value_flag("--jobs", Some("-j"), "Number of parallel jobs");
        assert!(expects_path(info.flag_metadata("--output-dir").unwrap()));
        assert!(expects_path(info.flag_metadata("--name").unwrap()));
        assert!(!expects_path(info.flag_metadata("-j").unwrap()));
    }
}
