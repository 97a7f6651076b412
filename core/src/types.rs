//! Type definitions for the command-intelligence data model.
//!
//! The types are plain data with builder-style constructors. They serialize
//! with [`serde`] so they can be persisted, printed by the CLI, or handed to
//! a rendering front end unchanged.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Description used when help text yields nothing recognizable.
pub const GENERIC_DESCRIPTION: &str = "Command";

/// What kind of positional argument a command expects.
///
/// Drives whether contextual suggestions include path completions.
///
/// # Examples
///
/// ```
/// use shellsense_core::ArgumentKind;
///
/// assert_eq!(ArgumentKind::default(), ArgumentKind::None);
/// assert!(ArgumentKind::Directory.accepts_paths());
/// assert!(!ArgumentKind::None.accepts_paths());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ArgumentKind {
    /// No positional argument, or one that is not a filesystem path.
    #[default]
    None,
    /// A regular file.
    File,
    /// A directory.
    Directory,
    /// Any filesystem path.
    Path,
}

impl ArgumentKind {
    /// Returns `true` for the kinds that are completed from the filesystem.
    pub fn accepts_paths(self) -> bool {
        !matches!(self, ArgumentKind::None)
    }

    /// Infers the argument kind from a usage synopsis.
    ///
    /// Only bare placeholders are considered (`FILE`, `<dir>`, `PATH...`);
    /// placeholders attached to a flag (`-C <path>`, `--out=FILE`) are
    /// skipped.
    ///
    /// # Examples
    ///
    /// ```
    /// use shellsense_core::ArgumentKind;
    ///
    /// assert_eq!(ArgumentKind::infer_from_usage("cat [OPTION]... [FILE]..."), ArgumentKind::File);
    /// assert_eq!(ArgumentKind::infer_from_usage("tool [-C <path>] run"), ArgumentKind::None);
    /// assert_eq!(
    ///     ArgumentKind::infer_from_usage("mkdir [OPTION]... DIRECTORY..."),
    ///     ArgumentKind::Directory
    /// );
    /// ```
    pub fn infer_from_usage(usage: &str) -> ArgumentKind {
        let mut previous_was_flag = false;
        for raw in usage.split_whitespace() {
            let opens_group = raw.starts_with('[') || raw.starts_with('(');
            let stripped = raw.trim_start_matches(['[', '(']);
            if stripped.starts_with('-') {
                previous_was_flag = !stripped.contains(']') && !stripped.contains('=');
                continue;
            }
            if previous_was_flag && !opens_group {
                previous_was_flag = false;
                continue;
            }
            previous_was_flag = false;

            let angle = stripped.starts_with('<');
            let word = stripped.trim_matches(|c: char| !c.is_ascii_alphanumeric() && c != '_');
            if word.is_empty() || word.contains('=') {
                continue;
            }
            let uppercase = word.chars().all(|c| c.is_ascii_uppercase() || c == '_');
            if !uppercase && !angle {
                continue;
            }
            match word.to_ascii_lowercase().as_str() {
                "dir" | "dirs" | "directory" | "directories" | "folder" => {
                    return ArgumentKind::Directory;
                }
                "file" | "files" => return ArgumentKind::File,
                "path" | "paths" | "pathspec" => return ArgumentKind::Path,
                _ => {}
            }
        }
        ArgumentKind::None
    }
}

/// Metadata for a single flag token.
///
/// Both the canonical form and its alias map to the same metadata entry, so
/// looking up `-m` or `--message` yields identical information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlagMetadata {
    /// Canonical form (long form when one exists).
    pub primary: String,
    /// The other spelling of the flag, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// Human-facing form, e.g. `-m, --message`.
    pub display: String,
    /// Description from help text or the built-in tables.
    pub description: String,
    /// Whether the flag consumes the following token as its value.
    pub expects_value: bool,
}

/// Everything the engine knows about one command key.
///
/// A key is either a top-level command (`git`) or a space-joined command
/// path (`git remote add`). Instances are treated as immutable once they
/// enter a catalog; build them with the `with_*` methods.
///
/// # Examples
///
/// ```
/// use shellsense_core::{ArgumentKind, CommandInfo};
///
/// let git = CommandInfo::new("Distributed version control")
///     .with_flags(&["--version", "--help"])
///     .with_subcommand("clone", "Clone a repository")
///     .with_subcommand("status", "Show the working tree status");
///
/// assert!(git.has_subcommands());
/// assert_eq!(git.subcommand_names(), vec!["clone", "status"]);
/// assert_eq!(git.argument_kind, ArgumentKind::None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommandInfo {
    /// Short description of the command.
    pub description: String,
    /// Flag tokens in declaration order; canonical and alias forms both appear.
    pub flags: Vec<String>,
    /// Subcommand name to description.
    pub subcommands: BTreeMap<String, String>,
    /// What the positional argument looks like.
    pub argument_kind: ArgumentKind,
    /// Flag token to metadata. Not every flag has an entry.
    pub flag_metadata: HashMap<String, FlagMetadata>,
}

impl CommandInfo {
    /// Creates an entry with only a description.
    pub fn new(description: &str) -> Self {
        Self {
            description: description.to_string(),
            ..Default::default()
        }
    }

    /// Creates the placeholder entry returned when help text is unparseable.
    pub fn generic() -> Self {
        Self::new(GENERIC_DESCRIPTION)
    }

    /// Builds an entry from a parsed help document.
    ///
    /// Every parsed subcommand and every flag (primary name, alias,
    /// expects-value) survives the conversion. The argument kind is inferred
    /// from the usage line when the document has one.
    ///
    /// # Examples
    ///
    /// ```
    /// use shellsense_core::{CommandInfo, ParsedFlag, ParsedHelpDocument, ParsedSubcommand};
    ///
    /// let doc = ParsedHelpDocument {
    ///     description: Some("Package tool".into()),
    ///     usage: None,
    ///     subcommands: vec![ParsedSubcommand::new("install", "Install a package")],
    ///     flags: vec![ParsedFlag::new("--quiet", Some("-q"), "Less output", false)],
    /// };
    ///
    /// let info = CommandInfo::from_parsed_help(&doc);
    /// assert_eq!(info.subcommands["install"], "Install a package");
    /// assert_eq!(info.flag_metadata("-q").unwrap().primary, "--quiet");
    /// ```
    pub fn from_parsed_help(doc: &ParsedHelpDocument) -> Self {
        let description = doc
            .description
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .unwrap_or(GENERIC_DESCRIPTION);
        let mut info = CommandInfo::new(description);

        for sub in &doc.subcommands {
            info.subcommands
                .entry(sub.name.clone())
                .or_insert_with(|| sub.description.clone());
        }

        for flag in &doc.flags {
            info = info.with_flag_entry(
                &flag.name,
                flag.alias.as_deref(),
                &flag.description,
                flag.expects_value,
            );
        }

        if let Some(usage) = doc.usage.as_deref() {
            info.argument_kind = ArgumentKind::infer_from_usage(usage);
        }

        info
    }

    /// Adds bare flag tokens without metadata. Duplicates are skipped.
    pub fn with_flags(mut self, flags: &[&str]) -> Self {
        for flag in flags {
            self.push_flag(flag);
        }
        self
    }

    /// Adds a flag with metadata.
    ///
    /// `name` becomes the primary form; `alias` (if any) maps to the same
    /// metadata. Pass the long form as `name` when one exists.
    pub fn with_flag_entry(
        mut self,
        name: &str,
        alias: Option<&str>,
        description: &str,
        expects_value: bool,
    ) -> Self {
        let display = match alias {
            Some(alias) if !alias.starts_with("--") => format!("{alias}, {name}"),
            Some(alias) => format!("{name}, {alias}"),
            None => name.to_string(),
        };
        let metadata = FlagMetadata {
            primary: name.to_string(),
            alias: alias.map(String::from),
            display,
            description: description.to_string(),
            expects_value,
        };

        self.push_flag(name);
        self.flag_metadata
            .entry(name.to_string())
            .or_insert_with(|| metadata.clone());
        if let Some(alias) = alias {
            self.push_flag(alias);
            self.flag_metadata
                .entry(alias.to_string())
                .or_insert(metadata);
        }
        self
    }

    /// Adds a flag that consumes a value (e.g. `--output <FILE>`).
    pub fn with_value_flag(self, name: &str, alias: Option<&str>, description: &str) -> Self {
        self.with_flag_entry(name, alias, description, true)
    }

    /// Adds a subcommand.
    pub fn with_subcommand(mut self, name: &str, description: &str) -> Self {
        self.subcommands
            .insert(name.to_string(), description.to_string());
        self
    }

    /// Adds several subcommands at once.
    pub fn with_subcommands(mut self, entries: &[(&str, &str)]) -> Self {
        for (name, description) in entries {
            self.subcommands
                .insert((*name).to_string(), (*description).to_string());
        }
        self
    }

    /// Sets the argument kind.
    pub fn with_argument_kind(mut self, kind: ArgumentKind) -> Self {
        self.argument_kind = kind;
        self
    }

    /// Returns `true` if `token` is one of this command's flags.
    pub fn has_flag(&self, token: &str) -> bool {
        self.flags.iter().any(|f| f == token)
    }

    /// Looks up metadata for a flag token (either form).
    pub fn flag_metadata(&self, token: &str) -> Option<&FlagMetadata> {
        self.flag_metadata.get(token)
    }

    /// Returns `true` when the command lists at least one subcommand.
    pub fn has_subcommands(&self) -> bool {
        !self.subcommands.is_empty()
    }

    /// Subcommand names in lexicographic order.
    pub fn subcommand_names(&self) -> Vec<&str> {
        self.subcommands.keys().map(String::as_str).collect()
    }

    /// Returns `true` when the entry carries flags or subcommands.
    pub fn has_content(&self) -> bool {
        !self.flags.is_empty() || !self.subcommands.is_empty()
    }

    fn push_flag(&mut self, flag: &str) {
        if !self.has_flag(flag) {
            self.flags.push(flag.to_string());
        }
    }
}

/// A subcommand row recognized in help text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedSubcommand {
    pub name: String,
    pub description: String,
}

impl ParsedSubcommand {
    pub fn new(name: &str, description: &str) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

/// A flag row recognized in help text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedFlag {
    /// Canonical name: the first `--long` token, else the first token.
    pub name: String,
    /// Any other spelling listed on the same row.
    pub alias: Option<String>,
    pub description: String,
    pub expects_value: bool,
}

impl ParsedFlag {
    pub fn new(name: &str, alias: Option<&str>, description: &str, expects_value: bool) -> Self {
        Self {
            name: name.to_string(),
            alias: alias.map(String::from),
            description: description.to_string(),
            expects_value,
        }
    }
}

/// Structured view of a `--help` text.
///
/// An empty document (no subcommands, no flags) means nothing was
/// recognized; see [`has_content`](Self::has_content).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedHelpDocument {
    pub description: Option<String>,
    /// Usage synopsis with the `Usage:` prefix removed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    pub subcommands: Vec<ParsedSubcommand>,
    pub flags: Vec<ParsedFlag>,
}

impl ParsedHelpDocument {
    /// Returns `true` if at least one subcommand or flag was recognized.
    pub fn has_content(&self) -> bool {
        !self.subcommands.is_empty() || !self.flags.is_empty()
    }

    pub fn find_flag(&self, token: &str) -> Option<&ParsedFlag> {
        self.flags
            .iter()
            .find(|f| f.name == token || f.alias.as_deref() == Some(token))
    }

    pub fn find_subcommand(&self, name: &str) -> Option<&ParsedSubcommand> {
        self.subcommands.iter().find(|s| s.name == name)
    }
}

/// Category of a suggestion. Closed set; renderers match over it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SuggestionType {
    Command,
    Subcommand,
    Flag,
    History,
    Directory,
    File,
    CodeFile,
    ConfigFile,
    Document,
    Image,
    Archive,
    Script,
    Executable,
}

impl SuggestionType {
    /// Every variant, in declaration order.
    pub const ALL: [SuggestionType; 13] = [
        SuggestionType::Command,
        SuggestionType::Subcommand,
        SuggestionType::Flag,
        SuggestionType::History,
        SuggestionType::Directory,
        SuggestionType::File,
        SuggestionType::CodeFile,
        SuggestionType::ConfigFile,
        SuggestionType::Document,
        SuggestionType::Image,
        SuggestionType::Archive,
        SuggestionType::Script,
        SuggestionType::Executable,
    ];

    /// Short glyph for list rendering.
    pub fn icon(self) -> &'static str {
        match self {
            SuggestionType::Command => ">_",
            SuggestionType::Subcommand => "::",
            SuggestionType::Flag => "--",
            SuggestionType::History => "<>",
            SuggestionType::Directory => "[]",
            SuggestionType::File => "..",
            SuggestionType::CodeFile => "{}",
            SuggestionType::ConfigFile => "#=",
            SuggestionType::Document => "Dc",
            SuggestionType::Image => "Im",
            SuggestionType::Archive => "Zp",
            SuggestionType::Script => "$_",
            SuggestionType::Executable => "*x",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            SuggestionType::Command => "command",
            SuggestionType::Subcommand => "subcommand",
            SuggestionType::Flag => "flag",
            SuggestionType::History => "history",
            SuggestionType::Directory => "directory",
            SuggestionType::File => "file",
            SuggestionType::CodeFile => "code file",
            SuggestionType::ConfigFile => "config file",
            SuggestionType::Document => "document",
            SuggestionType::Image => "image",
            SuggestionType::Archive => "archive",
            SuggestionType::Script => "script",
            SuggestionType::Executable => "executable",
        }
    }
}

/// One completion entry.
///
/// `sort_key` is compared lexicographically; producers prefix it with a rank
/// digit so one stable sort yields priority-then-alphabetical order.
///
/// # Examples
///
/// ```
/// use shellsense_core::{Suggestion, SuggestionType};
///
/// let s = Suggestion::new("status", SuggestionType::Subcommand)
///     .with_description("Show the working tree status")
///     .ranked(0, "status");
/// assert_eq!(s.sort_key, "0status");
/// assert_eq!(s.display_text, "status");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    /// Text inserted in place of the current token.
    pub text: String,
    pub display_text: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: SuggestionType,
    pub is_directory: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub sort_key: String,
    pub requires_value: bool,
}

impl Suggestion {
    pub fn new(text: impl Into<String>, kind: SuggestionType) -> Self {
        let text = text.into();
        Self {
            display_text: text.clone(),
            sort_key: text.clone(),
            text,
            description: String::new(),
            kind,
            is_directory: false,
            path: None,
            requires_value: false,
        }
    }

    pub fn with_display(mut self, display: impl Into<String>) -> Self {
        self.display_text = display.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn directory(mut self) -> Self {
        self.is_directory = true;
        self
    }

    pub fn requiring_value(mut self, requires_value: bool) -> Self {
        self.requires_value = requires_value;
        self
    }

    /// Sets the sort key to `rank` followed by `key`.
    pub fn ranked(mut self, rank: u8, key: &str) -> Self {
        self.sort_key = format!("{rank}{key}");
        self
    }

    /// Prepends a rank digit to the existing sort key.
    pub fn reranked(mut self, rank: u8) -> Self {
        self.sort_key = format!("{rank}{}", self.sort_key);
        self
    }
}

/// One executed command line.
///
/// Equality compares only the command text, which is what history
/// deduplication keys on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub command: String,
    /// Serialized as an ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub directory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

impl HistoryEntry {
    /// Creates an entry stamped with the current time.
    pub fn new(command: &str) -> Self {
        Self {
            command: command.to_string(),
            timestamp: Utc::now(),
            directory: None,
            exit_code: None,
        }
    }

    pub fn with_directory(mut self, directory: &str) -> Self {
        self.directory = Some(directory.to_string());
        self
    }

    pub fn with_exit_code(mut self, code: i32) -> Self {
        self.exit_code = Some(code);
        self
    }

    /// First whitespace-separated word of the command.
    pub fn program(&self) -> Option<&str> {
        self.command.split_whitespace().next()
    }
}

impl PartialEq for HistoryEntry {
    fn eq(&self, other: &Self) -> bool {
        self.command == other.command
    }
}

impl Eq for HistoryEntry {}

/// A remedial command derived from a failed command's output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuickFixSuggestion {
    pub title: String,
    /// Literal command line to run.
    pub command: String,
    pub description: String,
}

impl QuickFixSuggestion {
    pub fn new(title: &str, command: impl Into<String>, description: &str) -> Self {
        Self {
            title: title.to_string(),
            command: command.into(),
            description: description.to_string(),
        }
    }
}

/// One row from a directory-listing collaborator (local or remote).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub is_directory: bool,
    pub size: u64,
    /// Unix permission bits, when the source reports them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub permissions: Option<u32>,
    /// Full path of the entry as the source spells it.
    pub path: String,
}

impl DirectoryEntry {
    pub fn file(name: &str, path: &str, size: u64) -> Self {
        Self {
            name: name.to_string(),
            is_directory: false,
            size,
            permissions: None,
            path: path.to_string(),
        }
    }

    pub fn dir(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            is_directory: true,
            size: 0,
            permissions: None,
            path: path.to_string(),
        }
    }

    pub fn with_permissions(mut self, mode: u32) -> Self {
        self.permissions = Some(mode);
        self
    }

    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }

    /// Lower-cased extension, ignoring a leading dot on hidden files.
    pub fn extension(&self) -> Option<String> {
        let name = self.name.strip_prefix('.').unwrap_or(&self.name);
        let (_, ext) = name.rsplit_once('.')?;
        if ext.is_empty() {
            None
        } else {
            Some(ext.to_ascii_lowercase())
        }
    }

    /// Returns `true` when any execute bit is set.
    pub fn has_execute_bit(&self) -> bool {
        self.permissions.is_some_and(|mode| mode & 0o111 != 0)
    }
}
