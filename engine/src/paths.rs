//! Filesystem completion through a [`DirectoryFetcher`].
//!
//! Paths are handled as strings in the target platform's syntax, because the
//! directory being completed may live on a remote host.

use shellsense_core::{DirectoryEntry, Suggestion, SuggestionType};
use tracing::debug;

use crate::collaborators::DirectoryFetcher;
use crate::platform::Platform;

/// Default cap on path suggestions.
pub const DEFAULT_PATH_LIMIT: usize = 25;

const CODE_EXTENSIONS: &[&str] = &[
    "rs", "py", "js", "mjs", "ts", "tsx", "jsx", "go", "c", "h", "cc", "cpp", "hpp", "java", "kt",
    "swift", "rb", "php", "cs", "lua", "scala", "zig", "dart", "vue", "svelte", "css", "scss",
    "html", "sql",
];
const CONFIG_EXTENSIONS: &[&str] = &[
    "json", "yaml", "yml", "toml", "ini", "conf", "cfg", "env", "xml", "lock", "properties",
];
const DOCUMENT_EXTENSIONS: &[&str] = &[
    "md", "txt", "pdf", "doc", "docx", "rst", "odt", "rtf", "csv", "xls", "xlsx", "ppt", "pptx",
    "log",
];
const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "bmp", "webp", "ico", "tif", "tiff", "heic",
];
const ARCHIVE_EXTENSIONS: &[&str] = &[
    "zip", "tar", "gz", "tgz", "bz2", "xz", "7z", "rar", "zst", "jar", "deb", "rpm",
];
const SCRIPT_EXTENSIONS: &[&str] = &["sh", "bash", "zsh", "fish", "ps1", "bat", "cmd"];

/// Where to list and what to match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRoot {
    /// Directory handed to the fetcher.
    pub directory: String,
    /// Case-insensitive name prefix entries must start with.
    pub prefix: String,
    /// Text kept in front of each completed name, exactly as the user typed it.
    pub typed_base: String,
}

/// Works out which directory to list for `partial`.
///
/// # Examples
///
/// ```
/// use shellsense_engine::Platform;
/// use shellsense_engine::paths::search_root;
///
/// let root = search_root("src/ma", "/work", Some("/home/me"), Platform::Unix);
/// assert_eq!(root.directory, "/work/src");
/// assert_eq!(root.prefix, "ma");
/// assert_eq!(root.typed_base, "src/");
/// ```
pub fn search_root(partial: &str, cwd: &str, home: Option<&str>, platform: Platform) -> SearchRoot {
    if partial.is_empty() {
        return SearchRoot {
            directory: cwd.to_string(),
            prefix: String::new(),
            typed_base: String::new(),
        };
    }

    if partial == "~"
        && let Some(home) = home
    {
        return SearchRoot {
            directory: home.to_string(),
            prefix: String::new(),
            typed_base: format!("~{}", platform.separator()),
        };
    }

    // Everything up to and including the last separator is kept verbatim.
    let (typed_base, prefix) = match platform.last_separator(partial) {
        Some(index) => (&partial[..=index], &partial[index + 1..]),
        None => ("", partial),
    };
    if typed_base.is_empty() {
        return SearchRoot {
            directory: cwd.to_string(),
            prefix: prefix.to_string(),
            typed_base: String::new(),
        };
    }

    let expanded = expand_home(typed_base, home, platform);
    let directory = if platform.is_absolute(&expanded) {
        trim_directory(&expanded, platform)
    } else {
        trim_directory(&platform.join(cwd, &expanded), platform)
    };

    SearchRoot {
        directory,
        prefix: prefix.to_string(),
        typed_base: typed_base.to_string(),
    }
}

fn expand_home(path: &str, home: Option<&str>, platform: Platform) -> String {
    match (path.strip_prefix('~'), home) {
        (Some(rest), Some(home))
            if rest.is_empty() || rest.starts_with(|c| platform.is_separator(c)) =>
        {
            format!("{home}{rest}")
        }
        _ => path.to_string(),
    }
}

/// Drops a trailing separator unless the path is a root.
fn trim_directory(path: &str, platform: Platform) -> String {
    let trimmed = path.trim_end_matches(|c| platform.is_separator(c));
    if trimmed.is_empty() {
        return path[..1].to_string();
    }
    if platform == Platform::Windows && trimmed.len() == 2 && trimmed.ends_with(':') {
        return format!("{trimmed}{}", platform.separator());
    }
    trimmed.to_string()
}

/// Maps a directory entry to its suggestion type.
pub fn classify(entry: &DirectoryEntry, platform: Platform) -> SuggestionType {
    if entry.is_directory {
        return SuggestionType::Directory;
    }
    if let Some(ext) = entry.extension() {
        let ext = ext.as_str();
        if platform.executable_extensions().contains(&ext) {
            return SuggestionType::Executable;
        }
        let buckets: [(&[&str], SuggestionType); 6] = [
            (CODE_EXTENSIONS, SuggestionType::CodeFile),
            (CONFIG_EXTENSIONS, SuggestionType::ConfigFile),
            (DOCUMENT_EXTENSIONS, SuggestionType::Document),
            (IMAGE_EXTENSIONS, SuggestionType::Image),
            (ARCHIVE_EXTENSIONS, SuggestionType::Archive),
            (SCRIPT_EXTENSIONS, SuggestionType::Script),
        ];
        if let Some((_, kind)) = buckets.iter().find(|(exts, _)| exts.contains(&ext)) {
            return *kind;
        }
    }
    if platform == Platform::Unix && entry.has_execute_bit() {
        return SuggestionType::Executable;
    }
    SuggestionType::File
}

/// Completes file and directory names.
pub struct PathCompleter<'a> {
    fetcher: &'a dyn DirectoryFetcher,
    platform: Platform,
    home: Option<String>,
    limit: usize,
}

impl<'a> PathCompleter<'a> {
    pub fn new(fetcher: &'a dyn DirectoryFetcher, platform: Platform) -> Self {
        Self {
            fetcher,
            platform,
            home: None,
            limit: DEFAULT_PATH_LIMIT,
        }
    }

    /// Home directory used for `~`. Falls back to the local user's home.
    pub fn with_home(mut self, home: Option<String>) -> Self {
        self.home = home;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    fn home(&self) -> Option<String> {
        self.home.clone().or_else(|| {
            dirs::home_dir().map(|p| p.to_string_lossy().into_owned())
        })
    }

    /// Completes `partial` relative to `cwd`.
    ///
    /// Directories come first, then files, each group in case-insensitive
    /// name order. Directory text ends with a separator.
    pub async fn complete(&self, partial: &str, cwd: &str) -> Vec<Suggestion> {
        self.complete_filtered(partial, cwd, false).await
    }

    /// Like [`complete`](Self::complete) but returns directories only.
    pub async fn complete_directories(&self, partial: &str, cwd: &str) -> Vec<Suggestion> {
        self.complete_filtered(partial, cwd, true).await
    }

    async fn complete_filtered(
        &self,
        partial: &str,
        cwd: &str,
        directories_only: bool,
    ) -> Vec<Suggestion> {
        let home = self.home();
        let root = search_root(partial, cwd, home.as_deref(), self.platform);

        let entries = match self.fetcher.list(&root.directory).await {
            Ok(entries) => entries,
            Err(err) => {
                debug!(directory = %root.directory, error = %err, "Directory listing failed");
                return Vec::new();
            }
        };

        let show_hidden = root.prefix.starts_with('.');
        let prefix = root.prefix.to_lowercase();
        let mut matches: Vec<DirectoryEntry> = entries
            .into_iter()
            .filter(|e| show_hidden || !e.is_hidden())
            .filter(|e| !directories_only || e.is_directory)
            .filter(|e| e.name.to_lowercase().starts_with(&prefix))
            .collect();
        matches.sort_by(|a, b| {
            b.is_directory
                .cmp(&a.is_directory)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        matches.truncate(self.limit);

        matches
            .into_iter()
            .map(|entry| self.suggestion_for(&root, entry))
            .collect()
    }

    fn suggestion_for(&self, root: &SearchRoot, entry: DirectoryEntry) -> Suggestion {
        let kind = classify(&entry, self.platform);
        let key = entry.name.to_lowercase();
        if entry.is_directory {
            let display = format!("{}{}", entry.name, self.platform.separator());
            Suggestion::new(format!("{}{display}", root.typed_base), kind)
                .with_display(display)
                .with_description(kind.label())
                .with_path(entry.path)
                .directory()
                .ranked(0, &key)
        } else {
            let description = format!("{} ({})", kind.label(), format_size(entry.size));
            Suggestion::new(format!("{}{}", root.typed_base, entry.name), kind)
                .with_display(entry.name)
                .with_description(description)
                .with_path(entry.path)
                .ranked(1, &key)
        }
    }
}

/// Human-readable byte count.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}
