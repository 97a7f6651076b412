//! The suggestion engine: context detection and dispatch.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::RwLock;
use shellsense_core::{
    ArgumentKind, CommandInfo, HistoryEntry, QuickFixSuggestion, Suggestion, SuggestionType,
};
use shellsense_db::{
    CommandHistory, EngineConfig, HISTORY_KEY, KeyValueStore, RECENT_DIRECTORIES_KEY,
    RecentDirectories,
};
use shellsense_discovery::path_scan::{PathExecutableCache, path_executables};
use tracing::{debug, warn};

use crate::catalog::CommandCatalog;
use crate::collaborators::{CommandRunner, DirectoryFetcher, LocalDirectoryFetcher};
use crate::flags::{expects_path, flag_suggestions, pending_value_flag, used_flags};
use crate::fuzzy;
use crate::paths::PathCompleter;
use crate::platform::Platform;
use crate::quickfix;
use crate::resolver::{Resolution, resolve};
use crate::tokenizer::{ends_with_unquoted_space, tokenize};

/// Per-query inputs beyond the text itself.
#[derive(Clone, Default)]
pub struct SuggestOptions {
    /// Character just typed, when it should force a mode (`-` or a separator).
    pub trigger: Option<char>,
    /// Set after the user accepted a suggestion.
    pub auto_trigger: bool,
    /// Used to learn unknown commands from `--help`.
    pub command_runner: Option<Arc<dyn CommandRunner>>,
    /// Used for path completion; the local filesystem when absent.
    pub directory_fetcher: Option<Arc<dyn DirectoryFetcher>>,
    /// Overrides the home directory used for `~`.
    pub home_directory: Option<String>,
}

impl SuggestOptions {
    pub fn with_trigger(mut self, trigger: char) -> Self {
        self.trigger = Some(trigger);
        self
    }

    pub fn auto_triggered(mut self) -> Self {
        self.auto_trigger = true;
        self
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.command_runner = Some(runner);
        self
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn DirectoryFetcher>) -> Self {
        self.directory_fetcher = Some(fetcher);
        self
    }

    pub fn with_home(mut self, home: impl Into<String>) -> Self {
        self.home_directory = Some(home.into());
        self
    }
}

impl std::fmt::Debug for SuggestOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SuggestOptions")
            .field("trigger", &self.trigger)
            .field("auto_trigger", &self.auto_trigger)
            .field("command_runner", &self.command_runner.is_some())
            .field("directory_fetcher", &self.directory_fetcher.is_some())
            .field("home_directory", &self.home_directory)
            .finish()
    }
}

/// Turns partial command lines into ranked suggestions.
///
/// One engine is meant to be shared (behind an `Arc`) by whatever owns the
/// terminal input. Its caches are ordinary fields; locks are held only for
/// in-memory reads and writes, never across an await.
///
/// # Examples
///
/// ```
/// use shellsense_db::EngineConfig;
/// use shellsense_engine::{Platform, SuggestOptions, SuggestionEngine};
///
/// # tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(async {
/// let config = EngineConfig { scan_search_path: false, ..EngineConfig::default() };
/// let engine = SuggestionEngine::with_platform(config, Platform::Unix);
///
/// let suggestions = engine.suggestions("git sta", "/", &SuggestOptions::default()).await;
/// assert_eq!(suggestions[0].text, "stash");
/// assert_eq!(suggestions[1].text, "status");
/// # });
/// ```
pub struct SuggestionEngine {
    config: EngineConfig,
    catalog: CommandCatalog,
    path_cache: PathExecutableCache,
    history: RwLock<CommandHistory>,
    recent_directories: RwLock<RecentDirectories>,
    store: Option<Arc<dyn KeyValueStore>>,
}

impl SuggestionEngine {
    /// Creates an engine for the host platform.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_platform(config, Platform::host())
    }

    pub fn with_platform(config: EngineConfig, platform: Platform) -> Self {
        Self {
            catalog: CommandCatalog::new(platform),
            path_cache: PathExecutableCache::new(config.path_scan_ttl()),
            history: RwLock::new(CommandHistory::new(config.history_limit)),
            recent_directories: RwLock::new(RecentDirectories::new(config.recent_directory_limit)),
            store: None,
            config,
        }
    }

    /// Persists history and recent directories through `store`.
    ///
    /// Call [`load_persisted`](Self::load_persisted) afterwards to read what
    /// the store already holds.
    pub fn with_store(mut self, store: Arc<dyn KeyValueStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn catalog(&self) -> &CommandCatalog {
        &self.catalog
    }

    pub fn platform(&self) -> Platform {
        self.catalog.platform()
    }

    /// Registers command metadata learned elsewhere (e.g. a saved parse).
    pub fn register_command(&self, key: &str, info: CommandInfo) -> bool {
        self.catalog.learn(key, info)
    }

    /// Replaces in-memory history and recent directories with the stored
    /// copies. Missing or unreadable data loads as empty.
    pub async fn load_persisted(&self) {
        let Some(store) = self.store.as_deref() else {
            return;
        };
        let history = CommandHistory::load(store, self.config.history_limit).await;
        let recent = RecentDirectories::load(store, self.config.recent_directory_limit).await;
        debug!(
            history = history.len(),
            recent_directories = recent.len(),
            "Loaded persisted state"
        );
        *self.history.write() = history;
        *self.recent_directories.write() = recent;
    }

    // -----------------------------------------------------------------------
    // Suggestions
    // -----------------------------------------------------------------------

    /// Ranked suggestions for `input` typed in `cwd`.
    pub async fn suggestions(
        &self,
        input: &str,
        cwd: &str,
        options: &SuggestOptions,
    ) -> Vec<Suggestion> {
        if input.trim().is_empty() {
            return Vec::new();
        }

        let tokens = tokenize(input);
        let Some((current, context)) = tokens.split_last() else {
            return Vec::new();
        };
        let runner = options.command_runner.as_deref();
        let platform = self.platform();

        match options.trigger {
            Some('-') => {
                let resolution = resolve(&self.catalog, context, runner).await;
                return self.flags_for(&resolution, context, current);
            }
            Some(c) if platform.is_separator(c) => {
                return self.paths(current, cwd, options).await;
            }
            _ => {}
        }

        if context.is_empty() && !current.is_empty() {
            return self.command_names(current).await;
        }

        let resolution = resolve(&self.catalog, context, runner).await;

        if current.starts_with('-') {
            return self.flags_for(&resolution, context, current);
        }
        if platform.ends_with_separator(current) {
            return self.paths(current, cwd, options).await;
        }
        if context.len() == resolution.depth && resolution.has_subcommands() {
            let subcommands = self.subcommands(&resolution, current);
            if !subcommands.is_empty() {
                return subcommands;
            }
        }
        if current.is_empty() && (options.auto_trigger || ends_with_unquoted_space(input)) {
            return self.contextual(&resolution, context, cwd, options).await;
        }
        self.paths(current, cwd, options).await
    }

    fn flags_for(
        &self,
        resolution: &Resolution,
        context: &[String],
        current: &str,
    ) -> Vec<Suggestion> {
        let Some(info) = resolution.info.as_deref() else {
            return Vec::new();
        };
        let used = used_flags(context, info);
        let mut suggestions = flag_suggestions(info, resolution.program(), &used, current);
        suggestions.truncate(self.config.max_suggestions);
        suggestions
    }

    fn subcommands(&self, resolution: &Resolution, prefix: &str) -> Vec<Suggestion> {
        let Some(info) = resolution.info.as_deref() else {
            return Vec::new();
        };
        let mut suggestions: Vec<Suggestion> = info
            .subcommands
            .iter()
            .filter(|(name, _)| name.starts_with(prefix))
            .map(|(name, description)| {
                Suggestion::new(name.as_str(), SuggestionType::Subcommand)
                    .with_description(description.as_str())
                    .ranked(0, name)
            })
            .collect();
        suggestions.truncate(self.config.max_suggestions);
        suggestions
    }

    fn path_completer<'a>(
        &self,
        fetcher: &'a dyn DirectoryFetcher,
        options: &SuggestOptions,
    ) -> PathCompleter<'a> {
        PathCompleter::new(fetcher, self.platform())
            .with_home(options.home_directory.clone())
            .with_limit(self.config.max_path_suggestions)
    }

    async fn paths(&self, partial: &str, cwd: &str, options: &SuggestOptions) -> Vec<Suggestion> {
        let local = LocalDirectoryFetcher;
        let fetcher: &dyn DirectoryFetcher = match options.directory_fetcher.as_deref() {
            Some(fetcher) => fetcher,
            None => &local,
        };
        self.path_completer(fetcher, options).complete(partial, cwd).await
    }

    /// Command names for a lone first token: catalog, then search path,
    /// then programs from history.
    async fn command_names(&self, prefix: &str) -> Vec<Suggestion> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut suggestions = Vec::new();

        for name in self.catalog.program_names() {
            if name.starts_with(prefix) && seen.insert(name.clone()) {
                let description = self
                    .catalog
                    .get(&name)
                    .map(|info| info.description.clone())
                    .unwrap_or_default();
                suggestions.push(
                    Suggestion::new(name.as_str(), SuggestionType::Command)
                        .with_description(description)
                        .ranked(0, &name),
                );
            }
        }

        if self.config.scan_search_path {
            for name in self.search_path_executables().await.iter() {
                if name.starts_with(prefix) && seen.insert(name.clone()) {
                    suggestions.push(
                        Suggestion::new(name.as_str(), SuggestionType::Executable)
                            .with_description("Executable on PATH")
                            .ranked(1, name),
                    );
                }
            }
        }

        let programs = self.history.read().recent_programs(usize::MAX);
        let from_history = programs
            .into_iter()
            .filter(|name| name.starts_with(prefix))
            .filter(|name| seen.insert(name.clone()))
            .take(self.config.history_command_limit);
        for name in from_history {
            suggestions.push(
                Suggestion::new(name.as_str(), SuggestionType::History)
                    .with_description("From history")
                    .ranked(2, &name),
            );
        }

        suggestions.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
        suggestions.truncate(self.config.max_suggestions);
        suggestions
    }

    async fn search_path_executables(&self) -> Arc<Vec<String>> {
        if let Some(names) = self.path_cache.fresh() {
            return names;
        }
        match tokio::task::spawn_blocking(path_executables).await {
            Ok(names) => self.path_cache.store(names),
            Err(err) => {
                debug!(error = %err, "Search path scan failed");
                Arc::new(Vec::new())
            }
        }
    }

    /// Suggestions offered right after a token was completed.
    async fn contextual(
        &self,
        resolution: &Resolution,
        context: &[String],
        cwd: &str,
        options: &SuggestOptions,
    ) -> Vec<Suggestion> {
        let Some(info) = resolution.info.as_deref() else {
            return Vec::new();
        };
        let local = LocalDirectoryFetcher;
        let fetcher: &dyn DirectoryFetcher = match options.directory_fetcher.as_deref() {
            Some(fetcher) => fetcher,
            None => &local,
        };
        let completer = self.path_completer(fetcher, options);

        // The line ends in a flag that still needs its value; the whole
        // context is the trailing tokens plus the empty current one.
        let mut with_current = context.to_vec();
        with_current.push(String::new());
        if let Some(pending) = pending_value_flag(&with_current, info) {
            debug!(flag = %pending.primary, "Awaiting flag value");
            if !expects_path(pending) {
                return Vec::new();
            }
            return completer.complete("", cwd).await;
        }

        let used = used_flags(context, info);
        let flags = flag_suggestions(info, resolution.program(), &used, "");
        let mut suggestions: Vec<Suggestion> = flags
            .into_iter()
            .take(self.config.max_suggestions)
            .map(|s| s.reranked(0))
            .collect();

        if info.argument_kind.accepts_paths() {
            let paths = if info.argument_kind == ArgumentKind::Directory {
                completer.complete_directories("", cwd).await
            } else {
                completer.complete("", cwd).await
            };
            suggestions.extend(
                paths
                    .into_iter()
                    .take(self.config.contextual_path_limit)
                    .map(|s| s.reranked(1)),
            );
        }

        suggestions.sort_by(|a, b| a.sort_key.cmp(&b.sort_key));
        suggestions
    }

    // -----------------------------------------------------------------------
    // History and directories
    // -----------------------------------------------------------------------

    /// Records an executed command and persists the history.
    pub async fn record_command(&self, entry: HistoryEntry) {
        let json = {
            let mut history = self.history.write();
            history.push(entry);
            history.to_json()
        };
        self.persist(HISTORY_KEY, json).await;
    }

    /// Records a visited directory and persists the list.
    pub async fn record_directory(&self, path: &str) {
        let json = {
            let mut recent = self.recent_directories.write();
            recent.push(path);
            recent.to_json()
        };
        self.persist(RECENT_DIRECTORIES_KEY, json).await;
    }

    async fn persist(&self, key: &str, json: shellsense_db::Result<String>) {
        let Some(store) = self.store.as_deref() else {
            return;
        };
        let result = match json {
            Ok(json) => store.put(key, &json).await,
            Err(err) => Err(err),
        };
        if let Err(err) = result {
            warn!(key, error = %err, "Failed to persist; will retry on next change");
        }
    }

    /// Fuzzy history search, most recent first among equal scores.
    ///
    /// An empty query returns the most recent entries unscored.
    pub fn search_history(&self, query: &str) -> Vec<HistoryEntry> {
        let limit = self.config.history_search_limit;
        let history = self.history.read();
        if query.trim().is_empty() {
            return history.iter_recent().take(limit).cloned().collect();
        }
        fuzzy::rank(history.iter_recent(), query, |e| e.command.as_str(), limit)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Fuzzy search over recently visited directories.
    pub fn search_directories(&self, query: &str) -> Vec<String> {
        let limit = self.config.directory_search_limit;
        let recent = self.recent_directories.read();
        if query.trim().is_empty() {
            return recent.iter().take(limit).map(String::from).collect();
        }
        fuzzy::rank(recent.iter(), query, |p| *p, limit)
            .into_iter()
            .map(String::from)
            .collect()
    }

    /// History entries, most recent first.
    pub fn recent_history(&self) -> Vec<HistoryEntry> {
        self.history.read().iter_recent().cloned().collect()
    }

    pub fn history_len(&self) -> usize {
        self.history.read().len()
    }

    pub fn recent_directories(&self) -> Vec<String> {
        self.recent_directories.read().iter().map(String::from).collect()
    }

    /// Quick fixes for a failed command's output.
    pub fn quick_fixes(&self, command: &str, output: &str) -> Vec<QuickFixSuggestion> {
        quickfix::quick_fixes(command, output)
    }
}

#[cfg(test)]
mod tests {
    use shellsense_core::DirectoryEntry;

    use super::*;
    use crate::error::Result;

    struct NoFs;

    #[async_trait::async_trait]
    impl DirectoryFetcher for NoFs {
        async fn list(&self, _path: &str) -> Result<Vec<DirectoryEntry>> {
            Ok(Vec::new())
        }
    }

    fn engine() -> SuggestionEngine {
        let config = EngineConfig {
            scan_search_path: false,
            ..EngineConfig::default()
        };
        SuggestionEngine::with_platform(config, Platform::Unix)
    }

    fn options() -> SuggestOptions {
        SuggestOptions::default().with_fetcher(Arc::new(NoFs))
    }

    #[tokio::test]
    async fn test_empty_input_has_no_suggestions() {
        let engine = engine();
        assert!(engine.suggestions("", "/", &options()).await.is_empty());
        assert!(engine.suggestions("   ", "/", &options()).await.is_empty());
    }

    #[tokio::test]
    async fn test_single_token_completes_command_names() {
        let engine = engine();
        let out = engine.suggestions("gi", "/", &options()).await;
        assert_eq!(out[0].text, "git");
        assert_eq!(out[0].kind, SuggestionType::Command);
        assert!(out[0].sort_key.starts_with('0'));
    }

    #[tokio::test]
    async fn test_history_programs_rank_after_catalog() {
        let engine = engine();
        engine.record_command(HistoryEntry::new("gitk --all")).await;
        let out = engine.suggestions("gi", "/", &options()).await;
        let texts: Vec<&str> = out.iter().map(|s| s.text.as_str()).collect();
        assert_eq!(texts, vec!["git", "gitk"]);
        assert_eq!(out[1].kind, SuggestionType::History);
    }

    #[tokio::test]
    async fn test_subcommands_after_space() {
        let engine = engine();
        let out = engine.suggestions("git ", "/", &options()).await;
        assert!(out.iter().all(|s| s.kind == SuggestionType::Subcommand));
        assert!(out.iter().any(|s| s.text == "commit"));
    }

    #[tokio::test]
    async fn test_contextual_flags_after_subcommand() {
        let engine = engine();
        let out = engine.suggestions("git commit ", "/", &options()).await;
        assert!(!out.is_empty());
        assert!(out.iter().all(|s| s.kind == SuggestionType::Flag));
        assert_eq!(out[0].text, "-a");
    }

    #[tokio::test]
    async fn test_pending_value_without_path_is_empty() {
        let engine = engine();
        let out = engine.suggestions("git commit -m ", "/", &options()).await;
        assert!(out.is_empty());
    }

    #[tokio::test]
    async fn test_search_history_empty_query_is_recent_first() {
        let engine = engine();
        engine.record_command(HistoryEntry::new("ls")).await;
        engine.record_command(HistoryEntry::new("pwd")).await;
        let out = engine.search_history("");
        assert_eq!(out[0].command, "pwd");
        assert_eq!(out[1].command, "ls");
    }
}
