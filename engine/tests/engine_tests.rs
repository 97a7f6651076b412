//! End-to-end behavior of the suggestion engine with fake collaborators.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use shellsense_core::{ArgumentKind, CommandInfo, DirectoryEntry, HistoryEntry, SuggestionType};
use shellsense_db::{EngineConfig, HISTORY_KEY, KeyValueStore, MemoryStore};
use shellsense_engine::{
    CollaboratorError, CommandRunner, DirectoryFetcher, Platform, Result, SuggestOptions,
    SuggestionEngine, SuggestionRefresher,
};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

struct CannedRunner {
    calls: AtomicUsize,
    delay: Duration,
    responses: HashMap<String, String>,
}

impl CannedRunner {
    fn new(responses: &[(&str, &str)]) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            delay: Duration::ZERO,
            responses: responses
                .iter()
                .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                .collect(),
        }
    }

    fn slow(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CommandRunner for CannedRunner {
    async fn run(&self, command_line: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.responses
            .get(command_line)
            .cloned()
            .ok_or_else(|| CollaboratorError::Failed(format!("unknown command {command_line}")))
    }
}

/// Times out on the first call, then answers like [`CannedRunner`].
struct TimesOutOnceRunner {
    inner: CannedRunner,
}

#[async_trait]
impl CommandRunner for TimesOutOnceRunner {
    async fn run(&self, command_line: &str) -> Result<String> {
        if self.inner.calls() == 0 {
            self.inner.calls.fetch_add(1, Ordering::SeqCst);
            return Err(CollaboratorError::Timeout);
        }
        self.inner.run(command_line).await
    }
}

struct FakeFs(HashMap<String, Vec<DirectoryEntry>>);

#[async_trait]
impl DirectoryFetcher for FakeFs {
    async fn list(&self, path: &str) -> Result<Vec<DirectoryEntry>> {
        self.0
            .get(path)
            .cloned()
            .ok_or_else(|| CollaboratorError::Failed(format!("no directory {path}")))
    }
}

fn project_fs() -> Arc<FakeFs> {
    let mut dirs = HashMap::new();
    dirs.insert(
        "/project".to_string(),
        vec![
            DirectoryEntry::dir("src", "/project/src"),
            DirectoryEntry::dir("target", "/project/target"),
            DirectoryEntry::file("Cargo.toml", "/project/Cargo.toml", 420),
            DirectoryEntry::file("notes.md", "/project/notes.md", 64),
        ],
    );
    Arc::new(FakeFs(dirs))
}

fn config() -> EngineConfig {
    EngineConfig {
        scan_search_path: false,
        ..EngineConfig::default()
    }
}

fn engine() -> SuggestionEngine {
    SuggestionEngine::with_platform(config(), Platform::Unix)
}

/// `foo install` with two short-aliased flags and one long-only flag.
fn engine_with_foo() -> SuggestionEngine {
    let engine = engine();
    engine.register_command(
        "foo install",
        CommandInfo::new("Install a package")
            .with_value_flag("--short-flag", Some("-s"), "Value for the short flag")
            .with_flag_entry("--fast", Some("-f"), "Skip checks", false)
            .with_flag_entry("--long-only", None, "Only a long form", false),
    );
    engine
}

fn options() -> SuggestOptions {
    SuggestOptions::default().with_fetcher(project_fs())
}

fn texts(suggestions: &[shellsense_core::Suggestion]) -> Vec<&str> {
    suggestions.iter().map(|s| s.text.as_str()).collect()
}

// ---------------------------------------------------------------------------
// Flag ranking
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_single_dash_ranks_short_flags_first() {
    let engine = engine_with_foo();
    let out = engine
        .suggestions("foo install -", "/project", &options().with_trigger('-'))
        .await;

    assert!(!out[0].text.starts_with("--"));
    let texts = texts(&out);
    assert!(texts.contains(&"-s"));
    assert!(texts.contains(&"-f"));
}

#[tokio::test]
async fn test_double_dash_ranks_long_flags_first() {
    let engine = engine_with_foo();
    let out = engine
        .suggestions("foo install --", "/project", &options())
        .await;
    assert!(out[0].text.starts_with("--"));
}

#[tokio::test]
async fn test_pending_value_flag_suppresses_flags() {
    let engine = engine_with_foo();
    let out = engine
        .suggestions(
            "foo install --short-flag ",
            "/project",
            &options().auto_triggered(),
        )
        .await;
    assert_eq!(
        out.iter().filter(|s| s.kind == SuggestionType::Flag).count(),
        0
    );
}

#[tokio::test]
async fn test_used_flags_are_not_offered_again() {
    let engine = engine_with_foo();
    let out = engine
        .suggestions("foo install -f -", "/project", &options().with_trigger('-'))
        .await;
    let texts = texts(&out);
    assert!(!texts.contains(&"-f"));
    assert!(!texts.contains(&"--fast"));
    assert!(texts.contains(&"-s"));
}

// ---------------------------------------------------------------------------
// Contextual suggestions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_used_slash_switches_are_not_offered_again() {
    let engine = SuggestionEngine::with_platform(config(), Platform::Windows);
    let out = engine.suggestions("dir /a ", "/project", &options()).await;
    let flags: Vec<&str> = out
        .iter()
        .filter(|s| s.kind == SuggestionType::Flag)
        .map(|s| s.text.as_str())
        .collect();
    assert_eq!(flags, vec!["/b", "/o", "/s", "/w"]);
}

#[tokio::test]
async fn test_path_valued_flag_offers_paths() {
    let engine = engine();
    engine.register_command(
        "build",
        CommandInfo::new("Build").with_value_flag("--out-dir", Some("-o"), "Where artifacts go"),
    );
    let out = engine.suggestions("build -o ", "/project", &options()).await;
    assert_eq!(texts(&out), vec!["src/", "target/", "Cargo.toml", "notes.md"]);
}

#[tokio::test]
async fn test_contextual_flags_then_paths() {
    let engine = engine();
    engine.register_command(
        "view",
        CommandInfo::new("View a file")
            .with_flag_entry("--plain", Some("-p"), "No decorations", false)
            .with_argument_kind(ArgumentKind::File),
    );
    let out = engine.suggestions("view ", "/project", &options()).await;
    assert_eq!(
        texts(&out),
        vec!["-p", "--plain", "src/", "target/", "Cargo.toml", "notes.md"]
    );
    assert_eq!(out[0].kind, SuggestionType::Flag);
    assert_eq!(out[5].kind, SuggestionType::Document);
}

#[tokio::test]
async fn test_directory_argument_lists_directories_only() {
    let engine = engine();
    let out = engine.suggestions("cd ", "/project", &options()).await;
    assert_eq!(texts(&out), vec!["src/", "target/"]);
}

#[tokio::test]
async fn test_contextual_path_limit() {
    let mut config = config();
    config.contextual_path_limit = 1;
    let engine = SuggestionEngine::with_platform(config, Platform::Unix);
    let out = engine.suggestions("cat ", "/project", &options()).await;
    let paths: Vec<_> = out.iter().filter(|s| s.kind != SuggestionType::Flag).collect();
    assert_eq!(paths.len(), 1);
    assert_eq!(paths[0].text, "src/");
}

#[tokio::test]
async fn test_separator_trigger_completes_paths() {
    let engine = engine();
    let mut dirs = HashMap::new();
    dirs.insert(
        "/project/src".to_string(),
        vec![DirectoryEntry::file("main.rs", "/project/src/main.rs", 100)],
    );
    let fs = Arc::new(FakeFs(dirs));
    let opts = SuggestOptions::default().with_fetcher(fs).with_trigger('/');
    let out = engine.suggestions("vim src/", "/project", &opts).await;
    assert_eq!(texts(&out), vec!["src/main.rs"]);
    assert_eq!(out[0].kind, SuggestionType::CodeFile);
}

#[tokio::test]
async fn test_argument_defaults_to_path_completion() {
    let engine = engine();
    let out = engine.suggestions("cat no", "/project", &options()).await;
    assert_eq!(texts(&out), vec!["notes.md"]);
}

#[tokio::test]
async fn test_fetcher_failure_degrades_to_empty() {
    let engine = engine();
    let out = engine.suggestions("cat ", "/elsewhere", &options()).await;
    assert!(out.iter().all(|s| s.kind == SuggestionType::Flag));
}

// ---------------------------------------------------------------------------
// Enrichment
// ---------------------------------------------------------------------------

const MYTOOL_HELP: &str = "\
mytool - does things

Usage: mytool [OPTIONS] <COMMAND>

Commands:
  sync     Synchronize state
  prune    Remove stale entries

Options:
  -n, --dry-run          Print actions only
  -c, --config <FILE>    Config file path
";

#[tokio::test]
async fn test_unknown_command_learned_from_help() {
    let engine = engine();
    let runner = Arc::new(CannedRunner::new(&[("mytool --help", MYTOOL_HELP)]));
    let opts = options().with_runner(runner.clone());

    let subs = engine.suggestions("mytool ", "/project", &opts).await;
    assert_eq!(texts(&subs), vec!["prune", "sync"]);

    let flags = engine.suggestions("mytool --", "/project", &opts).await;
    assert_eq!(texts(&flags), vec!["--config", "--dry-run"]);
    assert!(flags[0].requires_value);

    assert_eq!(runner.calls(), 1);
    assert!(engine.catalog().contains("mytool"));
}

#[tokio::test]
async fn test_enrichment_failure_is_silent() {
    let engine = engine();
    let runner = Arc::new(CannedRunner::new(&[]));
    let opts = options().with_runner(runner.clone());

    let out = engine.suggestions("ghost -", "/project", &opts).await;
    assert!(out.is_empty());
    assert_eq!(runner.calls(), 1);
}

#[tokio::test]
async fn test_timed_out_help_is_retried() {
    let engine = engine();
    let runner = Arc::new(TimesOutOnceRunner {
        inner: CannedRunner::new(&[("mytool --help", MYTOOL_HELP)]),
    });
    let opts = options().with_runner(runner.clone());

    let first = engine.suggestions("mytool --", "/project", &opts).await;
    assert!(first.is_empty());
    assert!(!engine.catalog().is_marked_unknown("mytool"));

    let second = engine.suggestions("mytool --", "/project", &opts).await;
    assert_eq!(texts(&second), vec!["--config", "--dry-run"]);
    assert_eq!(runner.inner.calls(), 2);
}

#[tokio::test]
async fn test_static_commands_are_not_probed() {
    let engine = engine();
    let runner = Arc::new(CannedRunner::new(&[]));
    let opts = options().with_runner(runner.clone());
    engine.suggestions("git commit -", "/project", &opts).await;
    assert_eq!(runner.calls(), 0);
}

// ---------------------------------------------------------------------------
// History, directories and persistence
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_history_cap_and_dedupe() {
    let engine = engine();
    for i in 0..505 {
        engine.record_command(HistoryEntry::new(&format!("echo {i}"))).await;
    }
    assert_eq!(engine.history_len(), 500);
    let recent = engine.recent_history();
    assert_eq!(recent[0].command, "echo 504");
    assert!(recent.iter().all(|e| e.command != "echo 0"));

    engine.record_command(HistoryEntry::new("echo 10")).await;
    assert_eq!(engine.history_len(), 500);
    assert_eq!(engine.recent_history()[0].command, "echo 10");
}

#[tokio::test]
async fn test_history_search_is_fuzzy() {
    let engine = engine();
    engine.record_command(HistoryEntry::new("cargo build --release")).await;
    engine.record_command(HistoryEntry::new("git push")).await;
    engine.record_command(HistoryEntry::new("cargo test")).await;

    let hits = engine.search_history("cargo");
    let commands: Vec<&str> = hits.iter().map(|e| e.command.as_str()).collect();
    assert_eq!(commands, vec!["cargo test", "cargo build --release"]);

    assert!(engine.search_history("zzz").is_empty());
}

#[tokio::test]
async fn test_directory_search() {
    let engine = engine();
    engine.record_directory("/home/me/projects/api").await;
    engine.record_directory("/var/log").await;
    engine.record_directory("/home/me/projects/web").await;

    assert_eq!(engine.search_directories("")[0], "/home/me/projects/web");
    assert_eq!(engine.search_directories("log"), vec!["/var/log"]);

    engine.record_directory("/var/log").await;
    assert_eq!(engine.recent_directories()[0], "/var/log");
    assert_eq!(engine.recent_directories().len(), 3);
}

#[tokio::test]
async fn test_state_persists_through_store() {
    let store: Arc<MemoryStore> = Arc::new(MemoryStore::new());

    let first = engine().with_store(store.clone());
    first.record_command(HistoryEntry::new("make test").with_exit_code(2)).await;
    first.record_directory("/srv").await;
    assert!(store.get(HISTORY_KEY).await.unwrap().is_some());

    let second = engine().with_store(store.clone());
    second.load_persisted().await;
    assert_eq!(second.recent_history()[0].command, "make test");
    assert_eq!(second.recent_history()[0].exit_code, Some(2));
    assert_eq!(second.recent_directories(), vec!["/srv"]);
}

#[tokio::test]
async fn test_corrupted_store_loads_empty() {
    let store = Arc::new(MemoryStore::new());
    store.put(HISTORY_KEY, "not json").await.unwrap();

    let engine = engine().with_store(store.clone());
    engine.load_persisted().await;
    assert_eq!(engine.history_len(), 0);

    engine.record_command(HistoryEntry::new("ls")).await;
    let raw = store.get(HISTORY_KEY).await.unwrap().unwrap();
    assert!(raw.contains("\"ls\""));
}

#[tokio::test]
async fn test_quick_fix_python_module() {
    let fixes = engine().quick_fixes("python app.py", "No module named requests");
    assert_eq!(fixes.len(), 1);
    assert_eq!(fixes[0].command, "pip install requests");
}

// ---------------------------------------------------------------------------
// Debounced refresh
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_refresher_publishes_last_input_only() {
    let engine = Arc::new(engine());
    let refresher = SuggestionRefresher::with_delay(engine, Duration::from_millis(100));
    let updates = refresher.subscribe();

    for input in ["g", "gi", "git"] {
        refresher.input_changed(input, "/project", options());
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    tokio::time::sleep(Duration::from_millis(300)).await;

    let update = updates.borrow().clone().unwrap();
    assert_eq!(update.input, "git");
    assert_eq!(update.suggestions[0].text, "git");
}

#[tokio::test(start_paused = true)]
async fn test_refresher_discards_stale_results() {
    let engine = Arc::new(engine());
    let refresher = SuggestionRefresher::with_delay(engine, Duration::from_millis(100));
    let updates = refresher.subscribe();

    let slow = Arc::new(
        CannedRunner::new(&[("slowtool --help", MYTOOL_HELP)]).slow(Duration::from_secs(1)),
    );
    refresher.input_changed(
        "slowtool -",
        "/project",
        options().with_runner(slow.clone()).with_trigger('-'),
    );
    // Let the timer fire so the slow query is in flight.
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert_eq!(slow.calls(), 1);

    refresher.input_changed("gi", "/project", options());
    tokio::time::sleep(Duration::from_secs(3)).await;

    let update = updates.borrow().clone().unwrap();
    assert_eq!(update.input, "gi");
    assert_eq!(refresher.latest_input(), "gi");
}
