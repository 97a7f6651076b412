use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use shellsense_core::{HistoryEntry, QuickFixSuggestion, Suggestion};
use shellsense_db::{EngineConfig, JsonFileStore, KeyValueStore};
use shellsense_discovery::probe::{ProbeError, run_shell_command};
use shellsense_discovery::{parse_help_document, parse_help_text};
use shellsense_engine::{CollaboratorError, CommandRunner, SuggestOptions, SuggestionEngine};
use shellsense_sqlite::SqliteStore;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Table prefix used when persisting to SQLite.
const SQLITE_PREFIX: &str = "shellsense_";

/// CLI output format with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Json,
    Yaml,
    Table,
}

/// Formats for structured documents that have no tabular form.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum DocumentFormat {
    Json,
    Yaml,
}

#[derive(Debug, Parser)]
#[command(name = "shellsense")]
#[command(about = "Shell command suggestions, history search and quick fixes")]
struct Cli {
    /// Engine configuration file (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Directory for JSON state files.
    #[arg(long, global = true, conflicts_with = "db")]
    store_dir: Option<PathBuf>,
    /// SQLite database file for state.
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Log engine decisions to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse help text into command metadata without executing anything.
    ParseHelp(ParseHelpArgs),
    /// Suggest completions for a partial command line.
    Suggest(SuggestArgs),
    /// Suggest remedial commands for a failed command's output.
    QuickFix(QuickFixArgs),
    /// Record or search command history.
    History(HistoryArgs),
    /// Record or search recently visited directories.
    Dirs(DirsArgs),
}

#[derive(Debug, Args)]
struct ParseHelpArgs {
    /// File containing help text (stdin when omitted).
    #[arg(long)]
    input: Option<PathBuf>,
    /// Print the raw parsed document instead of command metadata.
    #[arg(long)]
    document: bool,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: DocumentFormat,
}

#[derive(Debug, Args)]
struct SuggestArgs {
    /// The partial command line.
    input: String,
    /// Working directory for path completion (default: current directory).
    #[arg(long)]
    cwd: Option<String>,
    /// Character just typed (`-` or a path separator).
    #[arg(long)]
    trigger: Option<char>,
    /// Treat the query as following an accepted suggestion.
    #[arg(long)]
    auto: bool,
    /// Do not run `<command> --help` to learn unknown commands.
    #[arg(long)]
    no_enrich: bool,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct QuickFixArgs {
    /// The command line that failed.
    #[arg(long)]
    command: String,
    /// File containing the command's output (stdin when omitted).
    #[arg(long)]
    input: Option<PathBuf>,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: CliOutputFormat,
}

#[derive(Debug, Args)]
struct HistoryArgs {
    #[command(subcommand)]
    operation: HistoryOperation,
}

#[derive(Debug, Subcommand)]
enum HistoryOperation {
    /// Record an executed command.
    Add(HistoryAddArgs),
    /// Fuzzy-search recorded commands (most recent first without a query).
    Search(SearchArgs),
}

#[derive(Debug, Args)]
struct HistoryAddArgs {
    /// The executed command line.
    command: String,
    /// Directory the command ran in.
    #[arg(long)]
    cwd: Option<String>,
    /// Exit code of the command.
    #[arg(long, allow_negative_numbers = true)]
    exit_code: Option<i32>,
}

#[derive(Debug, Args)]
struct DirsArgs {
    #[command(subcommand)]
    operation: DirsOperation,
}

#[derive(Debug, Subcommand)]
enum DirsOperation {
    /// Record a visited directory.
    Add(DirsAddArgs),
    /// Fuzzy-search visited directories (most recent first without a query).
    Search(SearchArgs),
}

#[derive(Debug, Args)]
struct DirsAddArgs {
    /// Directory path.
    path: String,
}

#[derive(Debug, Args)]
struct SearchArgs {
    /// Fuzzy query.
    query: Option<String>,
    /// Output format.
    #[arg(long, default_value = "table")]
    format: CliOutputFormat,
}

/// Shared settings resolved from the global flags.
struct Context {
    config: EngineConfig,
    store_dir: Option<PathBuf>,
    db: Option<PathBuf>,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match load_config(cli.config.as_deref()) {
        Ok(config) => {
            let ctx = Context {
                config,
                store_dir: cli.store_dir,
                db: cli.db,
            };
            match cli.command {
                Command::ParseHelp(args) => run_parse_help(args),
                Command::Suggest(args) => run_suggest(&ctx, args).await,
                Command::QuickFix(args) => run_quick_fix(args),
                Command::History(args) => run_history(&ctx, args).await,
                Command::Dirs(args) => run_dirs(&ctx, args).await,
            }
        }
        Err(err) => Err(err),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Explicit `--config`, else the user config file when present, else defaults.
fn load_config(path: Option<&Path>) -> Result<EngineConfig, String> {
    if let Some(path) = path {
        return EngineConfig::load(path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()));
    }
    let Some(default_path) = dirs::config_dir().map(|d| d.join("shellsense").join("config.yaml"))
    else {
        return Ok(EngineConfig::default());
    };
    if !default_path.exists() {
        return Ok(EngineConfig::default());
    }
    debug!(path = %default_path.display(), "Loading user config");
    EngineConfig::load(&default_path)
        .map_err(|err| format!("Failed to load config '{}': {err}", default_path.display()))
}

// ---------------------------------------------------------------------------
// Collaborators
// ---------------------------------------------------------------------------

/// Runs help probes through the platform shell with the configured timeout.
struct ShellRunner {
    timeout: std::time::Duration,
}

#[async_trait]
impl CommandRunner for ShellRunner {
    async fn run(&self, command_line: &str) -> shellsense_engine::Result<String> {
        let command_line = command_line.to_string();
        let timeout = self.timeout;
        let output = tokio::task::spawn_blocking(move || run_shell_command(&command_line, timeout))
            .await
            .map_err(|err| CollaboratorError::Failed(format!("probe task failed: {err}")))?;
        match output {
            Ok(text) => Ok(text),
            Err(ProbeError::Timeout(_)) => Err(CollaboratorError::Timeout),
            Err(err) => Err(CollaboratorError::Failed(err.to_string())),
        }
    }
}

fn open_store(ctx: &Context) -> Result<Arc<dyn KeyValueStore>, String> {
    if let Some(db) = &ctx.db {
        let store = SqliteStore::open(db, SQLITE_PREFIX)
            .map_err(|err| format!("Failed to open database '{}': {err}", db.display()))?;
        return Ok(Arc::new(store));
    }
    let dir = match &ctx.store_dir {
        Some(dir) => dir.clone(),
        None => dirs::data_dir()
            .map(|d| d.join("shellsense"))
            .ok_or("No data directory available; pass --store-dir or --db")?,
    };
    Ok(Arc::new(JsonFileStore::new(dir)))
}

/// An engine with persisted history and directories loaded.
async fn open_engine(ctx: &Context) -> Result<SuggestionEngine, String> {
    let store = open_store(ctx)?;
    let engine = SuggestionEngine::new(ctx.config.clone()).with_store(store);
    engine.load_persisted().await;
    Ok(engine)
}

// ---------------------------------------------------------------------------
// parse-help command
// ---------------------------------------------------------------------------

fn run_parse_help(args: ParseHelpArgs) -> Result<(), String> {
    let help_text = read_input(args.input.as_deref())?;
    let output = if args.document {
        let doc = parse_help_document(&help_text);
        if !doc.has_content() {
            return Err("No flags or subcommands found in help text".to_string());
        }
        render_document(&doc, args.format)?
    } else {
        let info = parse_help_text(&help_text);
        if !info.has_content() {
            return Err("No flags or subcommands found in help text".to_string());
        }
        render_document(&info, args.format)?
    };
    println!("{output}");
    Ok(())
}

// ---------------------------------------------------------------------------
// suggest command
// ---------------------------------------------------------------------------

async fn run_suggest(ctx: &Context, args: SuggestArgs) -> Result<(), String> {
    let engine = open_engine(ctx).await?;
    let cwd = match args.cwd {
        Some(cwd) => cwd,
        None => current_dir()?,
    };

    let mut options = SuggestOptions::default();
    if let Some(trigger) = args.trigger {
        options = options.with_trigger(trigger);
    }
    if args.auto {
        options = options.auto_triggered();
    }
    if !args.no_enrich {
        options = options.with_runner(Arc::new(ShellRunner {
            timeout: ctx.config.help_timeout(),
        }));
    }

    let suggestions = engine.suggestions(&args.input, &cwd, &options).await;
    match args.format {
        CliOutputFormat::Table => print!("{}", suggestion_table(&suggestions)),
        format => println!("{}", render_structured(&suggestions, format)?),
    }
    Ok(())
}

fn suggestion_table(suggestions: &[Suggestion]) -> String {
    let width = suggestions
        .iter()
        .map(|s| s.display_text.chars().count())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for s in suggestions {
        out.push_str(&format!(
            "{} {:<width$}  {}\n",
            s.kind.icon(),
            s.display_text,
            s.description
        ));
    }
    out
}

// ---------------------------------------------------------------------------
// quick-fix command
// ---------------------------------------------------------------------------

fn run_quick_fix(args: QuickFixArgs) -> Result<(), String> {
    let output = read_input(args.input.as_deref())?;
    let fixes = shellsense_engine::quick_fixes(&args.command, &output);
    match args.format {
        CliOutputFormat::Table => print!("{}", quick_fix_table(&fixes)),
        format => println!("{}", render_structured(&fixes, format)?),
    }
    Ok(())
}

fn quick_fix_table(fixes: &[QuickFixSuggestion]) -> String {
    let mut out = String::new();
    for fix in fixes {
        out.push_str(&format!("{}\n  $ {}\n  {}\n", fix.title, fix.command, fix.description));
    }
    out
}

// ---------------------------------------------------------------------------
// history / dirs commands
// ---------------------------------------------------------------------------

async fn run_history(ctx: &Context, args: HistoryArgs) -> Result<(), String> {
    let engine = open_engine(ctx).await?;
    match args.operation {
        HistoryOperation::Add(add) => {
            let cwd = match add.cwd {
                Some(cwd) => cwd,
                None => current_dir()?,
            };
            let mut entry = HistoryEntry::new(&add.command).with_directory(&cwd);
            if let Some(code) = add.exit_code {
                entry = entry.with_exit_code(code);
            }
            engine.record_command(entry).await;
            println!("Recorded ({} entries)", engine.history_len());
        }
        HistoryOperation::Search(search) => {
            let hits = engine.search_history(search.query.as_deref().unwrap_or_default());
            match search.format {
                CliOutputFormat::Table => {
                    for entry in &hits {
                        match entry.exit_code {
                            Some(code) if code != 0 => println!("{}  [exit {code}]", entry.command),
                            _ => println!("{}", entry.command),
                        }
                    }
                }
                format => println!("{}", render_structured(&hits, format)?),
            }
        }
    }
    Ok(())
}

async fn run_dirs(ctx: &Context, args: DirsArgs) -> Result<(), String> {
    let engine = open_engine(ctx).await?;
    match args.operation {
        DirsOperation::Add(add) => {
            engine.record_directory(&add.path).await;
            println!(
                "Recorded ({} directories)",
                engine.recent_directories().len()
            );
        }
        DirsOperation::Search(search) => {
            let hits = engine.search_directories(search.query.as_deref().unwrap_or_default());
            match search.format {
                CliOutputFormat::Table => {
                    for path in &hits {
                        println!("{path}");
                    }
                }
                format => println!("{}", render_structured(&hits, format)?),
            }
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Reads `path`, or stdin when no path is given.
fn read_input(path: Option<&Path>) -> Result<String, String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .map_err(|err| format!("Failed to read '{}': {err}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|err| format!("Failed to read stdin: {err}"))?;
            Ok(text)
        }
    }
}

fn current_dir() -> Result<String, String> {
    std::env::current_dir()
        .map(|p| p.to_string_lossy().into_owned())
        .map_err(|err| format!("Failed to read current directory: {err}"))
}

fn render_document<T: Serialize>(value: &T, format: DocumentFormat) -> Result<String, String> {
    match format {
        DocumentFormat::Json => serde_json::to_string_pretty(value)
            .map_err(|e| format!("Failed to serialize output: {e}")),
        DocumentFormat::Yaml => {
            serde_yaml::to_string(value).map_err(|e| format!("Failed to serialize output: {e}"))
        }
    }
}

/// JSON or YAML rendering; tables are printed by each command.
fn render_structured<T: Serialize>(value: &T, format: CliOutputFormat) -> Result<String, String> {
    match format {
        CliOutputFormat::Yaml => render_document(value, DocumentFormat::Yaml),
        CliOutputFormat::Json | CliOutputFormat::Table => {
            render_document(value, DocumentFormat::Json)
        }
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use shellsense_core::SuggestionType;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_store_flags_conflict() {
        let parsed = Cli::try_parse_from([
            "shellsense",
            "--db",
            "a.db",
            "--store-dir",
            "state",
            "dirs",
            "search",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_trigger_parses_as_char() {
        let cli =
            Cli::try_parse_from(["shellsense", "suggest", "git -", "--trigger", "-"]).unwrap();
        match cli.command {
            Command::Suggest(args) => assert_eq!(args.trigger, Some('-')),
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_suggestion_table_aligns_descriptions() {
        let rows = vec![
            Suggestion::new("-a", SuggestionType::Flag).with_description("All"),
            Suggestion::new("--amend", SuggestionType::Flag).with_description("Amend"),
        ];
        let table = suggestion_table(&rows);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "-- -a       All");
        assert_eq!(lines[1], "-- --amend  Amend");
    }
}
