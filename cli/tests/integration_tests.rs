use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const BIN: &str = env!("CARGO_BIN_EXE_shellsense");

const TOOL_HELP: &str = "\
Usage: tool [OPTIONS] <COMMAND>

Commands:
  build    Compile the project
  clean    Remove build artifacts

Options:
  -v, --verbose          Verbose output
  -o, --output <FILE>    Write output to FILE
";

fn run(args: &[&str]) -> Output {
    Command::new(BIN)
        .args(args)
        .output()
        .expect("failed to run shellsense")
}

fn run_ok(args: &[&str]) -> String {
    let out = run(args);
    assert!(
        out.status.success(),
        "shellsense {args:?} failed: {}",
        String::from_utf8_lossy(&out.stderr)
    );
    String::from_utf8(out.stdout).expect("stdout is utf-8")
}

fn path_str(path: &Path) -> &str {
    path.to_str().expect("temp path is utf-8")
}

// ---------------------------------------------------------------------------
// parse-help
// ---------------------------------------------------------------------------

#[test]
fn parse_help_reads_file_and_prints_command_info() {
    let dir = tempfile::tempdir().unwrap();
    let help = dir.path().join("tool.txt");
    fs::write(&help, TOOL_HELP).unwrap();

    let stdout = run_ok(&["parse-help", "--input", path_str(&help)]);
    let info: serde_json::Value = serde_json::from_str(&stdout).unwrap();

    let flags: Vec<&str> = info["flags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f.as_str().unwrap())
        .collect();
    assert!(flags.contains(&"--output"));
    assert!(flags.contains(&"-v"));
    assert!(info["subcommands"]["build"].is_string());
}

#[test]
fn parse_help_rejects_text_without_entries() {
    let dir = tempfile::tempdir().unwrap();
    let help = dir.path().join("empty.txt");
    fs::write(&help, "nothing to see here\n").unwrap();

    let out = run(&["parse-help", "--input", path_str(&help)]);
    assert!(!out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.starts_with("error:"), "stderr: {stderr}");
}

// ---------------------------------------------------------------------------
// suggest
// ---------------------------------------------------------------------------

#[test]
fn suggest_completes_static_flags_as_json() {
    let state = tempfile::tempdir().unwrap();
    let stdout = run_ok(&[
        "--store-dir",
        path_str(state.path()),
        "suggest",
        "git commit --am",
        "--no-enrich",
        "--format",
        "json",
    ]);
    let suggestions: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(suggestions[0]["text"], "--amend");
    assert_eq!(suggestions[0]["type"], "flag");
}

#[test]
fn suggest_completes_paths_in_cwd() {
    let state = tempfile::tempdir().unwrap();
    let work = tempfile::tempdir().unwrap();
    fs::create_dir(work.path().join("src")).unwrap();
    fs::write(work.path().join("README.md"), "# hi\n").unwrap();

    let stdout = run_ok(&[
        "--store-dir",
        path_str(state.path()),
        "suggest",
        "cat ",
        "--cwd",
        path_str(work.path()),
        "--no-enrich",
        "--format",
        "json",
    ]);
    let suggestions: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    let texts: Vec<&str> = suggestions
        .as_array()
        .unwrap()
        .iter()
        .filter(|s| s["type"] != "flag")
        .map(|s| s["text"].as_str().unwrap())
        .collect();
    assert_eq!(texts, vec!["src/", "README.md"]);
}

#[test]
fn suggest_table_output_lists_subcommands() {
    let state = tempfile::tempdir().unwrap();
    let stdout = run_ok(&[
        "--store-dir",
        path_str(state.path()),
        "suggest",
        "git pu",
        "--no-enrich",
    ]);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].contains("pull"));
    assert!(lines[1].contains("push"));
}

// ---------------------------------------------------------------------------
// quick-fix
// ---------------------------------------------------------------------------

#[test]
fn quick_fix_reads_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("out.txt");
    fs::write(&output, "ModuleNotFoundError: No module named 'requests'\n").unwrap();

    let stdout = run_ok(&[
        "quick-fix",
        "--command",
        "python app.py",
        "--input",
        path_str(&output),
        "--format",
        "json",
    ]);
    let fixes: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(fixes.as_array().unwrap().len(), 1);
    assert_eq!(fixes[0]["command"], "pip install requests");
}

// ---------------------------------------------------------------------------
// history / dirs
// ---------------------------------------------------------------------------

#[test]
fn history_persists_in_store_dir() {
    let state = tempfile::tempdir().unwrap();
    let store = path_str(state.path());

    run_ok(&["--store-dir", store, "history", "add", "cargo test", "--cwd", "/w"]);
    run_ok(&["--store-dir", store, "history", "add", "git status", "--cwd", "/w"]);
    run_ok(&[
        "--store-dir",
        store,
        "history",
        "add",
        "cargo build",
        "--exit-code",
        "101",
    ]);

    let stdout = run_ok(&["--store-dir", store, "history", "search", "cargo"]);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, vec!["cargo test", "cargo build  [exit 101]"]);

    let all = run_ok(&["--store-dir", store, "history", "search"]);
    assert_eq!(all.lines().next(), Some("cargo build  [exit 101]"));
}

#[test]
fn history_persists_in_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("state.db");
    let db = path_str(&db);

    run_ok(&["--db", db, "history", "add", "make deploy"]);
    let stdout = run_ok(&["--db", db, "history", "search", "--format", "json"]);
    let entries: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(entries[0]["command"], "make deploy");
}

#[test]
fn history_programs_complete_command_names() {
    let state = tempfile::tempdir().unwrap();
    let store = path_str(state.path());
    let config = state.path().join("config.yaml");
    fs::write(&config, "scan_search_path: false\n").unwrap();

    run_ok(&["--store-dir", store, "history", "add", "zzfrob --fast"]);
    let stdout = run_ok(&[
        "--store-dir",
        store,
        "--config",
        path_str(&config),
        "suggest",
        "zzf",
        "--no-enrich",
        "--format",
        "json",
    ]);
    let suggestions: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(suggestions[0]["text"], "zzfrob");
    assert_eq!(suggestions[0]["type"], "history");
}

#[test]
fn dirs_add_and_search() {
    let state = tempfile::tempdir().unwrap();
    let store = path_str(state.path());

    run_ok(&["--store-dir", store, "dirs", "add", "/srv/app"]);
    run_ok(&["--store-dir", store, "dirs", "add", "/var/log"]);
    run_ok(&["--store-dir", store, "dirs", "add", "/srv/app"]);

    let all = run_ok(&["--store-dir", store, "dirs", "search"]);
    assert_eq!(all.lines().collect::<Vec<_>>(), vec!["/srv/app", "/var/log"]);

    let hits = run_ok(&["--store-dir", store, "dirs", "search", "log"]);
    assert_eq!(hits.lines().collect::<Vec<_>>(), vec!["/var/log"]);
}

#[test]
fn missing_config_file_is_an_error() {
    let out = run(&["--config", "/definitely/not/here.yaml", "dirs", "search"]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Failed to load config"));
}
