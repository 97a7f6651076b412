//! Remedial commands derived from a failed command's output.
//!
//! Each detector looks for one error signature. Detectors are independent:
//! several may fire for the same output, and each contributes at most one
//! fix. Duplicate commands are dropped.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use shellsense_core::QuickFixSuggestion;

static UPSTREAM_HINT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"git push --set-upstream (\S+) (\S+)").expect("static regex must compile")
});

static NODE_MODULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"Cannot find module ['"]([^'"]+)['"]"#).expect("static regex must compile")
});

static PYTHON_MODULE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"No module named ['"]?([A-Za-z0-9_][A-Za-z0-9_.\-]*)['"]?"#)
        .expect("static regex must compile")
});

/// Shell style (`cat: x: No such file or directory`) or Python style
/// (`[Errno 2] No such file or directory: 'x'`).
static MISSING_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?:'([^']+)'|"([^"]+)"|([^\s:'"]+)): No such file or directory"#,
        r#"|No such file or directory: (?:'([^']+)'|"([^"]+)")"#,
    ))
    .expect("static regex must compile")
});

static GIT_TYPO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"git: '([^']+)' is not a git command").expect("static regex must compile")
});

/// Runs every detector over `output` of the failed `command`.
///
/// # Examples
///
/// ```
/// use shellsense_engine::quick_fixes;
///
/// let fixes = quick_fixes("python app.py", "ModuleNotFoundError: No module named 'requests'");
/// assert_eq!(fixes.len(), 1);
/// assert_eq!(fixes[0].command, "pip install requests");
/// ```
pub fn quick_fixes(command: &str, output: &str) -> Vec<QuickFixSuggestion> {
    let detectors: [fn(&str, &str) -> Option<QuickFixSuggestion>; 8] = [
        missing_upstream,
        missing_node_module,
        missing_python_module,
        permission_denied,
        missing_path,
        not_a_git_repository,
        missing_manifest,
        git_similar_command,
    ];

    let mut fixes: Vec<QuickFixSuggestion> = Vec::new();
    for detect in detectors {
        if let Some(fix) = detect(command, output)
            && !fixes.iter().any(|f| f.command == fix.command)
        {
            fixes.push(fix);
        }
    }
    fixes
}

fn missing_upstream(_command: &str, output: &str) -> Option<QuickFixSuggestion> {
    if !output.contains("has no upstream branch") {
        return None;
    }
    let fix = match UPSTREAM_HINT.captures(output) {
        Some(caps) => format!("git push --set-upstream {} {}", &caps[1], &caps[2]),
        None => "git push --set-upstream origin HEAD".to_string(),
    };
    Some(QuickFixSuggestion::new(
        "Set upstream and push",
        fix,
        "The current branch has no upstream branch",
    ))
}

fn missing_node_module(_command: &str, output: &str) -> Option<QuickFixSuggestion> {
    let module = NODE_MODULE
        .captures_iter(output)
        .map(|caps| caps[1].to_string())
        .find(|m| !m.starts_with('.') && !m.starts_with('/'))?;
    let package = package_name(&module);
    Some(QuickFixSuggestion::new(
        "Install missing Node module",
        format!("npm install {package}"),
        "A required Node.js module is not installed",
    ))
}

/// `lodash/fp` installs as `lodash`; `@scope/pkg/sub` as `@scope/pkg`.
fn package_name(module: &str) -> String {
    let mut parts = module.split('/');
    match parts.next() {
        Some(scope) if scope.starts_with('@') => match parts.next() {
            Some(name) => format!("{scope}/{name}"),
            None => scope.to_string(),
        },
        Some(name) => name.to_string(),
        None => module.to_string(),
    }
}

fn missing_python_module(_command: &str, output: &str) -> Option<QuickFixSuggestion> {
    let caps = PYTHON_MODULE.captures(output)?;
    let top_level = caps[1].split('.').next().unwrap_or(&caps[1]).to_string();
    if top_level.is_empty() {
        return None;
    }
    Some(QuickFixSuggestion::new(
        "Install missing Python module",
        format!("pip install {top_level}"),
        "A required Python module is not installed",
    ))
}

fn permission_denied(command: &str, output: &str) -> Option<QuickFixSuggestion> {
    let command = command.trim();
    if command.is_empty() || !output.contains("Permission denied") {
        return None;
    }
    if command == "sudo" || command.starts_with("sudo ") {
        return None;
    }
    Some(QuickFixSuggestion::new(
        "Retry with sudo",
        format!("sudo {command}"),
        "The command was denied permission",
    ))
}

fn missing_path(_command: &str, output: &str) -> Option<QuickFixSuggestion> {
    let caps = MISSING_PATH.captures(output)?;
    let path = (1..=5).find_map(|group| caps.get(group))?.as_str();
    if Path::new(path).extension().is_some() {
        Some(QuickFixSuggestion::new(
            "Create the missing file",
            format!("touch {path}"),
            "The file does not exist",
        ))
    } else {
        Some(QuickFixSuggestion::new(
            "Create the missing directory",
            format!("mkdir -p {path}"),
            "The directory does not exist",
        ))
    }
}

fn not_a_git_repository(_command: &str, output: &str) -> Option<QuickFixSuggestion> {
    if !output.to_lowercase().contains("not a git repository") {
        return None;
    }
    Some(QuickFixSuggestion::new(
        "Initialize a git repository",
        "git init",
        "The current directory is not inside a git repository",
    ))
}

fn missing_manifest(_command: &str, output: &str) -> Option<QuickFixSuggestion> {
    if output.contains("could not find `Cargo.toml`") {
        return Some(QuickFixSuggestion::new(
            "Create a Cargo package",
            "cargo init",
            "No Cargo.toml was found in this directory or any parent",
        ));
    }
    let lower = output.to_lowercase();
    if lower.contains("package.json")
        && (lower.contains("enoent") || lower.contains("could not read"))
    {
        return Some(QuickFixSuggestion::new(
            "Create a package.json",
            "npm init -y",
            "No package.json was found in this directory",
        ));
    }
    None
}

fn git_similar_command(command: &str, output: &str) -> Option<QuickFixSuggestion> {
    let mut lines = output.lines();
    lines.find(|line| line.contains("The most similar command"))?;
    let suggested = lines.map(str::trim).find(|line| !line.is_empty())?;

    let fixed = match GIT_TYPO.captures(output) {
        Some(caps) if command.contains(&caps[1]) => command.replacen(&caps[1], suggested, 1),
        _ => format!("git {suggested}"),
    };
    Some(QuickFixSuggestion::new(
        "Run the suggested git command",
        fixed,
        "Git suggested a similarly named command",
    ))
}
