//! Walks command-line tokens down the command/subcommand tree.
//!
//! `git remote add -` resolves to the key `git remote add` at depth 3, so
//! flag suggestions come from `add` rather than from `git`. Unknown keys are
//! learned by running `<key> --help` through the caller's [`CommandRunner`].

use std::sync::Arc;

use shellsense_core::CommandInfo;
use shellsense_discovery::parse_help_document;
use shellsense_discovery::probe::contains_shell_metacharacters;
use tracing::debug;

use crate::catalog::CommandCatalog;
use crate::collaborators::CommandRunner;

/// Outcome of a resolution walk.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Space-joined command path, e.g. `git remote add`. Empty when there
    /// was nothing to resolve.
    pub key: String,
    /// Metadata for `key`, when known.
    pub info: Option<Arc<CommandInfo>>,
    /// Number of leading tokens consumed as the command path.
    pub depth: usize,
}

impl Resolution {
    pub fn has_subcommands(&self) -> bool {
        self.info.as_ref().is_some_and(|i| i.has_subcommands())
    }

    /// Program name (first word of the key).
    pub fn program(&self) -> &str {
        self.key.split(' ').next().unwrap_or_default()
    }
}

/// Resolves `tokens` against `catalog`, learning unknown commands when a
/// runner is available.
pub async fn resolve(
    catalog: &CommandCatalog,
    tokens: &[String],
    runner: Option<&dyn CommandRunner>,
) -> Resolution {
    let Some(first) = tokens.first().filter(|t| !t.is_empty()) else {
        return Resolution::default();
    };

    let mut key = first.clone();
    let mut info = match catalog.get(&key) {
        Some(found) => Some(found),
        None => learn(catalog, &key, runner).await,
    };
    let mut depth = 1;

    for token in &tokens[1..] {
        if token.is_empty() || token.starts_with('-') {
            break;
        }
        let candidate = format!("{key} {token}");
        let next = match catalog.get(&candidate) {
            Some(found) => Some(found),
            None => {
                // Only probe tokens the parent actually lists; anything else
                // is an argument, not a subcommand.
                let listed = info
                    .as_ref()
                    .is_some_and(|parent| parent.subcommands.contains_key(token.as_str()));
                if listed {
                    learn(catalog, &candidate, runner).await
                } else {
                    None
                }
            }
        };

        match next {
            Some(found) => {
                key = candidate;
                info = Some(found);
                depth += 1;
            }
            None => break,
        }
    }

    Resolution { key, info, depth }
}

/// Runs `<key> --help`, parses it and caches the result when it has content.
async fn learn(
    catalog: &CommandCatalog,
    key: &str,
    runner: Option<&dyn CommandRunner>,
) -> Option<Arc<CommandInfo>> {
    let runner = runner?;
    if catalog.is_marked_unknown(key) {
        return None;
    }
    if contains_shell_metacharacters(key) {
        debug!(key, "Refusing to probe key with shell metacharacters");
        return None;
    }

    let command_line = format!("{key} --help");
    debug!(command = %command_line, "Probing help text");
    // A failed run (timeout, spawn error) says nothing about the command,
    // so it is retried on the next request instead of being remembered.
    let output = match runner.run(&command_line).await {
        Ok(output) => output,
        Err(err) => {
            debug!(key, error = %err, "Help command failed");
            return None;
        }
    };

    let doc = parse_help_document(&output);
    if !doc.has_content() {
        debug!(key, "Help text had no recognizable entries");
        catalog.mark_unknown(key);
        return None;
    }

    let info = CommandInfo::from_parsed_help(&doc);
    debug!(
        key,
        flags = info.flags.len(),
        subcommands = info.subcommands.len(),
        "Learned command"
    );
    if !catalog.learn(key, info) && !catalog.contains(key) {
        catalog.mark_unknown(key);
    }
    catalog.get(key)
}
