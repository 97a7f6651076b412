//! Known commands: a static table plus entries learned at runtime.
//!
//! Keys are either a program name (`git`) or a space-joined command path
//! (`git remote add`). Static entries are ground truth and always win over a
//! learned entry with the same key. Learned entries live for the lifetime of
//! the catalog.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use shellsense_core::{ArgumentKind, CommandInfo, validate_command_info};
use tracing::{debug, warn};

use crate::platform::Platform;

type Table = HashMap<&'static str, Arc<CommandInfo>>;

static COMMON_COMMANDS: LazyLock<Table> = LazyLock::new(common_commands);
static UNIX_COMMANDS: LazyLock<Table> = LazyLock::new(unix_commands);
static WINDOWS_COMMANDS: LazyLock<Table> = LazyLock::new(windows_commands);

/// Upper bound on remembered unknown keys. The set is cleared when full.
const MAX_UNKNOWN_KEYS: usize = 1024;

/// Static and learned command metadata.
#[derive(Debug)]
pub struct CommandCatalog {
    platform: Platform,
    learned: RwLock<HashMap<String, Arc<CommandInfo>>>,
    /// Keys whose help text parsed to nothing usable.
    unknown: RwLock<HashSet<String>>,
}

impl CommandCatalog {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            learned: RwLock::new(HashMap::new()),
            unknown: RwLock::new(HashSet::new()),
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    fn static_entry(&self, key: &str) -> Option<&'static Arc<CommandInfo>> {
        let platform_table: &'static Table = match self.platform {
            Platform::Unix => &UNIX_COMMANDS,
            Platform::Windows => &WINDOWS_COMMANDS,
        };
        COMMON_COMMANDS.get(key).or_else(|| platform_table.get(key))
    }

    /// Looks up `key`, preferring the static table.
    pub fn get(&self, key: &str) -> Option<Arc<CommandInfo>> {
        if let Some(info) = self.static_entry(key) {
            return Some(Arc::clone(info));
        }
        self.learned.read().get(key).cloned()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn is_static(&self, key: &str) -> bool {
        self.static_entry(key).is_some()
    }

    /// Stores a learned entry. Returns `false` when a static entry owns the
    /// key or `info` fails validation, in which case nothing changes.
    pub fn learn(&self, key: &str, info: CommandInfo) -> bool {
        if self.is_static(key) {
            debug!(key, "Ignoring learned entry for static command");
            return false;
        }
        let errors = validate_command_info(&info);
        if !errors.is_empty() {
            let errors: Vec<String> = errors.iter().map(ToString::to_string).collect();
            warn!(key, ?errors, "Rejecting invalid command metadata");
            return false;
        }
        self.unknown.write().remove(key);
        self.learned.write().insert(key.to_string(), Arc::new(info));
        true
    }

    /// Records that the help text for `key` had no usable metadata.
    pub fn mark_unknown(&self, key: &str) {
        let mut unknown = self.unknown.write();
        if unknown.len() >= MAX_UNKNOWN_KEYS && !unknown.contains(key) {
            debug!(entries = unknown.len(), "Unknown-command set full, clearing");
            unknown.clear();
        }
        unknown.insert(key.to_string());
    }

    pub fn is_marked_unknown(&self, key: &str) -> bool {
        self.unknown.read().contains(key)
    }

    pub fn learned_len(&self) -> usize {
        self.learned.read().len()
    }

    /// Top-level program names (keys without a space), sorted.
    pub fn program_names(&self) -> Vec<String> {
        let mut names: BTreeSet<String> = COMMON_COMMANDS
            .keys()
            .filter(|k| !k.contains(' '))
            .map(|k| (*k).to_string())
            .collect();
        let platform_table: &Table = match self.platform {
            Platform::Unix => &UNIX_COMMANDS,
            Platform::Windows => &WINDOWS_COMMANDS,
        };
        names.extend(
            platform_table
                .keys()
                .filter(|k| !k.contains(' '))
                .map(|k| (*k).to_string()),
        );
        names.extend(
            self.learned
                .read()
                .keys()
                .filter(|k| !k.contains(' '))
                .cloned(),
        );
        names.into_iter().collect()
    }
}

impl Default for CommandCatalog {
    fn default() -> Self {
        Self::new(Platform::host())
    }
}

// ---------------------------------------------------------------------------
// Static tables
// ---------------------------------------------------------------------------

fn insert(table: &mut Table, key: &'static str, info: CommandInfo) {
    table.insert(key, Arc::new(info));
}

/// Commands available on every platform.
fn common_commands() -> Table {
    let mut t = Table::new();

    insert(
        &mut t,
        "git",
        CommandInfo::new("Distributed version control system")
            .with_flag_entry("--version", None, "Print the git version", false)
            .with_flag_entry("--help", Some("-h"), "Show help", false)
            .with_value_flag("-C", None, "Run as if started in the given path")
            .with_value_flag("--git-dir", None, "Path to the repository directory")
            .with_flag_entry("--no-pager", None, "Do not pipe output into a pager", false)
            .with_subcommands(&[
                ("add", "Add file contents to the index"),
                ("branch", "List, create, or delete branches"),
                ("checkout", "Switch branches or restore working tree files"),
                ("clone", "Clone a repository into a new directory"),
                ("commit", "Record changes to the repository"),
                ("diff", "Show changes between commits and the working tree"),
                ("fetch", "Download objects and refs from another repository"),
                ("init", "Create an empty Git repository"),
                ("log", "Show commit logs"),
                ("merge", "Join two or more development histories together"),
                ("pull", "Fetch from and integrate with another repository"),
                ("push", "Update remote refs along with associated objects"),
                ("rebase", "Reapply commits on top of another base tip"),
                ("remote", "Manage set of tracked repositories"),
                ("reset", "Reset current HEAD to the specified state"),
                ("restore", "Restore working tree files"),
                ("stash", "Stash the changes in a dirty working directory away"),
                ("status", "Show the working tree status"),
                ("switch", "Switch branches"),
                ("tag", "Create, list, delete or verify a tag object"),
            ]),
    );
    insert(
        &mut t,
        "git add",
        CommandInfo::new("Add file contents to the index")
            .with_flag_entry(
                "--all",
                Some("-A"),
                "Add changes from all tracked and untracked files",
                false,
            )
            .with_flag_entry("--patch", Some("-p"), "Interactively choose hunks to stage", false)
            .with_flag_entry(
                "--update",
                Some("-u"),
                "Stage modified and deleted tracked files",
                false,
            )
            .with_flag_entry("--dry-run", Some("-n"), "Only show what would be added", false)
            .with_flag_entry("--force", Some("-f"), "Allow adding otherwise ignored files", false)
            .with_argument_kind(ArgumentKind::Path),
    );
    insert(
        &mut t,
        "git commit",
        CommandInfo::new("Record changes to the repository")
            .with_value_flag("--message", Some("-m"), "Use the given message as the commit message")
            .with_flag_entry("--all", Some("-a"), "Stage all modified and deleted files", false)
            .with_flag_entry("--amend", None, "Replace the tip of the current branch", false)
            .with_flag_entry(
                "--no-verify",
                Some("-n"),
                "Bypass pre-commit and commit-msg hooks",
                false,
            )
            .with_value_flag("--file", Some("-F"), "Take the commit message from the given file")
            .with_flag_entry("--signoff", Some("-s"), "Add a Signed-off-by trailer", false),
    );
    insert(
        &mut t,
        "git push",
        CommandInfo::new("Update remote refs along with associated objects")
            .with_flag_entry(
                "--set-upstream",
                Some("-u"),
                "Set upstream for the current branch",
                false,
            )
            .with_flag_entry("--force", Some("-f"), "Force updates", false)
            .with_flag_entry(
                "--force-with-lease",
                None,
                "Force only if the remote ref is as expected",
                false,
            )
            .with_flag_entry("--tags", None, "Push all tags", false)
            .with_flag_entry(
                "--dry-run",
                Some("-n"),
                "Do everything except actually send the updates",
                false,
            ),
    );
    insert(
        &mut t,
        "git pull",
        CommandInfo::new("Fetch from and integrate with another repository")
            .with_flag_entry(
                "--rebase",
                Some("-r"),
                "Rebase the current branch on top of the upstream",
                false,
            )
            .with_flag_entry("--ff-only", None, "Only fast-forward", false)
            .with_flag_entry("--all", None, "Fetch all remotes", false),
    );
    insert(
        &mut t,
        "git checkout",
        CommandInfo::new("Switch branches or restore working tree files")
            .with_value_flag("-b", None, "Create and check out a new branch")
            .with_value_flag("-B", None, "Create or reset and check out a branch")
            .with_flag_entry("--force", Some("-f"), "Throw away local modifications", false)
            .with_argument_kind(ArgumentKind::Path),
    );
    insert(
        &mut t,
        "git clone",
        CommandInfo::new("Clone a repository into a new directory")
            .with_value_flag("--branch", Some("-b"), "Check out the given branch")
            .with_value_flag("--depth", None, "Create a shallow clone with the given depth")
            .with_flag_entry("--recursive", None, "Initialize submodules in the clone", false)
            .with_flag_entry("--bare", None, "Make a bare repository", false)
            .with_argument_kind(ArgumentKind::Directory),
    );
    insert(
        &mut t,
        "git log",
        CommandInfo::new("Show commit logs")
            .with_flag_entry("--oneline", None, "One line per commit", false)
            .with_flag_entry("--graph", None, "Draw the commit graph", false)
            .with_flag_entry("--all", None, "Show all refs", false)
            .with_value_flag("--max-count", Some("-n"), "Limit the number of commits")
            .with_value_flag("--author", None, "Limit to commits by the given author")
            .with_flag_entry("--patch", Some("-p"), "Show the diff of each commit", false),
    );
    insert(
        &mut t,
        "git branch",
        CommandInfo::new("List, create, or delete branches")
            .with_flag_entry("--all", Some("-a"), "List local and remote branches", false)
            .with_flag_entry("--delete", Some("-d"), "Delete a branch", false)
            .with_flag_entry("-D", None, "Force delete a branch", false)
            .with_flag_entry("--move", Some("-m"), "Rename a branch", false)
            .with_flag_entry(
                "--verbose",
                Some("-v"),
                "Show hash and subject for each branch",
                false,
            ),
    );
    insert(
        &mut t,
        "git stash",
        CommandInfo::new("Stash the changes in a dirty working directory away")
            .with_subcommands(&[
                ("apply", "Apply a stash without removing it"),
                ("drop", "Remove a single stash entry"),
                ("list", "List stash entries"),
                ("pop", "Apply and remove a stash"),
                ("push", "Save local modifications to a new stash"),
                ("show", "Show the changes recorded in a stash"),
            ]),
    );
    insert(
        &mut t,
        "git remote",
        CommandInfo::new("Manage set of tracked repositories")
            .with_flag_entry("--verbose", Some("-v"), "Show remote URLs", false)
            .with_subcommands(&[
                ("add", "Add a remote"),
                ("remove", "Remove a remote"),
                ("rename", "Rename a remote"),
                ("set-url", "Change the URL of a remote"),
                ("show", "Show information about a remote"),
            ]),
    );
    insert(
        &mut t,
        "git remote add",
        CommandInfo::new("Add a remote")
            .with_value_flag("-t", None, "Track only the given branch")
            .with_value_flag("-m", None, "Set the remote HEAD to the given branch")
            .with_flag_entry("-f", None, "Fetch the remote immediately", false)
            .with_flag_entry("--tags", None, "Import every tag from the remote", false)
            .with_flag_entry("--no-tags", None, "Do not import tags", false),
    );

    insert(
        &mut t,
        "cargo",
        CommandInfo::new("Rust's package manager")
            .with_flag_entry("--version", Some("-V"), "Print version info", false)
            .with_flag_entry("--verbose", Some("-v"), "Use verbose output", false)
            .with_flag_entry("--quiet", Some("-q"), "Do not print cargo log messages", false)
            .with_flag_entry("--help", Some("-h"), "Print help", false)
            .with_subcommands(&[
                ("add", "Add dependencies to a manifest file"),
                ("build", "Compile the current package"),
                ("check", "Analyze the current package and report errors"),
                ("clean", "Remove the target directory"),
                ("doc", "Build this package's documentation"),
                ("init", "Create a new cargo package in an existing directory"),
                ("new", "Create a new cargo package"),
                ("run", "Run a binary or example of the local package"),
                ("test", "Run the tests"),
                ("update", "Update dependencies listed in Cargo.lock"),
            ]),
    );
    insert(
        &mut t,
        "cargo build",
        CommandInfo::new("Compile the current package")
            .with_flag_entry("--release", Some("-r"), "Build artifacts in release mode", false)
            .with_value_flag("--package", Some("-p"), "Package to build")
            .with_value_flag("--features", Some("-F"), "Space or comma separated list of features")
            .with_flag_entry("--all-features", None, "Activate all available features", false)
            .with_value_flag("--target-dir", None, "Directory for all generated artifacts")
            .with_value_flag("--manifest-path", None, "Path to Cargo.toml"),
    );
    insert(
        &mut t,
        "cargo test",
        CommandInfo::new("Run the tests")
            .with_flag_entry("--release", Some("-r"), "Build artifacts in release mode", false)
            .with_value_flag("--package", Some("-p"), "Package to run tests for")
            .with_flag_entry("--no-run", None, "Compile, but don't run tests", false)
            .with_flag_entry("--workspace", None, "Test all packages in the workspace", false)
            .with_flag_entry("--doc", None, "Test only this library's documentation", false),
    );

    insert(
        &mut t,
        "npm",
        CommandInfo::new("JavaScript package manager")
            .with_flag_entry("--version", Some("-v"), "Print the npm version", false)
            .with_subcommands(&[
                ("ci", "Clean install a project"),
                ("init", "Create a package.json file"),
                ("install", "Install a package"),
                ("publish", "Publish a package"),
                ("run", "Run arbitrary package scripts"),
                ("test", "Test a package"),
                ("uninstall", "Remove a package"),
                ("update", "Update packages"),
            ]),
    );
    insert(
        &mut t,
        "npm install",
        CommandInfo::new("Install a package")
            .with_flag_entry("--save-dev", Some("-D"), "Save to devDependencies", false)
            .with_flag_entry("--global", Some("-g"), "Install globally", false)
            .with_flag_entry("--save-exact", Some("-E"), "Save an exact version", false)
            .with_flag_entry("--no-save", None, "Do not save to package.json", false),
    );

    insert(
        &mut t,
        "docker",
        CommandInfo::new("Container runtime")
            .with_flag_entry("--version", Some("-v"), "Print version information", false)
            .with_value_flag("--context", Some("-c"), "Name of the context to use")
            .with_subcommands(&[
                ("build", "Build an image from a Dockerfile"),
                ("compose", "Define and run multi-container applications"),
                ("exec", "Execute a command in a running container"),
                ("images", "List images"),
                ("logs", "Fetch the logs of a container"),
                ("ps", "List containers"),
                ("pull", "Download an image from a registry"),
                ("push", "Upload an image to a registry"),
                ("rm", "Remove one or more containers"),
                ("run", "Create and run a new container from an image"),
                ("stop", "Stop one or more running containers"),
            ]),
    );
    insert(
        &mut t,
        "docker run",
        CommandInfo::new("Create and run a new container from an image")
            .with_flag_entry("--detach", Some("-d"), "Run container in background", false)
            .with_flag_entry("--interactive", Some("-i"), "Keep STDIN open", false)
            .with_flag_entry("--tty", Some("-t"), "Allocate a pseudo-TTY", false)
            .with_flag_entry("--rm", None, "Remove the container when it exits", false)
            .with_value_flag("--name", None, "Assign a name to the container")
            .with_value_flag("--publish", Some("-p"), "Publish a container's port to the host")
            .with_value_flag("--volume", Some("-v"), "Bind mount a volume")
            .with_value_flag("--env", Some("-e"), "Set environment variables")
            .with_value_flag("--workdir", Some("-w"), "Working directory inside the container"),
    );
    insert(
        &mut t,
        "docker build",
        CommandInfo::new("Build an image from a Dockerfile")
            .with_value_flag("--tag", Some("-t"), "Name and optionally a tag")
            .with_value_flag("--file", Some("-f"), "Name of the Dockerfile")
            .with_flag_entry("--no-cache", None, "Do not use cache when building", false)
            .with_argument_kind(ArgumentKind::Directory),
    );

    insert(
        &mut t,
        "ssh",
        CommandInfo::new("OpenSSH remote login client")
            .with_value_flag("-i", None, "Identity file for public key authentication")
            .with_value_flag("-p", None, "Port to connect to on the remote host")
            .with_value_flag("-l", None, "User to log in as")
            .with_value_flag("-L", None, "Local port forwarding")
            .with_value_flag("-F", None, "Alternative per-user configuration file")
            .with_flags(&["-v", "-A", "-N", "-T"]),
    );
    insert(
        &mut t,
        "python",
        CommandInfo::new("Python interpreter")
            .with_value_flag("-m", None, "Run library module as a script")
            .with_value_flag("-c", None, "Program passed in as string")
            .with_flags(&["-V", "--version", "-u", "-i"])
            .with_argument_kind(ArgumentKind::File),
    );
    insert(
        &mut t,
        "pip",
        CommandInfo::new("Python package installer")
            .with_flags(&["--version", "--help"])
            .with_subcommands(&[
                ("freeze", "Output installed packages in requirements format"),
                ("install", "Install packages"),
                ("list", "List installed packages"),
                ("show", "Show information about installed packages"),
                ("uninstall", "Uninstall packages"),
            ]),
    );
    insert(
        &mut t,
        "pip install",
        CommandInfo::new("Install packages")
            .with_value_flag(
                "--requirement",
                Some("-r"),
                "Install from the given requirements file",
            )
            .with_flag_entry("--upgrade", Some("-U"), "Upgrade all specified packages", false)
            .with_flag_entry("--user", None, "Install to the user site directory", false)
            .with_flag_entry("--editable", Some("-e"), "Install a project in editable mode", false),
    );

    t
}

/// Unix userland commands.
fn unix_commands() -> Table {
    let mut t = Table::new();

    insert(
        &mut t,
        "ls",
        CommandInfo::new("List directory contents")
            .with_flags(&["-l", "-a", "-A", "-h", "-R", "-t", "-S", "-r", "-1", "--color"])
            .with_argument_kind(ArgumentKind::Path),
    );
    insert(
        &mut t,
        "cd",
        CommandInfo::new("Change the working directory")
            .with_argument_kind(ArgumentKind::Directory),
    );
    insert(
        &mut t,
        "cat",
        CommandInfo::new("Concatenate files and print on the standard output")
            .with_flags(&["-n", "-b", "-A", "-s"])
            .with_argument_kind(ArgumentKind::File),
    );
    insert(
        &mut t,
        "less",
        CommandInfo::new("View file contents one screen at a time")
            .with_flags(&["-N", "-S", "-R", "-i"])
            .with_argument_kind(ArgumentKind::File),
    );
    insert(
        &mut t,
        "cp",
        CommandInfo::new("Copy files and directories")
            .with_flags(&["-r", "-R", "-f", "-i", "-n", "-v", "-p", "-a"])
            .with_argument_kind(ArgumentKind::Path),
    );
    insert(
        &mut t,
        "mv",
        CommandInfo::new("Move or rename files")
            .with_flags(&["-f", "-i", "-n", "-v"])
            .with_argument_kind(ArgumentKind::Path),
    );
    insert(
        &mut t,
        "rm",
        CommandInfo::new("Remove files or directories")
            .with_flags(&["-r", "-R", "-f", "-i", "-v", "-d"])
            .with_argument_kind(ArgumentKind::Path),
    );
    insert(
        &mut t,
        "mkdir",
        CommandInfo::new("Make directories")
            .with_flags(&["-p", "-v"])
            .with_value_flag("-m", None, "Set file mode")
            .with_argument_kind(ArgumentKind::Directory),
    );
    insert(
        &mut t,
        "rmdir",
        CommandInfo::new("Remove empty directories")
            .with_flags(&["-p", "-v"])
            .with_argument_kind(ArgumentKind::Directory),
    );
    insert(
        &mut t,
        "touch",
        CommandInfo::new("Change file timestamps or create empty files")
            .with_flags(&["-a", "-m", "-c"])
            .with_argument_kind(ArgumentKind::File),
    );
    insert(
        &mut t,
        "chmod",
        CommandInfo::new("Change file mode bits")
            .with_flags(&["-R", "-v", "-c"])
            .with_argument_kind(ArgumentKind::Path),
    );
    insert(
        &mut t,
        "grep",
        CommandInfo::new("Print lines that match patterns")
            .with_flags(&["-i", "-r", "-R", "-n", "-v", "-l", "-c", "-w", "-E", "-F"])
            .with_value_flag("--include", None, "Search only files matching the glob")
            .with_value_flag("--exclude", None, "Skip files matching the glob")
            .with_argument_kind(ArgumentKind::Path),
    );
    insert(
        &mut t,
        "find",
        CommandInfo::new("Search for files in a directory hierarchy")
            .with_value_flag("-name", None, "Base of file name matches the pattern")
            .with_value_flag("-type", None, "File is of the given type")
            .with_value_flag("-maxdepth", None, "Descend at most the given number of levels")
            .with_flags(&["-delete", "-print"])
            .with_argument_kind(ArgumentKind::Directory),
    );
    insert(
        &mut t,
        "tar",
        CommandInfo::new("Archive files")
            .with_flags(&["-c", "-x", "-t", "-v", "-z", "-j"])
            .with_value_flag("-f", None, "Use the given archive file")
            .with_value_flag("-C", None, "Change to the given directory")
            .with_argument_kind(ArgumentKind::Path),
    );
    insert(
        &mut t,
        "sudo",
        CommandInfo::new("Execute a command as another user")
            .with_value_flag("-u", None, "Run the command as the given user")
            .with_flags(&["-i", "-s", "-E", "-k"]),
    );
    insert(
        &mut t,
        "vim",
        CommandInfo::new("Vi IMproved, a programmer's text editor")
            .with_flags(&["-R", "-d", "-o", "-O"])
            .with_argument_kind(ArgumentKind::File),
    );

    t
}

/// Windows console commands.
fn windows_commands() -> Table {
    let mut t = Table::new();

    insert(
        &mut t,
        "dir",
        CommandInfo::new("Display a list of files and subdirectories")
            .with_flags(&["/a", "/b", "/s", "/w", "/o"])
            .with_argument_kind(ArgumentKind::Path),
    );
    insert(
        &mut t,
        "cd",
        CommandInfo::new("Display or change the current directory")
            .with_argument_kind(ArgumentKind::Directory),
    );
    insert(
        &mut t,
        "type",
        CommandInfo::new("Display the contents of a text file")
            .with_argument_kind(ArgumentKind::File),
    );
    insert(
        &mut t,
        "copy",
        CommandInfo::new("Copy one or more files")
            .with_flags(&["/y", "/-y", "/v"])
            .with_argument_kind(ArgumentKind::Path),
    );
    insert(
        &mut t,
        "del",
        CommandInfo::new("Delete one or more files")
            .with_flags(&["/p", "/f", "/s", "/q"])
            .with_argument_kind(ArgumentKind::File),
    );
    insert(
        &mut t,
        "mkdir",
        CommandInfo::new("Create a directory").with_argument_kind(ArgumentKind::Directory),
    );
    insert(&mut t, "cls", CommandInfo::new("Clear the screen"));
    insert(
        &mut t,
        "ipconfig",
        CommandInfo::new("Display IP network configuration")
            .with_flags(&["/all", "/release", "/renew", "/flushdns"]),
    );
    insert(
        &mut t,
        "tasklist",
        CommandInfo::new("Display running processes").with_flags(&["/v", "/svc", "/fi"]),
    );

    t
}
