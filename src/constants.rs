// src/constants.rs

/// The name of the application directory inside the system config directory.
pub const APP_DIR_NAME: &str = "procdeck";

/// The name of the TOML file holding the manager configuration (inside the app dir).
pub const CONFIG_FILENAME: &str = "config.toml";

/// The name of the JSON key-value file holding user preferences (inside the app dir).
pub const SETTINGS_FILENAME: &str = "settings.json";

/// The manifest that lists a project's runnable scripts.
pub const PACKAGE_MANIFEST_FILENAME: &str = "package.json";

/// Prefix placed in front of the script name to build the command line.
pub const DEFAULT_RUN_COMMAND: &str = "npm run";

/// Environment variables injected on POSIX hosts so tooling keeps emitting color.
pub const FORCE_COLOR_ENV: &[(&str, &str)] = &[("FORCE_COLOR", "1"), ("NPM_CONFIG_COLOR", "always")];

/// Interpreter used when `$SHELL` is not set.
pub const POSIX_FALLBACK_SHELL: &str = "/bin/bash";

/// Interpreter used by the synthetic entry when no shell could be discovered.
pub const POSIX_LAST_RESORT_SHELL: &str = "/bin/sh";

/// Interpreter used when `%COMSPEC%` is not set.
pub const WINDOWS_FALLBACK_SHELL: &str = "cmd.exe";

/// Well-known POSIX interpreters, in probing order, each with the locations to probe.
pub const POSIX_SHELL_CANDIDATES: &[(&str, &[&str])] = &[
    ("Bash", &["/bin/bash", "/usr/bin/bash"]),
    ("Zsh", &["/bin/zsh", "/usr/bin/zsh"]),
    ("Fish", &["/usr/bin/fish", "/bin/fish"]),
    ("Dash", &["/bin/dash", "/usr/bin/dash"]),
    ("Sh", &["/bin/sh", "/usr/bin/sh"]),
];

/// Fixed Windows interpreter list.
pub const WINDOWS_SHELL_CANDIDATES: &[(&str, &str)] = &[
    ("Command Prompt", "cmd.exe"),
    ("PowerShell", "powershell.exe"),
    ("PowerShell Core", "pwsh.exe"),
];

/// Display name of the interpreter taken from `%COMSPEC%`.
pub const SYSTEM_DEFAULT_SHELL_NAME: &str = "System Default";
/// Display name of the fallback entry listed when discovery finds nothing.
pub const SYNTHETIC_SHELL_NAME: &str = "Default Shell";

/// Size of the buffer used to read a child's output pipes.
pub const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Start of the stderr line reporting a spawn or wait failure.
pub const PROCESS_ERROR_PREFIX: &str = "Process error: ";
/// Start of the info line naming the signal that ended a process.
pub const SIGNAL_MESSAGE_PREFIX: &str = "Process terminated by signal: ";
