// src/cli/args.rs
use clap::Args;

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// The project directory. `~` and environment variables are expanded.
    pub dir: String,

    /// The scripts to run. All of them start at once.
    #[arg(required = true, num_args = 1..)]
    pub scripts: Vec<String>,

    /// Interpreter to use instead of the stored preference.
    #[arg(long, short)]
    pub shell: Option<String>,

    /// Display name of the project. Defaults to the directory name.
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct ShellArgs {
    /// New preferred interpreter path. Omit to print the current one.
    pub path: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct ScriptsArgs {
    /// The project directory. Defaults to the current directory.
    pub dir: Option<String>,
}
