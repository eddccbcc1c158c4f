//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Enable debug logging
//! - `--interactive` / `--no-interactive`: Control prompts
//! - `--quiet` / `-q`: Minimal output

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Librarian - vendor modules into projects from a library of git clones
#[derive(Parser, Debug)]
#[command(name = "librarian")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if librarian was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output; implies --no-interactive
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable interactive prompts
    #[arg(long = "interactive", global = true, conflicts_with = "no_interactive")]
    pub interactive_flag: bool,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_interactive: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }

    /// Determine if interactive mode is enabled.
    ///
    /// Returns true if:
    /// - `--interactive` was explicitly set, OR
    /// - Neither `--no-interactive` nor `--quiet` was set AND stdin is a TTY
    pub fn interactive(&self) -> bool {
        if self.interactive_flag {
            true
        } else if self.no_interactive || self.quiet {
            false
        } else {
            std::io::stdin().is_terminal()
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create or update a kind of project
    #[command(
        name = "config",
        long_about = "Create or update a kind of project.\n\n\
            A kind describes how modules are vendored into projects of one sort: \
            where they go, which files are copied, which file marks a module's \
            root, and whether a single-file module is renamed to that marker. \
            Patterns are regular expressions that must match a whole file or \
            directory name.\n\n\
            Without any option the current settings are shown and nothing is written.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Set up LOVE games: Lua sources and licenses, no tests or demos
    librarian config love --path src/lib/ \\
        --include-pattern '.*\\.lua|LICENSE.*' \\
        --exclude-pattern 'tests?|demos?' \\
        --root-marker init.lua \\
        --rename-single-file-root-marker '.*\\.lua'

    # Show the current settings for a kind
    librarian config love"
    )]
    Config {
        /// Kind name
        kind: String,

        /// Path inside a project where modules of this kind are placed
        #[arg(long = "path", value_name = "LIB_PATH")]
        lib_path: Option<String>,

        /// Regex matching the names of files to copy
        #[arg(long, value_name = "REGEX")]
        include_pattern: Option<String>,

        /// Regex matching file and directory names to skip; wins over --include-pattern
        #[arg(long, value_name = "REGEX")]
        exclude_pattern: Option<String>,

        /// File name marking the root of a module
        #[arg(long, value_name = "FILE")]
        root_marker: Option<String>,

        /// Regex selecting a lone file to rename to the root marker
        #[arg(long = "rename-single-file-root-marker", value_name = "REGEX")]
        rename_pattern: Option<String>,
    },

    /// Clone a module into the library
    #[command(
        name = "acquire",
        long_about = "Clone a module into the library.\n\n\
            The module is registered under the given kind and cloned into the \
            library. Its upstream master (or main) branch becomes the library's \
            master. If the module is already in the library, nothing is fetched; \
            use `librarian pull` to update it.",
        after_help = "\
WORKFLOW EXAMPLES:
    librarian acquire love windfield https://github.com/adnzzzzZ/windfield.git"
    )]
    Acquire {
        /// Kind the module belongs to
        kind: String,
        /// Module name
        module: String,
        /// Upstream clone URL
        url: String,
    },

    /// List modules in the library
    #[command(name = "list")]
    List {
        /// Only list modules of this kind
        #[arg(long)]
        kind: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Update a module in the library from upstream
    #[command(
        name = "pull",
        long_about = "Update a module in the library from upstream.\n\n\
            Fetches the remote and fast-forwards the library's master branch. \
            The library clone must be clean. Prints the new upstream commits, \
            oldest first.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Pull from origin
    librarian pull windfield

    # Pull from a fork
    librarian pull --remote fork windfield"
    )]
    Pull {
        /// Remote to pull from (default: origin, or the only remote)
        #[arg(long)]
        remote: Option<String>,
        /// Module name
        module: String,
    },

    /// Copy a module from the library into a project
    #[command(
        name = "checkout",
        long_about = "Copy a module from the library into a project.\n\n\
            The project repository must be clean. The module replaces whatever \
            is at <lib_path>/<module> in the project, and the change is committed \
            with a message naming the library commit it came from. In the library, \
            a branch named after the project records which version the project has.",
        after_help = "\
WORKFLOW EXAMPLES:
    # From inside the project
    cd ~/games/puppypark
    librarian checkout puppypark windfield"
    )]
    Checkout {
        /// Project name; also the branch name in the library
        project: String,
        /// Module name
        module: String,
        /// Project directory (default: working directory)
        #[arg(long)]
        project_root: Option<PathBuf>,
    },

    /// Copy a project's changes to a module back into the library
    #[command(
        name = "checkin",
        long_about = "Copy a project's changes to a module back into the library.\n\n\
            The module's library clone must be clean and have the project's \
            branch from an earlier checkout. The project's copy is committed onto \
            that branch. Files the kind never copies to projects are left alone.",
        after_help = "\
WORKFLOW EXAMPLES:
    cd ~/games/puppypark
    librarian checkin puppypark windfield"
    )]
    Checkin {
        /// Project name; also the branch name in the library
        project: String,
        /// Module name
        module: String,
        /// Project directory (default: working directory)
        #[arg(long)]
        project_root: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        long_about = "Generate shell completion scripts for tab-completion.\n\n\
            Outputs a completion script for the specified shell. Add the output \
            to your shell's configuration to enable tab-completion for librarian commands.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Bash (add to ~/.bashrc)
    librarian completion bash >> ~/.bashrc

    # Zsh (add to ~/.zshrc)
    librarian completion zsh >> ~/.zshrc

    # Fish
    librarian completion fish > ~/.config/fish/completions/librarian.fish

    # PowerShell
    librarian completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
