//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Validates command-specific arguments
//! 2. Loads the library configuration once
//! 3. Calls the engine to execute the command
//! 4. Writes the configuration back if the engine succeeded and changed it
//! 5. Formats and displays output
//!
//! Handlers do NOT touch repositories directly.

mod acquire;
mod checkin;
mod checkout;
mod completion;
mod config_cmd;
mod list;
mod pull;

// Re-export command functions for testing and direct invocation
pub use acquire::acquire;
pub use checkin::checkin;
pub use checkout::checkout;
pub use completion::completion;
pub use config_cmd::config;
pub use list::list;
pub use pull::pull;

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use crate::cli::args::Command;
use crate::core::config::Config;
use crate::core::paths::LibraryPaths;
use crate::engine::{self, Context, SyncSession};
use crate::ui::output::Verbosity;
use crate::ui::prompts::TerminalConfirm;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Config {
            kind,
            lib_path,
            include_pattern,
            exclude_pattern,
            root_marker,
            rename_pattern,
        } => config_cmd::config(
            ctx,
            &kind,
            engine::KindUpdate {
                lib_path,
                include_pattern,
                exclude_pattern,
                root_marker,
                rename_pattern,
            },
        ),
        Command::Acquire { kind, module, url } => acquire::acquire(ctx, &kind, &module, &url),
        Command::List { kind, json } => list::list(ctx, kind.as_deref(), json),
        Command::Pull { remote, module } => pull::pull(ctx, &module, remote.as_deref()),
        Command::Checkout {
            project,
            module,
            project_root,
        } => checkout::checkout(ctx, &project, &module, project_root),
        Command::Checkin {
            project,
            module,
            project_root,
        } => checkin::checkin(ctx, &project, &module, project_root),
        Command::Completion { shell } => completion::completion(shell),
    }
}

/// Verbosity for user-facing output.
fn verbosity(ctx: &Context) -> Verbosity {
    Verbosity::from_flags(ctx.quiet, ctx.debug)
}

/// Locate the library and load its configuration.
fn open_library() -> Result<(LibraryPaths, Config)> {
    let paths = LibraryPaths::discover().context("Failed to locate the library")?;
    let config = Config::load(&paths).context("Failed to load library config")?;
    Ok((paths, config))
}

/// Build the session for checkout/checkin, confirming the project location.
fn sync_session(
    ctx: &Context,
    project: &str,
    module: &str,
    project_root: Option<PathBuf>,
) -> Result<SyncSession> {
    let project = crate::core::types::ProjectName::new(project)?;
    let module = crate::core::types::ModuleName::new(module)?;

    let cwd = ctx
        .working_dir()
        .context("Failed to determine working directory")?;
    let root = match project_root {
        Some(root) => cwd.join(root),
        None => cwd,
    };

    let confirm = TerminalConfirm {
        interactive: ctx.interactive,
    };
    let project_root = engine::locate_project(&project, &root, &confirm)?;

    Ok(SyncSession {
        project,
        module,
        project_root,
    })
}

/// Show a path with the home directory abbreviated to `~`.
fn display_path(path: &std::path::Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(rest) = path.strip_prefix(&home) {
            return std::path::Path::new("~").join(rest).display().to_string();
        }
    }
    path.display().to_string()
}
