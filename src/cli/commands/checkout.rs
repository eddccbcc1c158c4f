//! checkout command - Copy a module from the library into a project

use std::path::PathBuf;

use anyhow::{Context as _, Result};

use super::{display_path, open_library, sync_session, verbosity};
use crate::engine::{self, BranchUpdate, Context, SyncOutcome};
use crate::ui::output;

/// Check a module out into a project and commit it there.
pub fn checkout(
    ctx: &Context,
    project: &str,
    module: &str,
    project_root: Option<PathBuf>,
) -> Result<()> {
    let verbosity = verbosity(ctx);
    let session = sync_session(ctx, project, module, project_root)?;
    let (paths, mut config) = open_library()?;

    let report = engine::checkout(&paths, &mut config.library, &session)?;

    output::print(
        format!(
            "Copied {} module \"{}\" into {}",
            report.kind,
            session.module,
            display_path(&report.destination)
        ),
        verbosity,
    );
    match report.branch {
        BranchUpdate::Created => output::print(
            format!(
                "Created branch \"{}\" in library for module \"{}\".",
                session.project, session.module
            ),
            verbosity,
        ),
        BranchUpdate::FastForwarded => output::print(
            format!(
                "Updated branch \"{}\" in library to master.",
                session.project
            ),
            verbosity,
        ),
        BranchUpdate::Diverged => output::warn(
            format!(
                "branch \"{}\" and master have diverged in the library; checked out the branch as is",
                session.project
            ),
            verbosity,
        ),
        BranchUpdate::UpToDate | BranchUpdate::Ahead => {}
    }
    if let Some(original) = &report.renamed_from {
        output::print(format!("Renamed {} to the module's root marker.", original), verbosity);
    }

    match &report.outcome {
        SyncOutcome::Committed { message, .. } => {
            output::print(format!("Commit complete:\n{}", message), verbosity)
        }
        SyncOutcome::NoChanges => output::print("No changes to apply", verbosity),
    }

    config.save().context("Failed to write library config")?;
    Ok(())
}
