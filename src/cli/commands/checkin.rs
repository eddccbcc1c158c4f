//! checkin command - Copy a project's changes back into the library

use std::path::PathBuf;

use anyhow::Result;

use super::{display_path, open_library, sync_session, verbosity};
use crate::engine::{self, Context, SyncOutcome};
use crate::ui::output::{self, format_list};

/// Check a project's copy of a module back into the library.
pub fn checkin(
    ctx: &Context,
    project: &str,
    module: &str,
    project_root: Option<PathBuf>,
) -> Result<()> {
    let verbosity = verbosity(ctx);
    let session = sync_session(ctx, project, module, project_root)?;
    let (paths, config) = open_library()?;

    let report = engine::checkin(&paths, &config.library, &session)?;

    output::print(
        format!(
            "Copied module \"{}\" from {}",
            session.module,
            display_path(&report.source)
        ),
        verbosity,
    );
    if !report.restored_paths.is_empty() {
        let restored: Vec<_> = report
            .restored_paths
            .iter()
            .map(|p| p.display().to_string())
            .collect();
        output::print(
            format!(
                "Kept library files the project never receives:\n{}",
                format_list(&restored, "  ")
            ),
            verbosity,
        );
    }

    match &report.outcome {
        SyncOutcome::Committed { message, .. } => {
            output::print(format!("Commit complete:\n{}", message), verbosity)
        }
        SyncOutcome::NoChanges => output::print("No changes to apply", verbosity),
    }
    Ok(())
}
