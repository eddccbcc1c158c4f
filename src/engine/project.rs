//! engine::project
//!
//! Locating the project a checkout or checkin is for.
//!
//! Projects have no record in the library; a project is just the directory
//! the command runs against. As a guard against syncing into the wrong
//! repository, a path that does not mention the project's name needs the
//! user's confirmation.

use std::path::{Path, PathBuf};

use tracing::debug;

use super::SyncError;
use crate::core::types::ProjectName;
use crate::ui::prompts::{Confirm, PromptError};

/// Confirm that `root` is where `project` lives.
///
/// Returns `root` unchanged when its path contains the project name, or
/// when `confirm` agrees it's the right place.
///
/// # Errors
///
/// - [`SyncError::WrongPlace`] if the user declines or can't be asked
pub fn locate_project(
    project: &ProjectName,
    root: &Path,
    confirm: &dyn Confirm,
) -> Result<PathBuf, SyncError> {
    if root.to_string_lossy().contains(project.as_str()) {
        return Ok(root.to_path_buf());
    }

    let question = format!(
        "Current path ({}) doesn't contain name of project '{}'. Are you in the right place?",
        root.display(),
        project
    );
    let confirmed = match confirm.confirm(&question, false) {
        Ok(answer) => answer,
        Err(PromptError::NotInteractive) | Err(PromptError::Cancelled) => false,
        Err(e) => return Err(e.into()),
    };

    if confirmed {
        debug!(project = %project, root = %root.display(), "project location confirmed");
        Ok(root.to_path_buf())
    } else {
        Err(SyncError::WrongPlace {
            project: project.to_string(),
            path: root.to_path_buf(),
        })
    }
}
