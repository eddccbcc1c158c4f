//! engine::checkin
//!
//! Copy a project's edits to a module back into the library clone.
//!
//! # Steps
//!
//! 1. The library clone must be clean and already have the project's
//!    branch; the module must exist in the project.
//! 2. The project's branch is checked out in the clone.
//! 3. The module root is resolved in the clone.
//! 4. The project's copy is materialized over that root. When the root is
//!    the clone's top level, `.git` is moved aside for the duration.
//! 5. A file renamed to the root marker at checkout gets its name back.
//! 6. Deleted paths the kind's filter would never have copied to the project
//!    are restored from the branch head.
//! 7. Any resulting change is committed with the project commit it came from.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use super::{
    commit_if_changed, ensure_clean, io_error, module_and_kind, RelocatedGitDir, SyncError,
    SyncOutcome, SyncSession,
};
use crate::core::config::LibraryConfig;
use crate::core::filter::InclusionFilter;
use crate::core::materialize::{materialize, MaterializeError};
use crate::core::normalize::restore_singleton;
use crate::core::ops::CloneLock;
use crate::core::paths::LibraryPaths;
use crate::core::resolve::resolve;
use crate::git::Git;

/// Result of a checkin.
#[derive(Debug, Clone)]
pub struct CheckinReport {
    /// The project copy that was read
    pub source: PathBuf,
    /// The module root inside the library clone that was written
    pub library_root: PathBuf,
    /// Whether `.git` had to be moved aside
    pub relocated_git_dir: bool,
    /// Whether the original single-file name was restored
    pub restored_name: bool,
    /// Deleted paths that were put back because the filter excludes them
    pub restored_paths: Vec<PathBuf>,
    /// Whether the library clone got a commit
    pub outcome: SyncOutcome,
}

/// Check a project's copy of a module back into the library.
pub fn checkin(
    paths: &LibraryPaths,
    library: &LibraryConfig,
    session: &SyncSession,
) -> Result<CheckinReport, SyncError> {
    let (record, kind) = module_and_kind(library, &session.module)?;
    let filter = InclusionFilter::for_kind(&kind)?;

    let _lock = CloneLock::acquire(paths, &session.module)?;

    let clone = Git::open_exact(&record.clone)?;
    ensure_clean(&clone)?;
    if clone.branch_oid(session.project.as_str())?.is_none() {
        return Err(SyncError::MissingProjectBranch {
            project: session.project.to_string(),
            module: session.module.to_string(),
        });
    }

    let source = session.destination(&kind);
    if !source.is_dir() {
        return Err(module_not_in_project(session, &source));
    }
    let project = Git::open(&session.project_root)?;
    let project_head = project.head_commit()?;

    info!(module = %session.module, source = %source.display(), "checking in module");

    clone.checkout_branch(session.project.as_str(), false)?;
    let root = resolve(&record.clone, kind.root_marker(), &filter)?;
    let flat = root.path == record.clone;

    // Everything in the project's copy goes back, even files the filter
    // would not have copied out.
    drop(clone);
    {
        let guard = if flat {
            Some(
                RelocatedGitDir::relocate(&record.clone)
                    .map_err(io_error("failed to move git dir out of", &record.clone))?,
            )
        } else {
            None
        };

        materialize(&source, &root.path, &InclusionFilter::accept_all()).map_err(|e| match e {
            MaterializeError::SourceNotFound { .. } => module_not_in_project(session, &source),
            other => SyncError::from(other),
        })?;

        if let Some(guard) = guard {
            guard
                .restore()
                .map_err(io_error("failed to restore git dir of", &record.clone))?;
        }
    }
    let clone = Git::open_exact(&record.clone)?;

    let restored_name = match (kind.rename_pattern(), kind.root_marker(), &record.renamed_root_marker) {
        (Some(_), Some(marker), Some(original)) => restore_singleton(&root.path, marker, original)?,
        _ => false,
    };

    let root_in_clone = root
        .path
        .strip_prefix(&record.clone)
        .unwrap_or(Path::new(""))
        .to_path_buf();
    let restored_paths = restore_excluded_deletions(&clone, &root_in_clone, &filter)?;

    let message = format!(
        "Librarian: Update with {project}'s latest\n\n\t{project}@{hash}\n\tMessage:\n{body}",
        project = session.project,
        hash = project_head.oid,
        body = project_head.message.trim(),
    );
    let outcome = commit_if_changed(&clone, &message)?;

    Ok(CheckinReport {
        source,
        library_root: root.path,
        relocated_git_dir: flat,
        restored_name,
        restored_paths,
        outcome,
    })
}

/// Put back deleted paths that fall outside the filter.
///
/// Paths are judged relative to the module root, component by component,
/// the same way materialization judged them on the way out. Deleted paths
/// outside the module root are always restored.
fn restore_excluded_deletions(
    clone: &Git,
    root_in_clone: &Path,
    filter: &InclusionFilter,
) -> Result<Vec<PathBuf>, SyncError> {
    let excluded: Vec<PathBuf> = clone
        .pending_deletions()?
        .into_iter()
        .filter(|path| match path.strip_prefix(root_in_clone) {
            Ok(relative) => !filter.accepts_relative_path(relative),
            Err(_) => true,
        })
        .collect();

    if !excluded.is_empty() {
        debug!(count = excluded.len(), "restoring deletions outside the filter");
        clone.restore_paths(&excluded)?;
    }
    Ok(excluded)
}

fn module_not_in_project(session: &SyncSession, source: &Path) -> SyncError {
    SyncError::ModuleNotInProject {
        project: session.project.to_string(),
        module: session.module.to_string(),
        path: source.to_path_buf(),
    }
}
