//! engine::checkout
//!
//! Copy a module from the library into a project.
//!
//! # Steps
//!
//! 1. The project repository must be clean.
//! 2. The per-project branch in the library clone is created from `master`,
//!    or fast-forwarded to it, and checked out.
//! 3. The module root is resolved in the clone.
//! 4. The root is materialized into `<project>/<lib_path>/<module>`.
//! 5. A lone file is renamed to the root marker if the kind asks for it, and
//!    the original name is recorded on the module.
//! 6. Any resulting change in the project is committed with the upstream
//!    commit it came from.

use std::path::PathBuf;

use tracing::{info, warn};

use super::{commit_if_changed, ensure_clean, module_and_kind, SyncError, SyncOutcome, SyncSession};
use crate::core::config::LibraryConfig;
use crate::core::filter::{InclusionFilter, Pattern};
use crate::core::materialize::materialize;
use crate::core::normalize::normalize_if_singleton;
use crate::core::ops::CloneLock;
use crate::core::paths::LibraryPaths;
use crate::core::resolve::resolve;
use crate::core::types::ProjectName;
use crate::git::{CommitInfo, Git, GitError, MAINLINE_BRANCH};

/// What happened to the per-project branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchUpdate {
    /// The branch did not exist and was created at `master`.
    Created,
    /// The branch was behind `master` and moved up to it.
    FastForwarded,
    /// The branch already pointed at `master`.
    UpToDate,
    /// The branch already contains `master` plus project checkins.
    Ahead,
    /// Both moved independently; the branch was left alone.
    Diverged,
}

/// Result of a checkout.
#[derive(Debug, Clone)]
pub struct CheckoutReport {
    /// Kind of the module
    pub kind: String,
    /// Where the module landed in the project
    pub destination: PathBuf,
    /// Whether the destination existed beforehand
    pub updated_existing: bool,
    /// What happened to the per-project branch
    pub branch: BranchUpdate,
    /// The library commit the files came from
    pub upstream: CommitInfo,
    /// Original name of a file renamed to the root marker
    pub renamed_from: Option<String>,
    /// Whether the project got a commit
    pub outcome: SyncOutcome,
}

/// Check a module out of the library into a project.
///
/// On success the module record may have changed (see
/// [`CheckoutReport::renamed_from`]); the caller persists `library`.
pub fn checkout(
    paths: &LibraryPaths,
    library: &mut LibraryConfig,
    session: &SyncSession,
) -> Result<CheckoutReport, SyncError> {
    let (record, kind) = module_and_kind(library, &session.module)?;
    let filter = InclusionFilter::for_kind(&kind)?;
    let rename = Pattern::optional(kind.rename_pattern(), "rename")?;

    let _lock = CloneLock::acquire(paths, &session.module)?;

    let project = Git::open(&session.project_root)?;
    ensure_clean(&project)?;

    let destination = session.destination(&kind);
    info!(
        kind = %record.kind,
        module = %session.module,
        dest = %destination.display(),
        "checking out module"
    );

    let clone = Git::open_exact(&record.clone)?;
    let branch = update_project_branch(&clone, &session.project)?;
    clone.checkout_branch(session.project.as_str(), false)?;
    let upstream = clone.head_commit()?;

    let root = resolve(&record.clone, kind.root_marker(), &filter)?;
    let materialized = materialize(&root.path, &destination, &filter)?;

    let renamed_from = match (&rename, kind.root_marker()) {
        (Some(pattern), Some(marker)) => {
            let renamed = normalize_if_singleton(&destination, marker, Some(pattern))?;
            if let Some(module) = library.module_mut(&session.module) {
                module.renamed_root_marker = renamed.clone();
            }
            renamed
        }
        _ => None,
    };

    let action = if materialized.replaced_existing {
        "Updated"
    } else {
        "Added"
    };
    let message = format!(
        "Librarian: {action} module {module}\n\n{module} is from {url}.\n\t{module}@{hash}\n\tMessage:\n{body}",
        action = action,
        module = session.module,
        url = record.url,
        hash = upstream.oid,
        body = upstream.message.trim(),
    );
    let outcome = commit_if_changed(&project, &message)?;

    Ok(CheckoutReport {
        kind: record.kind,
        destination,
        updated_existing: materialized.replaced_existing,
        branch,
        upstream,
        renamed_from,
        outcome,
    })
}

/// Create or fast-forward the project's branch to `master`.
///
/// The branch only ever moves forward; project checkins on it are never
/// discarded.
fn update_project_branch(clone: &Git, project: &ProjectName) -> Result<BranchUpdate, SyncError> {
    let master = clone
        .branch_oid(MAINLINE_BRANCH)?
        .ok_or_else(|| GitError::RefNotFound {
            refname: format!("refs/heads/{}", MAINLINE_BRANCH),
        })?;

    let update = match clone.branch_oid(project.as_str())? {
        None => {
            clone.create_tracking_branch(project.as_str(), &master, MAINLINE_BRANCH)?;
            BranchUpdate::Created
        }
        Some(current) if current == master => BranchUpdate::UpToDate,
        Some(current) if clone.is_ancestor(&current, &master)? => {
            clone.fast_forward(project.as_str(), &master)?;
            BranchUpdate::FastForwarded
        }
        Some(current) if clone.is_ancestor(&master, &current)? => BranchUpdate::Ahead,
        Some(current) => {
            warn!(
                branch = %project,
                at = %current.short(7),
                master = %master.short(7),
                "project branch and master have diverged; leaving the branch as is"
            );
            BranchUpdate::Diverged
        }
    };

    Ok(update)
}
