//! engine::library
//!
//! Managing what the library holds: kinds, module clones, upstream updates.

use serde::Serialize;
use tracing::{debug, info};

use super::{ensure_clean, SyncError};
use crate::core::config::{KindConfig, LibraryConfig, ModuleRecord, Registration};
use crate::core::ops::CloneLock;
use crate::core::paths::LibraryPaths;
use crate::core::types::{ModuleName, Oid};
use crate::git::{CommitInfo, Git, GitError, MAINLINE_BRANCH};

/// Remote every acquired clone starts with.
const DEFAULT_REMOTE: &str = "origin";

// =============================================================================
// Kinds
// =============================================================================

/// Requested changes to a kind. `None` leaves a field as it is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KindUpdate {
    pub lib_path: Option<String>,
    pub include_pattern: Option<String>,
    pub exclude_pattern: Option<String>,
    pub root_marker: Option<String>,
    pub rename_pattern: Option<String>,
}

impl KindUpdate {
    /// Check if nothing was requested.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One field changed by [`configure_kind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub field: &'static str,
    pub old: Option<String>,
    pub new: Option<String>,
}

/// Result of [`configure_kind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KindChange {
    /// The kind as it was, `None` if it did not exist
    pub previous: Option<KindConfig>,
    /// Fields whose value changed
    pub changes: Vec<FieldChange>,
}

impl KindChange {
    /// Check if the configuration needs to be written.
    pub fn is_modified(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// Create or update a kind.
///
/// Values are validated before anything is stored. When no field actually
/// changes, `library` is left untouched.
pub fn configure_kind(
    library: &mut LibraryConfig,
    name: &str,
    update: KindUpdate,
) -> Result<KindChange, SyncError> {
    let previous = library.kind(name).cloned();
    let mut kind = previous.clone().unwrap_or_default();

    let mut changes = Vec::new();
    let fields = [
        ("lib_path", &mut kind.lib_path, update.lib_path),
        ("include_pattern", &mut kind.include_pattern, update.include_pattern),
        ("exclude_pattern", &mut kind.exclude_pattern, update.exclude_pattern),
        ("root_marker", &mut kind.root_marker, update.root_marker),
        ("rename_pattern", &mut kind.rename_pattern, update.rename_pattern),
    ];
    for (field, slot, requested) in fields {
        if let Some(value) = requested {
            if slot.as_deref() != Some(value.as_str()) {
                changes.push(FieldChange {
                    field,
                    old: slot.clone(),
                    new: Some(value.clone()),
                });
                *slot = Some(value);
            }
        }
    }

    if changes.is_empty() {
        return Ok(KindChange { previous, changes });
    }

    kind.validate(name)?;
    let registration = library.register_kind(name, kind);
    debug!(kind = name, created = registration.is_created(), "kind configured");

    Ok(KindChange { previous, changes })
}

// =============================================================================
// Acquire
// =============================================================================

/// Result of [`acquire`].
#[derive(Debug, Clone)]
pub enum AcquireReport {
    /// The clone was fetched and `master` checked out.
    Cloned {
        registration: Registration<ModuleRecord>,
        upstream: String,
        head: CommitInfo,
    },
    /// The clone already had a remote; nothing was fetched.
    AlreadyCloned {
        registration: Registration<ModuleRecord>,
    },
}

/// Bring a module into the library.
///
/// The clone lives at `clones/<module>`. A module that is already
/// registered keeps its record.
pub fn acquire(
    paths: &LibraryPaths,
    library: &mut LibraryConfig,
    kind: &str,
    module: &ModuleName,
    url: &str,
) -> Result<AcquireReport, SyncError> {
    if library.kind(kind).is_none() {
        return Err(SyncError::UnknownKind {
            kind: kind.to_string(),
        });
    }

    let _lock = CloneLock::acquire(paths, module)?;

    let clone_path = paths.clone_path(module);
    let clone = Git::init(&clone_path)?;
    ensure_clean(&clone)?;

    let registration = library.register_module(
        module,
        ModuleRecord {
            kind: kind.to_string(),
            clone: clone_path.clone(),
            url: url.to_string(),
            renamed_root_marker: None,
        },
    );

    if !clone.remote_names()?.is_empty() {
        return Ok(AcquireReport::AlreadyCloned { registration });
    }

    info!(kind, module = %module, url, "cloning module into library");
    clone.add_remote(DEFAULT_REMOTE, url)?;
    let fetched = clone
        .fetch(DEFAULT_REMOTE)
        .and_then(|()| clone.remote_mainline(DEFAULT_REMOTE));
    let (upstream, target) = match fetched {
        Ok(found) => found,
        Err(e) => {
            // Leave the clone as we found it so acquire can be retried.
            clone.remove_remote(DEFAULT_REMOTE)?;
            return Err(e.into());
        }
    };

    clone.create_tracking_branch(MAINLINE_BRANCH, &target, &upstream)?;
    clone.checkout_branch(MAINLINE_BRANCH, true)?;
    let head = clone.head_commit()?;

    Ok(AcquireReport::Cloned {
        registration,
        upstream,
        head,
    })
}

// =============================================================================
// Pull
// =============================================================================

/// Result of [`pull`].
#[derive(Debug, Clone)]
pub struct PullReport {
    /// Remote that was fetched
    pub remote: String,
    /// Remote branch `master` was moved to, e.g. `origin/master`
    pub upstream: String,
    /// `master` before the pull
    pub before: Oid,
    /// `master` after the pull
    pub head: CommitInfo,
    /// Summaries of the new commits, oldest first
    pub changelog: Vec<String>,
}

impl PullReport {
    /// Check if `master` moved.
    pub fn is_up_to_date(&self) -> bool {
        self.before == self.head.oid
    }
}

/// Update a module's `master` from its upstream.
///
/// `remote` defaults to `origin`, or the only remote. `master` is only ever
/// fast-forwarded.
pub fn pull(
    paths: &LibraryPaths,
    library: &LibraryConfig,
    module: &ModuleName,
    remote: Option<&str>,
) -> Result<PullReport, SyncError> {
    let record = library
        .module(module)
        .ok_or_else(|| SyncError::UnknownModule {
            module: module.to_string(),
        })?;

    let _lock = CloneLock::acquire(paths, module)?;

    let clone = Git::open_exact(&record.clone)?;
    ensure_clean(&clone)?;

    let remote = clone.select_remote(remote)?;
    clone.fetch(&remote)?;
    let (upstream, target) = clone.remote_mainline(&remote)?;
    info!(module = %module, from = %upstream, "pulling module");

    clone.checkout_branch(MAINLINE_BRANCH, false)?;
    let before = clone
        .branch_oid(MAINLINE_BRANCH)?
        .ok_or_else(|| GitError::RefNotFound {
            refname: format!("refs/heads/{}", MAINLINE_BRANCH),
        })?;
    clone.fast_forward(MAINLINE_BRANCH, &target)?;

    let changelog = if before == target {
        Vec::new()
    } else {
        clone.changelog(&before, &target)?
    };
    let head = clone.branch_commit(MAINLINE_BRANCH)?;

    Ok(PullReport {
        remote,
        upstream,
        before,
        head,
        changelog,
    })
}

// =============================================================================
// List
// =============================================================================

/// One row of `librarian list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleListing {
    pub name: String,
    pub kind: String,
    pub url: String,
}

/// Registered modules in name order, optionally of one kind.
pub fn list_modules(library: &LibraryConfig, kind: Option<&str>) -> Vec<ModuleListing> {
    library
        .modules_of_kind(kind)
        .map(|(name, record)| ModuleListing {
            name: name.clone(),
            kind: record.kind.clone(),
            url: record.url.clone(),
        })
        .collect()
}
