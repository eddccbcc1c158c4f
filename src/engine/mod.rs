//! engine
//!
//! Orchestrates library operations and the checkout/checkin protocol.
//!
//! # Architecture
//!
//! The engine is the central coordinator for every librarian command. It
//! composes the tree operations in [`crate::core`] with the
//! [`crate::git`] interface:
//!
//! - [`library`] - Kind configuration, acquire, pull, list
//! - [`checkout`] - Library -> project
//! - [`checkin`] - Project -> library
//! - [`project`] - Locating the project being synced
//! - [`relocate`] - Moving a clone's `.git` out of harm's way
//!
//! # Invariants
//!
//! - Precondition checks (dirty state, known module, existing branch) run
//!   before anything is copied
//! - Every operation on a clone holds that module's [`CloneLock`]
//! - The configuration is only mutated in memory; callers persist it once
//!   the operation has succeeded
//!
//! [`CloneLock`]: crate::core::ops::CloneLock

pub mod checkin;
pub mod checkout;
pub mod library;
pub mod project;
pub mod relocate;

pub use checkin::{checkin, CheckinReport};
pub use checkout::{checkout, BranchUpdate, CheckoutReport};
pub use library::{
    acquire, configure_kind, list_modules, pull, AcquireReport, KindChange, KindUpdate,
    FieldChange, ModuleListing, PullReport,
};
pub use project::locate_project;
pub use relocate::RelocatedGitDir;

use std::path::{Path, PathBuf};

use crate::core::config::{ConfigError, KindConfig, LibraryConfig, ModuleRecord};
use crate::core::filter::FilterError;
use crate::core::materialize::MaterializeError;
use crate::core::normalize::NormalizeError;
use crate::core::ops::LockError;
use crate::core::resolve::ResolveError;
use crate::core::types::{ModuleName, Oid, ProjectName};
use crate::git::{Git, GitError};
use crate::ui::prompts::PromptError;

/// Execution context for commands.
///
/// Contains global settings derived from CLI flags that affect command behavior.
#[derive(Debug, Clone)]
pub struct Context {
    /// Working directory override.
    pub cwd: Option<PathBuf>,
    /// Debug logging enabled.
    pub debug: bool,
    /// Quiet mode (minimal output).
    pub quiet: bool,
    /// Interactive mode enabled.
    pub interactive: bool,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            cwd: None,
            debug: false,
            quiet: false,
            interactive: true,
        }
    }
}

impl Context {
    /// The directory commands run in: `--cwd` if given, else the process's.
    pub fn working_dir(&self) -> std::io::Result<PathBuf> {
        match &self.cwd {
            Some(cwd) => Ok(cwd.clone()),
            None => std::env::current_dir(),
        }
    }
}

/// Errors from engine operations.
#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    /// The module was never acquired.
    #[error(
        "module '{module}' doesn't exist in the library. Have you run `librarian acquire <kind> {module} <url>`?"
    )]
    UnknownModule { module: String },

    /// A kind referenced by a command is not configured.
    #[error("kind '{kind}' is not configured. Run `librarian config {kind} ...` first")]
    UnknownKind { kind: String },

    /// A repository has changes that an operation would clobber.
    #[error("repository is dirty: {path}\n{status}")]
    DirtyRepository { path: PathBuf, status: String },

    /// Checkin needs the branch a checkout creates.
    #[error(
        "branch '{project}' doesn't exist in the library for module '{module}'. Have you run `librarian checkout {project} {module}`?"
    )]
    MissingProjectBranch { project: String, module: String },

    /// Checkin found nothing to copy back.
    #[error(
        "module '{module}' cannot be found in project '{project}' at {path}. Have you run `librarian checkout {project} {module}`?"
    )]
    ModuleNotInProject {
        project: String,
        module: String,
        path: PathBuf,
    },

    /// The user declined to sync from an unexpected location.
    #[error("not syncing project '{project}' from {path}")]
    WrongPlace { project: String, path: PathBuf },

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    Materialize(#[from] MaterializeError),

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Filter(#[from] FilterError),

    #[error(transparent)]
    Git(#[from] GitError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Lock(#[from] LockError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error("{context} {path}: {source}")]
    Io {
        context: &'static str,
        path: PathBuf,
        source: std::io::Error,
    },
}

impl SyncError {
    /// Process exit code for this failure.
    ///
    /// The four caller-visible precondition failures, and a module missing
    /// from its project, each get their own code.
    pub fn exit_code(&self) -> i32 {
        match self {
            SyncError::UnknownModule { .. } => 2,
            SyncError::DirtyRepository { .. } => 3,
            SyncError::Resolve(ResolveError::NoIncludableFiles { .. }) => 4,
            SyncError::MissingProjectBranch { .. } => 5,
            SyncError::ModuleNotInProject { .. } => 6,
            _ => 1,
        }
    }
}

/// The (project, module) pair a checkout or checkin operates on.
#[derive(Debug, Clone)]
pub struct SyncSession {
    /// Project name; also the branch name in the library clone
    pub project: ProjectName,
    /// Module being synced
    pub module: ModuleName,
    /// Directory the project's `lib_path` is relative to
    pub project_root: PathBuf,
}

impl SyncSession {
    /// `<project root>/<lib_path>/<module>`
    pub fn destination(&self, kind: &KindConfig) -> PathBuf {
        self.project_root
            .join(kind.lib_path())
            .join(self.module.as_str())
    }
}

/// What the final commit step did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Changes were committed.
    Committed { oid: Oid, message: String },
    /// Nothing changed; no commit was made.
    NoChanges,
}

impl SyncOutcome {
    /// Check if a commit was made.
    pub fn is_committed(&self) -> bool {
        matches!(self, SyncOutcome::Committed { .. })
    }
}

/// Look up a module and its kind.
fn module_and_kind(
    library: &LibraryConfig,
    module: &ModuleName,
) -> Result<(ModuleRecord, KindConfig), SyncError> {
    let record = library
        .module(module)
        .cloned()
        .ok_or_else(|| SyncError::UnknownModule {
            module: module.to_string(),
        })?;
    let kind = library
        .kind(&record.kind)
        .cloned()
        .ok_or_else(|| SyncError::UnknownKind {
            kind: record.kind.clone(),
        })?;
    Ok((record, kind))
}

/// Fail with a status dump unless the repository is clean.
fn ensure_clean(git: &Git) -> Result<(), SyncError> {
    let status = git.worktree_status()?;
    if status.is_dirty() {
        return Err(SyncError::DirtyRepository {
            path: git.work_dir()?.to_path_buf(),
            status: git.status_report()?,
        });
    }
    Ok(())
}

/// Stage and commit everything if the repository has changed.
fn commit_if_changed(git: &Git, message: &str) -> Result<SyncOutcome, SyncError> {
    if git.worktree_status()?.is_clean() {
        return Ok(SyncOutcome::NoChanges);
    }

    git.stage_all()?;
    let oid = git.commit(message)?;
    Ok(SyncOutcome::Committed {
        oid,
        message: message.to_string(),
    })
}

fn io_error<'a>(
    context: &'static str,
    path: &'a Path,
) -> impl FnOnce(std::io::Error) -> SyncError + 'a {
    move |source| SyncError::Io {
        context,
        path: path.to_path_buf(),
        source,
    }
}
