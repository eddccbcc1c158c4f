//! git::interface
//!
//! Git interface implementation using git2.
//!
//! This module provides the **single doorway** to all Git operations in
//! librarian. Library clones and project repositories are both driven through
//! the [`Git`] struct, which returns structured results and normalizes errors
//! into typed failure categories.
//!
//! # Error Handling
//!
//! Git errors are categorized into typed variants:
//! - [`GitError::NotARepo`]: Not inside a Git repository
//! - [`GitError::RefNotFound`]: Requested ref does not exist
//! - [`GitError::RemoteNotFound`]: No usable remote could be selected
//! - [`GitError::NotFastForward`]: A branch update would lose commits
//!
//! # Example
//!
//! ```ignore
//! use librarian::git::Git;
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! if git.worktree_status()?.is_dirty() {
//!     println!("{}", git.status_report()?);
//! }
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

use crate::core::types::{Oid, TypeError};

/// Name of the mainline branch in every library clone.
pub const MAINLINE_BRANCH: &str = "master";

/// Remote mainline branches, in order of preference.
const REMOTE_MAINLINES: &[&str] = &["master", "main"];

/// Identity used when the repository has none configured.
const FALLBACK_NAME: &str = "librarian";
const FALLBACK_EMAIL: &str = "librarian@localhost";

/// Errors from Git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a Git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no working directory).
    #[error("bare repository not supported")]
    BareRepo,

    /// Requested ref does not exist.
    #[error("ref not found: {refname}")]
    RefNotFound {
        /// The ref that was not found
        refname: String,
    },

    /// Object not found in repository.
    #[error("object not found: {oid}")]
    ObjectNotFound {
        /// The OID that was not found
        oid: String,
    },

    /// Invalid object id format.
    #[error("invalid object id: {oid}")]
    InvalidOid {
        /// The invalid OID string
        oid: String,
    },

    /// No remote matches the request.
    #[error("no usable remote: {message}")]
    RemoteNotFound {
        /// What was looked for and what exists
        message: String,
    },

    /// Moving a branch would drop commits it already has.
    #[error("cannot fast-forward {branch} from {from} to {to}")]
    NotFastForward {
        /// The branch being moved
        branch: String,
        /// Its current commit
        from: String,
        /// The requested commit
        to: String,
    },

    /// Permission or filesystem error.
    #[error("repository access error: {message}")]
    AccessError {
        /// Description of the error
        message: String,
    },

    /// Internal git2 error.
    #[error("git error: {message}")]
    Internal {
        /// The error message
        message: String,
    },
}

impl GitError {
    /// Create a GitError from a git2::Error with richer context.
    fn from_git2(err: git2::Error, context: &str) -> Self {
        match err.code() {
            git2::ErrorCode::NotFound => {
                if context.starts_with("refs/") || context.contains("ref") || context == "HEAD" {
                    GitError::RefNotFound {
                        refname: context.to_string(),
                    }
                } else {
                    GitError::ObjectNotFound {
                        oid: context.to_string(),
                    }
                }
            }
            git2::ErrorCode::UnbornBranch => GitError::RefNotFound {
                refname: context.to_string(),
            },
            git2::ErrorCode::InvalidSpec => GitError::InvalidOid {
                oid: context.to_string(),
            },
            git2::ErrorCode::Locked => GitError::AccessError {
                message: format!("repository is locked: {}", err.message()),
            },
            _ => GitError::Internal {
                message: format!("{}: {}", context, err.message()),
            },
        }
    }

    /// Wrap an error where the context does not matter.
    fn internal(err: git2::Error) -> Self {
        GitError::Internal {
            message: err.message().to_string(),
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        GitError::InvalidOid {
            oid: err.to_string(),
        }
    }
}

/// Summary of working tree status.
///
/// Untracked files and submodule changes count as dirt: a tree is only
/// clean when committing would record nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorktreeStatus {
    /// Number of staged changes
    pub staged: usize,
    /// Number of unstaged changes to tracked files
    pub unstaged: usize,
    /// Number of untracked files
    pub untracked: usize,
    /// Whether there are unresolved conflicts
    pub has_conflicts: bool,
}

impl WorktreeStatus {
    /// Check if the worktree is completely clean (no changes at all).
    pub fn is_clean(&self) -> bool {
        self.staged == 0 && self.unstaged == 0 && self.untracked == 0 && !self.has_conflicts
    }

    /// Inverse of [`is_clean`](Self::is_clean).
    pub fn is_dirty(&self) -> bool {
        !self.is_clean()
    }
}

impl std::fmt::Display for WorktreeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} staged, {} unstaged, {} untracked",
            self.staged, self.unstaged, self.untracked
        )?;
        if self.has_conflicts {
            write!(f, ", conflicts")?;
        }
        Ok(())
    }
}

/// Information about a commit.
#[derive(Debug, Clone)]
pub struct CommitInfo {
    /// The commit OID
    pub oid: Oid,
    /// First line of the commit message
    pub summary: String,
    /// Full commit message
    pub message: String,
    /// Author name
    pub author_name: String,
    /// Author email
    pub author_email: String,
    /// Author timestamp
    pub author_time: chrono::DateTime<chrono::Utc>,
}

/// The Git interface.
///
/// This is the **single point of interaction** with Git. All repository
/// reads and writes flow through this interface. No other module should
/// import `git2` directly.
pub struct Git {
    /// The underlying git2 repository
    repo: git2::Repository,
}

impl std::fmt::Debug for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Git")
            .field("path", &self.repo.path())
            .finish()
    }
}

impl Git {
    // =========================================================================
    // Repository Opening and Info
    // =========================================================================

    /// Open the repository containing `path`.
    ///
    /// Uses `git2::Repository::discover`, so `path` can be any directory
    /// within the repository.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    /// - [`GitError::BareRepo`] if the repository has no working directory
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        Self::from_repo(repo)
    }

    /// Open the repository whose working directory is exactly `path`.
    ///
    /// Unlike [`open`](Self::open) this never climbs into a parent
    /// repository, so a library clone can't be confused with whatever
    /// repository the library root happens to live in.
    pub fn open_exact(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::open_ext(
            path,
            git2::RepositoryOpenFlags::NO_SEARCH,
            std::iter::empty::<&std::ffi::OsStr>(),
        )
        .map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;
        Self::from_repo(repo)
    }

    /// Open the repository at `path`, creating it first if needed.
    ///
    /// A new repository's HEAD points at [`MAINLINE_BRANCH`].
    pub fn init(path: &Path) -> Result<Self, GitError> {
        if let Ok(git) = Self::open_exact(path) {
            return Ok(git);
        }

        let mut opts = git2::RepositoryInitOptions::new();
        opts.initial_head(MAINLINE_BRANCH).mkpath(true);
        let repo = git2::Repository::init_opts(path, &opts)
            .map_err(|e| GitError::from_git2(e, &path.display().to_string()))?;
        debug!(path = %path.display(), "initialized repository");
        Self::from_repo(repo)
    }

    fn from_repo(repo: git2::Repository) -> Result<Self, GitError> {
        if repo.is_bare() {
            return Err(GitError::BareRepo);
        }
        Ok(Self { repo })
    }

    /// The working directory.
    pub fn work_dir(&self) -> Result<&Path, GitError> {
        self.repo.workdir().ok_or(GitError::BareRepo)
    }

    // =========================================================================
    // Working Tree Status
    // =========================================================================

    fn statuses(&self) -> Result<git2::Statuses<'_>, GitError> {
        let mut opts = git2::StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false)
            .exclude_submodules(false);

        self.repo.statuses(Some(&mut opts)).map_err(GitError::internal)
    }

    /// Get working tree status summary, untracked files included.
    pub fn worktree_status(&self) -> Result<WorktreeStatus, GitError> {
        let statuses = self.statuses()?;
        let mut result = WorktreeStatus::default();

        for entry in statuses.iter() {
            let status = entry.status();

            if status.is_conflicted() {
                result.has_conflicts = true;
            }

            if status.is_index_new()
                || status.is_index_modified()
                || status.is_index_deleted()
                || status.is_index_renamed()
                || status.is_index_typechange()
            {
                result.staged += 1;
            }

            if status.is_wt_modified()
                || status.is_wt_deleted()
                || status.is_wt_renamed()
                || status.is_wt_typechange()
            {
                result.unstaged += 1;
            }

            if status.is_wt_new() {
                result.untracked += 1;
            }
        }

        Ok(result)
    }

    /// A `git status --short` style listing of every change.
    pub fn status_report(&self) -> Result<String, GitError> {
        let statuses = self.statuses()?;
        let mut lines = Vec::new();

        for entry in statuses.iter() {
            let status = entry.status();
            let index = if status.is_conflicted() {
                'U'
            } else if status.is_wt_new() {
                '?'
            } else if status.is_index_new() {
                'A'
            } else if status.is_index_deleted() {
                'D'
            } else if status.is_index_renamed() {
                'R'
            } else if status.is_index_modified() || status.is_index_typechange() {
                'M'
            } else {
                ' '
            };
            let worktree = if status.is_conflicted() {
                'U'
            } else if status.is_wt_new() {
                '?'
            } else if status.is_wt_deleted() {
                'D'
            } else if status.is_wt_modified() || status.is_wt_typechange() {
                'M'
            } else {
                ' '
            };
            lines.push(format!(
                "{}{} {}",
                index,
                worktree,
                entry.path().unwrap_or("<non-utf8 path>")
            ));
        }

        Ok(lines.join("\n"))
    }

    /// Paths deleted from the working tree but still tracked, relative to
    /// the working directory. Names that aren't UTF-8 are kept as raw bytes.
    pub fn pending_deletions(&self) -> Result<Vec<PathBuf>, GitError> {
        let statuses = self.statuses()?;
        Ok(statuses
            .iter()
            .filter(|entry| entry.status().is_wt_deleted())
            .map(|entry| bytes_to_path(entry.path_bytes()))
            .collect())
    }

    /// Restore `paths` in the working tree from HEAD.
    pub fn restore_paths(&self, paths: &[PathBuf]) -> Result<(), GitError> {
        if paths.is_empty() {
            return Ok(());
        }

        let mut checkout = git2::build::CheckoutBuilder::new();
        checkout.force().disable_pathspec_match(true);
        for path in paths {
            checkout.path(path.as_path());
        }

        self.repo
            .checkout_head(Some(&mut checkout))
            .map_err(|e| GitError::from_git2(e, "HEAD"))
    }

    // =========================================================================
    // Refs and Branches
    // =========================================================================

    /// Commit a local branch points at, or `None` if it doesn't exist.
    pub fn branch_oid(&self, name: &str) -> Result<Option<Oid>, GitError> {
        match self.repo.find_branch(name, git2::BranchType::Local) {
            Ok(branch) => {
                let commit = branch
                    .get()
                    .peel_to_commit()
                    .map_err(|e| GitError::from_git2(e, name))?;
                Ok(Some(to_oid(commit.id())?))
            }
            Err(e) if e.code() == git2::ErrorCode::NotFound => Ok(None),
            Err(e) => Err(GitError::from_git2(e, name)),
        }
    }

    /// Create local branch `name` at `target`, tracking `upstream`.
    ///
    /// `upstream` is a branch name as git shows it: `origin/master` for a
    /// remote-tracking branch, `master` for a local one.
    pub fn create_tracking_branch(
        &self,
        name: &str,
        target: &Oid,
        upstream: &str,
    ) -> Result<(), GitError> {
        let commit = self.find_commit(target)?;
        let mut branch = self
            .repo
            .branch(name, &commit, false)
            .map_err(|e| GitError::from_git2(e, &format!("refs/heads/{}", name)))?;
        branch
            .set_upstream(Some(upstream))
            .map_err(|e| GitError::from_git2(e, upstream))?;

        debug!(branch = name, upstream, at = %target.short(7), "created tracking branch");
        Ok(())
    }

    /// Check out a local branch.
    ///
    /// Without `force` the checkout refuses to overwrite local changes.
    pub fn checkout_branch(&self, name: &str, force: bool) -> Result<(), GitError> {
        let refname = format!("refs/heads/{}", name);
        let object = self
            .repo
            .revparse_single(&refname)
            .map_err(|e| GitError::from_git2(e, &refname))?;

        let mut checkout = git2::build::CheckoutBuilder::new();
        if force {
            checkout.force();
        } else {
            checkout.safe();
        }

        self.repo
            .checkout_tree(&object, Some(&mut checkout))
            .map_err(|e| GitError::from_git2(e, &refname))?;
        self.repo
            .set_head(&refname)
            .map_err(|e| GitError::from_git2(e, &refname))?;

        debug!(branch = name, force, "checked out");
        Ok(())
    }

    /// Move branch `name` forward to `target`.
    ///
    /// If the branch is checked out, the working tree follows it.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotFastForward`] unless the branch's commit is an
    ///   ancestor of `target`
    pub fn fast_forward(&self, name: &str, target: &Oid) -> Result<(), GitError> {
        let refname = format!("refs/heads/{}", name);
        let current = self.branch_oid(name)?.ok_or_else(|| GitError::RefNotFound {
            refname: refname.clone(),
        })?;
        if &current == target {
            return Ok(());
        }
        if !self.is_ancestor(&current, target)? {
            return Err(GitError::NotFastForward {
                branch: name.to_string(),
                from: current.short(7).to_string(),
                to: target.short(7).to_string(),
            });
        }

        if self.head_branch()?.as_deref() == Some(name) {
            let commit = self.find_commit(target)?;
            let mut checkout = git2::build::CheckoutBuilder::new();
            checkout.safe();
            self.repo
                .checkout_tree(commit.as_object(), Some(&mut checkout))
                .map_err(|e| GitError::from_git2(e, &refname))?;
        }

        self.repo
            .reference(
                &refname,
                to_git2(target)?,
                true,
                &format!("librarian: fast-forward to {}", target.short(7)),
            )
            .map_err(|e| GitError::from_git2(e, &refname))?;

        debug!(branch = name, from = %current.short(7), to = %target.short(7), "fast-forwarded");
        Ok(())
    }

    /// The branch HEAD points at, if any.
    pub fn head_branch(&self) -> Result<Option<String>, GitError> {
        let head = match self.repo.head() {
            Ok(h) => h,
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => return Ok(None),
            Err(e) => return Err(GitError::from_git2(e, "HEAD")),
        };

        if head.is_branch() {
            Ok(head.shorthand().map(String::from))
        } else {
            Ok(None)
        }
    }

    /// Check if `ancestor` is reachable from `descendant`.
    ///
    /// A commit counts as its own ancestor.
    pub fn is_ancestor(&self, ancestor: &Oid, descendant: &Oid) -> Result<bool, GitError> {
        if ancestor == descendant {
            return Ok(true);
        }

        self.repo
            .graph_descendant_of(to_git2(descendant)?, to_git2(ancestor)?)
            .map_err(GitError::internal)
    }

    // =========================================================================
    // Commits
    // =========================================================================

    fn find_commit(&self, oid: &Oid) -> Result<git2::Commit<'_>, GitError> {
        self.repo
            .find_commit(to_git2(oid)?)
            .map_err(|e| GitError::from_git2(e, oid.as_str()))
    }

    /// Get information about a commit.
    ///
    /// # Errors
    ///
    /// - [`GitError::ObjectNotFound`] if the commit doesn't exist
    pub fn commit_info(&self, oid: &Oid) -> Result<CommitInfo, GitError> {
        let commit = self.find_commit(oid)?;

        let author = commit.author();
        let author_time = chrono::DateTime::from_timestamp(author.when().seconds(), 0)
            .unwrap_or(chrono::DateTime::UNIX_EPOCH)
            .with_timezone(&chrono::Utc);

        Ok(CommitInfo {
            oid: oid.clone(),
            summary: commit.summary().unwrap_or("").to_string(),
            message: commit.message().unwrap_or("").to_string(),
            author_name: author.name().unwrap_or("").to_string(),
            author_email: author.email().unwrap_or("").to_string(),
            author_time,
        })
    }

    /// The commit HEAD points at.
    ///
    /// # Errors
    ///
    /// - [`GitError::RefNotFound`] if HEAD is unborn (new repository)
    pub fn head_commit(&self) -> Result<CommitInfo, GitError> {
        let commit = self
            .repo
            .head()
            .and_then(|head| head.peel_to_commit())
            .map_err(|e| GitError::from_git2(e, "HEAD"))?;
        self.commit_info(&to_oid(commit.id())?)
    }

    /// The commit a local branch points at.
    pub fn branch_commit(&self, name: &str) -> Result<CommitInfo, GitError> {
        let oid = self.branch_oid(name)?.ok_or_else(|| GitError::RefNotFound {
            refname: format!("refs/heads/{}", name),
        })?;
        self.commit_info(&oid)
    }

    /// Stage every change in the working tree, deletions included.
    pub fn stage_all(&self) -> Result<(), GitError> {
        let mut index = self.repo.index().map_err(GitError::internal)?;
        index
            .add_all(["*"].iter(), git2::IndexAddOption::DEFAULT, None)
            .map_err(GitError::internal)?;
        index
            .update_all(["*"].iter(), None)
            .map_err(GitError::internal)?;
        index.write().map_err(GitError::internal)
    }

    /// Commit the index onto HEAD.
    ///
    /// Uses the repository's configured identity, falling back to a
    /// librarian identity when none is set.
    pub fn commit(&self, message: &str) -> Result<Oid, GitError> {
        let signature = self
            .repo
            .signature()
            .or_else(|_| git2::Signature::now(FALLBACK_NAME, FALLBACK_EMAIL))
            .map_err(GitError::internal)?;

        let mut index = self.repo.index().map_err(GitError::internal)?;
        let tree_id = index.write_tree().map_err(GitError::internal)?;
        let tree = self
            .repo
            .find_tree(tree_id)
            .map_err(|e| GitError::from_git2(e, &tree_id.to_string()))?;

        let parent = match self.repo.head() {
            Ok(head) => Some(
                head.peel_to_commit()
                    .map_err(|e| GitError::from_git2(e, "HEAD"))?,
            ),
            Err(e) if e.code() == git2::ErrorCode::UnbornBranch => None,
            Err(e) => return Err(GitError::from_git2(e, "HEAD")),
        };
        let parents: Vec<&git2::Commit<'_>> = parent.iter().collect();

        let oid = self
            .repo
            .commit(
                Some("HEAD"),
                &signature,
                &signature,
                message,
                &tree,
                &parents,
            )
            .map_err(GitError::internal)?;

        debug!(oid = %oid, "committed");
        to_oid(oid)
    }

    /// Summaries of the commits in `before..after`, oldest first, following
    /// first parents only.
    pub fn changelog(&self, before: &Oid, after: &Oid) -> Result<Vec<String>, GitError> {
        let mut revwalk = self.repo.revwalk().map_err(GitError::internal)?;
        revwalk
            .set_sorting(git2::Sort::TOPOLOGICAL | git2::Sort::REVERSE)
            .map_err(GitError::internal)?;
        revwalk.simplify_first_parent().map_err(GitError::internal)?;
        revwalk.push(to_git2(after)?).map_err(GitError::internal)?;
        revwalk.hide(to_git2(before)?).map_err(GitError::internal)?;

        let mut summaries = Vec::new();
        for oid in revwalk {
            let oid = oid.map_err(GitError::internal)?;
            let commit = self
                .repo
                .find_commit(oid)
                .map_err(|e| GitError::from_git2(e, &oid.to_string()))?;
            summaries.push(commit.summary().unwrap_or("").to_string());
        }
        Ok(summaries)
    }

    // =========================================================================
    // Remote Operations
    // =========================================================================

    /// Names of all configured remotes.
    pub fn remote_names(&self) -> Result<Vec<String>, GitError> {
        let remotes = self.repo.remotes().map_err(GitError::internal)?;
        Ok(remotes.iter().flatten().map(String::from).collect())
    }

    /// Add a remote with the default fetch refspec.
    pub fn add_remote(&self, name: &str, url: &str) -> Result<(), GitError> {
        self.repo
            .remote(name, url)
            .map_err(|e| GitError::from_git2(e, name))?;
        debug!(remote = name, url, "added remote");
        Ok(())
    }

    /// Delete a remote and its remote-tracking branches.
    pub fn remove_remote(&self, name: &str) -> Result<(), GitError> {
        self.repo
            .remote_delete(name)
            .map_err(|e| GitError::from_git2(e, name))?;
        debug!(remote = name, "removed remote");
        Ok(())
    }

    /// Pick the remote to talk to.
    ///
    /// An explicit `name` must exist. Otherwise `origin` is preferred, then
    /// the only remote if there is exactly one.
    pub fn select_remote(&self, name: Option<&str>) -> Result<String, GitError> {
        let remotes = self.remote_names()?;

        if let Some(name) = name {
            return remotes
                .into_iter()
                .find(|r| r == name)
                .ok_or_else(|| GitError::RemoteNotFound {
                    message: format!("no remote named '{}'", name),
                });
        }

        if remotes.iter().any(|r| r == "origin") {
            return Ok("origin".to_string());
        }
        match remotes.as_slice() {
            [only] => Ok(only.clone()),
            [] => Err(GitError::RemoteNotFound {
                message: "repository has no remotes".to_string(),
            }),
            many => Err(GitError::RemoteNotFound {
                message: format!("choose one of: {}", many.join(", ")),
            }),
        }
    }

    /// Fetch a remote's configured refspecs.
    pub fn fetch(&self, remote: &str) -> Result<(), GitError> {
        let mut handle = self
            .repo
            .find_remote(remote)
            .map_err(|_| GitError::RemoteNotFound {
                message: format!("no remote named '{}'", remote),
            })?;
        handle
            .fetch(&[] as &[&str], None, None)
            .map_err(|e| GitError::from_git2(e, &format!("remote {}", remote)))?;
        debug!(remote, "fetched");
        Ok(())
    }

    /// The remote's mainline branch: `<remote>/master`, else `<remote>/main`.
    ///
    /// Returns the upstream name (e.g. `origin/master`) and its commit.
    pub fn remote_mainline(&self, remote: &str) -> Result<(String, Oid), GitError> {
        for branch in REMOTE_MAINLINES {
            let upstream = format!("{}/{}", remote, branch);
            match self.repo.find_branch(&upstream, git2::BranchType::Remote) {
                Ok(found) => {
                    let commit = found
                        .get()
                        .peel_to_commit()
                        .map_err(|e| GitError::from_git2(e, &upstream))?;
                    return Ok((upstream, to_oid(commit.id())?));
                }
                Err(e) if e.code() == git2::ErrorCode::NotFound => continue,
                Err(e) => return Err(GitError::from_git2(e, &upstream)),
            }
        }

        Err(GitError::RefNotFound {
            refname: format!("refs/remotes/{}/{}", remote, REMOTE_MAINLINES.join(" or ")),
        })
    }
}

fn to_git2(oid: &Oid) -> Result<git2::Oid, GitError> {
    git2::Oid::from_str(oid.as_str()).map_err(|e| GitError::from_git2(e, oid.as_str()))
}

fn to_oid(oid: git2::Oid) -> Result<Oid, GitError> {
    Oid::new(oid.to_string()).map_err(GitError::from)
}

#[cfg(unix)]
fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    use std::os::unix::ffi::OsStrExt;
    PathBuf::from(std::ffi::OsStr::from_bytes(bytes))
}

#[cfg(not(unix))]
fn bytes_to_path(bytes: &[u8]) -> PathBuf {
    PathBuf::from(String::from_utf8_lossy(bytes).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    mod git_error {
        use super::*;

        #[test]
        fn not_fast_forward_names_both_commits() {
            let err = GitError::NotFastForward {
                branch: "puppypark".to_string(),
                from: "abc1234".to_string(),
                to: "def5678".to_string(),
            };
            let msg = err.to_string();
            assert!(msg.contains("puppypark"));
            assert!(msg.contains("abc1234"));
            assert!(msg.contains("def5678"));
        }

        #[test]
        fn not_found_with_ref_context_is_ref_not_found() {
            let err = git2::Error::new(
                git2::ErrorCode::NotFound,
                git2::ErrorClass::Reference,
                "missing",
            );
            assert!(matches!(
                GitError::from_git2(err, "refs/heads/master"),
                GitError::RefNotFound { refname } if refname == "refs/heads/master"
            ));
        }

        #[test]
        fn not_found_with_oid_context_is_object_not_found() {
            let err = git2::Error::new(
                git2::ErrorCode::NotFound,
                git2::ErrorClass::Odb,
                "missing",
            );
            assert!(matches!(
                GitError::from_git2(err, "abc123"),
                GitError::ObjectNotFound { .. }
            ));
        }

        #[test]
        fn unborn_head_is_ref_not_found() {
            let err = git2::Error::new(
                git2::ErrorCode::UnbornBranch,
                git2::ErrorClass::Reference,
                "unborn",
            );
            assert!(matches!(
                GitError::from_git2(err, "HEAD"),
                GitError::RefNotFound { .. }
            ));
        }
    }

    mod worktree_status {
        use super::*;

        #[test]
        fn default_is_clean() {
            assert!(WorktreeStatus::default().is_clean());
        }

        #[test]
        fn untracked_files_are_dirty() {
            let status = WorktreeStatus {
                untracked: 1,
                ..Default::default()
            };
            assert!(status.is_dirty());
        }

        #[test]
        fn conflicts_are_dirty() {
            let status = WorktreeStatus {
                has_conflicts: true,
                ..Default::default()
            };
            assert!(status.is_dirty());
            assert!(status.to_string().contains("conflicts"));
        }

        #[test]
        fn display_counts() {
            let status = WorktreeStatus {
                staged: 1,
                unstaged: 2,
                untracked: 3,
                has_conflicts: false,
            };
            assert_eq!(status.to_string(), "1 staged, 2 unstaged, 3 untracked");
        }
    }
}
