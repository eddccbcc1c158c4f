//! core::materialize
//!
//! Destructively mirror a filtered source tree onto a destination.
//!
//! # Algorithm
//!
//! 1. The filtered copy is built in a staging directory created next to the
//!    destination (same filesystem, so renames are cheap).
//! 2. Directories left empty by filtering are pruned from the staged tree.
//!    Pruning is best-effort: a directory that cannot be removed stays.
//! 3. The existing destination, if any, is renamed into the staging area and
//!    the staged tree is renamed into its place. If the second rename fails
//!    the previous tree is put back; if that fails too, the staging area is
//!    left on disk and the error names where the previous tree is.
//! 4. The staging area, including the previous tree, is removed.
//!
//! The destination is never merged into: whatever was there is replaced
//! wholesale, so materializing twice from an unchanged source yields the
//! same tree.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tempfile::TempDir;
use tracing::{debug, error, trace};
use walkdir::WalkDir;

use crate::core::filter::InclusionFilter;

const STAGING_PREFIX: &str = ".librarian-stage-";
const PREVIOUS_TREE: &str = "previous";

/// Errors from materialization.
#[derive(Debug, Error)]
pub enum MaterializeError {
    /// The source directory does not exist.
    #[error("no such file or directory: {path}")]
    SourceNotFound { path: PathBuf },

    /// Source and destination contain one another.
    #[error("cannot mirror {source_dir} onto {dest}: the trees overlap")]
    Overlap { source_dir: PathBuf, dest: PathBuf },

    /// Filesystem failure.
    #[error("failed to materialize {path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    /// The swap failed and the previous tree could not be moved back.
    #[error("failed to materialize {dest}: {source}; its previous contents were kept at {kept}")]
    PreviousTreeKept {
        dest: PathBuf,
        kept: PathBuf,
        source: io::Error,
    },
}

impl MaterializeError {
    fn io(path: &Path) -> impl FnOnce(io::Error) -> Self + '_ {
        move |source| MaterializeError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Summary of a materialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Materialized {
    /// Whether a destination tree existed and was replaced.
    pub replaced_existing: bool,
    /// Number of files copied.
    pub files: usize,
}

/// Mirror `source` onto `dest`, keeping only what `filter` accepts.
///
/// # Errors
///
/// - [`MaterializeError::SourceNotFound`] if `source` does not exist
/// - [`MaterializeError::Overlap`] if one tree contains the other
/// - [`MaterializeError::Io`] on any other filesystem failure
pub fn materialize(
    source: &Path,
    dest: &Path,
    filter: &InclusionFilter,
) -> Result<Materialized, MaterializeError> {
    if !source.exists() {
        return Err(MaterializeError::SourceNotFound {
            path: source.to_path_buf(),
        });
    }

    let parent = dest.parent().ok_or_else(|| MaterializeError::Io {
        path: dest.to_path_buf(),
        source: io::Error::new(io::ErrorKind::InvalidInput, "destination has no parent"),
    })?;
    fs::create_dir_all(parent).map_err(MaterializeError::io(parent))?;
    check_disjoint(source, dest)?;

    debug!(source = %source.display(), dest = %dest.display(), "materializing");

    let stage = tempfile::Builder::new()
        .prefix(STAGING_PREFIX)
        .tempdir_in(parent)
        .map_err(MaterializeError::io(parent))?;
    let staged_tree = stage.path().join("tree");
    let previous_tree = stage.path().join(PREVIOUS_TREE);

    let files = copy_filtered(source, &staged_tree, filter)?;
    prune_empty_dirs(&staged_tree);

    let replaced_existing = fs::symlink_metadata(dest).is_ok();
    if replaced_existing {
        fs::rename(dest, &previous_tree).map_err(MaterializeError::io(dest))?;
    }
    if let Err(e) = fs::rename(&staged_tree, dest) {
        if replaced_existing {
            return Err(put_back_previous(stage, &previous_tree, dest, e));
        }
        return Err(MaterializeError::Io {
            path: dest.to_path_buf(),
            source: e,
        });
    }

    stage.close().map_err(MaterializeError::io(parent))?;
    debug!(files, replaced_existing, "materialized");

    Ok(Materialized {
        replaced_existing,
        files,
    })
}

/// Move the replaced tree back to `dest` after a failed swap.
///
/// If that fails too, the staging area is kept on disk: it holds the only
/// copy of what used to be at `dest`.
fn put_back_previous(
    stage: TempDir,
    previous_tree: &Path,
    dest: &Path,
    cause: io::Error,
) -> MaterializeError {
    match fs::rename(previous_tree, dest) {
        Ok(()) => MaterializeError::Io {
            path: dest.to_path_buf(),
            source: cause,
        },
        Err(e) => {
            let kept = stage.keep().join(PREVIOUS_TREE);
            error!(
                error = %e,
                kept = %kept.display(),
                dest = %dest.display(),
                "failed to restore previous tree; move it back by hand"
            );
            MaterializeError::PreviousTreeKept {
                dest: dest.to_path_buf(),
                kept,
                source: cause,
            }
        }
    }
}

fn check_disjoint(source: &Path, dest: &Path) -> Result<(), MaterializeError> {
    let source_abs = source.canonicalize().map_err(MaterializeError::io(source))?;
    let dest_abs = match (dest.parent(), dest.file_name()) {
        (Some(parent), Some(name)) => parent
            .canonicalize()
            .map_err(MaterializeError::io(parent))?
            .join(name),
        _ => dest.to_path_buf(),
    };

    if source_abs.starts_with(&dest_abs) || dest_abs.starts_with(&source_abs) {
        return Err(MaterializeError::Overlap {
            source_dir: source.to_path_buf(),
            dest: dest.to_path_buf(),
        });
    }
    Ok(())
}

/// Copy the accepted part of `from` into a new directory `to`.
///
/// Returns the number of files copied.
fn copy_filtered(
    from: &Path,
    to: &Path,
    filter: &InclusionFilter,
) -> Result<usize, MaterializeError> {
    fs::create_dir_all(to).map_err(MaterializeError::io(to))?;

    let mut entries = fs::read_dir(from)
        .map_err(MaterializeError::io(from))?
        .collect::<Result<Vec<_>, _>>()
        .map_err(MaterializeError::io(from))?;
    entries.sort_by_key(|e| e.file_name());

    let mut files = 0;
    for entry in entries {
        let name = entry.file_name();
        let name_str = name.to_string_lossy();
        let src = entry.path();
        let dst = to.join(&name);

        let file_type = entry.file_type().map_err(MaterializeError::io(&src))?;
        if file_type.is_dir() {
            if filter.descends_into(&name_str) {
                files += copy_filtered(&src, &dst, filter)?;
            } else {
                trace!(path = %src.display(), "skipping directory");
            }
        } else if filter.accepts(&name_str) {
            if file_type.is_symlink() {
                copy_symlink(&src, &dst)?;
            } else {
                fs::copy(&src, &dst).map_err(MaterializeError::io(&src))?;
            }
            files += 1;
        } else {
            trace!(path = %src.display(), "skipping file");
        }
    }

    Ok(files)
}

/// Recreate the link at `src` as `dst`, pointing at the same target.
///
/// Links are judged by their own name like files, and never followed.
#[cfg(unix)]
fn copy_symlink(src: &Path, dst: &Path) -> Result<(), MaterializeError> {
    let target = fs::read_link(src).map_err(MaterializeError::io(src))?;
    std::os::unix::fs::symlink(&target, dst).map_err(MaterializeError::io(dst))
}

#[cfg(not(unix))]
fn copy_symlink(src: &Path, dst: &Path) -> Result<(), MaterializeError> {
    fs::copy(src, dst)
        .map(|_| ())
        .map_err(MaterializeError::io(src))
}

/// Remove directories under `root` that are empty, deepest first.
///
/// `root` itself is kept. Directories that turn out non-empty or cannot be
/// removed are left in place.
fn prune_empty_dirs(root: &Path) {
    let dirs = WalkDir::new(root)
        .min_depth(1)
        .contents_first(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_dir());

    for dir in dirs {
        if fs::remove_dir(dir.path()).is_ok() {
            trace!(path = %dir.path().display(), "pruned empty directory");
        }
    }
}
