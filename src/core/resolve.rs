//! core::resolve
//!
//! Locate the effective root of a module inside a source tree.
//!
//! # Algorithm
//!
//! The tree is walked top-down. A directory holding a file literally named
//! after the root marker is returned as soon as it is seen, and a marker
//! always outranks the fallback: the first directory, in traversal order,
//! that holds at least one file the [`InclusionFilter`] accepts. When
//! neither exists the module has nothing to vendor and resolution fails.
//!
//! Traversal order is deterministic: within a directory, files are visited
//! before subdirectories and names are visited in byte order, then each
//! subdirectory is walked depth-first. Directories the filter refuses to
//! descend into (`.git`, excluded names) are skipped entirely.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;
use walkdir::{DirEntry, WalkDir};

use crate::core::filter::InclusionFilter;

/// Errors from root resolution.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Neither a marker nor an includable file exists under the path.
    #[error("no includable files found under {path}")]
    NoIncludableFiles { path: PathBuf },

    /// The tree could not be read.
    #[error("failed to walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
}

/// How a module root was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootEvidence {
    /// The directory contains the root marker file.
    Marker,
    /// No marker exists; this is the first directory with an includable file.
    FirstIncludable,
}

/// A resolved module root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleRoot {
    /// The directory to materialize from or into.
    pub path: PathBuf,
    /// Why this directory was chosen.
    pub evidence: RootEvidence,
}

/// Find the module root under `path`.
///
/// `root_marker` of `None` disables marker matching, leaving only the
/// fallback.
///
/// # Errors
///
/// - [`ResolveError::NoIncludableFiles`] if the filter excludes everything
/// - [`ResolveError::Walk`] if a directory cannot be read
pub fn resolve(
    path: &Path,
    root_marker: Option<&str>,
    filter: &InclusionFilter,
) -> Result<ModuleRoot, ResolveError> {
    let mut fallback: Option<PathBuf> = None;

    let walker = WalkDir::new(path)
        .sort_by(files_first)
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || filter.descends_into(&entry.file_name().to_string_lossy())
        });

    for entry in walker {
        let entry = entry.map_err(|e| ResolveError::Walk {
            path: path.to_path_buf(),
            source: e,
        })?;
        if entry.file_type().is_dir() {
            continue;
        }

        let Some(dir) = entry.path().parent() else {
            continue;
        };
        let name = entry.file_name().to_string_lossy();

        if root_marker == Some(name.as_ref()) {
            debug!(root = %dir.display(), marker = %name, "module root found by marker");
            return Ok(ModuleRoot {
                path: dir.to_path_buf(),
                evidence: RootEvidence::Marker,
            });
        }

        if fallback.is_none() && filter.accepts(&name) {
            fallback = Some(dir.to_path_buf());
        }
    }

    match fallback {
        Some(dir) => {
            debug!(root = %dir.display(), "module root found by first includable file");
            Ok(ModuleRoot {
                path: dir,
                evidence: RootEvidence::FirstIncludable,
            })
        }
        None => Err(ResolveError::NoIncludableFiles {
            path: path.to_path_buf(),
        }),
    }
}

fn files_first(a: &DirEntry, b: &DirEntry) -> Ordering {
    a.file_type()
        .is_dir()
        .cmp(&b.file_type().is_dir())
        .then_with(|| a.file_name().cmp(b.file_name()))
}
