//! core::normalize
//!
//! Rename a lone module file to a canonical entry name, and back.
//!
//! Many small modules ship as one oddly named file. Renaming it to the
//! kind's root marker (e.g. `windfield.lua` -> `init.lua`) lets projects
//! load every module the same way; the original name is recorded so checkin
//! can restore it before the library clone is committed.
//!
//! Only the top level of a directory is examined. A directory qualifies as a
//! singleton when it has no subdirectories (the `.git` metadata directory
//! does not count) and exactly one top-level file qualifies.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::core::filter::{Pattern, GIT_DIR_NAME};

/// Errors from normalization.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("failed to normalize {path}: {source}")]
    Io { path: PathBuf, source: io::Error },
}

/// Rename the lone qualifying file in `dir` to `canonical_name`.
///
/// A file qualifies when `include` is absent or fully matches its name.
/// Returns the file's original name when a rename happened. Nothing is
/// renamed when zero or several files qualify, when `dir` has
/// subdirectories, or when the lone file already has the canonical name.
pub fn normalize_if_singleton(
    dir: &Path,
    canonical_name: &str,
    include: Option<&Pattern>,
) -> Result<Option<String>, NormalizeError> {
    let Some(lone) = singleton(dir, |name| include.map_or(true, |p| p.fully_matches(name)))? else {
        return Ok(None);
    };
    if lone == canonical_name {
        return Ok(None);
    }

    if rename_within(dir, &lone, canonical_name)? {
        debug!(dir = %dir.display(), from = %lone, to = %canonical_name, "normalized entry");
        Ok(Some(lone))
    } else {
        Ok(None)
    }
}

/// Undo [`normalize_if_singleton`]: rename `canonical_name` back to `original_name`.
///
/// The same singleton rule applies, with only `canonical_name` qualifying.
/// Returns whether a rename happened.
pub fn restore_singleton(
    dir: &Path,
    canonical_name: &str,
    original_name: &str,
) -> Result<bool, NormalizeError> {
    if canonical_name == original_name {
        return Ok(false);
    }
    if singleton(dir, |name| name == canonical_name)?.is_none() {
        return Ok(false);
    }

    let renamed = rename_within(dir, canonical_name, original_name)?;
    if renamed {
        debug!(dir = %dir.display(), from = %canonical_name, to = %original_name, "restored entry name");
    }
    Ok(renamed)
}

/// The one top-level file of `dir` for which `qualifies` holds, if exactly
/// one exists and `dir` has no subdirectories besides `.git`.
fn singleton(dir: &Path, qualifies: impl Fn(&str) -> bool) -> Result<Option<String>, NormalizeError> {
    let io_err = |source| NormalizeError::Io {
        path: dir.to_path_buf(),
        source,
    };

    let mut found = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let entry = entry.map_err(io_err)?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name == GIT_DIR_NAME {
            continue;
        }
        if entry.file_type().map_err(io_err)?.is_dir() {
            return Ok(None);
        }
        if qualifies(&name) {
            found.push(name);
        }
    }

    Ok(match found.len() {
        1 => found.pop(),
        _ => None,
    })
}

/// Rename `from` to `to` inside `dir` unless `to` already exists.
fn rename_within(dir: &Path, from: &str, to: &str) -> Result<bool, NormalizeError> {
    let target = dir.join(to);
    if fs::symlink_metadata(&target).is_ok() {
        warn!(path = %target.display(), "entry name already taken, leaving {} as is", from);
        return Ok(false);
    }
    fs::rename(dir.join(from), &target).map_err(|source| NormalizeError::Io {
        path: target.clone(),
        source,
    })?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn lua() -> Pattern {
        Pattern::new(r".*\.lua", "rename").unwrap()
    }

    fn names(dir: &Path) -> Vec<String> {
        let mut names: Vec<_> = fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn renames_lone_qualifying_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("windfield.lua"), "return {}").unwrap();
        fs::write(temp.path().join("LICENSE"), "MIT").unwrap();

        let renamed = normalize_if_singleton(temp.path(), "init.lua", Some(&lua())).unwrap();
        assert_eq!(renamed.as_deref(), Some("windfield.lua"));
        assert_eq!(names(temp.path()), vec!["LICENSE", "init.lua"]);
    }

    #[test]
    fn several_candidates_means_no_rename() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.lua"), "").unwrap();
        fs::write(temp.path().join("b.lua"), "").unwrap();

        let renamed = normalize_if_singleton(temp.path(), "init.lua", Some(&lua())).unwrap();
        assert!(renamed.is_none());
        assert_eq!(names(temp.path()), vec!["a.lua", "b.lua"]);
    }

    #[test]
    fn no_candidates_means_no_rename() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("README.md"), "").unwrap();

        let renamed = normalize_if_singleton(temp.path(), "init.lua", Some(&lua())).unwrap();
        assert!(renamed.is_none());
    }

    #[test]
    fn subdirectory_means_no_rename() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("lone.lua"), "").unwrap();
        fs::create_dir(temp.path().join("sub")).unwrap();

        let renamed = normalize_if_singleton(temp.path(), "init.lua", Some(&lua())).unwrap();
        assert!(renamed.is_none());
    }

    #[test]
    fn git_dir_is_not_a_subdirectory() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("init.lua"), "").unwrap();
        fs::create_dir(temp.path().join(".git")).unwrap();

        assert!(restore_singleton(temp.path(), "init.lua", "lone.lua").unwrap());
        assert!(temp.path().join("lone.lua").exists());
    }

    #[test]
    fn already_canonical_is_not_recorded() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("init.lua"), "").unwrap();

        let renamed = normalize_if_singleton(temp.path(), "init.lua", Some(&lua())).unwrap();
        assert!(renamed.is_none());
    }

    #[test]
    fn without_pattern_every_file_qualifies() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.lua"), "").unwrap();
        fs::write(temp.path().join("LICENSE"), "").unwrap();

        let renamed = normalize_if_singleton(temp.path(), "init.lua", None).unwrap();
        assert!(renamed.is_none());
    }

    #[test]
    fn round_trip_restores_name_and_content() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("windfield.lua"), "local wf = {}").unwrap();

        let original = normalize_if_singleton(temp.path(), "init.lua", Some(&lua()))
            .unwrap()
            .unwrap();
        assert!(restore_singleton(temp.path(), "init.lua", &original).unwrap());

        assert_eq!(names(temp.path()), vec!["windfield.lua"]);
        assert_eq!(
            fs::read_to_string(temp.path().join("windfield.lua")).unwrap(),
            "local wf = {}"
        );
    }

    #[test]
    fn restore_without_canonical_file_is_noop() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("other.lua"), "").unwrap();

        assert!(!restore_singleton(temp.path(), "init.lua", "windfield.lua").unwrap());
        assert_eq!(names(temp.path()), vec!["other.lua"]);
    }

    #[test]
    fn existing_target_is_not_overwritten() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("init.lua"), "canonical").unwrap();
        fs::write(temp.path().join("windfield.lua"), "keep").unwrap();

        // init.lua is the only file named init.lua, but the target is taken.
        assert!(!restore_singleton(temp.path(), "init.lua", "windfield.lua").unwrap());
        assert_eq!(
            fs::read_to_string(temp.path().join("windfield.lua")).unwrap(),
            "keep"
        );
    }
}
