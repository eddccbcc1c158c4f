//! engine::relocate
//!
//! Move a clone's `.git` directory aside while its working tree is replaced.
//!
//! When a module is vendored flat, its root is the clone's own working
//! directory, and materializing into it would take `.git` down with the old
//! tree. [`RelocatedGitDir`] parks the metadata in a fresh temporary
//! directory beside the clone and moves it back when dropped, on success,
//! error return or panic alike.
//!
//! If moving it back fails, the parked copy is kept on disk and its location
//! is logged so the clone can be repaired by hand.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, error};

use crate::core::filter::GIT_DIR_NAME;

const HOLDING_PREFIX: &str = ".librarian-git-";

/// A `.git` directory moved out of its working tree.
#[derive(Debug)]
pub struct RelocatedGitDir {
    /// Where `.git` belongs
    home: PathBuf,
    /// Temporary directory holding it meanwhile
    holding: Option<tempfile::TempDir>,
}

impl RelocatedGitDir {
    /// Move `<work_dir>/.git` into a temporary directory next to `work_dir`.
    pub fn relocate(work_dir: &Path) -> io::Result<Self> {
        let home = work_dir.join(GIT_DIR_NAME);
        let parent = work_dir.parent().ok_or_else(|| {
            io::Error::new(io::ErrorKind::InvalidInput, "working tree has no parent")
        })?;

        let holding = tempfile::Builder::new()
            .prefix(HOLDING_PREFIX)
            .tempdir_in(parent)?;
        fs::rename(&home, holding.path().join(GIT_DIR_NAME))?;
        debug!(from = %home.display(), to = %holding.path().display(), "relocated git dir");

        Ok(Self {
            home,
            holding: Some(holding),
        })
    }

    /// Where the metadata currently lives.
    pub fn parked_path(&self) -> Option<PathBuf> {
        self.holding
            .as_ref()
            .map(|holding| holding.path().join(GIT_DIR_NAME))
    }

    /// Move `.git` back now, reporting failure.
    pub fn restore(mut self) -> io::Result<()> {
        self.put_back()
    }

    fn put_back(&mut self) -> io::Result<()> {
        let Some(holding) = self.holding.take() else {
            return Ok(());
        };
        let parked = holding.path().join(GIT_DIR_NAME);

        if let Some(parent) = self.home.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                self.holding = Some(holding);
                return Err(e);
            }
        }
        if let Err(e) = fs::rename(&parked, &self.home) {
            self.holding = Some(holding);
            return Err(e);
        }

        debug!(path = %self.home.display(), "restored git dir");
        holding.close()
    }
}

impl Drop for RelocatedGitDir {
    fn drop(&mut self) {
        if let Err(e) = self.put_back() {
            if let Some(holding) = self.holding.take() {
                let kept = holding.keep();
                error!(
                    error = %e,
                    parked = %kept.join(GIT_DIR_NAME).display(),
                    home = %self.home.display(),
                    "failed to restore git dir; move it back by hand"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn clone_dir(temp: &TempDir) -> PathBuf {
        let work = temp.path().join("windfield");
        fs::create_dir_all(work.join(".git/refs")).unwrap();
        fs::write(work.join(".git/HEAD"), "ref: refs/heads/master\n").unwrap();
        fs::write(work.join("windfield.lua"), "return {}").unwrap();
        work
    }

    #[test]
    fn moves_git_out_and_back() {
        let temp = TempDir::new().unwrap();
        let work = clone_dir(&temp);

        let guard = RelocatedGitDir::relocate(&work).unwrap();
        assert!(!work.join(".git").exists());
        assert!(guard.parked_path().unwrap().join("HEAD").exists());

        guard.restore().unwrap();
        assert_eq!(
            fs::read_to_string(work.join(".git/HEAD")).unwrap(),
            "ref: refs/heads/master\n"
        );
    }

    #[test]
    fn restores_on_drop() {
        let temp = TempDir::new().unwrap();
        let work = clone_dir(&temp);

        {
            let _guard = RelocatedGitDir::relocate(&work).unwrap();
            assert!(!work.join(".git").exists());
        }
        assert!(work.join(".git/HEAD").exists());
    }

    #[test]
    fn survives_working_tree_replacement() {
        let temp = TempDir::new().unwrap();
        let work = clone_dir(&temp);

        {
            let _guard = RelocatedGitDir::relocate(&work).unwrap();
            fs::remove_dir_all(&work).unwrap();
            fs::create_dir(&work).unwrap();
            fs::write(work.join("init.lua"), "return {}").unwrap();
        }

        assert!(work.join(".git/HEAD").exists());
        assert!(work.join("init.lua").exists());
    }

    #[test]
    fn restores_when_the_working_tree_vanished() {
        let temp = TempDir::new().unwrap();
        let work = clone_dir(&temp);

        let guard = RelocatedGitDir::relocate(&work).unwrap();
        fs::remove_dir_all(&work).unwrap();
        guard.restore().unwrap();

        assert!(work.join(".git/HEAD").exists());
    }

    #[test]
    fn leaves_no_holding_dir_behind() {
        let temp = TempDir::new().unwrap();
        let work = clone_dir(&temp);

        RelocatedGitDir::relocate(&work).unwrap().restore().unwrap();

        let names: Vec<_> = fs::read_dir(temp.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["windfield"]);
    }

    #[test]
    fn missing_git_dir_is_an_error() {
        let temp = TempDir::new().unwrap();
        let work = temp.path().join("plain");
        fs::create_dir(&work).unwrap();

        assert!(RelocatedGitDir::relocate(&work).is_err());
    }
}
