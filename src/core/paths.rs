//! core::paths
//!
//! Centralized path routing for library storage locations.
//!
//! # Storage Layout
//!
//! Everything the library owns lives under one root directory:
//! - `config.toml` - Kinds and modules
//! - `clones/<module>/` - Library clones
//! - `locks/<module>.lock` - Advisory per-module locks
//!
//! The root is `$LIBRARIAN_HOME` when set, otherwise `~/.librarian/`.
//!
//! Lock files deliberately live outside the clones: checkin may move a
//! clone's `.git` directory aside while the lock is held.
//!
//! # Example
//!
//! ```
//! use librarian::core::paths::LibraryPaths;
//! use librarian::core::types::ModuleName;
//! use std::path::PathBuf;
//!
//! let paths = LibraryPaths::new(PathBuf::from("/home/me/.librarian"));
//! let module = ModuleName::new("windfield").unwrap();
//!
//! assert_eq!(paths.config_path(), PathBuf::from("/home/me/.librarian/config.toml"));
//! assert_eq!(
//!     paths.clone_path(&module),
//!     PathBuf::from("/home/me/.librarian/clones/windfield")
//! );
//! ```

use std::path::{Path, PathBuf};

use crate::core::config::ConfigError;
use crate::core::types::ModuleName;

/// Environment variable overriding the library root.
pub const LIBRARY_HOME_ENV: &str = "LIBRARIAN_HOME";

/// Centralized path routing for library storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryPaths {
    root: PathBuf,
}

impl LibraryPaths {
    /// Create paths rooted at an explicit directory.
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Locate the library root from the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NoHomeDir` if `$LIBRARIAN_HOME` is unset and
    /// no home directory can be determined.
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(root) = std::env::var_os(LIBRARY_HOME_ENV) {
            if !root.is_empty() {
                return Ok(Self::new(PathBuf::from(root)));
            }
        }
        let home = dirs::home_dir().ok_or(ConfigError::NoHomeDir)?;
        Ok(Self::new(home.join(".librarian")))
    }

    /// The library root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<root>/config.toml`
    pub fn config_path(&self) -> PathBuf {
        self.root.join("config.toml")
    }

    /// `<root>/clones`
    pub fn clones_dir(&self) -> PathBuf {
        self.root.join("clones")
    }

    /// `<root>/clones/<module>`
    pub fn clone_path(&self, module: &ModuleName) -> PathBuf {
        self.clones_dir().join(module.as_str())
    }

    /// `<root>/locks`
    pub fn locks_dir(&self) -> PathBuf {
        self.root.join("locks")
    }

    /// `<root>/locks/<module>.lock`
    pub fn lock_path(&self, module: &ModuleName) -> PathBuf {
        self.locks_dir().join(format!("{}.lock", module.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths() -> LibraryPaths {
        LibraryPaths::new(PathBuf::from("/lib"))
    }

    #[test]
    fn layout() {
        let module = ModuleName::new("bump").unwrap();
        let paths = paths();
        assert_eq!(paths.root(), Path::new("/lib"));
        assert_eq!(paths.config_path(), PathBuf::from("/lib/config.toml"));
        assert_eq!(paths.clones_dir(), PathBuf::from("/lib/clones"));
        assert_eq!(paths.clone_path(&module), PathBuf::from("/lib/clones/bump"));
        assert_eq!(paths.lock_path(&module), PathBuf::from("/lib/locks/bump.lock"));
    }

    #[test]
    fn locks_live_outside_clones() {
        let module = ModuleName::new("bump").unwrap();
        let paths = paths();
        assert!(!paths.lock_path(&module).starts_with(paths.clones_dir()));
    }
}
