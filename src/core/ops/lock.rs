//! core::ops::lock
//!
//! Advisory per-module lock.
//!
//! # Architecture
//!
//! Every operation that mutates a library clone (acquire, pull, checkout,
//! checkin) holds the module's lock for its whole duration. Two processes
//! working on the same module would otherwise race on the clone's working
//! tree and branch refs.
//!
//! # Storage
//!
//! - `<library root>/locks/<module>.lock` - Lock file with OS-level exclusive lock
//!
//! # Invariants
//!
//! - Lock is automatically released on drop (RAII pattern)
//! - Lock acquisition is non-blocking (fails fast if locked)
//! - Lock files never live inside a clone, so relocating the clone's
//!   `.git` directory cannot move a held lock
//!
//! # Example
//!
//! ```ignore
//! use librarian::core::ops::lock::CloneLock;
//!
//! let lock = CloneLock::acquire(&paths, &module)?;
//! // ... mutate the clone ...
//! drop(lock);
//! ```

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;
use tracing::debug;

use crate::core::paths::LibraryPaths;
use crate::core::types::ModuleName;

/// Errors from locking operations.
#[derive(Debug, Error)]
pub enum LockError {
    /// Another process already holds the lock.
    #[error("module '{0}' is locked by another librarian process")]
    AlreadyLocked(String),

    /// Failed to create lock file or directory.
    #[error("failed to create lock: {0}")]
    CreateFailed(String),

    /// Failed to acquire the OS lock.
    #[error("failed to acquire lock: {0}")]
    AcquireFailed(String),

    /// Failed to release the lock.
    #[error("failed to release lock: {0}")]
    ReleaseFailed(String),
}

/// An exclusive lock on one module's library clone.
///
/// The lock is released when this guard is dropped, even if the operation
/// panics.
#[derive(Debug)]
pub struct CloneLock {
    /// Path to the lock file.
    path: PathBuf,
    /// The open file handle with the lock held. `Some` while held.
    file: Option<File>,
}

impl CloneLock {
    /// Attempt to acquire the lock for `module`.
    ///
    /// This uses OS-level file locking via `fs2`, which works across
    /// processes. The lock is non-blocking.
    ///
    /// # Errors
    ///
    /// - [`LockError::AlreadyLocked`] if another process holds the lock
    /// - [`LockError::CreateFailed`] if the lock file cannot be created
    /// - [`LockError::AcquireFailed`] if the OS lock cannot be acquired
    pub fn acquire(paths: &LibraryPaths, module: &ModuleName) -> Result<Self, LockError> {
        let locks_dir = paths.locks_dir();
        fs::create_dir_all(&locks_dir).map_err(|e| {
            LockError::CreateFailed(format!("cannot create {}: {}", locks_dir.display(), e))
        })?;

        let path = paths.lock_path(module);
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&path)
            .map_err(|e| {
                LockError::CreateFailed(format!("cannot open {}: {}", path.display(), e))
            })?;

        match file.try_lock_exclusive() {
            Ok(()) => {
                debug!(module = %module, path = %path.display(), "lock acquired");
                Ok(Self {
                    path,
                    file: Some(file),
                })
            }
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                Err(LockError::AlreadyLocked(module.to_string()))
            }
            Err(e) => Err(LockError::AcquireFailed(e.to_string())),
        }
    }

    /// Check if the lock is currently held.
    pub fn is_held(&self) -> bool {
        self.file.is_some()
    }

    /// Get the path to the lock file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock before the guard goes out of scope.
    pub fn release(&mut self) -> Result<(), LockError> {
        if let Some(file) = self.file.take() {
            file.unlock()
                .map_err(|e| LockError::ReleaseFailed(e.to_string()))?;
        }
        Ok(())
    }
}

impl Drop for CloneLock {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            let _ = file.unlock();
        }
    }
}
