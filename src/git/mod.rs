//! git
//!
//! Single interface for all Git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to Git. Library clones and project
//! repositories are both read and written through [`Git`]. No other module
//! should import `git2`, and nothing shells out to the git CLI.
//!
//! # Responsibilities
//!
//! - Repository discovery, opening and initialization
//! - Status queries (dirty check, pending deletions, status listing)
//! - Branch creation, tracking, checkout and fast-forward
//! - Staging, committing and commit-range logs
//! - Remote selection and fetch
//!
//! # Invariants
//!
//! - Branches only ever move forward; nothing here resets or rebases
//! - All operations return strong types (Oid)

mod interface;

pub use interface::{CommitInfo, Git, GitError, WorktreeStatus, MAINLINE_BRANCH};
