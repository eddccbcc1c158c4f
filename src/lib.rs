//! Librarian - vendor modules into projects from a library of git clones
//!
//! The library is a directory of git clones, one per module, plus a
//! configuration describing kinds of projects. `checkout` copies a module
//! into a project and commits it there; `checkin` copies the project's
//! edits back onto a per-project branch in the module's clone.
//!
//! # Architecture
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Checkout, checkin, and library maintenance
//! - [`core`] - Domain types, configuration, filtering, and tree copying
//! - [`git`] - Single interface for all Git operations
//! - [`ui`] - User interaction utilities
//!
//! # Invariants
//!
//! 1. A dirty repository is never written to
//! 2. `.git` is never copied between trees
//! 3. A project branch in the library is only ever fast-forwarded
//! 4. One command at a time touches a given library clone

pub mod cli;
pub mod core;
pub mod engine;
pub mod git;
pub mod ui;
