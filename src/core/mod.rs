//! core
//!
//! Domain types, configuration, and the tree operations behind every sync.
//!
//! # Modules
//!
//! - [`types`] - Strong types: ModuleName, ProjectName, Oid
//! - [`config`] - Library configuration schema and loading
//! - [`paths`] - Centralized path routing for library storage
//! - [`filter`] - Include/exclude name filtering
//! - [`resolve`] - Module root resolution
//! - [`materialize`] - Filtered tree mirroring
//! - [`normalize`] - Single-file entry renaming
//! - [`ops`] - Per-module locking
//!
//! Nothing in here touches git. The engine combines these pieces with the
//! [`crate::git`] interface.

pub mod config;
pub mod filter;
pub mod materialize;
pub mod normalize;
pub mod ops;
pub mod paths;
pub mod resolve;
pub mod types;
