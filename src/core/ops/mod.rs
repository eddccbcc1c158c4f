//! core::ops
//!
//! Operation safety.
//!
//! # Modules
//!
//! - [`lock`] - Advisory per-module lock
//!
//! # Architecture
//!
//! Every command that touches a library clone acquires the module's lock
//! before its first precondition check and holds it until the clone is
//! back in a consistent state.

pub mod lock;

pub use lock::{CloneLock, LockError};
