//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`prompts`] - Confirmations
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All user-facing text and prompts go through this module so quiet and
//! non-interactive modes are honored everywhere. Diagnostics for developers
//! go through `tracing` instead.

pub mod output;
pub mod prompts;
