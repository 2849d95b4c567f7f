//! Flotilla patch primitives — small, idempotence-friendly file mutations.
//!
//! Public API surface:
//! - [`error`] — [`PatchError`]
//! - [`ops`] — [`PatchOp`] and the three primitives
//! - [`env`] — wholesale `.env` line updates from JSON configs

pub mod env;
pub mod error;
pub mod ops;

pub use error::PatchError;
pub use ops::{append_line, apply, prepend_line, replace_all, PatchOp};

/// Escape a literal string for use as a substitution pattern.
pub use regex::escape as escape_pattern;
