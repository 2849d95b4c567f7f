//! Flotilla core library — domain types, fleet configuration, discovery,
//! per-project feature state.
//!
//! Public API surface:
//! - [`types`] — newtypes and domain structs
//! - [`config`] — [`FleetConfig`] passed explicitly into every component
//! - [`error`] — [`CoreError`]
//! - [`discover`] — fleet discovery over the filesystem
//! - [`state`] — applied-feature manifest per project

pub mod config;
pub mod discover;
pub mod error;
pub mod state;
pub mod types;

pub use config::FleetConfig;
pub use discover::discover;
pub use error::CoreError;
pub use types::{ArchiveRef, FleetProject, ProjectName, Stage, MANIFEST_FILE};
