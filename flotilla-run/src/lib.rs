//! Flotilla fleet command orchestration.
//!
//! Public API surface:
//! - [`error`] — [`RunError`]
//! - [`runner`] — [`CommandTemplate`], [`run_across_fleet`], run reports

pub mod error;
pub mod runner;

pub use error::RunError;
pub use runner::{
    run_across_fleet, CommandTemplate, FailureMode, FleetRunReport, HookDecision, ProjectOutcome,
    ProjectStatus, RunOptions,
};
