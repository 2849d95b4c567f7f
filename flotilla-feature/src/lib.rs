//! Flotilla feature toggles and provisioning-backed scaffolding.
//!
//! Public API surface:
//! - [`error`] — [`FeatureError`]
//! - [`descriptor`] — feature ids, markers, patch sequences
//! - [`toggle`] — the per-project and global toggle state machines
//! - [`scaffold`] — create / extend microservices, init a new monorepo

pub mod descriptor;
pub mod error;
pub mod scaffold;
pub mod toggle;

pub use descriptor::{FeatureId, GlobalFeatureId};
pub use error::FeatureError;
pub use scaffold::{create_project, extend_project, init_monorepo, ExtendKind};
pub use toggle::{toggle_feature, toggle_global_feature, ToggleAction, ToggleOutcome};
