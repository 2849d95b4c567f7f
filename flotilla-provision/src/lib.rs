//! Flotilla provisioning — fetch a remote template snapshot and materialize
//! part of it onto local disk.
//!
//! Public API surface:
//! - [`error`] — [`ProvisionError`]
//! - [`fetch`] — single-shot HTTPS archive download
//! - [`archive`] — zip extraction with path sanitization
//! - [`provision`] — scratch checkout + atomic-as-possible publish
//! - [`copy`] — recursive tree copy used by feature toggles

pub mod archive;
pub mod copy;
pub mod error;
pub mod fetch;
pub mod provision;

pub use copy::copy_tree;
pub use error::ProvisionError;
pub use provision::{provision, ScratchCheckout, TemplateSource};
