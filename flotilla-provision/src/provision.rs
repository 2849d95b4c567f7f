//! Provisioning sessions — scratch checkout and subtree publish.
//!
//! ## Publish protocol
//!
//! 1. Create a scratch directory as a *sibling* of the destination (same
//!    filesystem, so the final rename cannot fail with EXDEV).
//! 2. Fetch the archive into the scratch and extract it fully; extraction is
//!    synchronous, so its return is the completion barrier.
//! 3. Locate `scratch/{repository}-{ref}`.
//! 4. If the destination exists, remove it, then rename the subtree onto the
//!    destination. The rename itself is atomic; the only window in which the
//!    destination is absent is between the remove and the rename.
//!
//! The scratch directory is removed on every exit path, success or failure
//! (`TempDir` drop).

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use flotilla_core::ArchiveRef;

use crate::archive::extract_zip;
use crate::error::{io_err, ProvisionError};
use crate::fetch::fetch;

/// Where template content comes from.
///
/// `LocalArchive` is the offline path: a snapshot zip already on disk,
/// named with the top-level directory it extracts to. Used by tests and by
/// air-gapped setups; `Remote` is the normal codeload fetch.
#[derive(Debug, Clone)]
pub enum TemplateSource {
    Remote(ArchiveRef),
    LocalArchive { path: PathBuf, root_dir: String },
}

/// An extracted template snapshot living in a scratch directory.
///
/// Owns the scratch exclusively; dropping the checkout removes it.
#[derive(Debug)]
pub struct ScratchCheckout {
    scratch: TempDir,
    root: PathBuf,
}

impl ScratchCheckout {
    /// Fetch and extract `source` into a fresh scratch directory under
    /// `parent`.
    pub fn obtain(source: &TemplateSource, parent: &Path) -> Result<Self, ProvisionError> {
        fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        let scratch = tempfile::Builder::new()
            .prefix(".flotilla-scratch-")
            .tempdir_in(parent)
            .map_err(|e| io_err(parent, e))?;

        let (archive_path, root_dir) = match source {
            TemplateSource::Remote(archive_ref) => {
                let download = scratch.path().join("archive.zip");
                fetch(archive_ref, &download)?;
                (download, archive_ref.archive_root_dir())
            }
            TemplateSource::LocalArchive { path, root_dir } => {
                (path.clone(), root_dir.clone())
            }
        };

        extract_zip(&archive_path, scratch.path())?;

        let root = scratch.path().join(&root_dir);
        if !root.is_dir() {
            return Err(ProvisionError::MissingSubtree { path: root });
        }
        Ok(Self { scratch, root })
    }

    /// Obtain a checkout in the system temp directory (for callers that copy
    /// files out rather than publish the subtree).
    pub fn obtain_in_temp(source: &TemplateSource) -> Result<Self, ProvisionError> {
        Self::obtain(source, &std::env::temp_dir())
    }

    /// Root of the extracted snapshot (`scratch/{repository}-{ref}`).
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Publish the extracted subtree onto `destination` and consume the
    /// checkout. Remove-then-rename: the destination is never observed half
    /// old / half new, only briefly absent.
    pub fn publish(self, destination: &Path) -> Result<(), ProvisionError> {
        if destination.exists() {
            fs::remove_dir_all(destination).map_err(|e| io_err(destination, e))?;
        }
        fs::rename(&self.root, destination).map_err(|e| io_err(destination, e))?;
        log::info!("published template subtree to {}", destination.display());
        Ok(())
        // self.scratch dropped here — removes what is left of the scratch
    }
}

/// Provision a whole template snapshot onto `destination`.
///
/// The scratch lives next to the destination so the publish rename stays on
/// one filesystem. No scratch directory survives this call, regardless of
/// outcome.
pub fn provision(source: &TemplateSource, destination: &Path) -> Result<(), ProvisionError> {
    let parent = match destination.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let checkout = ScratchCheckout::obtain(source, &parent)?;
    checkout.publish(destination)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
