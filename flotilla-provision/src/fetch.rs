//! Archive fetcher — single HTTPS GET of a template snapshot.

use std::fs;
use std::io;
use std::path::Path;

use flotilla_core::ArchiveRef;

use crate::error::{io_err, ProvisionError};

/// Fetch the zip archive for `archive_ref` into `dest_file`.
///
/// One GET, no retries — a failed fetch is terminal for the calling
/// operation. A partially written `dest_file` is removed before the error is
/// surfaced.
pub fn fetch(archive_ref: &ArchiveRef, dest_file: &Path) -> Result<(), ProvisionError> {
    let url = archive_ref.archive_url();
    log::info!("fetching {url}");

    let response = ureq::get(&url).call().map_err(|e| ProvisionError::Network {
        url: url.clone(),
        source: Box::new(e),
    })?;

    let mut reader = response.into_reader();
    let mut out = fs::File::create(dest_file).map_err(|e| io_err(dest_file, e))?;

    if let Err(e) = io::copy(&mut reader, &mut out) {
        drop(out);
        let _ = fs::remove_file(dest_file);
        return Err(io_err(dest_file, e));
    }

    log::info!("fetched {} -> {}", url, dest_file.display());
    Ok(())
}
