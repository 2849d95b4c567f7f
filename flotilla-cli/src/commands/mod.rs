pub mod create;
pub mod extend;
pub mod feature;
pub mod fleet;
pub mod init;
pub mod list;
pub mod update_env;

use std::path::PathBuf;

use flotilla_core::{ArchiveRef, Stage};
use flotilla_provision::TemplateSource;

/// Resolve the template snapshot for a command: the default remote branch for
/// the stage, or a local archive when one was supplied.
pub(crate) fn template_source(staging: bool, archive: Option<PathBuf>) -> TemplateSource {
    let archive_ref = ArchiveRef::template(Stage::from_staging_flag(staging));
    match archive {
        Some(path) => TemplateSource::LocalArchive {
            path,
            root_dir: archive_ref.archive_root_dir(),
        },
        None => TemplateSource::Remote(archive_ref),
    }
}
