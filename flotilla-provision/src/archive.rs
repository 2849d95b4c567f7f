//! Zip extraction.
//!
//! Extraction is fully synchronous: when [`extract_zip`] returns, every entry
//! has been written and flushed. Callers may publish the extracted tree
//! immediately — there is no separate completion signal to wait for.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::{io_err, ProvisionError};

/// Extract `archive_path` into `dest` (created if absent).
///
/// Entry paths are sanitized; an entry that would escape `dest` fails the
/// whole extraction with [`ProvisionError::UnsafeEntry`].
pub fn extract_zip(archive_path: &Path, dest: &Path) -> Result<(), ProvisionError> {
    let file = fs::File::open(archive_path).map_err(|e| io_err(archive_path, e))?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| ProvisionError::Extract {
        path: archive_path.to_path_buf(),
        source: e,
    })?;

    fs::create_dir_all(dest).map_err(|e| io_err(dest, e))?;

    for index in 0..archive.len() {
        let mut entry = archive.by_index(index).map_err(|e| ProvisionError::Extract {
            path: archive_path.to_path_buf(),
            source: e,
        })?;

        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            return Err(ProvisionError::UnsafeEntry {
                name: entry.name().to_owned(),
            });
        };
        let out_path = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&out_path).map_err(|e| io_err(&out_path, e))?;
            continue;
        }

        if let Some(parent) = out_path.parent() {
            fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
        }
        let mut out = fs::File::create(&out_path).map_err(|e| io_err(&out_path, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| io_err(&out_path, e))?;

        #[cfg(unix)]
        if let Some(mode) = entry.unix_mode() {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&out_path, fs::Permissions::from_mode(mode))
                .map_err(|e| io_err(&out_path, e))?;
        }
    }

    log::debug!(
        "extracted {} entries from {} into {}",
        archive.len(),
        archive_path.display(),
        dest.display()
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod tests {
    use std::io::Write;

    use tempfile::TempDir;
    use zip::write::FileOptions;

    use super::*;

    pub(crate) fn build_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, contents) in entries {
            if name.ends_with('/') {
                writer.add_directory(*name, FileOptions::default()).unwrap();
            } else {
                writer.start_file(*name, FileOptions::default()).unwrap();
                writer.write_all(contents.as_bytes()).unwrap();
            }
        }
        writer.finish().unwrap();
    }

    #[test]
    fn extracts_files_and_directories() {
        let tmp = TempDir::new().unwrap();
        let zip_path = tmp.path().join("snap.zip");
        build_zip(
            &zip_path,
            &[
                ("repo-prod/", ""),
                ("repo-prod/README.md", "# template"),
                ("repo-prod/src/index.ts", "export {};"),
            ],
        );

        let dest = tmp.path().join("out");
        extract_zip(&zip_path, &dest).unwrap();

        assert_eq!(
            fs::read_to_string(dest.join("repo-prod/README.md")).unwrap(),
            "# template"
        );
        assert_eq!(
            fs::read_to_string(dest.join("repo-prod/src/index.ts")).unwrap(),
            "export {};"
        );
    }

    #[test]
    fn corrupt_archive_reports_extract_error() {
        let tmp = TempDir::new().unwrap();
        let zip_path = tmp.path().join("bad.zip");
        fs::write(&zip_path, b"this is not a zip archive").unwrap();

        let err = extract_zip(&zip_path, &tmp.path().join("out")).unwrap_err();
        assert!(matches!(err, ProvisionError::Extract { .. }));
    }

    #[test]
    fn escaping_entry_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let zip_path = tmp.path().join("evil.zip");
        build_zip(&zip_path, &[("../outside.txt", "nope")]);

        let dest = tmp.path().join("out");
        let err = extract_zip(&zip_path, &dest).unwrap_err();
        assert!(matches!(err, ProvisionError::UnsafeEntry { .. }));
        assert!(!tmp.path().join("outside.txt").exists());
    }

    #[test]
    fn missing_archive_reports_io_error() {
        let tmp = TempDir::new().unwrap();
        let err = extract_zip(&tmp.path().join("absent.zip"), &tmp.path().join("out"))
            .unwrap_err();
        assert!(matches!(err, ProvisionError::Io { .. }));
    }
}
