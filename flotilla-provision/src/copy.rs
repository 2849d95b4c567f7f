//! Recursive tree copy.

use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::error::{io_err, ProvisionError};

/// Copy the tree rooted at `src` into `dst`, preserving relative layout.
///
/// Existing files in `dst` are overwritten; extra files already in `dst` are
/// left alone.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<(), ProvisionError> {
    for entry in WalkDir::new(src) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            io_err(path, e.into())
        })?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .expect("walkdir yields paths under its root");
        let target = dst.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(|e| io_err(&target, e))?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
            }
            fs::copy(entry.path(), &target).map_err(|e| io_err(&target, e))?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn copies_nested_tree() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        fs::create_dir_all(src.join("a/b")).unwrap();
        fs::write(src.join("top.txt"), "top").unwrap();
        fs::write(src.join("a/b/deep.txt"), "deep").unwrap();

        let dst = tmp.path().join("dst");
        copy_tree(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("top.txt")).unwrap(), "top");
        assert_eq!(fs::read_to_string(dst.join("a/b/deep.txt")).unwrap(), "deep");
    }

    #[test]
    fn overwrites_existing_files_keeps_extras() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("src");
        let dst = tmp.path().join("dst");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dst).unwrap();
        fs::write(src.join("file.txt"), "new").unwrap();
        fs::write(dst.join("file.txt"), "old").unwrap();
        fs::write(dst.join("extra.txt"), "keep").unwrap();

        copy_tree(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("file.txt")).unwrap(), "new");
        assert_eq!(fs::read_to_string(dst.join("extra.txt")).unwrap(), "keep");
    }

    #[test]
    fn missing_source_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let err = copy_tree(&tmp.path().join("absent"), &tmp.path().join("dst")).unwrap_err();
        assert!(matches!(err, ProvisionError::Io { .. }));
    }
}
