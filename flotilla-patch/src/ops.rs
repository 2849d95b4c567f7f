//! Patch primitives.
//!
//! Three file mutations: regex replace-all, append-line, prepend-line. All
//! read-then-write the whole file — targets are small source and config
//! files, never data files.
//!
//! `replace_all` with zero matches succeeds silently: feature toggles must be
//! safely re-invokable, so "pattern not found" is a defined no-op, not an
//! error. A missing target file is always `PatchError::FileNotFound`.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::{io_err, PatchError};

/// One declarative file mutation, bound to its target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOp {
    Replace {
        file: PathBuf,
        pattern: String,
        replacement: String,
    },
    Append {
        file: PathBuf,
        line: String,
    },
    Prepend {
        file: PathBuf,
        line: String,
    },
}

impl PatchOp {
    pub fn replace(
        file: impl Into<PathBuf>,
        pattern: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Self {
        PatchOp::Replace {
            file: file.into(),
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }

    pub fn append(file: impl Into<PathBuf>, line: impl Into<String>) -> Self {
        PatchOp::Append {
            file: file.into(),
            line: line.into(),
        }
    }

    pub fn prepend(file: impl Into<PathBuf>, line: impl Into<String>) -> Self {
        PatchOp::Prepend {
            file: file.into(),
            line: line.into(),
        }
    }

    pub fn target(&self) -> &Path {
        match self {
            PatchOp::Replace { file, .. }
            | PatchOp::Append { file, .. }
            | PatchOp::Prepend { file, .. } => file,
        }
    }
}

/// Apply an ordered sequence of operations, stopping at the first failure.
/// Earlier effects stay in place; remaining operations are skipped.
pub fn apply(ops: &[PatchOp]) -> Result<(), PatchError> {
    for op in ops {
        match op {
            PatchOp::Replace {
                file,
                pattern,
                replacement,
            } => {
                replace_all(file, pattern, replacement)?;
            }
            PatchOp::Append { file, line } => append_line(file, line)?,
            PatchOp::Prepend { file, line } => prepend_line(file, line)?,
        }
    }
    Ok(())
}

/// Substitute every non-overlapping match of `pattern` in `file` with
/// `replacement`, writing the whole result back. Returns the match count;
/// zero matches is a silent success.
pub fn replace_all(file: &Path, pattern: &str, replacement: &str) -> Result<usize, PatchError> {
    let contents = read_target(file)?;
    let re = Regex::new(pattern).map_err(|e| PatchError::Pattern {
        pattern: pattern.to_owned(),
        source: e,
    })?;

    let matches = re.find_iter(&contents).count();
    if matches == 0 {
        log::debug!("no match for '{}' in {}", pattern, file.display());
        return Ok(0);
    }

    let replaced = re.replace_all(&contents, replacement);
    fs::write(file, replaced.as_bytes()).map_err(|e| io_err(file, e))?;
    log::debug!(
        "replaced {} occurrence(s) of '{}' in {}",
        matches,
        pattern,
        file.display()
    );
    Ok(matches)
}

/// Append `line` plus a newline at the end of `file`.
pub fn append_line(file: &Path, line: &str) -> Result<(), PatchError> {
    let contents = read_target(file)?;
    let mut next = contents;
    next.push_str(line);
    next.push('\n');
    fs::write(file, next).map_err(|e| io_err(file, e))
}

/// Write `line` plus a newline, followed by the original contents of `file`.
pub fn prepend_line(file: &Path, line: &str) -> Result<(), PatchError> {
    let contents = read_target(file)?;
    let mut next = String::with_capacity(line.len() + 1 + contents.len());
    next.push_str(line);
    next.push('\n');
    next.push_str(&contents);
    fs::write(file, next).map_err(|e| io_err(file, e))
}

fn read_target(file: &Path) -> Result<String, PatchError> {
    if !file.exists() {
        return Err(PatchError::FileNotFound {
            path: file.to_path_buf(),
        });
    }
    fs::read_to_string(file).map_err(|e| io_err(file, e))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
