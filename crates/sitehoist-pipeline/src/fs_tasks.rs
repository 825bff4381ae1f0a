//! Filesystem tasks: clean, copy, hoist.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::pipeline::{io_error, PipelineError};

/// Remove a directory tree. Returns `false` if there was nothing to remove.
pub fn clean(dir: &Path) -> Result<bool, PipelineError> {
    if !dir.exists() {
        return Ok(false);
    }

    fs::remove_dir_all(dir).map_err(io_error(dir))?;
    tracing::info!("Cleaned {}", dir.display());

    Ok(true)
}

/// Copy every file under `source` into `dest`, keeping relative paths.
pub fn copy_tree(source: &Path, dest: &Path) -> Result<usize, PipelineError> {
    if !source.is_dir() {
        return Err(PipelineError::MissingInput(source.to_path_buf()));
    }

    let mut count = 0;

    for path in files_under(source, |_| true)? {
        let relative = path.strip_prefix(source).unwrap_or(&path);
        copy_file(&path, &dest.join(relative))?;
        count += 1;
    }

    Ok(count)
}

/// Copy `source/<language>/<index>` to `dest/<index>`.
pub fn hoist_index(
    source: &Path,
    dest: &Path,
    language: &str,
    index: &str,
) -> Result<PathBuf, PipelineError> {
    let entry = source.join(language).join(index);
    if !entry.is_file() {
        return Err(PipelineError::MissingInput(entry));
    }

    let target = dest.join(index);
    copy_file(&entry, &target)?;
    tracing::debug!("Hoisted {} to {}", entry.display(), target.display());

    Ok(target)
}

/// Copy one file, creating the destination directory.
pub fn copy_file(from: &Path, to: &Path) -> Result<(), PipelineError> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent).map_err(io_error(parent))?;
    }
    fs::copy(from, to).map_err(io_error(from))?;

    Ok(())
}

/// Every regular file under `root` accepted by `filter`, in sorted order.
///
/// Any entry that cannot be read (a dangling link, a permission error, a
/// symlink loop) fails the whole walk.
pub fn files_under(
    root: &Path,
    filter: impl Fn(&Path) -> bool,
) -> Result<Vec<PathBuf>, PipelineError> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = entry.map_err(|e| walk_error(root, e))?;
        if entry.file_type().is_file() && filter(entry.path()) {
            files.push(entry.into_path());
        }
    }

    Ok(files)
}

fn walk_error(root: &Path, err: walkdir::Error) -> PipelineError {
    let path = err.path().unwrap_or(root).to_path_buf();
    let message = err.to_string();
    let source = err
        .into_io_error()
        .unwrap_or_else(|| io::Error::other(message));

    PipelineError::Io { path, source }
}

/// Whether `path` has one of `extensions` (case-insensitive, no dot).
pub fn has_extension<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };

    extensions
        .iter()
        .any(|wanted| wanted.as_ref().eq_ignore_ascii_case(ext))
}

/// Every `.html` file under `root`.
pub fn html_files(root: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    files_under(root, |p| has_extension(p, &["html"]))
}
