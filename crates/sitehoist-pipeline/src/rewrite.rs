//! Apply rule sets to HTML files on disk.
//!
//! Files are rewritten one at a time, in place, with no backup. There is no
//! locking: two runs against the same deployment directory race.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use sitehoist_rewrite::RuleSet;

use crate::fs_tasks::html_files;
use crate::pipeline::{io_error, PipelineError};

/// Outcome of a rewrite pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RewriteStats {
    /// HTML files read
    pub scanned: usize,
    /// Files whose content changed and was written back
    pub changed: BTreeSet<PathBuf>,
}

impl RewriteStats {
    /// Number of distinct files changed.
    pub fn changed_count(&self) -> usize {
        self.changed.len()
    }
}

/// Rewrite one document in place. Returns whether its content changed.
pub fn rewrite_file(path: &Path, rules: &RuleSet) -> Result<bool, PipelineError> {
    if !path.is_file() {
        return Err(PipelineError::MissingInput(path.to_path_buf()));
    }

    let content = fs::read_to_string(path).map_err(io_error(path))?;
    let rewritten = rules.apply(&content);

    if rewritten == content {
        return Ok(false);
    }

    fs::write(path, rewritten).map_err(io_error(path))?;
    tracing::debug!("Applied {} rules to {}", rules.name(), path.display());

    Ok(true)
}

/// Rewrite every `.html` file under `root`.
pub fn rewrite_tree(root: &Path, rules: &RuleSet) -> Result<RewriteStats, PipelineError> {
    let mut stats = RewriteStats::default();

    for path in html_files(root)? {
        stats.scanned += 1;
        if rewrite_file(&path, rules)? {
            stats.changed.insert(path);
        }
    }

    Ok(stats)
}
