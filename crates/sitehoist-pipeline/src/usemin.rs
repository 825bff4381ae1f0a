//! Usemin build blocks.
//!
//! A page groups the assets it wants concatenated between two comments:
//!
//! ```html
//! <!-- build:css /css/site.min.css -->
//! <link rel="stylesheet" href="../css/a.css">
//! <link rel="stylesheet" href="../css/b.css">
//! <!-- endbuild -->
//! ```
//!
//! The referenced files are concatenated into the target and the block is
//! replaced by a single tag pointing at it.

use std::fs;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::fs_tasks::html_files;
use crate::pipeline::{io_error, PipelineError};

static BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)<!--\s*build:(\w+)\s+(\S+)\s*-->(.*?)<!--\s*endbuild\s*-->")
        .expect("Invalid build block regex")
});

static HREF_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"href="([^"]+)""#).expect("Invalid href regex"));

static SRC_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"src="([^"]+)""#).expect("Invalid src regex"));

/// Asset type of a build block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Css,
    Js,
}

impl BlockKind {
    fn from_name(name: &str) -> Option<Self> {
        match name {
            "css" => Some(Self::Css),
            "js" => Some(Self::Js),
            _ => None,
        }
    }

    /// Text placed between concatenated sources.
    pub fn separator(&self) -> &'static str {
        match self {
            Self::Css => "\n",
            Self::Js => ";\n",
        }
    }

    /// The tag that replaces a block.
    pub fn tag(&self, target: &str) -> String {
        match self {
            Self::Css => format!(r#"<link rel="stylesheet" href="{}">"#, target),
            Self::Js => format!(r#"<script src="{}"></script>"#, target),
        }
    }

    fn reference_regex(&self) -> &'static Regex {
        match self {
            Self::Css => &HREF_RE,
            Self::Js => &SRC_RE,
        }
    }
}

/// A parsed build block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildBlock {
    pub kind: BlockKind,
    /// Concatenation target as written in the marker
    pub target: String,
    /// Source references in document order
    pub sources: Vec<String>,
    /// Byte range of the whole block in the page
    pub range: Range<usize>,
}

/// Find every build block in a page.
///
/// Blocks with an unknown asset type are an error rather than being skipped,
/// so a typo does not silently ship unmerged assets.
pub fn find_blocks(html: &str) -> Result<Vec<BuildBlock>, String> {
    BLOCK_RE
        .captures_iter(html)
        .map(|caps| -> Result<BuildBlock, String> {
            let whole = caps.get(0).map(|m| m.range()).unwrap_or_default();
            let kind = BlockKind::from_name(&caps[1])
                .ok_or_else(|| format!("unknown block type build:{}", &caps[1]))?;
            let sources = kind
                .reference_regex()
                .captures_iter(&caps[3])
                .map(|c| c[1].to_string())
                .collect();

            Ok(BuildBlock {
                kind,
                target: caps[2].to_string(),
                sources,
                range: whole,
            })
        })
        .collect()
}

/// Resolve an asset reference from a page.
///
/// Root-relative references resolve against the deployment root, anything
/// else against the page's directory. Query strings and fragments are ignored.
pub fn resolve_asset(root: &Path, page_dir: &Path, reference: &str) -> PathBuf {
    let reference = reference.split(['?', '#']).next().unwrap_or(reference);

    match reference.strip_prefix('/') {
        Some(rooted) => root.join(rooted),
        None => page_dir.join(reference),
    }
}

/// Merge the build blocks of one page. Returns the number of blocks merged.
pub fn process_page(root: &Path, page: &Path) -> Result<usize, PipelineError> {
    let html = fs::read_to_string(page).map_err(io_error(page))?;
    let blocks = find_blocks(&html).map_err(|message| PipelineError::Usemin {
        path: page.to_path_buf(),
        message,
    })?;

    if blocks.is_empty() {
        return Ok(0);
    }

    let page_dir = page.parent().unwrap_or(root);
    let mut output = String::with_capacity(html.len());
    let mut cursor = 0;

    for block in &blocks {
        let mut parts = Vec::with_capacity(block.sources.len());
        for source in &block.sources {
            let path = resolve_asset(root, page_dir, source);
            if !path.is_file() {
                return Err(PipelineError::MissingInput(path));
            }
            parts.push(fs::read_to_string(&path).map_err(io_error(&path))?);
        }

        let target = resolve_asset(root, page_dir, &block.target);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }
        fs::write(&target, parts.join(block.kind.separator())).map_err(io_error(&target))?;

        tracing::debug!(
            "Merged {} sources into {}",
            block.sources.len(),
            target.display()
        );

        output.push_str(&html[cursor..block.range.start]);
        output.push_str(&block.kind.tag(&block.target));
        cursor = block.range.end;
    }
    output.push_str(&html[cursor..]);

    fs::write(page, output).map_err(io_error(page))?;

    Ok(blocks.len())
}

/// Merge build blocks in every page under `root`.
pub fn process_tree(root: &Path) -> Result<usize, PipelineError> {
    let mut total = 0;

    for page in html_files(root)? {
        total += process_page(root, &page)?;
    }

    if total > 0 {
        tracing::info!("Merged {} build blocks", total);
    }

    Ok(total)
}
