//! Pipeline orchestration.

use std::path::{Path, PathBuf};
use std::time::Instant;

use sitehoist_rewrite::{RewriteError, RuleSet, DEFAULT_LANGUAGE, DEFAULT_RESERVED_PREFIXES};

use crate::assets::{self, CssOptions, ScriptBundle};
use crate::fs_tasks;
use crate::images;
use crate::rewrite::{self, RewriteStats};
use crate::usemin;

/// Configuration for a deployment run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Site generator output directory
    pub source_dir: PathBuf,

    /// Deployment directory, wiped at the start of every run
    pub deploy_dir: PathBuf,

    /// Language subdirectory the entry document is hoisted from
    pub language: String,

    /// Entry document file name
    pub index: String,

    /// `href` prefixes the index rules leave alone
    pub reserved_prefixes: Vec<String>,

    /// Browserslist queries used for CSS vendor prefixing
    pub browsers: Vec<String>,

    /// Minify stylesheets
    pub minify_css: bool,

    /// Minify HTML pages
    pub minify_html: bool,

    /// Merge `<!-- build:... -->` blocks
    pub usemin: bool,

    /// Standalone scripts to minify into the deployment directory
    pub scripts: Vec<ScriptBundle>,

    /// Recompress images
    pub compress_images: bool,

    /// Image extensions to recompress (without dot)
    pub image_extensions: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("output"),
            deploy_dir: PathBuf::from("deploy"),
            language: DEFAULT_LANGUAGE.to_string(),
            index: "index.html".to_string(),
            reserved_prefixes: DEFAULT_RESERVED_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
            browsers: vec!["defaults".to_string()],
            minify_css: true,
            minify_html: true,
            usemin: true,
            scripts: vec![ScriptBundle::new("js/headers.js", "js/headers.min.js")],
            compress_images: true,
            image_extensions: vec!["png".to_string(), "gif".to_string(), "jpg".to_string()],
        }
    }
}

/// Summary of a pipeline run.
#[derive(Debug)]
pub struct PipelineResult {
    /// Files copied from the generator output
    pub files_copied: usize,

    /// HTML documents changed by the rewrite rules
    pub pages_rewritten: usize,

    /// Usemin blocks merged into single assets
    pub usemin_blocks: usize,

    /// Stylesheets prefixed/minified
    pub stylesheets: usize,

    /// Standalone scripts minified
    pub scripts_minified: usize,

    /// HTML pages minified
    pub pages_minified: usize,

    /// Images replaced by a smaller re-encoding
    pub images_recompressed: usize,

    /// Bytes saved by image recompression
    pub image_bytes_saved: u64,

    /// Total run time in milliseconds
    pub duration_ms: u64,

    /// Deployment directory
    pub deploy_dir: PathBuf,
}

/// Errors that abort a pipeline run.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("Missing input: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid rewrite rule: {0}")]
    Rule(#[from] RewriteError),

    #[error("Failed to process stylesheet {}: {message}", .path.display())]
    Css { path: PathBuf, message: String },

    #[error("Failed to minify {}: {message}", .path.display())]
    Html { path: PathBuf, message: String },

    #[error("Failed to minify script {}: {message}", .path.display())]
    Script { path: PathBuf, message: String },

    #[error("Bad build block in {}: {message}", .path.display())]
    Usemin { path: PathBuf, message: String },

    #[error("{label} command `{command}` failed: {status}")]
    Command {
        label: String,
        command: String,
        status: String,
    },
}

/// Build an [`PipelineError::Io`] mapper for `path`.
pub(crate) fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> PipelineError + '_ {
    move |source| PipelineError::Io {
        path: path.to_path_buf(),
        source,
    }
}

/// Deployment pipeline.
pub struct Pipeline {
    config: PipelineConfig,
    general: RuleSet,
    index: RuleSet,
}

impl Pipeline {
    /// Create a pipeline, compiling its rule sets.
    pub fn new(config: PipelineConfig) -> Result<Self, PipelineError> {
        let general = RuleSet::general()?;
        let index = RuleSet::index(&config.language, &config.reserved_prefixes);

        for set in [&general, &index] {
            tracing::debug!("{} rule set: {} rules", set.name(), set.len());
            for rule in set.rules() {
                tracing::debug!("{} rule: {}", set.name(), rule.describe());
            }
        }

        Ok(Self {
            config,
            general,
            index,
        })
    }

    /// Run every task in order. The first failure aborts the run.
    pub fn run(&self) -> Result<PipelineResult, PipelineError> {
        let start = Instant::now();
        let config = &self.config;

        fs_tasks::clean(&config.deploy_dir)?;

        let files_copied = fs_tasks::copy_tree(&config.source_dir, &config.deploy_dir)?;
        fs_tasks::hoist_index(
            &config.source_dir,
            &config.deploy_dir,
            &config.language,
            &config.index,
        )?;
        tracing::info!("Copied {} files to {}", files_copied, config.deploy_dir.display());

        let image_stats = if config.compress_images {
            images::compress_images(
                &config.source_dir,
                &config.deploy_dir,
                &config.image_extensions,
            )?
        } else {
            images::ImageStats::default()
        };

        // Marker rules must see the hrefs exactly as generated, so the
        // rewrite runs before usemin consumes the blocks.
        let rewrite_stats = self.rewrite()?;

        let usemin_blocks = if config.usemin {
            usemin::process_tree(&config.deploy_dir)?
        } else {
            0
        };

        let css_options = CssOptions {
            browsers: config.browsers.clone(),
            minify: config.minify_css,
        };
        let stylesheets = assets::process_css_dir(&config.deploy_dir.join("css"), &css_options)?;

        let scripts_minified =
            assets::minify_scripts(&config.source_dir, &config.deploy_dir, &config.scripts)?;

        let pages_minified = if config.minify_html {
            assets::minify_html_tree(&config.deploy_dir)?
        } else {
            0
        };

        Ok(PipelineResult {
            files_copied,
            pages_rewritten: rewrite_stats.changed_count(),
            usemin_blocks,
            stylesheets,
            scripts_minified,
            pages_minified,
            images_recompressed: image_stats.recompressed,
            image_bytes_saved: image_stats.bytes_saved,
            duration_ms: start.elapsed().as_millis() as u64,
            deploy_dir: config.deploy_dir.clone(),
        })
    }

    /// Apply the general rules to the whole deployment tree, then the index
    /// rules to the hoisted entry document.
    pub fn rewrite(&self) -> Result<RewriteStats, PipelineError> {
        let deploy = &self.config.deploy_dir;

        let mut stats = rewrite::rewrite_tree(deploy, &self.general)?;
        let index = deploy.join(&self.config.index);
        if rewrite::rewrite_file(&index, &self.index)? {
            stats.changed.insert(index);
        }

        tracing::info!(
            "Rewrote {} of {} pages",
            stats.changed_count(),
            stats.scanned
        );

        Ok(stats)
    }
}
