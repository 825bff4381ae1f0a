//! Configuration file (sitehoist.toml).

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use sitehoist_pipeline::assets::ScriptBundle;
use sitehoist_pipeline::PipelineConfig;
use sitehoist_rewrite::{DEFAULT_LANGUAGE, DEFAULT_RESERVED_PREFIXES};

/// Configuration file structure.
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct ConfigFile {
    pub site: SiteConfig,
    pub rewrite: RewriteConfig,
    pub assets: AssetsConfig,
    pub images: ImagesConfig,
    pub generator: GeneratorConfig,
    pub publish: PublishConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Generator output directory
    pub source: String,
    /// Deployment directory
    pub deploy: String,
    /// Default language subdirectory
    pub language: String,
    /// Entry document name
    pub index: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            source: "output".to_string(),
            deploy: "deploy".to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            index: "index.html".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RewriteConfig {
    pub reserved_prefixes: Vec<String>,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            reserved_prefixes: DEFAULT_RESERVED_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct AssetsConfig {
    /// Browserslist queries for CSS prefixing
    pub browsers: Vec<String>,
    pub minify_css: bool,
    pub minify_html: bool,
    pub usemin: bool,
    /// Standalone scripts to minify (`[[assets.js]]`)
    pub js: Vec<ScriptEntry>,
}

impl Default for AssetsConfig {
    fn default() -> Self {
        Self {
            browsers: vec!["defaults".to_string()],
            minify_css: true,
            minify_html: true,
            usemin: true,
            js: vec![ScriptEntry {
                src: "js/headers.js".to_string(),
                dest: "js/headers.min.js".to_string(),
            }],
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ScriptEntry {
    /// Relative to the source directory
    pub src: String,
    /// Relative to the deployment directory
    pub dest: String,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ImagesConfig {
    pub compress: bool,
    pub extensions: Vec<String>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            compress: true,
            extensions: vec!["png".to_string(), "gif".to_string(), "jpg".to_string()],
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Command that regenerates the source directory
    pub command: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            command: "bundle exec nanoc".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct PublishConfig {
    /// Command run inside the deployment directory; none skips publishing
    pub command: Option<String>,
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
pub struct Overrides {
    pub source: Option<PathBuf>,
    pub deploy: Option<PathBuf>,
    pub minify: Option<bool>,
}

impl ConfigFile {
    /// Load configuration from `path` if it exists.
    /// Returns an error if the config file exists but is malformed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No {} found, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config = Self::parse(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::info!("Loaded config from {}", path.display());

        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Build the pipeline configuration, applying command-line overrides.
    pub fn pipeline_config(&self, overrides: &Overrides) -> PipelineConfig {
        PipelineConfig {
            source_dir: overrides
                .source
                .clone()
                .unwrap_or_else(|| PathBuf::from(&self.site.source)),
            deploy_dir: overrides
                .deploy
                .clone()
                .unwrap_or_else(|| PathBuf::from(&self.site.deploy)),
            language: self.site.language.clone(),
            index: self.site.index.clone(),
            reserved_prefixes: self.rewrite.reserved_prefixes.clone(),
            browsers: self.assets.browsers.clone(),
            minify_css: overrides.minify.unwrap_or(self.assets.minify_css),
            minify_html: overrides.minify.unwrap_or(self.assets.minify_html),
            usemin: self.assets.usemin,
            scripts: self
                .assets
                .js
                .iter()
                .map(|entry| ScriptBundle::new(&entry.src, &entry.dest))
                .collect(),
            compress_images: self.images.compress,
            image_extensions: self.images.extensions.clone(),
        }
    }
}
