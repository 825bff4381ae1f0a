//! Write a default configuration file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

/// Run the init command.
pub async fn run(config_path: &Path, yes: bool) -> Result<()> {
    if config_path.exists() && !yes {
        tracing::warn!(
            "{} already exists. Use --yes to overwrite.",
            config_path.display()
        );
        return Ok(());
    }

    fs::write(config_path, DEFAULT_CONFIG)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    tracing::info!("Created {}", config_path.display());
    tracing::info!("Run 'sitehoist build' to build the deployment directory.");

    Ok(())
}

pub(crate) const DEFAULT_CONFIG: &str = r#"# sitehoist configuration

[site]
# Site generator output directory
source = "output"

# Deployment directory (wiped on every build)
deploy = "deploy"

# Language subdirectory whose index.html is hoisted to the root
language = "en"

# Entry document name
index = "index.html"

[rewrite]
# Links in the hoisted index that start with any of these are left alone;
# everything else is pointed back into the language directory.
reserved_prefixes = ["css/", "js/", "img/", "https://", "http://", "javadoc", "pt", "en"]

[assets]
# Browserslist queries used for CSS vendor prefixes
browsers = ["defaults"]
minify_css = true
minify_html = true

# Merge <!-- build:css|js --> blocks into single files
usemin = true

# Scripts minified from the source directory into the deployment directory.
# Set `js = []` under [assets] to skip.
[[assets.js]]
src = "js/headers.js"
dest = "js/headers.min.js"

[images]
compress = true
extensions = ["png", "gif", "jpg"]

[generator]
# Regenerates the source directory before `sitehoist deploy`
command = "bundle exec nanoc"

[publish]
# Run inside the deployment directory by `sitehoist deploy`. Unset skips publishing.
# command = "git add -A && git commit -m 'Publish' && git push origin gh-pages"
"#;
