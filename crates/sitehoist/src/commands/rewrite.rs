//! Re-apply link rewriting to an existing deployment directory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sitehoist_pipeline::Pipeline;

use crate::config::{ConfigFile, Overrides};

/// Run the rewrite command.
pub async fn run(config_path: &Path, dir: Option<PathBuf>) -> Result<()> {
    let file_config = ConfigFile::load(config_path)?;
    let config = file_config.pipeline_config(&Overrides {
        deploy: dir,
        ..Default::default()
    });

    if !config.deploy_dir.is_dir() {
        anyhow::bail!(
            "Directory not found: {}. Run 'sitehoist build' first.",
            config.deploy_dir.display()
        );
    }

    let stats = Pipeline::new(config)?.rewrite().context("Rewrite failed")?;
    tracing::info!("{} of {} pages changed", stats.changed_count(), stats.scanned);

    Ok(())
}
