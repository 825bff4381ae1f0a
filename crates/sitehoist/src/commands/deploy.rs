//! Regenerate, build and publish.

use std::path::Path;

use anyhow::{Context, Result};
use sitehoist_pipeline::fs_tasks::clean;
use sitehoist_pipeline::{run_command, Pipeline};

use crate::commands::build::report;
use crate::config::{ConfigFile, Overrides};

/// Run the deploy command.
pub async fn run(config_path: &Path, generate: bool, publish: bool) -> Result<()> {
    let file_config = ConfigFile::load(config_path)?;
    let config = file_config.pipeline_config(&Overrides::default());

    if generate {
        clean(&config.source_dir)?;
        run_command("generator", &file_config.generator.command, Path::new("."))
            .context("Site generation failed")?;
    }

    let deploy_dir = config.deploy_dir.clone();
    let result = Pipeline::new(config)?.run().context("Build failed")?;
    report(&result);

    match (&file_config.publish.command, publish) {
        (Some(command), true) => {
            run_command("publish", command, &deploy_dir).context("Publish failed")?;
            tracing::info!("Published {}", deploy_dir.display());
        }
        (None, true) => {
            tracing::warn!("No [publish] command configured; {} left in place", deploy_dir.display());
        }
        (_, false) => {
            tracing::info!("Skipping publish");
        }
    }

    Ok(())
}
