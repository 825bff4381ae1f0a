//! Build the deployment directory.

use std::path::Path;

use anyhow::{Context, Result};
use sitehoist_pipeline::{Pipeline, PipelineResult};

use crate::config::{ConfigFile, Overrides};

/// Run the build command.
pub async fn run(config_path: &Path, overrides: Overrides) -> Result<()> {
    tracing::info!("Building deployment directory...");

    let file_config = ConfigFile::load(config_path)?;
    let config = file_config.pipeline_config(&overrides);

    let result = Pipeline::new(config)?.run().context("Build failed")?;
    report(&result);

    Ok(())
}

/// Log a summary of a pipeline run.
pub(crate) fn report(result: &PipelineResult) {
    tracing::info!(
        "Copied {} files, rewrote {} pages, merged {} build blocks in {}ms",
        result.files_copied,
        result.pages_rewritten,
        result.usemin_blocks,
        result.duration_ms
    );

    tracing::info!(
        "Processed {} stylesheets, {} scripts, {} pages",
        result.stylesheets,
        result.scripts_minified,
        result.pages_minified
    );

    if result.images_recompressed > 0 {
        tracing::info!(
            "Recompressed {} images ({} bytes saved)",
            result.images_recompressed,
            result.image_bytes_saved
        );
    }

    tracing::info!("Output: {}", result.deploy_dir.display());
}
