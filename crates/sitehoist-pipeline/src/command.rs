//! External commands: the site generator and the publish step.

use std::path::Path;
use std::process::Command;

use crate::pipeline::{io_error, PipelineError};

/// Run `command` through `sh -c` in `cwd`, inheriting stdio.
///
/// A non-zero exit status is an error; output is not captured.
pub fn run_command(label: &str, command: &str, cwd: &Path) -> Result<(), PipelineError> {
    tracing::info!("Running {} command: {}", label, command);

    let status = Command::new("sh")
        .arg("-c")
        .arg(command)
        .current_dir(cwd)
        .status()
        .map_err(io_error(cwd))?;

    if !status.success() {
        return Err(PipelineError::Command {
            label: label.to_string(),
            command: command.to_string(),
            status: status.to_string(),
        });
    }

    Ok(())
}
