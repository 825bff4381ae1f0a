//! Deployment pipeline for generated static sites.
//!
//! Copies a site generator's output into a deployment directory, hoists the
//! default-language entry page to the root, rewrites links, merges usemin
//! build blocks, prefixes and minifies CSS, minifies scripts, recompresses
//! images and minifies HTML.

pub mod assets;
pub mod command;
pub mod fs_tasks;
pub mod images;
pub mod pipeline;
pub mod rewrite;
pub mod usemin;

pub use command::run_command;
pub use assets::ScriptBundle;
pub use pipeline::{Pipeline, PipelineConfig, PipelineError, PipelineResult};
pub use rewrite::RewriteStats;
