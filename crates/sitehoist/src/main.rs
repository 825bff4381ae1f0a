//! sitehoist CLI - deploy a generated static site.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "sitehoist")]
#[command(about = "Copy, rewrite, minify and publish a generated static site")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to sitehoist.toml config file
    #[arg(short, long, default_value = "sitehoist.toml", global = true)]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default sitehoist.toml
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        yes: bool,
    },

    /// Build the deployment directory from the generator output
    Build {
        /// Generator output directory (defaults to config or "output")
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Deployment directory (defaults to config or "deploy")
        #[arg(short, long)]
        deploy: Option<PathBuf>,

        /// Skip CSS and HTML minification
        #[arg(long)]
        no_minify: bool,
    },

    /// Regenerate the site, build it and run the publish command
    Deploy {
        /// Use the existing generator output instead of regenerating
        #[arg(long)]
        skip_generate: bool,

        /// Build only, do not run the publish command
        #[arg(long)]
        skip_publish: bool,
    },

    /// Re-apply the link rewrite rules to an existing deployment directory
    Rewrite {
        /// Deployment directory (defaults to config or "deploy")
        #[arg(short, long)]
        dir: Option<PathBuf>,
    },

    /// Preview the deployment directory
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// Directory to serve (defaults to config or "deploy")
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Do not open browser
        #[arg(long)]
        no_open: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt().with_env_filter(filter).with_target(false).init();

    match cli.command {
        Commands::Init { yes } => {
            commands::init::run(&cli.config, yes).await?;
        }
        Commands::Build {
            source,
            deploy,
            no_minify,
        } => {
            let overrides = config::Overrides {
                source,
                deploy,
                minify: if no_minify { Some(false) } else { None },
            };
            commands::build::run(&cli.config, overrides).await?;
        }
        Commands::Deploy {
            skip_generate,
            skip_publish,
        } => {
            commands::deploy::run(&cli.config, !skip_generate, !skip_publish).await?;
        }
        Commands::Rewrite { dir } => {
            commands::rewrite::run(&cli.config, dir).await?;
        }
        Commands::Serve { port, dir, no_open } => {
            commands::serve::run(&cli.config, port, dir, !no_open).await?;
        }
    }

    Ok(())
}
