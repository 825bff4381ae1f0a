//! CLI subcommands.

pub mod build;
pub mod deploy;
pub mod init;
pub mod rewrite;
pub mod serve;
