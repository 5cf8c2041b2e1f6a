pub use clap::Parser;

use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "s3vol")]
#[command(about = "Docker volume plugin for S3 buckets mounted with goofys")]
#[command(version)]
pub struct Args {
    /// Path to a TOML config file
    #[arg(long, global = true, env = "S3VOL_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: crate::Command,
}
