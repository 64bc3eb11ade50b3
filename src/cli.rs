use clap::Parser;
use std::path::PathBuf;

/// Mounts a Veracrypt volume with a Linux filesystem in Windows or Linux.
#[derive(Parser, Debug)]
#[command(name = "veracrypt-mount")]
#[command(about = "Mounts a Veracrypt volume with a Linux filesystem in Windows or Linux.")]
#[command(version)]
pub struct Cli {
    /// Path to a .ini configuration file for this script.
    #[arg(short, long = "config", value_name = "PATH")]
    pub config: PathBuf,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
