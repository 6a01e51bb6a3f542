//! Command line arguments.

use std::path::PathBuf;

use clap::Parser;

/// JSON-transforming reverse proxy.
#[derive(Parser, Debug)]
#[command(name = "jqhttp", version)]
pub struct Cli {
    /// Configuration YAML file. A missing file is not an error.
    #[arg(short = 'c', long = "config", default_value = "config.yml")]
    pub config: PathBuf,
}
