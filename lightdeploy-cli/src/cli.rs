//! CLI argument parsing definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "lightdeploy", author, version, about, long_about = None)]
pub struct Cli {
    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Prefix for environment variable overrides
    #[arg(long, value_name = "PREFIX", global = true, default_value = "LIGHTDEPLOY")]
    pub env_prefix: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve a configuration file and summarize it
    Check {
        /// Path to configuration file
        #[arg(short, long, value_name = "PATH")]
        config: PathBuf,
    },

    /// Print the fully resolved configuration
    Show {
        /// Path to configuration file
        #[arg(short, long, value_name = "PATH")]
        config: PathBuf,

        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
        format: OutputFormat,
    },

    /// Print a sample configuration file
    Sample,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Yaml,
    Json,
}
