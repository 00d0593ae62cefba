use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "alkaline")]
#[command(author, version, about = "Convert files between formats with CloudConvert")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the formats a file can be converted to
    Formats {
        /// File whose extension selects the input format
        #[arg(required = true)]
        file: PathBuf,
    },

    /// Convert one or more files and download the results
    Convert {
        /// Files to convert
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Target format (e.g. pdf)
        #[arg(short, long)]
        to: String,

        /// Write converted files to this directory instead of next to the input
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Replace existing output files
        #[arg(long)]
        overwrite: bool,

        /// Only convert; print the result URLs without downloading
        #[arg(long)]
        no_download: bool,
    },

    /// Store the CloudConvert API key in the config file
    SetKey {
        /// API key from the CloudConvert dashboard
        key: String,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
