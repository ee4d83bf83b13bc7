//! CLI parse: clap types for treewire. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// treewire CLI - resolve declared references across a scene tree
#[derive(Parser, Debug)]
#[command(name = "treewire")]
#[command(about = "Resolve declared object references across a scene tree")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (layered above the workspace files)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, default_value = "false", conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (when output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve every injected field of a scene document
    Resolve {
        /// Scene document (.json or .toml)
        scene: PathBuf,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
        /// Write resolved values back into the scene document
        #[arg(long)]
        write: bool,
        /// Write the resolved scene to this path instead
        #[arg(long, conflicts_with = "write")]
        output: Option<PathBuf>,
        /// Pipeline builder to use (overrides configuration)
        #[arg(long)]
        pipeline: Option<String>,
        /// Skip the process-only pass
        #[arg(long)]
        single_pass: bool,
    },
    /// List registered matching policies
    Policies {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List pipeline and context builders
    Builders {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}
