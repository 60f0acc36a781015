use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "edlskip")]
#[command(author, version, about = "Skip EDL-listed segments in active playback sessions")]
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
    /// Start watching Jellyfin sessions and skipping EDL ranges
    Start {
        /// Scan interval in milliseconds (overrides config)
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// Show the EDL sidecar and skip ranges for a media file
    Inspect {
        /// Media file to inspect
        #[arg(required = true)]
        media: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}
