//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

/// BlogPulse - page-view analytics for a headless-CMS blog
#[derive(Parser)]
#[command(name = "blogpulse")]
#[command(version)]
#[command(about = "Page-view analytics recorder for a headless-CMS blog", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file (default: config.toml)
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Start the HTTP server (default when no command is given)
    Serve,

    /// Show the most viewed pages
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Record one page view directly against the database
    Record {
        /// URL path, e.g. /blog/my-post
        path: String,

        #[arg(long)]
        referrer: Option<String>,

        #[arg(long)]
        user_agent: Option<String>,
    },

    /// Classify a User-Agent string into device type, browser and OS
    Classify {
        user_agent: String,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

/// Configuration management commands
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Force overwrite without confirmation
        #[arg(long)]
        force: bool,
    },
}
