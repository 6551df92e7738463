//! CLI command definitions and handlers

use clap::{Parser, Subcommand};

pub mod args;
pub mod config;
pub mod context;
pub mod dashboard;
pub mod field;
pub mod probe;
pub mod structures;
pub mod watch;

pub use args::{GlobalOptions, OutputFormat};
pub use context::CommandContext;

use crate::dashboard::DashboardField;

/// trafdash - resilient client for the traffic analytics backend
#[derive(Parser, Debug)]
#[command(name = "trafdash")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, table, json)
    #[arg(
        long,
        global = true,
        env = "TRAFDASH_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "TRAFDASH_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Backend base URL (e.g. http://localhost:8080/api)
    #[arg(long, global = true, env = "TRAFDASH_BASE_URL", hide_env = true)]
    pub base_url: Option<String>,

    /// Per-attempt request timeout in milliseconds
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Total attempts per request, including the first
    #[arg(long, global = true)]
    pub retries: Option<u32>,

    /// Enable debug logging
    #[arg(long, global = true, env = "TRAFDASH_DEBUG", hide_env = true)]
    pub debug: bool,

    /// Bypass fresh cache entries and fetch from the backend
    #[arg(long, global = true, env = "TRAFDASH_REFRESH", hide_env = true)]
    pub refresh: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the full dashboard with per-field data sources
    Dashboard,

    /// Show a single dashboard field
    Field {
        /// Field to fetch
        #[arg(value_enum)]
        name: DashboardField,
    },

    /// Show the data-structure samples
    Structures,

    /// Check which backend URLs and endpoints respond
    Probe,

    /// Poll the dashboard until interrupted
    Watch {
        /// Seconds between refreshes (defaults to refresh.interval_secs)
        #[arg(long, short = 'i')]
        interval: Option<u64>,

        /// Force a backend fetch on every refresh
        #[arg(long)]
        force: bool,

        /// Stop after this many refreshes
        #[arg(long, short = 'n')]
        count: Option<u32>,
    },

    /// Manage the configuration file
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Display version information
    Version,
}

/// Configuration subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
