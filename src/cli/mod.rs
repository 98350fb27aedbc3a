//! CLI module for CacheWatch
//!
//! Command-line interface definitions and handlers.
//!
//! # Commands
//!
//! - `serve` - Start the monitoring engine and API server
//! - `check` - Run a one-shot cache check against a URL
//!
//! # Example
//!
//! ```bash
//! # Start the server with default config
//! cachewatch serve
//!
//! # Classify one URL and print the result
//! cachewatch check https://example.com
//! ```

pub mod check;
pub mod output;
pub mod serve;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// CacheWatch - HTTP cache monitoring engine
#[derive(Parser, Debug)]
#[command(
    name = "cachewatch",
    version,
    about = "HTTP cache monitoring engine"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the monitoring engine and API server
    Serve(ServeArgs),
    /// Run a one-shot cache check against a URL
    Check(CheckArgs),
}

#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "cachewatch.toml")]
    pub config: PathBuf,

    /// Override server port
    #[arg(short, long, env = "CACHEWATCH_PORT")]
    pub port: Option<u16>,

    /// Override server host
    #[arg(short = 'H', long, env = "CACHEWATCH_HOST")]
    pub host: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "CACHEWATCH_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Disable snapshot persistence
    #[arg(long)]
    pub no_persistence: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// URL to check (must include a scheme)
    pub url: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Fetch timeout in seconds
    #[arg(short, long, default_value = "10")]
    pub timeout_seconds: u64,
}
