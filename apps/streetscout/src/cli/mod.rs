//! # StreetScout CLI Module
//!
//! This module implements the CLI interface for StreetScout.
//!
//! ## Available Commands
//!
//! - `server` - Start the HTTP server (default)
//! - `street-id` - Print the identifier a street would be stored under
//! - `road-type` - Print the road type inferred from a street name

mod commands;

use crate::config::Config;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use streetscout_core::ScoutError;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// StreetScout - road infrastructure registry
///
/// Keeps streets, street signs and intersections in memory and serves them
/// over HTTP.
#[derive(Parser, Debug)]
#[command(name = "streetscout")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start HTTP server
    Server {
        /// Host to bind to (overrides the config file)
        #[arg(short = 'H', long)]
        host: Option<String>,

        /// Port to bind to (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,

        /// JSON file of streets, signs and intersections to load at startup
        #[arg(short, long)]
        seed: Option<PathBuf>,
    },

    /// Print the identifier for a street
    StreetId {
        /// Zip code
        #[arg(short, long)]
        zip: String,

        /// Street name, e.g. "Main St"
        #[arg(short, long)]
        name: String,

        /// Road type; inferred from the name when omitted
        #[arg(short, long)]
        road_type: Option<String>,
    },

    /// Print the road type inferred from a street name
    RoadType {
        /// Street name, e.g. "Chelmsford Ave."
        name: String,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub async fn execute(cli: Cli) -> Result<(), ScoutError> {
    let config = Config::load(cli.config.as_deref())?;
    let json_mode = cli.json_mode;

    match cli.command {
        Some(Commands::Server { host, port, seed }) => {
            cmd_server(config, host, port, seed.as_deref()).await
        }
        Some(Commands::StreetId {
            zip,
            name,
            road_type,
        }) => cmd_street_id(json_mode, &zip, &name, road_type.as_deref()),
        Some(Commands::RoadType { name }) => cmd_road_type(json_mode, &name),
        None => cmd_server(config, None, None, None).await,
    }
}
