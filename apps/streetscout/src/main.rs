//! # StreetScout - Road Infrastructure Registry
//!
//! The main binary for the StreetScout entity store.
//!
//! This application provides:
//! - HTTP REST API server (axum-based)
//! - CLI helpers for street identity
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────┐
//! │               apps/streetscout (THE BINARY)          │
//! │                                                      │
//! │   ┌─────────────┐    ┌─────────────┐   ┌──────────┐  │
//! │   │    CLI      │    │  HTTP API   │   │  Config  │  │
//! │   │   (clap)    │    │   (axum)    │   │  (toml)  │  │
//! │   └──────┬──────┘    └──────┬──────┘   └────┬─────┘  │
//! │          └──────────────────┼───────────────┘        │
//! │                             ▼                        │
//! │                  ┌────────────────────┐              │
//! │                  │  streetscout-core  │              │
//! │                  │    (THE LOGIC)     │              │
//! │                  └────────────────────┘              │
//! └──────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! streetscout server --host 0.0.0.0 --port 8082 --seed streets.json
//!
//! # Identity helpers
//! streetscout street-id --zip 01824 --name "Main St"
//! streetscout road-type "Chelmsford Ave."
//! ```

use clap::Parser;
use streetscout::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    // STREETSCOUT_LOG_FORMAT=json switches to machine-parseable output.
    let log_format =
        std::env::var("STREETSCOUT_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "streetscout=info,tower_http=debug".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }

    let cli = cli::Cli::parse();

    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the StreetScout startup banner.
fn print_banner() {
    println!(
        r#"
  ┌─┐┌┬┐┬─┐┌─┐┌─┐┌┬┐┌─┐┌─┐┌─┐┬ ┬┌┬┐
  └─┐ │ ├┬┘├┤ ├┤  │ └─┐│  │ ││ │ │
  └─┘ ┴ ┴└─└─┘└─┘ ┴ └─┘└─┘└─┘└─┘ ┴

  Road Infrastructure Registry v{}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
