//! Agrisight CLI
//!
//! Command-line interface for interacting with the Agrisight telemetry
//! platform.
//!
//! # Usage
//!
//! ```bash
//! agrisight --help
//! agrisight health
//! agrisight sweep --data-path /var/lib/agrisight/dataset.json
//! ```

#![deny(unsafe_code)]

use anyhow::Result;
use clap::{Parser, Subcommand};
use shared::config::RetentionConfig;
use shared::storage::JsonFileStore;
use std::path::PathBuf;

/// Agrisight CLI - telemetry platform command-line interface
#[derive(Parser)]
#[command(name = "agrisight")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// API server URL
    #[arg(
        short,
        long,
        env = "AGRISIGHT_API_URL",
        default_value = "http://localhost:8080"
    )]
    api_url: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Check API server health
    Health,
    /// Run one retention sweep against a dataset file
    Sweep {
        /// Path of the JSON dataset file
        #[arg(long, env = "AGRISIGHT_DATA_PATH")]
        data_path: PathBuf,

        /// Alert retention window in days
        #[arg(long, default_value_t = 30)]
        alert_days: u32,

        /// Telemetry retention window in days
        #[arg(long, default_value_t = 90)]
        telemetry_days: u32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Health) => {
            println!("Checking health of Agrisight API at {}...", cli.api_url);
            println!("Health check not yet implemented");
        }
        Some(Commands::Sweep {
            data_path,
            alert_days,
            telemetry_days,
        }) => {
            let retention = RetentionConfig::new(alert_days, telemetry_days);
            retention
                .validate()
                .map_err(|message| anyhow::anyhow!("Invalid retention windows: {message}"))?;

            let store = JsonFileStore::new(&data_path);
            let outcome = api::sweep_once(&store, &retention, chrono::Utc::now())?;
            println!(
                "Sweep complete: {} alerts and {} telemetry records pruned",
                outcome.alerts_pruned, outcome.telemetry_pruned
            );
        }
        None => {
            println!("Agrisight CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
        }
    }

    Ok(())
}
