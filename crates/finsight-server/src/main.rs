//! Finsight server binary
//!
//! Usage:
//!   finsight --db finsight.db --port 3000

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use finsight_core::{Database, DEFAULT_HISTORY_CAPACITY};

#[derive(Parser)]
#[command(name = "finsight", about = "Personal finance analytics server")]
struct Cli {
    /// Path to the SQLite database file
    #[arg(long, default_value = "finsight.db")]
    db: String,

    /// Host to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port to bind
    #[arg(long, default_value_t = 3000)]
    port: u16,

    /// Maximum retained prediction history entries
    #[arg(long, default_value_t = DEFAULT_HISTORY_CAPACITY)]
    history_capacity: usize,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let db = Database::new(&cli.db)?;

    finsight_server::serve(db, &cli.host, cli.port, cli.history_capacity).await
}
