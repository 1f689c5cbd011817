//! Freqtable CLI binary.

use anyhow::Result;
use freqtable_server::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Main entry point for the freqtable CLI.
///
/// Uses the multi-threaded runtime: the server handles requests while
/// extractions run on the blocking pool.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // RUST_LOG wins over -v, e.g. RUST_LOG=freqtable=trace freqtable extract ...
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cli.log_filter())),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting freqtable CLI");
    cli.execute().await?;
    tracing::debug!("Freqtable CLI completed successfully");

    Ok(())
}
