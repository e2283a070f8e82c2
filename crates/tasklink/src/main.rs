//! tasklink CLI binary.

use anyhow::Result;
use tasklink::cli::Cli;
use tracing_subscriber::EnvFilter;

/// Uses tokio's current_thread runtime; every command is a short sequence of
/// file I/O.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Controlled via RUST_LOG, e.g. RUST_LOG=tasklink=debug
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tasklink=info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Starting tasklink CLI");

    let cli = Cli::parse_args();
    cli.execute().await?;

    tracing::debug!("tasklink CLI completed successfully");
    Ok(())
}
