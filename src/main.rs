//! Binary entry point for the paperseek CLI.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use paperseek::cli::{Cli, execute};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "paperseek=debug" } else { "paperseek=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let output = execute(&cli).await?;
    #[allow(clippy::print_stdout)]
    {
        println!("{output}");
    }
    Ok(())
}
