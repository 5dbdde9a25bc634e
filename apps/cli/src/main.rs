//! ragwalk CLI: static builder for the RAG walkthrough site.
//!
//! Resolves every pipeline step to localized content, its demo and
//! navigation, and writes the page payloads the front end renders.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
