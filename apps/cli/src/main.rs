//! daf CLI: one amud of Talmud, its translation and its commentary as JSON.
//!
//! Aggregates the primary text, link summaries and comment details from the
//! upstream text provider into a single document per amud.

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
