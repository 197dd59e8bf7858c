//! leadpipe CLI — PubMed lead generation and scoring.
//!
//! Fetches researcher leads from PubMed, streams them to a CRM webhook, and
//! scores enriched lead exports for outreach prioritization.

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
