//! bookseek CLI - query a static book site's search index from the terminal

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod output;
mod utils;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    utils::logging::initialize_logging(&cli)?;

    match cli.command {
        Commands::Search(args) => commands::search(&args).await,
    }
}
