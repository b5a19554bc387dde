//! # CLI Structure and Argument Parsing
//!
//! ```bash
//! # Query a published book
//! bookseek search "install toolchain" --index https://book.example/searchindex.json
//!
//! # Query a local build, links relative to the book root
//! bookseek search config --index book/searchindex.json --root /docs/ --format json
//! ```

use crate::output::OutputFormat;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Main CLI structure for the `bookseek` command
#[derive(Parser, Clone, Debug)]
#[command(name = "bookseek")]
#[command(version)]
#[command(about = "Search a static book site's index from the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only print errors
    #[arg(short = 'q', long, global = true)]
    pub quiet: bool,

    /// Disable colored output (also respects `NO_COLOR`)
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Clone, Debug)]
pub enum Commands {
    /// Run a query against an index document
    Search(SearchArgs),
}

#[derive(Args, Clone, Debug)]
pub struct SearchArgs {
    /// Query terms
    #[arg(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Index document: an http(s) URL or a file path
    ///
    /// Defaults to the site configuration's root and index file.
    #[arg(short, long)]
    pub index: Option<String>,

    /// Prefix for result links (overrides `path_to_root`)
    #[arg(long)]
    pub root: Option<String>,

    /// Maximum number of results (overrides `limit_results`)
    #[arg(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..))]
    pub limit: Option<u32>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Site configuration file (TOML)
    #[arg(short, long, env = "BOOKSEEK_CONFIG")]
    pub config: Option<PathBuf>,

    /// HTTP timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}
