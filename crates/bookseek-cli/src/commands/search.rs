//! The `search` command.

use anyhow::{Context, Result, bail};
use bookseek_core::fetcher::is_remote;
use bookseek_core::loader::{self, LoadOutcome, LoadedIndex};
use bookseek_core::render::{LinkBase, format_search_metric};
use bookseek_core::{
    DocumentSource, Fetcher, FileSource, QueryExecutor, QueryOutcome, RenderedResult, SearchIndex,
    SiteConfig,
};
use colored::Colorize;
use std::time::Duration;
use tracing::debug;

use crate::cli::SearchArgs;
use crate::output::{OutputFormat, format_json, format_text};

/// Load the index document, run the query and print the results.
pub async fn search(args: &SearchArgs) -> Result<()> {
    let site = match &args.config {
        Some(path) => SiteConfig::load(path)
            .with_context(|| format!("Failed to load site configuration '{}'", path.display()))?,
        None => SiteConfig::default(),
    };

    let term = args.query.join(" ");
    let term = term.trim();
    if term.is_empty() {
        bail!("Query is empty");
    }

    let location = args
        .index
        .clone()
        .unwrap_or_else(|| site.index_location());
    debug!("Loading index document from {}", location);

    let source: Box<dyn DocumentSource> = if is_remote(&location) {
        Box::new(
            Fetcher::with_timeout(Duration::from_secs(args.timeout))
                .context("Failed to create HTTP client")?,
        )
    } else {
        Box::new(FileSource::new())
    };

    let outcome = loader::load(source.as_ref(), &location)
        .await
        .with_context(|| format!("Failed to load search index from '{location}'"))?;

    let LoadedIndex { mut options, index } = match outcome {
        LoadOutcome::Ready(loaded) => loaded,
        LoadOutcome::Disabled(reason) => {
            match args.format {
                OutputFormat::Text => {
                    println!("{} ({reason})", "Search is disabled for this book".yellow());
                },
                OutputFormat::Json => println!("[]"),
            }
            return Ok(());
        },
    };

    if let Some(limit) = args.limit {
        options.result_limit = limit;
    }

    let mut executor = QueryExecutor::new();
    let results = match executor.execute(index.as_ref(), &options, term)? {
        QueryOutcome::Results(results) => results,
        QueryOutcome::Unchanged => Vec::new(),
    };

    let link_base = LinkBase {
        path_to_root: args.root.as_deref().unwrap_or(&site.path_to_root),
        highlight_param: &site.highlight_param,
    };
    let terms: Vec<&str> = term.split_whitespace().collect();
    let rendered: Vec<RenderedResult> = results
        .iter()
        .map(|result| {
            RenderedResult::new(result, &link_base, &terms, options.teaser_words(), |w| {
                index.stem(w)
            })
        })
        .collect();

    match args.format {
        OutputFormat::Text => {
            let header = format_search_metric(rendered.len(), term);
            print!("{}", format_text(&header, &rendered));
        },
        OutputFormat::Json => println!("{}", format_json(&rendered)?),
    }
    Ok(())
}
