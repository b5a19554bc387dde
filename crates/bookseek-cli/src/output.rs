//! Printing search results.

use anyhow::Result;
use bookseek_core::RenderedResult;
use colored::Colorize;
use std::fmt::Write as _;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Colored text (default)
    Text,
    /// Single JSON array
    Json,
}

/// Text rendering: header, then link, breadcrumbs and teaser per result.
pub fn format_text(header: &str, results: &[RenderedResult]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", header.bold());

    for (i, result) in results.iter().enumerate() {
        let _ = writeln!(out);
        let _ = writeln!(
            out,
            "{} {}",
            format!("{:>2}.", i + 1).dimmed(),
            html_escape::decode_html_entities(&result.breadcrumbs).cyan()
        );
        let _ = writeln!(out, "    {}", result.link.blue().underline());
        let _ = writeln!(out, "    {}", teaser_to_terminal(&result.teaser));
    }
    out
}

/// JSON rendering: an array of `{ref, link, breadcrumbs, teaser}`.
pub fn format_json(results: &[RenderedResult]) -> Result<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

/// Replace `<em>` markup with terminal emphasis and decode entities.
fn teaser_to_terminal(teaser: &str) -> String {
    let mut out = String::new();
    let mut rest = teaser;

    while let Some(start) = rest.find("<em>") {
        out.push_str(&html_escape::decode_html_entities(&rest[..start]));
        let after = &rest[start + "<em>".len()..];
        let (word, tail) = after.split_once("</em>").unwrap_or((after, ""));
        let word = html_escape::decode_html_entities(word);
        let _ = write!(out, "{}", word.yellow().bold());
        rest = tail;
    }
    out.push_str(&html_escape::decode_html_entities(rest));
    out
}
