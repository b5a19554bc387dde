//! Turning search results into what the page shows.

use crate::teaser::{escape_html, make_teaser};
use crate::url::encode_param;
use crate::SearchResult;
use serde::Serialize;

/// A result ready for the render sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedResult {
    /// Document reference the result came from.
    #[serde(rename = "ref")]
    pub document_ref: String,
    /// Link target: root prefix, page path, highlight parameter, anchor.
    pub link: String,
    /// HTML-escaped breadcrumbs, used as link text.
    pub breadcrumbs: String,
    /// Teaser HTML with matches wrapped in `<em>`.
    pub teaser: String,
}

impl RenderedResult {
    /// Build the link and teaser for one result.
    pub fn new<S>(
        result: &SearchResult,
        link_base: &LinkBase<'_>,
        terms: &[&str],
        teaser_word_count: usize,
        stem: S,
    ) -> Self
    where
        S: Fn(&str) -> String,
    {
        Self {
            document_ref: result.document_ref.clone(),
            link: link_base.link_for(&result.document_ref, terms),
            breadcrumbs: escape_html(&result.breadcrumbs).into_owned(),
            teaser: make_teaser(&result.body, terms, teaser_word_count, stem),
        }
    }

    /// Markup for the `position`-th entry of the result list.
    pub fn to_html(&self, position: usize) -> String {
        format!(
            "<a href=\"{link}\" aria-details=\"teaser_{position}\">{breadcrumbs}</a>\
             <span class=\"teaser\" id=\"teaser_{position}\" aria-label=\"Search Result Teaser\">{teaser}</span>",
            link = escape_html(&self.link),
            breadcrumbs = self.breadcrumbs,
            teaser = self.teaser,
        )
    }
}

/// Prefix and parameter name shared by every result link of a page.
#[derive(Debug, Clone, Copy)]
pub struct LinkBase<'a> {
    /// Relative path from the current page to the site root.
    pub path_to_root: &'a str,
    /// Name of the highlight parameter.
    pub highlight_param: &'a str,
}

impl LinkBase<'_> {
    /// `root + path + "?highlight=" + terms + "#" + anchor`.
    ///
    /// Terms are joined with spaces, stripped of `"` and form-encoded. The
    /// fragment is left out when the reference has no anchor.
    pub fn link_for(&self, document_ref: &str, terms: &[&str]) -> String {
        let doc = crate::DocumentRef::parse(document_ref);
        let joined = terms.join(" ").replace('"', "");
        let encoded = encode_param(&joined).replace("%20", "+");

        let mut link = format!(
            "{}{}?{}={}",
            self.path_to_root, doc.path, self.highlight_param, encoded
        );
        if !doc.anchor.is_empty() {
            link.push('#');
            link.push_str(doc.anchor);
        }
        link
    }
}

/// Header line above the result list.
pub fn format_search_metric(count: usize, term: &str) -> String {
    match count {
        0 => format!("No search results for '{term}'."),
        1 => format!("1 search result for '{term}':"),
        n => format!("{n} search results for '{term}':"),
    }
}
