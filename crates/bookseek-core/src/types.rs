use serde::{Deserialize, Serialize};

/// One hit returned by a query, in the index's relevance order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Document reference in `path#anchor` form (anchor optional).
    pub document_ref: String,
    /// Hierarchical title path, used as the visible link label.
    pub breadcrumbs: String,
    /// Plain-text body the teaser is cut from.
    pub body: String,
}

impl SearchResult {
    /// Split the document reference into its path and anchor.
    pub fn document(&self) -> DocumentRef<'_> {
        DocumentRef::parse(&self.document_ref)
    }
}

/// A `path#anchor` reference, borrowed from the result it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentRef<'a> {
    /// Page path relative to the site root.
    pub path: &'a str,
    /// Heading anchor, empty when the reference names a whole page.
    pub anchor: &'a str,
}

impl<'a> DocumentRef<'a> {
    /// Split on the first `#`. A reference without one has an empty anchor.
    pub fn parse(reference: &'a str) -> Self {
        match reference.split_once('#') {
            Some((path, anchor)) => Self { path, anchor },
            None => Self {
                path: reference,
                anchor: "",
            },
        }
    }
}

/// How a URL mutation is committed to navigation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavigationAction {
    /// Always add a new history entry.
    Push,
    /// Always overwrite the current history entry.
    Replace,
    /// Push when the URL had no search yet, replace when refining one.
    PushIfNewSearchElseReplace,
}

impl NavigationAction {
    /// Resolve to a concrete commit given whether this starts a new search.
    pub const fn commits_as_push(self, first_search: bool) -> bool {
        match self {
            Self::Push => true,
            Self::Replace => false,
            Self::PushIfNewSearchElseReplace => first_search,
        }
    }
}
