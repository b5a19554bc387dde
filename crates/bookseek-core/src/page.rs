//! The host page as the session sees it.
//!
//! The session never touches a document tree, browser history or highlighter
//! directly; it talks to these three traits. A browser binding implements them
//! over the real page, tests implement them with recorders.

use crate::render::RenderedResult;

/// Navigation history and the live location.
pub trait History {
    /// The current URL, read fresh on every call.
    fn current_url(&self) -> String;

    /// Add a new history entry and make it current.
    fn push(&mut self, url: &str);

    /// Overwrite the current history entry.
    fn replace(&mut self, url: &str);
}

/// Highlights terms in the content of the displayed page.
pub trait Highlighter {
    /// Highlight every occurrence of `terms`.
    fn mark(&mut self, terms: &[String]);

    /// Remove all highlighting.
    fn unmark(&mut self);
}

/// The visual parts of the search UI.
pub trait RenderSink {
    /// Show or hide the search bar and results area.
    fn show_search(&mut self, visible: bool);

    /// Show or hide the results panel.
    fn show_results(&mut self, visible: bool);

    /// Put `value` into the search bar.
    fn set_searchbar_value(&mut self, value: &str);

    /// Mark the search bar as holding a live query.
    fn set_searchbar_active(&mut self, active: bool);

    /// Replace the text above the result list.
    fn set_results_header(&mut self, text: &str);

    /// Remove every rendered result.
    fn clear_results(&mut self);

    /// Append one result to the list.
    fn append_result(&mut self, result: &RenderedResult);

    /// Give keyboard focus to the search bar and select its text.
    fn focus_searchbar(&mut self);

    /// Take keyboard focus away from the search bar.
    fn unfocus_searchbar(&mut self);

    /// Focus the result at `index`.
    fn focus_result(&mut self, index: usize);

    /// Remove focus from the result at `index`.
    fn unfocus_result(&mut self, index: usize);

    /// Leave the page for `url`.
    fn navigate(&mut self, url: &str);

    /// Hide the icon that opens the search; used when search is unavailable.
    fn hide_search_icon(&mut self);
}
