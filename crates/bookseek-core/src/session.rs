//! The search session: one per page.
//!
//! [`SearchSession`] owns everything that changes while a reader searches: the
//! loaded index and options, the displayed term, keyboard focus and the page
//! collaborators. Every host event maps to one method; each method runs to
//! completion before the next event is handled, so nothing here is shared
//! across threads.
//!
//! Lifecycle: construct with [`SearchSession::new`] while the index document
//! is in flight, then hand the load result to [`SearchSession::finish_load`].
//! Until then, and forever after a failed load, input and key events are
//! ignored.

use crate::config::{SearchOptions, SiteConfig};
use crate::index::{QueryExecutor, QueryOutcome, SearchIndex};
use crate::keyboard::{FocusState, KeyCommand, KeyEvent, KeyboardMachine};
use crate::loader::{LoadOutcome, LoadedIndex};
use crate::page::{Highlighter, History, RenderSink};
use crate::render::{LinkBase, RenderedResult, format_search_metric};
use crate::url::{UrlState, encode_param};
use crate::{Error, NavigationAction, Result};
use tracing::{debug, warn};

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// The index document has not arrived yet.
    Loading,
    /// Search is available.
    Ready,
    /// Search is off for the rest of the page's life.
    Disabled,
}

enum SessionState {
    Loading,
    Ready(LoadedIndex),
    Disabled,
}

/// Search state and its collaborators for one page.
pub struct SearchSession {
    site: SiteConfig,
    state: SessionState,
    executor: QueryExecutor,
    keyboard: KeyboardMachine,
    history: Box<dyn History>,
    highlighter: Box<dyn Highlighter>,
    sink: Box<dyn RenderSink>,
    search_visible: bool,
    searchbar_value: String,
    results: Vec<RenderedResult>,
}

impl SearchSession {
    /// Create a session waiting for its index.
    pub fn new(
        site: SiteConfig,
        history: Box<dyn History>,
        highlighter: Box<dyn Highlighter>,
        sink: Box<dyn RenderSink>,
    ) -> Self {
        let keyboard = KeyboardMachine::new(site.search_hotkey);
        Self {
            site,
            state: SessionState::Loading,
            executor: QueryExecutor::new(),
            keyboard,
            history,
            highlighter,
            sink,
            search_visible: false,
            searchbar_value: String::new(),
            results: Vec::new(),
        }
    }

    /// Hand over the result of [`crate::loader::load`].
    pub fn finish_load(&mut self, result: Result<LoadOutcome>) -> Result<()> {
        match result {
            Ok(outcome) => self.init(outcome),
            Err(err) => {
                self.init_failed(&err);
                Ok(())
            },
        }
    }

    /// Install a loaded index, or switch search off, then apply the URL.
    pub fn init(&mut self, outcome: LoadOutcome) -> Result<()> {
        match outcome {
            LoadOutcome::Ready(loaded) => {
                debug!("Search session ready");
                self.state = SessionState::Ready(loaded);
                self.apply_from_url()
            },
            LoadOutcome::Disabled(reason) => {
                warn!("Search disabled: {}", reason);
                self.disable();
                Ok(())
            },
        }
    }

    /// The index could not be loaded. Search stays off; nothing is retried.
    pub fn init_failed(&mut self, err: &Error) {
        warn!(
            category = err.category(),
            "Search disabled, index failed to load: {}", err
        );
        self.disable();
    }

    fn disable(&mut self) {
        self.state = SessionState::Disabled;
        self.sink.hide_search_icon();
    }

    /// Lifecycle status.
    pub const fn status(&self) -> SessionStatus {
        match self.state {
            SessionState::Loading => SessionStatus::Loading,
            SessionState::Ready(_) => SessionStatus::Ready,
            SessionState::Disabled => SessionStatus::Disabled,
        }
    }

    /// Options of the loaded index.
    pub fn options(&self) -> Option<&SearchOptions> {
        match &self.state {
            SessionState::Ready(loaded) => Some(&loaded.options),
            _ => None,
        }
    }

    /// Current keyboard focus.
    pub const fn focus(&self) -> FocusState {
        self.keyboard.state()
    }

    /// Whether the search box is shown.
    pub const fn search_visible(&self) -> bool {
        self.search_visible
    }

    /// The term whose results are displayed.
    pub fn current_term(&self) -> Option<&str> {
        self.executor.current_term()
    }

    /// Results currently rendered, in display order.
    pub fn results(&self) -> &[RenderedResult] {
        &self.results
    }

    /// Re-read the live URL and bring the search UI in line with it.
    ///
    /// Call on load and on every history navigation.
    pub fn apply_from_url(&mut self) -> Result<()> {
        if !matches!(self.state, SessionState::Ready(_)) {
            debug!("Ignoring URL before the index is ready");
            return Ok(());
        }

        let url = UrlState::parse(&self.history.current_url());

        match url.decoded_param(&self.site.search_param) {
            Some(term) if !term.is_empty() => {
                self.show_search();
                self.sink.set_searchbar_value(&term);
                self.on_search_input(&term)?;
            },
            _ => self.hide_search(),
        }

        if let Some(highlight) = url.decoded_param(&self.site.highlight_param) {
            let terms: Vec<String> = highlight
                .split(' ')
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
            self.highlighter.mark(&terms);
        }
        Ok(())
    }

    /// Write `term` into the live URL and commit it to history per `action`.
    pub fn set_url_parameters(&mut self, term: &str, action: NavigationAction) {
        let mut url = UrlState::parse(&self.history.current_url());
        let first_search = !url.has_param(&self.site.search_param);

        if !term.is_empty() || action == NavigationAction::PushIfNewSearchElseReplace {
            url.set_param(&self.site.search_param, encode_param(term));
            url.remove_param(&self.site.highlight_param);
            url.hash.clear();
        } else {
            url.remove_param(&self.site.search_param);
        }

        let target = url.render();
        if action.commits_as_push(first_search) {
            debug!("History push: {}", target);
            self.history.push(&target);
        } else {
            debug!("History replace: {}", target);
            self.history.replace(&target);
        }
    }

    /// The search bar text changed.
    pub fn on_search_input(&mut self, text: &str) -> Result<()> {
        if !matches!(self.state, SessionState::Ready(_)) {
            return Ok(());
        }

        text.clone_into(&mut self.searchbar_value);
        let term = text.trim();

        if term.is_empty() {
            self.sink.set_searchbar_active(false);
            self.clear_results();
        } else {
            self.sink.set_searchbar_active(true);
            self.run_query(term)?;
        }

        self.set_url_parameters(term, NavigationAction::PushIfNewSearchElseReplace);
        self.highlighter.unmark();
        Ok(())
    }

    /// A key was pressed anywhere on the page.
    pub fn on_key(&mut self, event: KeyEvent) {
        if !matches!(self.state, SessionState::Ready(_)) {
            return;
        }
        let Some(command) = self.keyboard.handle(event, self.results.len()) else {
            return;
        };

        match command {
            KeyCommand::ClearSearch { unfocus_result } => {
                if let Some(index) = unfocus_result {
                    self.sink.unfocus_result(index);
                }
                let action = if self.searchbar_value.trim().is_empty() {
                    NavigationAction::Replace
                } else {
                    NavigationAction::Push
                };
                self.sink.set_searchbar_active(false);
                self.set_url_parameters("", action);
                self.sink.unfocus_searchbar();
                self.sink.set_searchbar_value("");
                self.searchbar_value.clear();
                self.clear_results();
                self.hide_search();
                self.highlighter.unmark();
            },
            KeyCommand::OpenSearchbar { unfocus_result } => {
                if let Some(index) = unfocus_result {
                    self.sink.unfocus_result(index);
                }
                self.show_search();
                self.sink.focus_searchbar();
            },
            KeyCommand::FocusFirstResult => {
                self.sink.unfocus_searchbar();
                self.sink.focus_result(0);
            },
            KeyCommand::MoveResultFocus { from, to } => {
                self.sink.unfocus_result(from);
                self.sink.focus_result(to);
            },
            KeyCommand::ReturnToSearchbar => {
                self.sink.unfocus_result(0);
                self.sink.focus_searchbar();
            },
            KeyCommand::OpenResult(index) => {
                if let Some(result) = self.results.get(index) {
                    debug!("Opening result {}: {}", index, result.link);
                    self.sink.navigate(&result.link);
                }
            },
        }
    }

    /// The search icon was clicked.
    pub fn toggle_search(&mut self) {
        if !matches!(self.state, SessionState::Ready(_)) {
            return;
        }
        if self.search_visible {
            self.hide_search();
        } else {
            self.show_search();
            self.keyboard.focus_searchbar();
            self.sink.focus_searchbar();
        }
    }

    /// The search bar received focus from outside the keyboard machine.
    pub fn on_searchbar_focus(&mut self) {
        if let Some(index) = self.keyboard.unfocus() {
            self.sink.unfocus_result(index);
        }
        self.keyboard.focus_searchbar();
    }

    /// Focus moved away from the search UI.
    pub fn on_focus_lost(&mut self) {
        if let Some(index) = self.keyboard.unfocus() {
            self.sink.unfocus_result(index);
        }
    }

    fn run_query(&mut self, term: &str) -> Result<()> {
        let SessionState::Ready(loaded) = &self.state else {
            return Ok(());
        };

        let results = match self
            .executor
            .execute(loaded.index.as_ref(), &loaded.options, term)?
        {
            QueryOutcome::Unchanged => return Ok(()),
            QueryOutcome::Results(results) => results,
        };

        let terms: Vec<&str> = term.split_whitespace().collect();
        let link_base = LinkBase {
            path_to_root: &self.site.path_to_root,
            highlight_param: &self.site.highlight_param,
        };
        let index: &dyn SearchIndex = loaded.index.as_ref();
        let teaser_words = loaded.options.teaser_words();

        self.results = results
            .iter()
            .map(|result| {
                RenderedResult::new(result, &link_base, &terms, teaser_words, |w| index.stem(w))
            })
            .collect();

        if let Some(focused) = self.keyboard.results_replaced() {
            self.sink.unfocus_result(focused);
        }
        self.sink
            .set_results_header(&format_search_metric(self.results.len(), term));
        self.sink.clear_results();
        for result in &self.results {
            self.sink.append_result(result);
        }
        self.sink.show_results(true);
        Ok(())
    }

    fn clear_results(&mut self) {
        self.sink.show_results(false);
        self.sink.clear_results();
        self.results.clear();
        self.executor.reset();
    }

    fn show_search(&mut self) {
        self.search_visible = true;
        self.sink.show_search(true);
    }

    fn hide_search(&mut self) {
        self.search_visible = false;
        self.sink.show_search(false);
        if let Some(index) = self.keyboard.unfocus() {
            self.sink.unfocus_result(index);
        }
    }
}
