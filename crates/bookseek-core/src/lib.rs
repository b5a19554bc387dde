//! # bookseek-core
//!
//! In-page search for statically generated book sites.
//!
//! The site generator ships one index document next to the pages. This crate
//! loads it, answers queries against it, cuts a teaser out of every result
//! body and keeps the page URL, navigation history and keyboard focus in step
//! with what the reader is searching for.
//!
//! ## Architecture
//!
//! - **Loading**: [`loader::load`] fetches the index document through a
//!   [`fetcher::DocumentSource`] and builds a [`TantivyIndex`] from it
//! - **Querying**: [`QueryExecutor`] skips repeated terms and caps results
//! - **Teasers**: [`teaser::make_teaser`] picks the heaviest window of words
//! - **URL state**: [`UrlState`] parses and renders the page URL
//! - **Session**: [`SearchSession`] wires it all to the page collaborators in
//!   [`page`]
//!
//! ## Quick Start
//!
//! ```rust
//! use bookseek_core::loader::{LoadOutcome, parse_document};
//! use bookseek_core::SearchIndex;
//!
//! let document = r#"{
//!     "enable": true,
//!     "searchoptions": { "teaser_word_count": 8 },
//!     "index": { "documentStore": { "docs": {
//!         "intro.html#start": {
//!             "title": "Start",
//!             "body": "Install the toolchain before building the book.",
//!             "breadcrumbs": "Introduction » Start"
//!         }
//!     } } }
//! }"#;
//!
//! if let LoadOutcome::Ready(loaded) = parse_document(document)? {
//!     let results = loaded.index.search("install", &loaded.options)?;
//!     assert_eq!(results[0].document_ref, "intro.html#start");
//! }
//! # Ok::<(), bookseek_core::Error>(())
//! ```
//!
//! ## Error Handling
//!
//! Operations return [`Result<T, Error>`]. A failed or disabled index load
//! switches search off for the page; nothing is retried.

/// Site and index configuration
pub mod config;
/// Error types and result aliases
pub mod error;
/// Index document sources over HTTP and the file system
pub mod fetcher;
/// Search index contract, the tantivy index and the query executor
pub mod index;
/// Keyboard focus state machine
pub mod keyboard;
/// Index document loading and validation
pub mod loader;
/// Page collaborator traits
pub mod page;
/// Result links, markup and header text
pub mod render;
/// The per-page search session
pub mod session;
/// Result teaser generation
pub mod teaser;
/// Core data types
pub mod types;
/// URL parsing and rendering
pub mod url;

// Re-export commonly used types
pub use config::{MatchMode, SearchOptions, SiteConfig};
pub use error::{Error, Result};
pub use fetcher::{DocumentSource, Fetcher, FileSource};
pub use index::{QueryExecutor, QueryOutcome, SearchIndex, TantivyIndex};
pub use keyboard::{FocusState, Key, KeyEvent, KeyboardMachine, Modifiers};
pub use loader::{LoadOutcome, LoadedIndex};
pub use render::RenderedResult;
pub use session::{SearchSession, SessionStatus};
pub use types::*;
pub use crate::url::UrlState;
