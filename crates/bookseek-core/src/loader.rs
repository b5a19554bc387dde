//! Loading the index document.
//!
//! The site generator writes a single JSON document next to the pages:
//!
//! ```json
//! {
//!   "enable": true,
//!   "searchoptions": { "bool": "OR", "expand": true, "limit_results": 30, ... },
//!   "index": { "documentStore": { "docs": { "intro.html#welcome": { ... } } } }
//! }
//! ```
//!
//! [`load`] fetches it once and turns it into a [`LoadOutcome`]. A client error
//! status or `"enable": false` disables search; anything else that goes wrong
//! is returned as an error. Both end with search switched off for the page.

use crate::config::SearchOptions;
use crate::fetcher::{DocumentSource, Fetched};
use crate::index::{SearchIndex, StoredDocument, TantivyIndex};
use crate::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{info, warn};

/// Top-level shape of the index document.
#[derive(Debug, Deserialize)]
pub struct IndexDocument {
    /// Whether search is enabled for the site.
    pub enable: bool,
    /// Options for the search front-end; required when enabled.
    #[serde(default)]
    pub searchoptions: Option<SearchOptions>,
    /// Serialized full-text index; required when enabled.
    #[serde(default)]
    pub index: Option<IndexPayload>,
}

/// The part of the serialized index this crate reads.
#[derive(Debug, Deserialize)]
pub struct IndexPayload {
    /// Stored copies of every indexed section.
    #[serde(rename = "documentStore")]
    pub document_store: DocumentStore,
}

/// Indexed sections keyed by document reference.
#[derive(Debug, Default, Deserialize)]
pub struct DocumentStore {
    /// `ref → document`.
    #[serde(default)]
    pub docs: BTreeMap<String, StoredDocument>,
}

impl DocumentStore {
    /// Documents in reference order, with missing ids filled from their key.
    pub fn into_documents(self) -> Vec<StoredDocument> {
        self.docs
            .into_iter()
            .map(|(key, mut doc)| {
                if doc.id.is_empty() {
                    doc.id = key;
                }
                doc
            })
            .collect()
    }
}

/// Everything the session needs once the index is available.
pub struct LoadedIndex {
    /// Options shipped with the index. Never replaced after load.
    pub options: SearchOptions,
    /// The queryable index.
    pub index: Box<dyn SearchIndex>,
}

impl fmt::Debug for LoadedIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadedIndex")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Result of a load that did not fail.
#[derive(Debug)]
pub enum LoadOutcome {
    /// Search is available.
    Ready(LoadedIndex),
    /// Search is switched off; the reason is for logs only.
    Disabled(String),
}

/// Fetch the index document from `source` and build the index.
pub async fn load(source: &dyn DocumentSource, location: &str) -> Result<LoadOutcome> {
    match source.fetch_document(location).await? {
        Fetched::Document(text) => parse_document(&text),
        Fetched::Rejected { status, reason } => {
            let reason = format!("index document request answered {status} {reason}");
            warn!("Search disabled: {}", reason);
            Ok(LoadOutcome::Disabled(reason))
        },
    }
}

/// Validate an index document and build the index from it.
pub fn parse_document(text: &str) -> Result<LoadOutcome> {
    let document: IndexDocument = serde_json::from_str(text)?;

    if !document.enable {
        warn!("Search disabled: index document has enable = false");
        return Ok(LoadOutcome::Disabled(
            "search is disabled in the index document".to_string(),
        ));
    }

    let options = document
        .searchoptions
        .ok_or_else(|| Error::Parse("index document is missing 'searchoptions'".into()))?;
    options.validate()?;

    let payload = document
        .index
        .ok_or_else(|| Error::Parse("index document is missing 'index'".into()))?;
    let documents = payload.document_store.into_documents();
    let index = TantivyIndex::build(&documents)?;

    info!(
        "Search index ready: {} documents, {:?} mode",
        index.document_count(),
        options.match_mode
    );

    Ok(LoadOutcome::Ready(LoadedIndex {
        options,
        index: Box::new(index),
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::config::MatchMode;
    use crate::fetcher::{FileSource, Fetcher};
    use serde_json::json;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{method, path},
    };

    fn enabled_document() -> String {
        json!({
            "enable": true,
            "searchoptions": {
                "bool": "AND",
                "expand": true,
                "limit_results": 10,
                "teaser_word_count": 5,
                "fields": {
                    "title": { "boost": 2 },
                    "body": { "boost": 1 },
                    "breadcrumbs": { "boost": 1 }
                }
            },
            "index": {
                "version": "0.9.5",
                "ref": "id",
                "documentStore": {
                    "save": true,
                    "docs": {
                        "intro.html#welcome": {
                            "id": "intro.html#welcome",
                            "title": "Welcome",
                            "body": "Welcome to the manual.",
                            "breadcrumbs": "Introduction » Welcome"
                        },
                        "usage.html": {
                            "title": "Usage",
                            "body": "Run the tool with a manual page.",
                            "breadcrumbs": "Usage"
                        }
                    }
                }
            }
        })
        .to_string()
    }

    fn expect_ready(outcome: LoadOutcome) -> LoadedIndex {
        match outcome {
            LoadOutcome::Ready(loaded) => loaded,
            LoadOutcome::Disabled(reason) => panic!("expected a ready index, got disabled: {reason}"),
        }
    }

    #[test]
    fn test_parse_enabled_document() {
        let loaded = expect_ready(parse_document(&enabled_document()).unwrap());
        assert_eq!(loaded.options.match_mode, MatchMode::And);
        assert_eq!(loaded.options.teaser_words(), 5);

        let results = loaded.index.search("manual", &loaded.options).unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_missing_id_is_taken_from_key() {
        let loaded = expect_ready(parse_document(&enabled_document()).unwrap());
        let results = loaded.index.search("tool", &loaded.options).unwrap();
        assert_eq!(results[0].document_ref, "usage.html");
    }

    #[test]
    fn test_disabled_document() {
        let outcome = parse_document(r#"{"enable": false}"#).unwrap();
        assert!(matches!(outcome, LoadOutcome::Disabled(_)));
    }

    #[test]
    fn test_malformed_json_fails() {
        let err = parse_document("{ not json").unwrap_err();
        assert_eq!(err.category(), "serialization");
    }

    #[test]
    fn test_missing_enable_fails() {
        assert!(parse_document(r#"{"searchoptions": {}}"#).is_err());
    }

    #[test]
    fn test_enabled_without_options_fails() {
        let err = parse_document(r#"{"enable": true, "index": {"documentStore": {}}}"#)
            .unwrap_err();
        assert_eq!(err.category(), "parse");
    }

    #[test]
    fn test_enabled_without_index_fails() {
        let err = parse_document(r#"{"enable": true, "searchoptions": {}}"#).unwrap_err();
        assert_eq!(err.category(), "parse");
    }

    #[test]
    fn test_invalid_options_fail() {
        let text = json!({
            "enable": true,
            "searchoptions": { "teaser_word_count": 0 },
            "index": { "documentStore": { "docs": {} } }
        })
        .to_string();
        let err = parse_document(&text).unwrap_err();
        assert_eq!(err.category(), "config");
    }

    #[tokio::test]
    async fn test_load_over_http() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/book/searchindex.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string(enabled_document()))
            .expect(1)
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::with_timeout(Duration::from_secs(5))?;
        let url = format!("{}/book/searchindex.json", mock_server.uri());
        let loaded = expect_ready(load(&fetcher, &url).await?);
        assert_eq!(loaded.options.result_cap(), 10);
        Ok(())
    }

    #[tokio::test]
    async fn test_load_client_error_disables() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::with_timeout(Duration::from_secs(5))?;
        let url = format!("{}/searchindex.json", mock_server.uri());
        match load(&fetcher, &url).await? {
            LoadOutcome::Disabled(reason) => assert!(reason.contains("403")),
            LoadOutcome::Ready(_) => panic!("403 must disable search"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_load_server_error_fails() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::with_timeout(Duration::from_secs(5))?;
        let url = format!("{}/searchindex.json", mock_server.uri());
        assert!(load(&fetcher, &url).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_load_malformed_body_fails() -> anyhow::Result<()> {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let fetcher = Fetcher::with_timeout(Duration::from_secs(5))?;
        let url = format!("{}/searchindex.json", mock_server.uri());
        assert!(load(&fetcher, &url).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("searchindex.json"), enabled_document()).unwrap();

        let source = FileSource::with_base(dir.path());
        let loaded = expect_ready(load(&source, "searchindex.json").await.unwrap());
        assert_eq!(loaded.options.teaser_words(), 5);
    }
}
