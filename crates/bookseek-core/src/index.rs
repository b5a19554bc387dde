//! Full-text index contract and its tantivy-backed implementation.
//!
//! The session only needs two things from an index: ranked matches for a query
//! string and the stemmer used to compare words. [`SearchIndex`] is that
//! contract. [`TantivyIndex`] rebuilds the document store shipped in the index
//! document into an in-memory tantivy index; ranking stays tantivy's.
//!
//! [`QueryExecutor`] sits in front of any index and short-circuits a query for
//! the term that is already displayed.

use crate::config::{MatchMode, SearchOptions};
use crate::{Result, SearchResult};
use serde::{Deserialize, Serialize};
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, BoostQuery, Occur, Query, RegexQuery, TermQuery};
use tantivy::schema::{
    Field, IndexRecordOption, STORED, STRING, Schema, TextFieldIndexing, TextOptions, Value,
};
use tantivy::tokenizer::{TextAnalyzer, TokenStream};
use tantivy::{Index, IndexReader, IndexWriter, TantivyDocument, Term, doc};
use tracing::{debug, info};

/// Tokenizer registered by tantivy by default: lowercasing plus English stemming.
const STEM_TOKENIZER: &str = "en_stem";
const WRITER_MEMORY_BYTES: usize = 50_000_000;

/// The external full-text index as the session sees it.
pub trait SearchIndex {
    /// Ranked matches for `query`. Implementations may return more than
    /// `options.result_limit`; callers cap the list.
    fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchResult>>;

    /// Reduce a lower-cased word to the root form used for matching.
    fn stem(&self, word: &str) -> String;
}

/// A section of the site as stored in the index document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoredDocument {
    /// Document reference, `path#anchor`.
    pub id: String,
    /// Section heading.
    pub title: String,
    /// Section text.
    pub body: String,
    /// Heading path, joined with ` » `.
    pub breadcrumbs: String,
}

/// In-memory tantivy index over the stored documents.
pub struct TantivyIndex {
    reader: IndexReader,
    analyzer: TextAnalyzer,
    ref_field: Field,
    title_field: Field,
    body_field: Field,
    breadcrumbs_field: Field,
    document_count: usize,
}

impl TantivyIndex {
    /// Index every stored document.
    pub fn build(documents: &[StoredDocument]) -> Result<Self> {
        let mut schema_builder = Schema::builder();
        let text_options = TextOptions::default()
            .set_indexing_options(
                TextFieldIndexing::default()
                    .set_tokenizer(STEM_TOKENIZER)
                    .set_index_option(IndexRecordOption::WithFreqsAndPositions),
            )
            .set_stored();

        let ref_field = schema_builder.add_text_field("ref", STRING | STORED);
        let title_field = schema_builder.add_text_field("title", text_options.clone());
        let body_field = schema_builder.add_text_field("body", text_options.clone());
        let breadcrumbs_field = schema_builder.add_text_field("breadcrumbs", text_options);
        let schema = schema_builder.build();

        let index = Index::create_in_ram(schema);
        let mut writer: IndexWriter = index.writer_with_num_threads(1, WRITER_MEMORY_BYTES)?;

        for document in documents {
            writer.add_document(doc!(
                ref_field => document.id.as_str(),
                title_field => document.title.as_str(),
                body_field => document.body.as_str(),
                breadcrumbs_field => document.breadcrumbs.as_str(),
            ))?;
        }
        writer.commit()?;

        let reader = index.reader()?;
        let analyzer = index.tokenizer_for_field(body_field)?;

        info!("Indexed {} documents", documents.len());

        Ok(Self {
            reader,
            analyzer,
            ref_field,
            title_field,
            body_field,
            breadcrumbs_field,
            document_count: documents.len(),
        })
    }

    /// Number of indexed documents.
    pub const fn document_count(&self) -> usize {
        self.document_count
    }

    fn tokens(&self, text: &str) -> Vec<String> {
        let mut analyzer = self.analyzer.clone();
        let mut stream = analyzer.token_stream(text);
        let mut tokens = Vec::new();
        while stream.advance() {
            tokens.push(stream.token().text.clone());
        }
        tokens
    }

    fn token_query(&self, token: &str, options: &SearchOptions) -> Result<Box<dyn Query>> {
        let boosts = options.field_boosts;
        let fields = [
            (self.title_field, boosts.title.boost),
            (self.body_field, boosts.body.boost),
            (self.breadcrumbs_field, boosts.breadcrumbs.boost),
        ];

        let mut clauses: Vec<(Occur, Box<dyn Query>)> = Vec::with_capacity(fields.len());
        for (field, boost) in fields {
            let query: Box<dyn Query> = if options.expand {
                let pattern = format!("{}.*", regex::escape(token));
                Box::new(RegexQuery::from_pattern(&pattern, field)?)
            } else {
                Box::new(TermQuery::new(
                    Term::from_field_text(field, token),
                    IndexRecordOption::WithFreqs,
                ))
            };
            clauses.push((Occur::Should, Box::new(BoostQuery::new(query, boost))));
        }
        Ok(Box::new(BooleanQuery::new(clauses)))
    }

    fn field_text(document: &TantivyDocument, field: Field) -> String {
        document
            .get_first(field)
            .and_then(|v| v.as_str())
            .map(std::string::ToString::to_string)
            .unwrap_or_default()
    }
}

impl SearchIndex for TantivyIndex {
    fn search(&self, query: &str, options: &SearchOptions) -> Result<Vec<SearchResult>> {
        let tokens = self.tokens(query);
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let occur = match options.match_mode {
            MatchMode::And => Occur::Must,
            MatchMode::Or => Occur::Should,
        };
        let mut clauses = Vec::with_capacity(tokens.len());
        for token in &tokens {
            clauses.push((occur, self.token_query(token, options)?));
        }
        let query = BooleanQuery::new(clauses);

        let searcher = self.reader.searcher();
        let top_docs = searcher.search(&query, &TopDocs::with_limit(options.result_cap().max(1)))?;

        let mut results = Vec::with_capacity(top_docs.len());
        for (_score, address) in top_docs {
            let document: TantivyDocument = searcher.doc(address)?;
            results.push(SearchResult {
                document_ref: Self::field_text(&document, self.ref_field),
                breadcrumbs: Self::field_text(&document, self.breadcrumbs_field),
                body: Self::field_text(&document, self.body_field),
            });
        }
        Ok(results)
    }

    fn stem(&self, word: &str) -> String {
        self.tokens(word)
            .into_iter()
            .next()
            .unwrap_or_else(|| word.to_lowercase())
    }
}

/// Outcome of handing a term to the [`QueryExecutor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    /// The term is already the displayed one; nothing was queried.
    Unchanged,
    /// Fresh results, capped at the result limit.
    Results(Vec<SearchResult>),
}

/// Remembers the displayed term so repeating it does not hit the index again.
#[derive(Debug, Default)]
pub struct QueryExecutor {
    current_term: Option<String>,
}

impl QueryExecutor {
    /// Create an executor with no displayed term.
    pub const fn new() -> Self {
        Self { current_term: None }
    }

    /// Run `term` unless it is already the displayed term.
    pub fn execute(
        &mut self,
        index: &dyn SearchIndex,
        options: &SearchOptions,
        term: &str,
    ) -> Result<QueryOutcome> {
        if self.current_term.as_deref() == Some(term) {
            return Ok(QueryOutcome::Unchanged);
        }

        let mut results = index.search(term, options)?;
        results.truncate(options.result_cap());
        self.current_term = Some(term.to_string());
        debug!("Found {} results for query '{}'", results.len(), term);
        Ok(QueryOutcome::Results(results))
    }

    /// Forget the displayed term.
    pub fn reset(&mut self) {
        self.current_term = None;
    }

    /// The term whose results are displayed, if any.
    pub fn current_term(&self) -> Option<&str> {
        self.current_term.as_deref()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::Error;
    use std::cell::Cell;

    fn stored(id: &str, title: &str, body: &str, breadcrumbs: &str) -> StoredDocument {
        StoredDocument {
            id: id.to_string(),
            title: title.to_string(),
            body: body.to_string(),
            breadcrumbs: breadcrumbs.to_string(),
        }
    }

    fn create_test_documents() -> Vec<StoredDocument> {
        vec![
            stored(
                "intro.html#welcome",
                "Welcome",
                "This book explains how the renderer turns markdown into pages.",
                "Introduction » Welcome",
            ),
            stored(
                "config.html#search",
                "Search",
                "Searching is configured with a boolean mode and teaser length.",
                "Configuration » Search",
            ),
            stored(
                "config.html#output",
                "Output",
                "The renderer writes static pages into the output directory.",
                "Configuration » Output",
            ),
        ]
    }

    fn refs(results: &[SearchResult]) -> Vec<&str> {
        results.iter().map(|r| r.document_ref.as_str()).collect()
    }

    #[test]
    fn test_build_counts_documents() {
        let index = TantivyIndex::build(&create_test_documents()).unwrap();
        assert_eq!(index.document_count(), 3);
    }

    #[test]
    fn test_search_returns_stored_fields() {
        let index = TantivyIndex::build(&create_test_documents()).unwrap();
        let options = SearchOptions::default();

        let results = index.search("teaser", &options).unwrap();
        assert_eq!(refs(&results), vec!["config.html#search"]);
        assert_eq!(results[0].breadcrumbs, "Configuration » Search");
        assert!(results[0].body.contains("teaser length"));
    }

    #[test]
    fn test_stemmed_query_matches_inflections() {
        let index = TantivyIndex::build(&create_test_documents()).unwrap();
        let options = SearchOptions {
            expand: false,
            ..SearchOptions::default()
        };

        let results = index.search("configures", &options).unwrap();
        assert!(refs(&results).contains(&"config.html#search"));
    }

    #[test]
    fn test_expand_matches_prefixes() {
        let index = TantivyIndex::build(&create_test_documents()).unwrap();
        let expanded = SearchOptions::default();
        let exact = SearchOptions {
            expand: false,
            ..SearchOptions::default()
        };

        assert!(!index.search("direc", &expanded).unwrap().is_empty());
        assert!(index.search("direc", &exact).unwrap().is_empty());
    }

    #[test]
    fn test_and_mode_requires_every_term() {
        let index = TantivyIndex::build(&create_test_documents()).unwrap();
        let and = SearchOptions {
            match_mode: MatchMode::And,
            expand: false,
            ..SearchOptions::default()
        };
        let or = SearchOptions {
            match_mode: MatchMode::Or,
            expand: false,
            ..SearchOptions::default()
        };

        let and_results = index.search("renderer output", &and).unwrap();
        assert_eq!(refs(&and_results), vec!["config.html#output"]);

        let or_results = index.search("renderer output", &or).unwrap();
        assert_eq!(or_results.len(), 2);
    }

    #[test]
    fn test_search_respects_result_limit() {
        let index = TantivyIndex::build(&create_test_documents()).unwrap();
        let options = SearchOptions {
            result_limit: 1,
            ..SearchOptions::default()
        };
        assert_eq!(index.search("renderer", &options).unwrap().len(), 1);
    }

    #[test]
    fn test_blank_query_returns_nothing() {
        let index = TantivyIndex::build(&create_test_documents()).unwrap();
        assert!(index.search("   ", &SearchOptions::default()).unwrap().is_empty());
        assert!(index.search("?!", &SearchOptions::default()).unwrap().is_empty());
    }

    #[test]
    fn test_regex_metacharacters_are_escaped() {
        let index = TantivyIndex::build(&create_test_documents()).unwrap();
        // The tokenizer drops punctuation, but tokens reaching the regex must stay literal.
        assert!(index.search("render.*", &SearchOptions::default()).is_ok());
    }

    #[test]
    fn test_stem() {
        let index = TantivyIndex::build(&[]).unwrap();
        assert_eq!(index.stem("running"), "run");
        assert_eq!(index.stem("Pages"), "page");
        assert_eq!(index.stem("..."), "...");
    }

    struct CountingIndex {
        calls: Cell<usize>,
    }

    impl SearchIndex for CountingIndex {
        fn search(&self, query: &str, _options: &SearchOptions) -> Result<Vec<SearchResult>> {
            self.calls.set(self.calls.get() + 1);
            Ok((0..5)
                .map(|i| SearchResult {
                    document_ref: format!("{query}.html#{i}"),
                    breadcrumbs: String::new(),
                    body: String::new(),
                })
                .collect())
        }

        fn stem(&self, word: &str) -> String {
            word.to_string()
        }
    }

    #[test]
    fn test_executor_short_circuits_repeated_term() {
        let index = CountingIndex {
            calls: Cell::new(0),
        };
        let options = SearchOptions::default();
        let mut executor = QueryExecutor::new();

        assert!(matches!(
            executor.execute(&index, &options, "foo").unwrap(),
            QueryOutcome::Results(_)
        ));
        assert_eq!(
            executor.execute(&index, &options, "foo").unwrap(),
            QueryOutcome::Unchanged
        );
        assert_eq!(index.calls.get(), 1);
        assert_eq!(executor.current_term(), Some("foo"));

        executor.execute(&index, &options, "bar").unwrap();
        executor.execute(&index, &options, "foo").unwrap();
        assert_eq!(index.calls.get(), 3);
    }

    #[test]
    fn test_executor_reset_allows_requery() {
        let index = CountingIndex {
            calls: Cell::new(0),
        };
        let options = SearchOptions::default();
        let mut executor = QueryExecutor::new();

        executor.execute(&index, &options, "foo").unwrap();
        executor.reset();
        assert_eq!(executor.current_term(), None);
        executor.execute(&index, &options, "foo").unwrap();
        assert_eq!(index.calls.get(), 2);
    }

    /// Fails until `healthy` is set.
    struct FlakyIndex {
        healthy: Cell<bool>,
        calls: Cell<usize>,
    }

    impl SearchIndex for FlakyIndex {
        fn search(&self, _query: &str, _options: &SearchOptions) -> Result<Vec<SearchResult>> {
            self.calls.set(self.calls.get() + 1);
            if self.healthy.get() {
                Ok(Vec::new())
            } else {
                Err(Error::Index("reader unavailable".to_string()))
            }
        }

        fn stem(&self, word: &str) -> String {
            word.to_string()
        }
    }

    #[test]
    fn test_executor_failed_search_keeps_previous_term() {
        let index = FlakyIndex {
            healthy: Cell::new(true),
            calls: Cell::new(0),
        };
        let options = SearchOptions::default();
        let mut executor = QueryExecutor::new();

        executor.execute(&index, &options, "foo").unwrap();
        index.healthy.set(false);
        assert!(executor.execute(&index, &options, "bar").is_err());
        assert_eq!(executor.current_term(), Some("foo"));

        index.healthy.set(true);
        assert!(matches!(
            executor.execute(&index, &options, "bar").unwrap(),
            QueryOutcome::Results(_)
        ));
        assert_eq!(index.calls.get(), 3);
        assert_eq!(executor.current_term(), Some("bar"));
    }

    #[test]
    fn test_executor_caps_results() {
        let index = CountingIndex {
            calls: Cell::new(0),
        };
        let options = SearchOptions {
            result_limit: 2,
            ..SearchOptions::default()
        };
        let mut executor = QueryExecutor::new();

        match executor.execute(&index, &options, "foo").unwrap() {
            QueryOutcome::Results(results) => assert_eq!(results.len(), 2),
            QueryOutcome::Unchanged => panic!("expected fresh results"),
        }
    }
}
