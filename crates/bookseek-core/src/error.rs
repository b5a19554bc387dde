//! Error types and handling for bookseek-core operations.
//!
//! Every fallible operation in the crate returns [`Result<T>`]. Errors are
//! categorized so callers can log them consistently and decide how the page
//! should degrade.
//!
//! ## Error Categories
//!
//! - **I/O Errors**: reading an index document from disk
//! - **Network Errors**: fetching the index document over HTTP
//! - **Parse Errors**: malformed index documents or TOML site configuration
//! - **Index Errors**: building or querying the in-memory search index
//! - **Configuration Errors**: search options outside their valid ranges
//!
//! ## Degradation, not retry
//!
//! A failed index load disables search for the rest of the session. Nothing in
//! this crate retries; [`Error::is_recoverable`] only tells a host whether a
//! fresh page load has a chance of succeeding.
//!
//! ```rust
//! use bookseek_core::Error;
//!
//! let err = Error::Config("teaser_word_count must be greater than zero".into());
//! assert_eq!(err.category(), "config");
//! assert!(!err.is_recoverable());
//! ```

use thiserror::Error;

/// The main error type for bookseek-core operations.
///
/// `Display` gives a short user-facing message, `Debug` keeps the full source
/// chain for diagnostics.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    ///
    /// Raised when an index document or a site configuration file cannot be
    /// read from the local file system.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Network operation failed.
    ///
    /// Covers transport failures and non-success status codes that are not
    /// mapped to a disabled search (see [`crate::loader::load`]).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Parsing operation failed.
    ///
    /// The index document or configuration file did not have the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Search index operation failed.
    ///
    /// Covers failures while rebuilding the document store into the in-memory
    /// index and while executing queries against it.
    #[error("Index error: {0}")]
    Index(String),

    /// Configuration is invalid.
    ///
    /// ## Common Causes
    ///
    /// - `teaser_word_count` or `limit_results` set to zero
    /// - Unknown match mode in the `bool` option
    /// - Invalid values in the site TOML file
    #[error("Configuration error: {0}")]
    Config(String),

    /// Requested resource was not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// URL is malformed or invalid.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error for uncategorized failures.
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<tantivy::TantivyError> for Error {
    fn from(err: tantivy::TantivyError) -> Self {
        Self::Index(err.to_string())
    }
}

impl Error {
    /// Check whether a later attempt (a fresh page load) might succeed.
    ///
    /// Returns `true` for timeouts, connection failures and interrupted I/O.
    /// The session itself never retries.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }

    /// Get the error category as a static identifier for logging.
    ///
    /// - `"io"`, `"network"`, `"parse"`, `"index"`, `"config"`, `"not_found"`,
    ///   `"invalid_url"`, `"serialization"`, `"other"`
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::Network(_) => "network",
            Self::Parse(_) => "parse",
            Self::Index(_) => "index",
            Self::Config(_) => "config",
            Self::NotFound(_) => "not_found",
            Self::InvalidUrl(_) => "invalid_url",
            Self::Serialization(_) => "serialization",
            Self::Other(_) => "other",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T> = std::result::Result<T, Error>;
