use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info};

/// What a source handed back for the index document location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched {
    /// The document body.
    Document(String),
    /// The server answered with a client error; search should be disabled.
    Rejected {
        /// HTTP status code (4xx).
        status: u16,
        /// Human readable reason.
        reason: String,
    },
}

/// Something that can deliver the index document.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetch the document at `location`. Exactly one attempt, no retry.
    async fn fetch_document(&self, location: &str) -> Result<Fetched>;
}

/// Whether `location` should be fetched over HTTP rather than read from disk.
pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// HTTP client for the index document
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    /// Creates a fetcher without a request timeout; a hanging server keeps search unavailable
    pub fn new() -> Result<Self> {
        Self::build(None)
    }

    /// Creates a fetcher with a request timeout (used by the CLI and tests)
    pub fn with_timeout(timeout: Duration) -> Result<Self> {
        Self::build(Some(timeout))
    }

    fn build(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = Client::builder()
            .user_agent(concat!("bookseek/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .brotli(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(Error::Network)?;
        Ok(Self { client })
    }
}

#[async_trait]
impl DocumentSource for Fetcher {
    async fn fetch_document(&self, location: &str) -> Result<Fetched> {
        let url = ::url::Url::parse(location)
            .map_err(|e| Error::InvalidUrl(format!("{location}: {e}")))?;

        debug!("Fetching index document from {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if status.is_client_error() {
            info!("Index document at {} answered {}", location, status);
            return Ok(Fetched::from(status));
        }

        if !status.is_success() {
            return match response.error_for_status() {
                Err(err) => Err(Error::Network(err)),
                Ok(_) => Err(Error::Other(format!(
                    "Unexpected status {status} for '{location}'"
                ))),
            };
        }

        let content = response.text().await?;
        info!("Fetched {} bytes from {}", content.len(), location);
        Ok(Fetched::Document(content))
    }
}

/// Reads the index document from the local file system.
///
/// Relative locations resolve against `base` when one is set.
#[derive(Debug, Clone, Default)]
pub struct FileSource {
    base: Option<PathBuf>,
}

impl FileSource {
    /// Resolve locations against the current directory.
    pub const fn new() -> Self {
        Self { base: None }
    }

    /// Resolve relative locations against `base`.
    pub fn with_base(base: impl Into<PathBuf>) -> Self {
        Self {
            base: Some(base.into()),
        }
    }

    fn resolve(&self, location: &str) -> PathBuf {
        match &self.base {
            Some(base) => base.join(location),
            None => PathBuf::from(location),
        }
    }
}

#[async_trait]
impl DocumentSource for FileSource {
    async fn fetch_document(&self, location: &str) -> Result<Fetched> {
        let path = self.resolve(location);
        match tokio::fs::read_to_string(&path).await {
            Ok(content) => {
                info!("Read {} bytes from {}", content.len(), path.display());
                Ok(Fetched::Document(content))
            },
            Err(err) if err.kind() == ErrorKind::NotFound => Err(Error::NotFound(format!(
                "Index document not found at '{}'",
                path.display()
            ))),
            Err(err) => Err(Error::Io(err)),
        }
    }
}

impl From<StatusCode> for Fetched {
    fn from(status: StatusCode) -> Self {
        Self::Rejected {
            status: status.as_u16(),
            reason: status
                .canonical_reason()
                .unwrap_or("client error")
                .to_string(),
        }
    }
}
