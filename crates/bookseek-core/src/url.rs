//! Parsing and rendering of the page URL.
//!
//! The search state lives in the query string (`?search=...&highlight=...`),
//! so every state change goes through a parse → edit → render cycle. Query
//! parameters keep the exact encoding they arrived with unless they are
//! explicitly replaced, which keeps unrelated parameters byte-stable across
//! history commits.
//!
//! Parsing never fails. Absolute URLs are split with the `url` crate; anything
//! it rejects falls back to a plain `path?query#hash` split with no origin.

use std::fmt;
use tracing::debug;
use ::url::Url;

/// Structured view of a URL, derived fresh from the live location on every read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UrlState {
    /// Scheme without the trailing `:`. Empty for URLs without an origin.
    pub protocol: String,
    /// Host name.
    pub host: String,
    /// Explicit port, empty when absent or the scheme default.
    pub port: String,
    /// Path, always starting with `/` when an origin is present.
    pub path: String,
    params: Vec<(String, String)>,
    /// Fragment without the leading `#`.
    pub hash: String,
}

impl UrlState {
    /// Split a URL into its components. Malformed segments are dropped.
    pub fn parse(input: &str) -> Self {
        match Url::parse(input) {
            Ok(url) => Self::from_url(&url),
            Err(err) => {
                debug!(%err, url = input, "falling back to relative URL split");
                Self::from_relative(input)
            },
        }
    }

    fn from_url(url: &Url) -> Self {
        let path = url.path();
        let path = if path.starts_with('/') {
            path.to_string()
        } else {
            format!("/{path}")
        };

        Self {
            protocol: url.scheme().to_string(),
            host: url.host_str().unwrap_or_default().to_string(),
            port: url.port().map(|p| p.to_string()).unwrap_or_default(),
            path,
            params: parse_query(url.query().unwrap_or_default()),
            hash: url.fragment().unwrap_or_default().to_string(),
        }
    }

    fn from_relative(input: &str) -> Self {
        let (rest, hash) = input.split_once('#').unwrap_or((input, ""));
        let (path, query) = rest.split_once('?').unwrap_or((rest, ""));
        Self {
            path: path.to_string(),
            params: parse_query(query),
            hash: hash.to_string(),
            ..Self::default()
        }
    }

    /// Inverse of [`UrlState::parse`]: origin, path, `?`/`&`-joined params, fragment.
    pub fn render(&self) -> String {
        let mut url = String::new();
        if !self.protocol.is_empty() {
            url.push_str(&self.protocol);
            url.push_str("://");
            url.push_str(&self.host);
            if !self.port.is_empty() {
                url.push(':');
                url.push_str(&self.port);
            }
        }
        url.push_str(&self.path);

        let mut joiner = '?';
        for (key, value) in &self.params {
            url.push(joiner);
            url.push_str(key);
            url.push('=');
            url.push_str(value);
            joiner = '&';
        }

        if !self.hash.is_empty() {
            url.push('#');
            url.push_str(&self.hash);
        }
        url
    }

    /// Raw (still encoded) value of a query parameter.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Decoded value of a query parameter (see [`decode_param`]).
    pub fn decoded_param(&self, key: &str) -> Option<String> {
        self.param(key).map(decode_param)
    }

    /// Whether the query string carries `key`.
    pub fn has_param(&self, key: &str) -> bool {
        self.param(key).is_some()
    }

    /// Set a parameter to an already-encoded value, keeping its position if present.
    pub fn set_param(&mut self, key: &str, raw_value: impl Into<String>) {
        let raw_value = raw_value.into();
        match self.params.iter_mut().find(|(k, _)| k == key) {
            Some((_, value)) => *value = raw_value,
            None => self.params.push((key.to_string(), raw_value)),
        }
    }

    /// Remove a parameter, returning its raw value.
    pub fn remove_param(&mut self, key: &str) -> Option<String> {
        let position = self.params.iter().position(|(k, _)| k == key)?;
        Some(self.params.remove(position).1)
    }

    /// Iterate parameters as raw `(key, value)` pairs.
    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for UrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Split a raw query string into unique keys. Later duplicates overwrite in place.
fn parse_query(query: &str) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = Vec::new();
    for segment in query.split('&').filter(|s| !s.is_empty()) {
        let (key, value) = segment.split_once('=').unwrap_or((segment, ""));
        if key.is_empty() {
            continue;
        }
        match params.iter_mut().find(|(k, _)| k == key) {
            Some((_, existing)) => *existing = value.to_string(),
            None => params.push((key.to_string(), value.to_string())),
        }
    }
    params
}

/// Decode a query value: `+` means space, then percent-decoding.
///
/// Invalid escapes fall back to the raw value.
pub fn decode_param(raw: &str) -> String {
    let spaced = raw.replace('+', "%20");
    match urlencoding::decode(&spaced) {
        Ok(decoded) => decoded.into_owned(),
        Err(err) => {
            debug!(%err, raw, "keeping undecodable URL parameter as-is");
            raw.to_string()
        },
    }
}

/// Percent-encode a value for use in the query string.
pub fn encode_param(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}
