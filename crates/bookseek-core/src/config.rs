//! Configuration for the search session.
//!
//! Two layers live here:
//!
//! - [`SearchOptions`]: written by the site generator into the index document
//!   and loaded once per page. Immutable after load.
//! - [`SiteConfig`]: how the host page is laid out (root prefix, index file
//!   name, hotkey, URL parameter names). Read from TOML or left at defaults.
//!
//! ## Index document options
//!
//! ```json
//! {
//!   "bool": "OR",
//!   "expand": true,
//!   "limit_results": 30,
//!   "teaser_word_count": 30,
//!   "fields": {
//!     "title": { "boost": 2 },
//!     "body": { "boost": 1 },
//!     "breadcrumbs": { "boost": 1 }
//!   }
//! }
//! ```
//!
//! ## Site configuration file
//!
//! ```toml
//! path_to_root = "../"
//! index_file = "searchindex.json"
//! search_hotkey = "S"
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How multiple query terms combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchMode {
    /// Every term must match.
    And,
    /// Any term may match.
    #[default]
    Or,
}

/// Boost applied to a single indexed field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldBoost {
    /// Multiplier for matches in this field.
    pub boost: f32,
}

/// Per-field boosts, keyed the way the index document spells them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldBoosts {
    /// Page or section title.
    pub title: FieldBoost,
    /// Section body text.
    pub body: FieldBoost,
    /// Hierarchical heading path.
    pub breadcrumbs: FieldBoost,
}

impl Default for FieldBoosts {
    fn default() -> Self {
        Self {
            title: FieldBoost { boost: 2.0 },
            body: FieldBoost { boost: 1.0 },
            breadcrumbs: FieldBoost { boost: 1.0 },
        }
    }
}

/// Search options shipped inside the index document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchOptions {
    /// Term combination mode, serialized as `"AND"` / `"OR"`.
    #[serde(rename = "bool")]
    pub match_mode: MatchMode,
    /// Whether a query term also matches indexed words it is a prefix of.
    pub expand: bool,
    /// Maximum number of results rendered per query.
    #[serde(rename = "limit_results")]
    pub result_limit: u32,
    /// Number of words in each result teaser.
    pub teaser_word_count: u32,
    /// Field weights.
    #[serde(rename = "fields")]
    pub field_boosts: FieldBoosts,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            match_mode: MatchMode::Or,
            expand: true,
            result_limit: 30,
            teaser_word_count: 30,
            field_boosts: FieldBoosts::default(),
        }
    }
}

impl SearchOptions {
    /// Reject options the session cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.teaser_word_count == 0 {
            return Err(Error::Config(
                "teaser_word_count must be greater than zero".into(),
            ));
        }
        if self.result_limit == 0 {
            return Err(Error::Config("limit_results must be greater than zero".into()));
        }
        let boosts = [
            ("title", self.field_boosts.title.boost),
            ("body", self.field_boosts.body.boost),
            ("breadcrumbs", self.field_boosts.breadcrumbs.boost),
        ];
        for (field, boost) in boosts {
            if !boost.is_finite() || boost < 0.0 {
                return Err(Error::Config(format!(
                    "boost for field '{field}' must be a non-negative number, got {boost}"
                )));
            }
        }
        Ok(())
    }

    /// `teaser_word_count` as a word count.
    pub fn teaser_words(&self) -> usize {
        self.teaser_word_count as usize
    }

    /// `limit_results` as a result count.
    pub fn result_cap(&self) -> usize {
        self.result_limit as usize
    }
}

/// Layout of the host site around the search core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Relative prefix from the current page to the site root.
    pub path_to_root: String,
    /// Index document file name, relative to the root.
    pub index_file: String,
    /// Key that reveals and focuses the search bar.
    pub search_hotkey: char,
    /// URL parameter carrying the search term.
    pub search_param: String,
    /// URL parameter carrying terms to highlight on the target page.
    pub highlight_param: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            path_to_root: String::new(),
            index_file: "searchindex.json".to_string(),
            search_hotkey: 'S',
            search_param: "search".to_string(),
            highlight_param: "highlight".to_string(),
        }
    }
}

impl SiteConfig {
    /// Parse a site configuration from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a site configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Where the index document lives relative to the current page.
    pub fn index_location(&self) -> String {
        if self.path_to_root.is_empty() || self.path_to_root.ends_with('/') {
            format!("{}{}", self.path_to_root, self.index_file)
        } else {
            format!("{}/{}", self.path_to_root, self.index_file)
        }
    }

    fn validate(&self) -> Result<()> {
        if self.index_file.trim().is_empty() {
            return Err(Error::Config("index_file must not be empty".into()));
        }
        if self.search_param.is_empty() || self.highlight_param.is_empty() {
            return Err(Error::Config("URL parameter names must not be empty".into()));
        }
        if self.search_param == self.highlight_param {
            return Err(Error::Config(
                "search_param and highlight_param must differ".into(),
            ));
        }
        Ok(())
    }
}
