//! Data models for scraped search results.
//!
//! This module defines the core data structures used throughout the application:
//! - [`Article`]: one search result card, with its derived identity and signals
//! - [`ResultSet`]: the deduplicating collection built up across result pages
//! - [`OrderBy`]: the sort order requested from the outlet's search page
//! - [`WorkItem`]: one validated search request
//!
//! An [`Article`] computes everything it derives (hashes, query occurrences,
//! money detection) once, in [`Article::new`], and exposes read-only accessors
//! afterwards.

use crate::error::{Error, Result};
use chrono::{Local, NaiveDate};
use itertools::Itertools;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// Placeholder title for a card whose headline could not be read.
pub const NO_TITLE: &str = "No title";
/// Placeholder description for a card without an excerpt.
pub const NO_CONTENT: &str = "No content";

/// `$11.1`, `$ 111,111.11`, `11 dollars`, `11 USD`.
static MONEY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\$\s?\d+(?:,\d{3})*(?:\.\d+)?|\b\d+(?:,\d{3})*(?:\.\d+)?\s*(?:dollars|usd)\b")
        .unwrap()
});

/// A single search result as extracted from the results list.
///
/// Two articles are equal iff their URLs are equal; title, description and
/// every other field are ignored by `==` and by hashing.
#[derive(Debug, Clone)]
pub struct Article {
    search_query: String,
    title: String,
    description: String,
    url: String,
    img_url: Option<String>,
    date: NaiveDate,
    identity_hash: String,
    image_hash: Option<String>,
    query_occurrence_count: usize,
    has_monetary_value: bool,
}

impl Article {
    /// Build an article and compute all derived fields.
    ///
    /// `url` must be non-empty; it is the identity of the record. When `date`
    /// is `None` the local date at the time of this call is used.
    pub fn new(
        search_query: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
        img_url: Option<String>,
        date: Option<NaiveDate>,
    ) -> Self {
        let search_query = search_query.into();
        let title = title.into();
        let description = description.into();
        let url = url.into();
        debug_assert!(!url.is_empty(), "article url must not be empty");

        let identity_hash = sha256_hex(&url);
        let image_hash = img_url.as_deref().map(sha256_hex);
        let query_occurrence_count = count_occurrences(&title, &search_query)
            + count_occurrences(&description, &search_query);
        let has_monetary_value = contains_money(&title) || contains_money(&description);

        Self {
            search_query,
            title,
            description,
            url,
            img_url,
            date: date.unwrap_or_else(|| Local::now().date_naive()),
            identity_hash,
            image_hash,
            query_occurrence_count,
            has_monetary_value,
        }
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn img_url(&self) -> Option<&str> {
        self.img_url.as_deref()
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// SHA-256 hex digest of the article URL.
    pub fn identity_hash(&self) -> &str {
        &self.identity_hash
    }

    /// SHA-256 hex digest of the image URL, `None` when the card had no image.
    ///
    /// Used as the stem of the downloaded image file so that fetching the same
    /// image twice overwrites the same file.
    pub fn image_hash(&self) -> Option<&str> {
        self.image_hash.as_deref()
    }

    pub fn query_occurrence_count(&self) -> usize {
        self.query_occurrence_count
    }

    pub fn has_monetary_value(&self) -> bool {
        self.has_monetary_value
    }
}

impl PartialEq for Article {
    fn eq(&self, other: &Self) -> bool {
        self.identity_hash == other.identity_hash
    }
}

impl Eq for Article {}

impl Hash for Article {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity_hash.hash(state);
    }
}

/// Deduplicating set of articles accumulated over one search execution.
///
/// The first article inserted for a URL wins; later duplicates are dropped.
#[derive(Debug, Default)]
pub struct ResultSet {
    articles: HashSet<Article>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an article, returning `true` if its URL was not yet present.
    pub fn insert(&mut self, article: Article) -> bool {
        self.articles.insert(article)
    }

    /// Merge a batch of articles, returning how many were new.
    pub fn merge<I>(&mut self, articles: I) -> usize
    where
        I: IntoIterator<Item = Article>,
    {
        articles
            .into_iter()
            .map(|article| self.articles.insert(article))
            .filter(|inserted| *inserted)
            .count()
    }

    pub fn len(&self) -> usize {
        self.articles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.articles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Article> {
        self.articles.iter()
    }

    /// Newest first, ties broken by URL, so exports are reproducible.
    pub fn into_sorted_vec(self) -> Vec<Article> {
        self.articles
            .into_iter()
            .sorted_by(|a, b| b.date.cmp(&a.date).then_with(|| a.url.cmp(&b.url)))
            .collect()
    }
}

/// Sort order offered by the outlet's search page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderBy {
    #[default]
    Date,
    Relevance,
}

impl OrderBy {
    /// The `value` attribute of the matching `<option>`.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderBy::Date => "date",
            OrderBy::Relevance => "relevance",
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderBy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "date" => Ok(OrderBy::Date),
            "relevance" => Ok(OrderBy::Relevance),
            other => Err(Error::invalid_config(format!(
                "unknown order_by '{other}', expected 'date' or 'relevance'"
            ))),
        }
    }
}

/// One validated search request: what to search, how to sort, how far back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkItem {
    pub query: String,
    pub order_by: OrderBy,
    /// Trailing window size; 0 keeps only the current month.
    pub months: u32,
}

pub(crate) fn sha256_hex(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Case-insensitive, non-overlapping count of `needle` in `haystack`.
fn count_occurrences(haystack: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack
        .to_lowercase()
        .matches(needle.to_lowercase().as_str())
        .count()
}

fn contains_money(text: &str) -> bool {
    MONEY_RE.is_match(text)
}
