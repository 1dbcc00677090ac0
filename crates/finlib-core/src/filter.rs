//! Filter state and its shareable (URL query string) representation.
//!
//! A [`FilterState`] is the canonical description of the document query a
//! view is showing. It maps to a query string and back with a pair of pure
//! functions:
//!
//! - [`FilterState::to_query_string`] writes only the non-default fields, in
//!   the fixed order `query`, `category_id`, `is_featured`, `page`.
//! - [`FilterState::from_query_string`] never fails; missing or malformed
//!   fields fall back to their defaults.
//!
//! ```rust
//! use finlib_core::filter::{FilterKey, FilterState, Page};
//!
//! let state = FilterState::default()
//!     .with_filter(FilterKey::Query, "보험")
//!     .with_page(Page::new(2).unwrap());
//! let link = state.to_query_string();
//! assert_eq!(FilterState::from_query_string(&link), state);
//! ```

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::form_urlencoded;

/// Query-string key for the free-text filter.
pub const KEY_QUERY: &str = "query";
/// Query-string key for the category filter.
pub const KEY_CATEGORY_ID: &str = "category_id";
/// Query-string key for the featured flag.
pub const KEY_IS_FEATURED: &str = "is_featured";
/// Query-string key for the page number.
pub const KEY_PAGE: &str = "page";
/// Query-string key for the page size (request only, never in links).
pub const KEY_LIMIT: &str = "limit";

/// A 1-based page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Page(NonZeroU32);

impl Page {
    pub const FIRST: Page = Page(NonZeroU32::MIN);

    /// Returns `None` for page 0.
    pub fn new(n: u32) -> Option<Self> {
        NonZeroU32::new(n).map(Page)
    }

    pub fn get(self) -> u32 {
        self.0.get()
    }

    /// Parses user or link input. Anything that is not a positive integer
    /// becomes page 1.
    pub fn parse_lenient(input: &str) -> Self {
        input
            .trim()
            .parse::<u32>()
            .ok()
            .and_then(Page::new)
            .unwrap_or(Page::FIRST)
    }

    pub fn next(self) -> Self {
        Page(self.0.saturating_add(1))
    }

    /// `None` on the first page.
    pub fn prev(self) -> Option<Self> {
        Page::new(self.get() - 1)
    }

    pub fn is_first(self) -> bool {
        self == Page::FIRST
    }
}

impl Default for Page {
    fn default() -> Self {
        Page::FIRST
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The filter fields a user can edit. Editing any of them resets the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKey {
    Query,
    CategoryId,
    IsFeatured,
}

impl FilterKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Query => KEY_QUERY,
            Self::CategoryId => KEY_CATEGORY_ID,
            Self::IsFeatured => KEY_IS_FEATURED,
        }
    }
}

impl fmt::Display for FilterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown filter key '{0}' (expected query, category_id, or is_featured)")]
pub struct UnknownFilterKey(pub String);

impl FromStr for FilterKey {
    type Err = UnknownFilterKey;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "query" | "q" => Ok(Self::Query),
            "category_id" | "categoryId" | "category" => Ok(Self::CategoryId),
            "is_featured" | "isFeatured" | "featured" => Ok(Self::IsFeatured),
            other => Err(UnknownFilterKey(other.to_string())),
        }
    }
}

/// Interprets a featured-flag value. Empty or unrecognised input means
/// "no filter".
pub fn parse_featured(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Canonical description of the document query a view is showing.
///
/// Also serves as the request identity for fetches: two fetches for equal
/// states are the same request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FilterState {
    /// Free-text query; empty means no text filter.
    pub query: String,
    /// `None` means all categories.
    pub category_id: Option<String>,
    /// `None` means no featured filter.
    pub is_featured: Option<bool>,
    pub page: Page,
}

impl FilterState {
    /// Returns a copy with `key` set from `value` and the page reset to 1.
    ///
    /// An empty `value` clears the field.
    pub fn with_filter(&self, key: FilterKey, value: &str) -> Self {
        let mut next = self.clone();
        match key {
            FilterKey::Query => next.query = value.to_string(),
            FilterKey::CategoryId => {
                next.category_id = Some(value.trim())
                    .filter(|v| !v.is_empty())
                    .map(String::from)
            }
            FilterKey::IsFeatured => next.is_featured = parse_featured(value),
        }
        next.page = Page::FIRST;
        next
    }

    /// Returns a copy with only the page changed.
    pub fn with_page(&self, page: Page) -> Self {
        Self {
            page,
            ..self.clone()
        }
    }

    /// `true` when no filter is applied and the page is 1.
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    /// Non-default fields as ordered key/value pairs, unencoded.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = self.filter_pairs();
        if !self.page.is_first() {
            pairs.push((KEY_PAGE, self.page.to_string()));
        }
        pairs
    }

    /// The shareable representation: a form-urlencoded query string without
    /// a leading `?`. Empty for the default state.
    pub fn to_query_string(&self) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        for (key, value) in self.to_query_pairs() {
            serializer.append_pair(key, &value);
        }
        serializer.finish()
    }

    /// Parses a shareable representation.
    ///
    /// Accepts a bare query string, one with a leading `?`, or a full URL or
    /// path (everything up to the first `?` is skipped, any `#fragment` is
    /// dropped). The first occurrence of a repeated key wins and unknown keys
    /// are ignored.
    pub fn from_query_string(input: &str) -> Self {
        let input = input.split('#').next().unwrap_or_default();
        let query = match input.split_once('?') {
            Some((_, q)) => q,
            None if input.contains('=') || input.is_empty() => input,
            None => "",
        };

        let mut query_value = None;
        let mut category_value = None;
        let mut featured_value = None;
        let mut page_value = None;

        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let slot = match key.as_ref() {
                KEY_QUERY => &mut query_value,
                KEY_CATEGORY_ID => &mut category_value,
                KEY_IS_FEATURED => &mut featured_value,
                KEY_PAGE => &mut page_value,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value.into_owned());
            }
        }

        Self {
            query: query_value.unwrap_or_default(),
            category_id: category_value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            is_featured: featured_value.as_deref().and_then(parse_featured),
            page: page_value
                .as_deref()
                .map(Page::parse_lenient)
                .unwrap_or_default(),
        }
    }

    /// Request parameters for `GET /documents`: the set filters, then `page`
    /// and `limit`, which are always present.
    pub fn to_request_pairs(&self, limit: u32) -> Vec<(&'static str, String)> {
        let mut pairs = self.filter_pairs();
        pairs.push((KEY_PAGE, self.page.to_string()));
        pairs.push((KEY_LIMIT, limit.to_string()));
        pairs
    }

    fn filter_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::with_capacity(4);
        if !self.query.is_empty() {
            pairs.push((KEY_QUERY, self.query.clone()));
        }
        if let Some(category) = &self.category_id {
            pairs.push((KEY_CATEGORY_ID, category.clone()));
        }
        if let Some(featured) = self.is_featured {
            pairs.push((KEY_IS_FEATURED, featured.to_string()));
        }
        pairs
    }
}

impl fmt::Display for FilterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let query = if self.query.is_empty() {
            "-"
        } else {
            &self.query
        };
        let category = self.category_id.as_deref().unwrap_or("all");
        let featured = match self.is_featured {
            Some(true) => "only",
            Some(false) => "excluded",
            None => "any",
        };
        write!(
            f,
            "query={} category={} featured={} page={}",
            query, category, featured, self.page
        )
    }
}
