//! Data models shared by the client and the reference document service.
//!
//! All types are owned by the remote document store. The client only ever
//! reads them, so they derive both `Serialize` (for the service) and
//! `Deserialize` (for the client) with lenient defaults for optional fields.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Maximum number of characters taken from `content` when a document has
/// no summary.
pub const EXCERPT_CHARS: usize = 200;

/// Maximum number of page buttons shown by the pagination control.
pub const PAGE_WINDOW: u64 = 5;

/// A document category, used to populate the category filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
}

/// Lightweight projection of a document for list display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub publication_date: Option<NaiveDate>,
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub is_featured: bool,
}

impl DocumentSummary {
    /// Text shown under the title: the summary if present, otherwise the
    /// first [`EXCERPT_CHARS`] characters of the content followed by `...`.
    pub fn excerpt(&self) -> String {
        if let Some(summary) = self.summary.as_deref().filter(|s| !s.is_empty()) {
            return summary.to_string();
        }
        let content = self.content.as_deref().unwrap_or_default();
        let head: String = content.chars().take(EXCERPT_CHARS).collect();
        format!("{}...", head)
    }
}

/// Full document as returned by `GET /documents/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentDetail {
    pub id: i64,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub category_id: Option<i64>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub publication_date: Option<NaiveDate>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub view_count: i64,
    #[serde(default)]
    pub is_featured: bool,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub updated_at: Option<NaiveDateTime>,
}

impl DocumentDetail {
    /// Comma-separated tags, trimmed, with empty entries dropped.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .collect()
    }

    /// Projects the detail down to its list representation.
    pub fn to_summary(&self) -> DocumentSummary {
        DocumentSummary {
            id: self.id,
            title: self.title.clone(),
            category_id: self.category_id,
            category_name: self.category_name.clone(),
            summary: self.summary.clone(),
            content: Some(self.content.clone()),
            author: self.author.clone(),
            publication_date: self.publication_date,
            view_count: self.view_count,
            is_featured: self.is_featured,
        }
    }
}

/// One page of documents plus pagination metadata.
///
/// Documents are kept in server order. `page` and `limit` are echoed by
/// servers that report them and are otherwise absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentPage {
    pub documents: Vec<DocumentSummary>,
    pub total: u64,
    pub total_pages: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl DocumentPage {
    /// A page with no documents and no totals.
    pub fn empty() -> Self {
        Self {
            documents: Vec::new(),
            total: 0,
            total_pages: 0,
            page: None,
            limit: None,
        }
    }

    /// `true` when the page should render as "no results".
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

/// Pagination controls derived from the current page and the server's
/// `total_pages`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub current: u64,
    pub total_pages: u64,
}

impl Pagination {
    pub fn new(current: u64, total_pages: u64) -> Self {
        Self {
            current,
            total_pages,
        }
    }

    /// Controls are only shown when there is more than one page.
    pub fn is_visible(&self) -> bool {
        self.total_pages > 1
    }

    pub fn has_prev(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self) -> bool {
        self.current < self.total_pages
    }

    /// Page numbers offered as direct links: `1..=min(5, total_pages)`.
    pub fn window(&self) -> std::ops::RangeInclusive<u64> {
        1..=self.total_pages.min(PAGE_WINDOW)
    }
}
