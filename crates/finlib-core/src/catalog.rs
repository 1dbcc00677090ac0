//! In-memory document collection.
//!
//! Holds categories and documents and answers list, detail, and category
//! queries with the same semantics as the document service:
//!
//! - `query` matches title, content, or summary (case-insensitive substring).
//! - `category_id` must be an integer; empty or non-numeric values are ignored.
//! - `tags` is a substring match on the raw tags field.
//! - `is_featured`: empty is ignored, `true`/`1`/`yes`/`on` select featured
//!   documents, any other value selects non-featured ones.
//! - Results are ordered by `created_at` descending, then `id` descending.
//! - Pages past the end are empty, not errors.
//!
//! Uses `std::sync::RwLock` so detail reads can bump view counts.

use std::cmp::Reverse;
use std::sync::RwLock;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::FetchError;
use crate::filter::FilterState;
use crate::models::{Category, DocumentDetail, DocumentPage};
use crate::source::DocumentSource;

/// On-disk catalog layout.
#[derive(Debug, Clone, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub categories: Vec<Category>,
    #[serde(default)]
    pub documents: Vec<DocumentDetail>,
}

/// Raw list parameters as received by the service.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogQuery {
    pub query: Option<String>,
    pub category_id: Option<String>,
    pub tags: Option<String>,
    pub is_featured: Option<String>,
    pub page: u32,
    pub limit: u32,
}

impl CatalogQuery {
    /// Builds the parameters a client would send for `filter`.
    pub fn from_filter(filter: &FilterState, limit: u32) -> Self {
        Self {
            query: Some(filter.query.clone()).filter(|q| !q.is_empty()),
            category_id: filter.category_id.clone(),
            tags: None,
            is_featured: filter.is_featured.map(|f| f.to_string()),
            page: filter.page.get(),
            limit,
        }
    }
}

/// In-memory document collection.
#[derive(Debug)]
pub struct Catalog {
    categories: Vec<Category>,
    documents: RwLock<Vec<DocumentDetail>>,
}

impl Catalog {
    pub fn new(data: CatalogData) -> Self {
        let mut documents = data.documents;
        for doc in &mut documents {
            if doc.category_name.is_none() {
                doc.category_name = doc.category_id.and_then(|id| {
                    data.categories
                        .iter()
                        .find(|c| c.id == id)
                        .map(|c| c.name.clone())
                });
            }
        }
        Self {
            categories: data.categories,
            documents: RwLock::new(documents),
        }
    }

    /// Parses a catalog from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let data: CatalogData = serde_json::from_str(json)?;
        Ok(Self::new(data))
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Categories ordered by name.
    pub fn categories(&self) -> Vec<Category> {
        let mut categories = self.categories.clone();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        categories
    }

    /// Lists one page of matching documents.
    ///
    /// `page` and `limit` are expected to be validated by the caller; a zero
    /// value for either is treated as 1.
    pub fn search(&self, params: &CatalogQuery) -> DocumentPage {
        let page = params.page.max(1);
        let limit = params.limit.max(1);

        let needle = params
            .query
            .as_deref()
            .filter(|q| !q.is_empty())
            .map(str::to_lowercase);
        let category = params
            .category_id
            .as_deref()
            .and_then(|c| c.trim().parse::<i64>().ok());
        let tags = params.tags.as_deref().filter(|t| !t.is_empty());
        let featured = params
            .is_featured
            .as_deref()
            .filter(|f| !f.is_empty())
            .map(|f| matches!(f.to_lowercase().as_str(), "true" | "1" | "yes" | "on"));

        let docs = self.read();
        let mut matched: Vec<&DocumentDetail> = docs
            .iter()
            .filter(|d| needle.as_deref().is_none_or(|n| matches_text(d, n)))
            .filter(|d| category.is_none_or(|c| d.category_id == Some(c)))
            .filter(|d| {
                tags.is_none_or(|t| d.tags.as_deref().is_some_and(|dt| dt.contains(t)))
            })
            .filter(|d| featured.is_none_or(|f| d.is_featured == f))
            .collect();

        matched.sort_by_key(|d| (Reverse(d.created_at), Reverse(d.id)));

        let total = matched.len() as u64;
        let total_pages = if total > 0 {
            total.div_ceil(u64::from(limit))
        } else {
            0
        };
        let offset = (u64::from(page) - 1) * u64::from(limit);

        let documents = matched
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(limit as usize)
            .map(DocumentDetail::to_summary)
            .collect();

        DocumentPage {
            documents,
            total,
            total_pages,
            page: Some(page),
            limit: Some(limit),
        }
    }

    /// Returns a document and counts the read as a view.
    pub fn open(&self, id: i64) -> Option<DocumentDetail> {
        let mut docs = self
            .documents
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let doc = docs.iter_mut().find(|d| d.id == id)?;
        doc.view_count += 1;
        Some(doc.clone())
    }

    /// Returns a document without counting a view.
    pub fn get(&self, id: i64) -> Option<DocumentDetail> {
        self.read().iter().find(|d| d.id == id).cloned()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Vec<DocumentDetail>> {
        self.documents
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn matches_text(doc: &DocumentDetail, needle: &str) -> bool {
    doc.title.to_lowercase().contains(needle)
        || doc.content.to_lowercase().contains(needle)
        || doc
            .summary
            .as_deref()
            .is_some_and(|s| s.to_lowercase().contains(needle))
}

#[async_trait]
impl DocumentSource for Catalog {
    async fn list_documents(
        &self,
        filter: &FilterState,
        limit: u32,
    ) -> Result<DocumentPage, FetchError> {
        Ok(self.search(&CatalogQuery::from_filter(filter, limit)))
    }
}
