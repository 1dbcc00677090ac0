//! The read seam between the list fetcher and a document collection.
//!
//! The HTTP client in the `finlib` crate is the production implementation;
//! [`Catalog`](crate::catalog::Catalog) answers from memory and backs the
//! reference service and tests.

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::FetchError;
use crate::filter::FilterState;
use crate::models::DocumentPage;

/// Page size used when none is configured.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page size the collection accepts.
pub const MAX_PAGE_SIZE: u32 = 100;

/// A collection that can list one page of documents for a filter.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Returns the page selected by `filter.page`, at most `limit` documents,
    /// in the collection's own order.
    async fn list_documents(
        &self,
        filter: &FilterState,
        limit: u32,
    ) -> Result<DocumentPage, FetchError>;
}

#[async_trait]
impl<T: DocumentSource + ?Sized> DocumentSource for Arc<T> {
    async fn list_documents(
        &self,
        filter: &FilterState,
        limit: u32,
    ) -> Result<DocumentPage, FetchError> {
        (**self).list_documents(filter, limit).await
    }
}
