//! HTTP client for the document service.
//!
//! Wraps `reqwest` with the configured base URL and timeout and maps every
//! failure onto [`FetchError`]:
//!
//! | Failure | Error |
//! |---------|-------|
//! | connect/DNS/IO error | [`FetchError::Network`] |
//! | no response within `timeout_secs` | [`FetchError::Timeout`] |
//! | non-2xx status | [`FetchError::Server`] |
//! | body is not the expected JSON | [`FetchError::Parse`] |
//!
//! # Endpoints
//!
//! | Method | Path | Used by |
//! |--------|------|---------|
//! | `GET` | `/documents` | list view, title suggestions |
//! | `GET` | `/documents/{id}` | detail |
//! | `GET` | `/categories` | category filter options |

use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use finlib_core::filter::{FilterKey, FilterState};
use finlib_core::models::{Category, DocumentDetail, DocumentPage};
use finlib_core::source::DocumentSource;
use finlib_core::FetchError;

use crate::config::ApiConfig;

/// Number of titles returned by [`DocumentClient::suggest_titles`].
pub const SUGGESTION_LIMIT: u32 = 5;

/// Read-only client for the document service.
#[derive(Debug, Clone)]
pub struct DocumentClient {
    http: reqwest::Client,
    base: Url,
    timeout: Duration,
}

impl DocumentClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("finlib/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            base: config.base()?,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// `GET /documents` for one page of `filter`.
    pub async fn list_documents(
        &self,
        filter: &FilterState,
        limit: u32,
    ) -> Result<DocumentPage, FetchError> {
        let url = self.endpoint("documents")?;
        self.get_json(url, &filter.to_request_pairs(limit)).await
    }

    /// `GET /documents/{id}`.
    pub async fn get_document(&self, id: i64) -> Result<DocumentDetail, FetchError> {
        let url = self.endpoint(&format!("documents/{}", id))?;
        self.get_json(url, &[]).await
    }

    /// `GET /categories`.
    pub async fn list_categories(&self) -> Result<Vec<Category>, FetchError> {
        let url = self.endpoint("categories")?;
        self.get_json(url, &[]).await
    }

    /// Titles of the first few documents matching `query`.
    ///
    /// Suggestions are best-effort: any failure yields an empty list.
    pub async fn suggest_titles(&self, query: &str) -> Vec<String> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let filter = FilterState::default().with_filter(FilterKey::Query, query);
        match self.list_documents(&filter, SUGGESTION_LIMIT).await {
            Ok(page) => page.documents.into_iter().map(|d| d.title).collect(),
            Err(e) => {
                warn!(error = %e, "title suggestions unavailable");
                Vec::new()
            }
        }
    }

    /// Download link for a document's PDF, or `None` when it has none.
    pub fn pdf_download_url(&self, file_path: &str) -> Option<Url> {
        let file_path = file_path.trim().trim_start_matches('/');
        if file_path.is_empty() {
            return None;
        }
        self.base.join("pdfs/").ok()?.join(file_path).ok()
    }

    fn endpoint(&self, path: &str) -> Result<Url, FetchError> {
        self.base
            .join(path)
            .map_err(|e| FetchError::Network(format!("invalid request URL '{}': {}", path, e)))
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&'static str, String)],
    ) -> Result<T, FetchError> {
        debug!(url = %url, ?query, "GET");

        let response = self
            .http
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status();
        debug!(url = %url, status = status.as_u16(), "response");

        let body = response.text().await.map_err(|e| self.classify(e))?;

        if !status.is_success() {
            warn!(url = %url, status = status.as_u16(), "document service error");
            return Err(FetchError::Server {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| FetchError::Parse(e.to_string()))
    }

    fn classify(&self, err: reqwest::Error) -> FetchError {
        if err.is_timeout() {
            FetchError::Timeout(self.timeout)
        } else if err.is_decode() {
            FetchError::Parse(err.to_string())
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

#[async_trait]
impl DocumentSource for DocumentClient {
    async fn list_documents(
        &self,
        filter: &FilterState,
        limit: u32,
    ) -> Result<DocumentPage, FetchError> {
        DocumentClient::list_documents(self, filter, limit).await
    }
}
