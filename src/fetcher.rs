//! Document list fetcher.
//!
//! Drives a [`ListView`] from asynchronous reads against a
//! [`DocumentSource`]:
//!
//! - **Retry**: a failed read is retried up to `max_retries` times with a
//!   fixed backoff, but only for retryable errors (network, timeout, 5xx, 429).
//! - **De-duplication**: concurrent fetches for an identical [`FilterState`]
//!   share one underlying read through a `tokio::sync::OnceCell`. Once that
//!   read resolves, the next identical fetch is a new read.
//! - **Last request wins**: each fetch takes a ticket from the view; its
//!   result is applied only if its filter is still the most recently issued
//!   one. Superseded reads are not aborted, just ignored when they land.
//!
//! The view and the in-flight table share one `std::sync::Mutex` that is never
//! held across an `.await`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::sync::OnceCell;
use tracing::{debug, info, warn};

use finlib_core::filter::FilterState;
use finlib_core::list_view::{Completion, FetchState, ListView};
use finlib_core::models::DocumentPage;
use finlib_core::source::DocumentSource;
use finlib_core::FetchError;

use crate::config::ApiConfig;

type SharedResult = Arc<OnceCell<Result<DocumentPage, FetchError>>>;

/// How failed reads are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            backoff: Duration::ZERO,
        }
    }

    pub fn from_config(config: &ApiConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            backoff: Duration::from_millis(config.retry_backoff_ms),
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 1,
            backoff: Duration::from_millis(500),
        }
    }
}

#[derive(Default)]
struct Inner {
    view: ListView,
    in_flight: HashMap<FilterState, SharedResult>,
}

pub struct DocumentListFetcher {
    source: Arc<dyn DocumentSource>,
    retry: RetryPolicy,
    page_size: u32,
    inner: Mutex<Inner>,
}

impl DocumentListFetcher {
    pub fn new(source: Arc<dyn DocumentSource>, retry: RetryPolicy, page_size: u32) -> Self {
        Self {
            source,
            retry,
            page_size,
            inner: Mutex::new(Inner::default()),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Snapshot of what the view should show right now.
    pub fn state(&self) -> FetchState {
        self.lock().view.state().clone()
    }

    /// Filter of the most recently issued fetch.
    pub fn latest_filter(&self) -> Option<FilterState> {
        self.lock().view.latest_filter().cloned()
    }

    /// Fetches the page for `filter` and returns the view state once this
    /// fetch has resolved.
    ///
    /// If a newer fetch was issued while this one was in flight, the returned
    /// state reflects that newer fetch (possibly still `Loading`), never this
    /// fetch's stale result.
    pub async fn fetch(&self, filter: FilterState) -> FetchState {
        let (ticket, cell) = {
            let mut inner = self.lock();
            let ticket = inner.view.begin(filter.clone());
            let cell = inner
                .in_flight
                .entry(filter.clone())
                .or_insert_with(|| Arc::new(OnceCell::new()))
                .clone();
            (ticket, cell)
        };
        debug!(seq = ticket.seq(), filter = %filter, "fetch issued");

        let result = cell
            .get_or_init(|| self.read_with_retry(&filter))
            .await
            .clone();

        let mut inner = self.lock();
        if inner
            .in_flight
            .get(&filter)
            .is_some_and(|current| Arc::ptr_eq(current, &cell))
        {
            inner.in_flight.remove(&filter);
        }

        match inner.view.complete(&ticket, result) {
            Completion::Applied => match inner.view.state() {
                FetchState::Success(page) => {
                    info!(seq = ticket.seq(), total = page.total, shown = page.documents.len(), "documents loaded")
                }
                FetchState::Failure { error, .. } => {
                    warn!(seq = ticket.seq(), error = %error, "document fetch failed")
                }
                _ => {}
            },
            Completion::Stale => {
                debug!(seq = ticket.seq(), filter = %filter, "discarding stale response")
            }
        }

        inner.view.state().clone()
    }

    async fn read_with_retry(&self, filter: &FilterState) -> Result<DocumentPage, FetchError> {
        let mut attempt = 0;
        loop {
            match self.source.list_documents(filter, self.page_size).await {
                Ok(page) => return Ok(page),
                Err(e) if e.is_retryable() && attempt < self.retry.max_retries => {
                    attempt += 1;
                    warn!(attempt, error = %e, "retrying document fetch");
                    if !self.retry.backoff.is_zero() {
                        tokio::time::sleep(self.retry.backoff).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
