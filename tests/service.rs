//! End-to-end tests: the reference service on an ephemeral port, read back
//! through the HTTP client and the list fetcher.

use std::sync::Arc;
use std::time::Duration;

use finlib::client::DocumentClient;
use finlib::config::ApiConfig;
use finlib::fetcher::{DocumentListFetcher, RetryPolicy};
use finlib::server;
use finlib_core::catalog::Catalog;
use finlib_core::filter::{FilterKey, FilterState, Page};
use finlib_core::list_view::FetchState;
use finlib_core::query_state::QueryStateManager;
use finlib_core::FetchError;
use tokio::net::TcpListener;

const CATALOG: &str = include_str!("../data/catalog.json");

async fn start_service() -> String {
    let catalog = Catalog::from_json(CATALOG).unwrap();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, Arc::new(catalog)));
    format!("http://{}", addr)
}

fn client_for(base_url: &str) -> DocumentClient {
    let config = ApiConfig {
        base_url: base_url.to_string(),
        timeout_secs: 5,
        ..ApiConfig::default()
    };
    DocumentClient::new(&config).unwrap()
}

fn fetcher_for(client: &DocumentClient, page_size: u32) -> DocumentListFetcher {
    DocumentListFetcher::new(
        Arc::new(client.clone()),
        RetryPolicy::none(),
        page_size,
    )
}

#[tokio::test]
async fn test_default_listing_is_newest_first() {
    let base = start_service().await;
    let client = client_for(&base);

    let page = client
        .list_documents(&FilterState::default(), 20)
        .await
        .unwrap();
    assert_eq!(page.total, 8);
    assert_eq!(page.total_pages, 1);
    assert_eq!(page.page, Some(1));
    assert_eq!(page.limit, Some(20));

    let ids: Vec<i64> = page.documents.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![6, 4, 1, 2, 3, 7, 8, 5]);
    assert_eq!(page.documents[0].category_name.as_deref(), Some("자본시장"));
}

#[tokio::test]
async fn test_query_without_matches_is_empty_success() {
    let base = start_service().await;
    let client = client_for(&base);
    let fetcher = fetcher_for(&client, 20);

    let mut state = QueryStateManager::new();
    state.set_filter(FilterKey::Query, "금융정책");
    assert_eq!(
        state.state().to_request_pairs(20),
        vec![
            ("query", "금융정책".to_string()),
            ("page", "1".to_string()),
            ("limit", "20".to_string()),
        ]
    );

    let result = fetcher.fetch(state.state().clone()).await;
    assert!(result.is_no_results(), "unexpected state: {:?}", result);
    assert!(result.error().is_none());
}

#[tokio::test]
async fn test_query_matches_title_content_and_summary() {
    let base = start_service().await;
    let client = client_for(&base);

    let filter = FilterState::default().with_filter(FilterKey::Query, "보험");
    let page = client.list_documents(&filter, 20).await.unwrap();
    let ids: Vec<i64> = page.documents.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![2, 3, 7]);
}

#[tokio::test]
async fn test_category_and_featured_filters() {
    let base = start_service().await;
    let client = client_for(&base);

    let filter = FilterState::default()
        .with_filter(FilterKey::CategoryId, "2")
        .with_filter(FilterKey::IsFeatured, "true");
    let page = client.list_documents(&filter, 20).await.unwrap();
    let ids: Vec<i64> = page.documents.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![3]);
}

#[tokio::test]
async fn test_paging_through_results() {
    let base = start_service().await;
    let client = client_for(&base);
    let fetcher = fetcher_for(&client, 3);

    let mut state = QueryStateManager::new();
    let first = fetcher.fetch(state.state().clone()).await;
    let first = first.displayed().unwrap();
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.documents.len(), 3);

    state.next_page();
    state.next_page();
    let last = fetcher.fetch(state.state().clone()).await;
    let last = last.displayed().unwrap();
    assert_eq!(last.page, Some(3));
    assert_eq!(last.documents.len(), 2);
    assert_eq!(state.link(), "page=3");
}

#[tokio::test]
async fn test_page_beyond_end_is_empty_not_error() {
    let base = start_service().await;
    let client = client_for(&base);
    let fetcher = fetcher_for(&client, 20);

    let filter = FilterState::default().with_page(Page::new(9).unwrap());
    let result = fetcher.fetch(filter).await;
    match result {
        FetchState::Success(page) => {
            assert!(page.documents.is_empty());
            assert_eq!(page.total, 8);
            assert_eq!(page.page, Some(9));
        }
        other => panic!("expected success, got {:?}", other),
    }
}

#[tokio::test]
async fn test_detail_counts_views() {
    let base = start_service().await;
    let client = client_for(&base);

    let first = client.get_document(1).await.unwrap();
    assert_eq!(first.view_count, 43);
    assert_eq!(first.category_name.as_deref(), Some("통화정책"));
    assert_eq!(first.tag_list(), vec!["기준금리", "물가", "통화정책"]);

    let second = client.get_document(1).await.unwrap();
    assert_eq!(second.view_count, 44);

    let url = client
        .pdf_download_url(first.file_path.as_deref().unwrap())
        .unwrap();
    assert_eq!(
        url.as_str(),
        format!("{}/pdfs/monetary_policy_2024h1.pdf", base)
    );
}

#[tokio::test]
async fn test_missing_document_is_server_error() {
    let base = start_service().await;
    let client = client_for(&base);

    let err = client.get_document(999).await.unwrap_err();
    match err {
        FetchError::Server { status, body } => {
            assert_eq!(status, 404);
            assert!(body.contains("not_found"));
        }
        other => panic!("expected 404, got {:?}", other),
    }
}

#[tokio::test]
async fn test_invalid_limit_is_rejected() {
    let base = start_service().await;
    let client = client_for(&base);

    let err = client
        .list_documents(&FilterState::default(), 500)
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Server { status: 422, .. }));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_categories_sorted_by_name() {
    let base = start_service().await;
    let client = client_for(&base);

    let names: Vec<String> = client
        .list_categories()
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["가계금융", "보험", "자본시장", "통화정책"]);
}

#[tokio::test]
async fn test_title_suggestions() {
    let base = start_service().await;
    let client = client_for(&base);

    let titles = client.suggest_titles("보험").await;
    assert_eq!(titles.len(), 3);
    assert_eq!(titles[0], "실손의료보험 제도 개선 방안");
}

#[tokio::test]
async fn test_timeout_keeps_previous_page() {
    let base = start_service().await;

    // Accepts connections but never answers.
    let silent = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let silent_addr = silent.local_addr().unwrap();
    tokio::spawn(async move {
        let mut held = Vec::new();
        while let Ok((socket, _)) = silent.accept().await {
            held.push(socket);
        }
    });

    let good = client_for(&base);
    let slow = DocumentClient::new(&ApiConfig {
        base_url: format!("http://{}", silent_addr),
        timeout_secs: 1,
        ..ApiConfig::default()
    })
    .unwrap();

    // One fetcher, switched between sources by filter.
    struct Routed {
        good: DocumentClient,
        slow: DocumentClient,
    }

    #[async_trait::async_trait]
    impl finlib_core::source::DocumentSource for Routed {
        async fn list_documents(
            &self,
            filter: &FilterState,
            limit: u32,
        ) -> Result<finlib_core::models::DocumentPage, FetchError> {
            if filter.query == "slow" {
                self.slow.list_documents(filter, limit).await
            } else {
                self.good.list_documents(filter, limit).await
            }
        }
    }

    let fetcher = DocumentListFetcher::new(
        Arc::new(Routed { good, slow }),
        RetryPolicy::none(),
        20,
    );

    let loaded = fetcher.fetch(FilterState::default()).await;
    assert_eq!(loaded.displayed().unwrap().total, 8);

    let started = std::time::Instant::now();
    let failed = fetcher
        .fetch(FilterState::default().with_filter(FilterKey::Query, "slow"))
        .await;
    assert!(started.elapsed() < Duration::from_secs(5));

    assert!(
        matches!(failed.error(), Some(FetchError::Timeout(_))),
        "unexpected state: {:?}",
        failed
    );
    assert_eq!(failed.displayed().unwrap().total, 8);
}
