//! Reference document service.
//!
//! Serves a [`Catalog`] loaded from JSON over the same HTTP contract the
//! client reads from, for local runs and end-to-end tests.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/documents` | Filtered, paginated document list |
//! | `GET`  | `/documents/{id}` | Document detail (counts a view) |
//! | `GET`  | `/categories` | Categories ordered by name |
//! | `GET`  | `/health` | Health check (returns version) |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "validation_error", "message": "page must be >= 1" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404),
//! `validation_error` (422).

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Path as UrlPath, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info};

use finlib_core::catalog::{Catalog, CatalogQuery};
use finlib_core::models::{Category, DocumentDetail, DocumentPage};
use finlib_core::source::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

use crate::config::Config;

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    catalog: Arc<Catalog>,
}

/// Reads a catalog file.
pub fn load_catalog(path: &Path) -> Result<Catalog> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read catalog: {}", path.display()))?;
    Catalog::from_json(&content)
        .with_context(|| format!("Failed to parse catalog: {}", path.display()))
}

/// Starts the document service on `[server].bind` and runs until the process
/// is terminated.
pub async fn run_server(config: &Config) -> Result<()> {
    let catalog = load_catalog(&config.server.catalog)?;
    info!(
        documents = catalog.len(),
        catalog = %config.server.catalog.display(),
        "catalog loaded"
    );

    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    println!("Document service listening on http://{}", listener.local_addr()?);

    serve(listener, Arc::new(catalog)).await
}

/// Serves `catalog` on an already bound listener.
pub async fn serve(listener: TcpListener, catalog: Arc<Catalog>) -> Result<()> {
    axum::serve(listener, router(catalog)).await?;
    Ok(())
}

/// Builds the service routes.
pub fn router(catalog: Arc<Catalog>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/documents", get(handle_list_documents))
        .route("/documents/{id}", get(handle_get_document))
        .route("/categories", get(handle_categories))
        .route("/health", get(handle_health))
        .layer(cors)
        .with_state(AppState { catalog })
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found",
        message: message.into(),
    }
}

fn validation_error(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::UNPROCESSABLE_ENTITY,
        code: "validation_error",
        message: message.into(),
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// ============ GET /documents ============

/// Query parameters for `GET /documents`. Numbers arrive as strings so
/// malformed values produce a JSON error body instead of a bare rejection.
#[derive(Debug, Deserialize)]
struct ListParams {
    query: Option<String>,
    category_id: Option<String>,
    tags: Option<String>,
    is_featured: Option<String>,
    page: Option<String>,
    limit: Option<String>,
}

fn parse_bounded(name: &str, raw: Option<&str>, default: u32, max: u32) -> Result<u32, AppError> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| validation_error(format!("{} must be an integer", name)))?;
    if value < 1 || value > i64::from(max) {
        return Err(validation_error(format!(
            "{} must be between 1 and {}",
            name, max
        )));
    }
    Ok(value as u32)
}

async fn handle_list_documents(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<DocumentPage>, AppError> {
    let page = parse_bounded("page", params.page.as_deref(), 1, u32::MAX)?;
    let limit = parse_bounded("limit", params.limit.as_deref(), DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE)?;

    let query = CatalogQuery {
        query: params.query,
        category_id: params.category_id,
        tags: params.tags,
        is_featured: params.is_featured,
        page,
        limit,
    };
    debug!(?query, "list documents");

    Ok(Json(state.catalog.search(&query)))
}

// ============ GET /documents/{id} ============

async fn handle_get_document(
    State(state): State<AppState>,
    UrlPath(id): UrlPath<String>,
) -> Result<Json<DocumentDetail>, AppError> {
    let id: i64 = id
        .parse()
        .map_err(|_| bad_request(format!("invalid document id: {}", id)))?;
    state
        .catalog
        .open(id)
        .map(Json)
        .ok_or_else(|| not_found(format!("document not found: {}", id)))
}

// ============ GET /categories ============

async fn handle_categories(State(state): State<AppState>) -> Json<Vec<Category>> {
    Json(state.catalog.categories())
}
