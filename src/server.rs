//! JSON HTTP API.
//!
//! Exposes article maintenance, CSV import, sale recording, and the monthly
//! sales series over HTTP. Handlers call the same functions as the CLI,
//! against a shared [`Store`].
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`    | `/health` | Health check (returns version) |
//! | `GET`    | `/articles` | All articles ordered by code |
//! | `POST`   | `/articles` | Add an article |
//! | `POST`   | `/articles/import` | Import articles from a raw CSV body |
//! | `GET`    | `/articles/{code}` | One article |
//! | `PUT`    | `/articles/{code}` | Update quantity and unit price |
//! | `DELETE` | `/articles/{code}` | Delete an article and its sales |
//! | `POST`   | `/articles/{code}/sales` | Record a sale |
//! | `GET`    | `/articles/{code}/sales/monthly` | Monthly sales series for charting |
//!
//! # Error Contract
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "quantity must be >= 1, got 0" } }
//! ```
//!
//! Error codes: `bad_request` (400), `schema_error` (400), `not_found` (404),
//! `conflict` (409), `internal` (500).

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use stockroom_core::import::{import_articles_with, ImportError, ImportOptions, ImportReport};
use stockroom_core::models::{Article, NewArticle, Sale, ValidationError};
use stockroom_core::store::Store;

use crate::articles;
use crate::config::Config;
use crate::sales::{self, SalesHistory};
use crate::sqlite_store::SqliteStore;

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    store: Arc<dyn Store>,
    import_options: Arc<ImportOptions>,
}

/// Starts the HTTP server on `[server].bind` against the SQLite store.
///
/// Runs until the process is terminated. Returns an error if binding fails.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let store = SqliteStore::open(config).await?;
    let options = ImportOptions {
        delimiter: config.import.delimiter_byte(),
    };
    let app = router(Arc::new(store), options);

    let listener = tokio::net::TcpListener::bind(&config.server.bind).await?;
    tracing::info!(bind = %config.server.bind, "server listening");
    println!("Stockroom listening on http://{}", config.server.bind);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Builds the router over any store.
pub fn router(store: Arc<dyn Store>, import_options: ImportOptions) -> Router {
    let state = AppState {
        store,
        import_options: Arc::new(import_options),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handle_health))
        .route("/articles", get(handle_list).post(handle_add))
        .route("/articles/import", post(handle_import))
        .route(
            "/articles/{code}",
            get(handle_get).put(handle_edit).delete(handle_delete),
        )
        .route("/articles/{code}/sales", post(handle_record_sale))
        .route("/articles/{code}/sales/monthly", get(handle_monthly))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
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

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(message = %self.message, "request failed");
        }
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code.to_string(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn app_error(status: StatusCode, code: &'static str, message: impl Into<String>) -> AppError {
    AppError {
        status,
        code,
        message: message.into(),
    }
}

/// Maps operation errors to HTTP statuses. Validation failures are typed;
/// uniqueness and lookups are recognised by their messages, which both stores
/// share. Conflict markers are checked first since codes and names end up in
/// the message text.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        let msg = format!("{:#}", err);

        if err.downcast_ref::<ValidationError>().is_some() {
            app_error(StatusCode::BAD_REQUEST, "bad_request", msg)
        } else if msg.contains("already exists") || msg.contains("UNIQUE constraint failed") {
            app_error(StatusCode::CONFLICT, "conflict", msg)
        } else if msg.contains("not found") {
            app_error(StatusCode::NOT_FOUND, "not_found", msg)
        } else {
            app_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", msg)
        }
    }
}

impl From<ImportError> for AppError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Schema { .. } | ImportError::Header(_) => {
                app_error(StatusCode::BAD_REQUEST, "schema_error", err.to_string())
            }
            ImportError::Read { .. } | ImportError::Persistence(_) => {
                app_error(StatusCode::INTERNAL_SERVER_ERROR, "internal", err.to_string())
            }
        }
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

// ============ Articles ============

#[derive(Serialize)]
struct ArticleListResponse {
    articles: Vec<Article>,
}

async fn handle_list(State(state): State<AppState>) -> Result<Json<ArticleListResponse>, AppError> {
    let articles = state.store.list_articles().await?;
    Ok(Json(ArticleListResponse { articles }))
}

async fn handle_add(
    State(state): State<AppState>,
    Json(article): Json<NewArticle>,
) -> Result<(StatusCode, Json<Article>), AppError> {
    let added = articles::add_article(state.store.as_ref(), article).await?;
    Ok((StatusCode::CREATED, Json(added)))
}

async fn handle_get(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<Article>, AppError> {
    match state.store.find_article(&code).await? {
        Some(article) => Ok(Json(article)),
        None => Err(app_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("article not found: {}", code),
        )),
    }
}

/// Body of `PUT /articles/{code}`.
#[derive(Deserialize)]
struct EditRequest {
    quantity: i64,
    unit_price: f64,
}

async fn handle_edit(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<EditRequest>,
) -> Result<Json<Article>, AppError> {
    let article =
        articles::edit_article(state.store.as_ref(), &code, req.quantity, req.unit_price).await?;
    Ok(Json(article))
}

async fn handle_delete(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<StatusCode, AppError> {
    articles::delete_article(state.store.as_ref(), &code).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ============ POST /articles/import ============

async fn handle_import(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ImportReport>, AppError> {
    let report =
        import_articles_with(body.as_ref(), state.store.as_ref(), &state.import_options).await?;
    Ok(Json(report))
}

// ============ Sales ============

/// Body of `POST /articles/{code}/sales`. `date` defaults to today.
#[derive(Deserialize)]
struct SaleRequest {
    quantity: i64,
    #[serde(default)]
    date: Option<NaiveDate>,
}

async fn handle_record_sale(
    State(state): State<AppState>,
    Path(code): Path<String>,
    Json(req): Json<SaleRequest>,
) -> Result<(StatusCode, Json<Sale>), AppError> {
    let sale = sales::record_sale(state.store.as_ref(), &code, req.quantity, req.date).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

async fn handle_monthly(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<SalesHistory>, AppError> {
    let history = sales::monthly_history(state.store.as_ref(), &code).await?;
    Ok(Json(history))
}
