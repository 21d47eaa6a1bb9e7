//! HTTP Server for the inventory API.
//!
//! # API Endpoints
//!
//! | Method | Path               | Description                          |
//! |--------|--------------------|--------------------------------------|
//! | GET    | `/health`          | Health check                         |
//! | GET    | `/api/items`       | Records, `?q=&category=&supplier=`   |
//! | GET    | `/api/categories`  | Distinct categories                  |
//! | GET    | `/api/suppliers`   | Distinct suppliers                   |
//! | GET    | `/api/state`       | Loading flag, error, item count      |
//! | POST   | `/api/refresh`     | Fetch and parse the sheet again      |
//! | GET    | `/api/logs`        | SSE stream for real-time logs        |

use axum::{
    extract::{Query, State},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, sync::Arc, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_info, log_warning, LOG_BROADCASTER};
use super::types::{error_response, ItemsParams, ItemsResponse, ValuesResponse};
use crate::error::ServerResult;
use crate::fetch::{AnySource, CsvSource};
use crate::query::ItemQuery;
use crate::store::{refresh_shared, SharedStore, StoreState};

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub store: SharedStore,
    pub source: Arc<AnySource>,
}

impl AppState {
    pub fn new(store: SharedStore, source: AnySource) -> Self {
        Self {
            store,
            source: Arc::new(source),
        }
    }
}

/// Build the router without binding it.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/items", get(list_items))
        .route("/api/categories", get(list_categories))
        .route("/api/suppliers", get(list_suppliers))
        .route("/api/state", get(store_state))
        .route("/api/refresh", post(refresh))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
        .with_state(state)
}

/// Load the sheet once, then serve until the process stops.
pub async fn start_server(port: u16, state: AppState) -> ServerResult<()> {
    log_info(format!("📄 Loading inventory from {}", state.source.describe()));
    if !refresh_shared(&state.store, state.source.as_ref()).await {
        log_warning("Starting with an empty inventory, POST /api/refresh to retry");
    }

    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    println!("🚀 Inventory server running on http://localhost:{}", port);
    println!("   GET  /api/items      - Items (q, category, supplier)");
    println!("   GET  /api/categories - Distinct categories");
    println!("   GET  /api/suppliers  - Distinct suppliers");
    println!("   POST /api/refresh    - Reload the sheet");
    println!("   GET  /api/logs       - SSE log stream");
    println!("   GET  /health         - Health check");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "inventory",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn list_items(
    State(state): State<AppState>,
    Query(params): Query<ItemsParams>,
) -> Json<ItemsResponse> {
    let store = state.store.read().await;
    let query = ItemQuery::from(params);
    let items: Vec<_> = store.query(&query).into_iter().cloned().collect();

    Json(ItemsResponse {
        total: items.len(),
        items,
        state: store.state(),
    })
}

async fn list_categories(State(state): State<AppState>) -> Json<ValuesResponse> {
    let values = state.store.read().await.categories();
    Json(ValuesResponse { values })
}

async fn list_suppliers(State(state): State<AppState>) -> Json<ValuesResponse> {
    let values = state.store.read().await.suppliers();
    Json(ValuesResponse { values })
}

async fn store_state(State(state): State<AppState>) -> Json<StoreState> {
    Json(state.store.read().await.state())
}

/// Reload the sheet. A failed fetch answers 502 with the stored message.
async fn refresh(
    State(state): State<AppState>,
) -> Result<Json<StoreState>, (StatusCode, Json<Value>)> {
    let ok = refresh_shared(&state.store, state.source.as_ref()).await;
    let snapshot = state.store.read().await.state();

    if ok {
        Ok(Json(snapshot))
    } else {
        let message = snapshot.error.unwrap_or_else(|| "Failed to fetch inventory data".into());
        Err((StatusCode::BAD_GATEWAY, Json(error_response(&message))))
    }
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FileSource;
    use crate::parser::ParseOptions;
    use crate::store::InventoryStore;
    use std::io::Write;

    const SHEET: &str = "\
Item Name,Category,Default Supplier,Supplier Alternative,Order Quantity
Milk,Dairy,Metro,Costco,4
Bread,Bakery,Local,,2";

    async fn spawn(source: AnySource) -> String {
        LOG_BROADCASTER.set_quiet(true);
        let options = ParseOptions::new()
            .with_numeric_keys(["order_quantity"])
            .with_required_key("item_name");
        let state = AppState::new(InventoryStore::new(options).shared(), source);
        refresh_shared(&state.store, state.source.as_ref()).await;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router(state)).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn sheet_file() -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SHEET.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_items_filtered() {
        let file = sheet_file();
        let base = spawn(FileSource::new(file.path()).into()).await;

        let body: Value = reqwest::get(format!("{}/api/items?category=Dairy", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body["total"], 1);
        assert_eq!(body["items"][0]["item_name"], "Milk");
        assert_eq!(body["items"][0]["order_quantity"], 4.0);
        assert_eq!(body["state"]["itemCount"], 2);
    }

    #[tokio::test]
    async fn test_distinct_values() {
        let file = sheet_file();
        let base = spawn(FileSource::new(file.path()).into()).await;

        let body: Value = reqwest::get(format!("{}/api/suppliers", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["values"], json!(["Costco", "Local", "Metro"]));

        let body: Value = reqwest::get(format!("{}/api/categories", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["values"], json!(["Bakery", "Dairy"]));
    }

    #[tokio::test]
    async fn test_refresh_failure_is_bad_gateway() {
        let dir = tempfile::tempdir().unwrap();
        let base = spawn(FileSource::new(dir.path().join("gone.csv")).into()).await;

        let response = reqwest::Client::new()
            .post(format!("{}/api/refresh", base))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_GATEWAY);

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["status"], "error");
        assert!(body["error"].as_str().unwrap().contains("gone.csv"));

        let state: Value = reqwest::get(format!("{}/api/state", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(state["loading"], false);
        assert_eq!(state["itemCount"], 0);
    }

    #[tokio::test]
    async fn test_refresh_success_new_snapshot() {
        let file = sheet_file();
        let base = spawn(FileSource::new(file.path()).into()).await;

        let before: Value = reqwest::get(format!("{}/api/state", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        let after: Value = reqwest::Client::new()
            .post(format!("{}/api/refresh", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(after["itemCount"], 2);
        assert_ne!(before["snapshotId"], after["snapshotId"]);
    }

    #[tokio::test]
    async fn test_health() {
        let file = sheet_file();
        let base = spawn(FileSource::new(file.path()).into()).await;

        let body: Value = reqwest::get(format!("{}/health", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["status"], "ok");
    }
}
