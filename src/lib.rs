pub mod config;
pub mod error;
pub mod events;
pub mod handlers;
pub mod models;
pub mod net;
pub mod services;
pub mod storage;
pub mod sweeper;

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::events::{ConnectionRegistry, EventBus};
use crate::storage::{StorageDir, MAX_UPLOAD_BYTES};

/// Application state shared across handlers, constructed once at
/// startup instead of living in globals.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub storage: Arc<StorageDir>,
    pub events: EventBus,
    pub connections: ConnectionRegistry,
    pub local_ip: String,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let storage = Arc::new(StorageDir::new(&config.storage.local_path));
        Self {
            config: Arc::new(config),
            storage,
            events: EventBus::new(),
            connections: ConnectionRegistry::new(),
            local_ip: net::detect_local_ip(),
            started_at: Instant::now(),
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    // LAN tool: reflect any origin
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/health", get(handlers::system::health))
        .route("/files", get(handlers::file::list_files))
        .route("/upload", post(handlers::file::upload_file))
        .route("/upload-multiple", post(handlers::file::upload_multiple))
        .route("/download/:name", get(handlers::file::download_file))
        .route("/delete/:name", delete(handlers::file::delete_file))
        .route("/delete-all", delete(handlers::file::delete_all))
        .route("/server-info", get(handlers::system::server_info))
        .route("/network-test", get(handlers::system::network_test));

    Router::new()
        .nest("/api", api)
        .route("/ws", get(handlers::ws::ws_handler))
        .nest_service("/uploads", ServeDir::new(state.storage.base()))
        // The ceiling itself is enforced chunk-by-chunk in UploadSink;
        // the body limit just needs to sit above it plus framing.
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES as usize + 1024 * 1024))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
