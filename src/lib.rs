//! Backend for the email template editor: stores templates in SQLite, keeps
//! uploaded images on disk and renders the email layout for download.

use std::path::PathBuf;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod models;
pub mod render;
pub mod uploads;

use database::TemplateStore;
use handlers::{
    handle_blob_request, handle_layout_request, handle_list_request, handle_render_request,
    handle_save_request, handle_upload_request,
};
use uploads::BlobStore;

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub store: TemplateStore,
    pub blobs: BlobStore,
    pub layout_path: PathBuf,
}

pub fn setup_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/api/getEmailLayout", get(handle_layout_request))
        .route("/api/uploadImage", post(handle_upload_request))
        .route("/api/uploadEmailConfig", post(handle_save_request))
        .route("/api/templates", get(handle_list_request))
        .route("/api/renderAndDownloadTemplate", post(handle_render_request))
        .route("/uploads/:name", get(handle_blob_request))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
