use axum::{
    extract::{
        multipart::MultipartRejection, rejection::JsonRejection, Multipart, Path, State,
    },
    http::header,
    response::{Html, IntoResponse},
    Json,
};
use serde_json::Value;

use crate::error::{AppError, AppResult};
use crate::models::{NewTemplate, SavedResponse, Template, UploadResponse};
use crate::render::{load_layout, render};
use crate::uploads::content_type_for;
use crate::AppState;

const UPLOAD_FIELD: &str = "image";
const DOWNLOAD_DISPOSITION: &str = "attachment; filename=email-template.html";

pub async fn handle_layout_request(State(state): State<AppState>) -> AppResult<Html<String>> {
    let layout = load_layout(&state.layout_path)
        .await
        .map_err(AppError::Layout)?;
    Ok(Html(layout))
}

pub async fn handle_upload_request(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Json<UploadResponse>> {
    let mut multipart = multipart.map_err(|_| AppError::MissingFile)?;

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        upload = Some((file_name, bytes));
        break;
    }

    let (file_name, bytes) = upload.ok_or(AppError::MissingFile)?;
    let blob = state
        .blobs
        .put(&file_name, &bytes)
        .await
        .map_err(AppError::Upload)?;
    tracing::info!(name = %blob.name, size = bytes.len(), "Stored uploaded image");

    Ok(Json(UploadResponse {
        image_url: blob.url,
    }))
}

pub async fn handle_save_request(
    State(state): State<AppState>,
    payload: Result<Json<NewTemplate>, JsonRejection>,
) -> AppResult<Json<SavedResponse>> {
    let Json(input) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let id = state.store.insert(&input).await.map_err(AppError::Save)?;
    tracing::info!(id, title = %input.title, "Saved template");

    Ok(Json(SavedResponse { id }))
}

pub async fn handle_list_request(State(state): State<AppState>) -> AppResult<Json<Vec<Template>>> {
    let templates = state.store.list_all().await.map_err(AppError::Fetch)?;
    Ok(Json(templates))
}

pub async fn handle_render_request(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> AppResult<impl IntoResponse> {
    let Json(variables) = payload.map_err(|e| AppError::BadRequest(e.body_text()))?;

    let layout = load_layout(&state.layout_path)
        .await
        .map_err(AppError::Layout)?;
    let html = render(&layout, &variables)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/html; charset=utf-8"),
            (header::CONTENT_DISPOSITION, DOWNLOAD_DISPOSITION),
        ],
        html,
    ))
}

pub async fn handle_blob_request(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> AppResult<impl IntoResponse> {
    let bytes = state
        .blobs
        .get(&name)
        .await
        .map_err(AppError::Blob)?
        .ok_or(AppError::NotFound)?;

    Ok((
        [(header::CONTENT_TYPE, content_type_for(&name).to_string())],
        bytes,
    ))
}
