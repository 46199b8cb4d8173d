#![allow(dead_code)]

use std::path::PathBuf;

use axum::body::Body;
use axum::http::{header, Method, Request, Response};
use axum::Router;
use serde_json::Value;
use tempfile::TempDir;
use tower::ServiceExt;

use mailforge::database::TemplateStore;
use mailforge::uploads::BlobStore;
use mailforge::{setup_router, AppState};

pub const PUBLIC_URL: &str = "http://localhost:3000";
pub const BOUNDARY: &str = "mailforge-test-boundary";

/// A router backed by a throwaway database, uploads directory and layout.
pub struct TestApp {
    pub dir: TempDir,
    pub router: Router,
}

impl TestApp {
    pub fn uploads_dir(&self) -> PathBuf {
        self.dir.path().join("uploads")
    }

    pub fn layout_path(&self) -> PathBuf {
        self.dir.path().join("default.html")
    }
}

pub async fn build_test_app(layout: Option<&str>) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite:{}", dir.path().join("test.sqlite").display());
    let store = TemplateStore::connect(&url).await.unwrap();
    store.initialize().await.unwrap();

    let layout_path = dir.path().join("default.html");
    if let Some(layout) = layout {
        std::fs::write(&layout_path, layout).unwrap();
    }

    let state = AppState {
        store,
        blobs: BlobStore::new(dir.path().join("uploads"), PUBLIC_URL),
        layout_path,
    };

    TestApp {
        router: setup_router(state, 1024 * 1024),
        dir,
    }
}

pub async fn send(app: &TestApp, request: Request<Body>) -> Response<axum::body::BoxBody> {
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &TestApp, uri: &str) -> Response<axum::body::BoxBody> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(app, request).await
}

pub async fn post_json(app: &TestApp, uri: &str, body: &Value) -> Response<axum::body::BoxBody> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

/// Multipart body with a single part; `file_name` turns it into a file part.
pub fn multipart_body(field: &str, file_name: Option<&str>, data: &[u8]) -> Vec<u8> {
    let disposition = match file_name {
        Some(name) => format!("form-data; name=\"{field}\"; filename=\"{name}\""),
        None => format!("form-data; name=\"{field}\""),
    };
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: {disposition}\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub async fn post_multipart(app: &TestApp, uri: &str, body: Vec<u8>) -> Response<axum::body::BoxBody> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap();
    send(app, request).await
}

pub async fn body_bytes(response: Response<axum::body::BoxBody>) -> Vec<u8> {
    hyper::body::to_bytes(response.into_body())
        .await
        .unwrap()
        .to_vec()
}

pub async fn body_json(response: Response<axum::body::BoxBody>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

pub async fn body_text(response: Response<axum::body::BoxBody>) -> String {
    String::from_utf8(body_bytes(response).await).unwrap()
}
