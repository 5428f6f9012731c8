//! # HTTP API Tests
//!
//! Requests are sent straight to the router with `tower::ServiceExt::oneshot`;
//! no socket is opened.

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use rust_xlsxwriter::Workbook;
use serde_json::{Value, json};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;
use xlbarcode::config::SettingsStore;
use xlbarcode::server::{AppState, ServerConfig, router};
use xlbarcode::workbook::ImageLocation;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

fn app(dir: &Path) -> Router {
    let config = ServerConfig {
        listen_addr: "127.0.0.1:0".to_string(),
        settings_path: dir.join("settings.json"),
        images: ImageLocation::Within(dir.join("images")),
        keep_images: false,
    };
    router(Arc::new(AppState::new(config).unwrap()))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>, Option<String>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .map(|v| v.to_str().unwrap().to_string());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec(), content_type)
}

async fn send_json(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes, _) = send(app, method, uri, body).await;
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

// ============================================================================
// SETTINGS
// ============================================================================

#[tokio::test]
async fn test_first_run_serves_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());

    let (status, settings) = send_json(&app, "GET", "/api/settings", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["dpi"], 200);
    assert_eq!(settings["symbology"], "ean8");
    assert!(dir.path().join("settings.json").exists());
}

#[tokio::test]
async fn test_update_single_field_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());

    let (status, settings) = send_json(
        &app,
        "PUT",
        "/api/settings",
        Some(json!({"key": "dpi", "value": 300})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(settings["dpi"], 300);
    let stored = SettingsStore::new(dir.path().join("settings.json")).load().unwrap();
    assert_eq!(stored.dpi, 300);
}

#[tokio::test]
async fn test_out_of_range_update_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());

    let (status, _) = send_json(
        &app,
        "PUT",
        "/api/settings",
        Some(json!({"key": "border_px", "value": 99})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, settings) = send_json(&app, "GET", "/api/settings", None).await;
    assert_eq!(settings["border_px"], 10);
}

#[tokio::test]
async fn test_full_settings_update() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());

    let (_, mut settings) = send_json(&app, "GET", "/api/settings", None).await;
    settings["symbology"] = json!("code39");
    settings["input_column"] = json!("C");

    let (status, updated) = send_json(&app, "PUT", "/api/settings", Some(settings)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["symbology"], "code39");
    assert_eq!(updated["input_column"], "C");
}

// ============================================================================
// EXPORT
// ============================================================================

#[tokio::test]
async fn test_export_returns_png() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());

    let (status, bytes, content_type) =
        send(&app, "POST", "/api/export", Some(json!({"code": "1234567"}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("image/png"));
    assert_eq!(&bytes[..4], b"\x89PNG");
}

#[tokio::test]
async fn test_export_invalid_code_is_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());

    let (status, bytes, _) = send(&app, "POST", "/api/export", Some(json!({"code": "abc"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(String::from_utf8_lossy(&bytes).contains("not an integer"));
}

// ============================================================================
// JOBS
// ============================================================================

#[tokio::test]
async fn test_unknown_job_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());

    let uri = format!("/api/jobs/{}", uuid::Uuid::new_v4());
    let (status, _) = send_json(&app, "GET", &uri, None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_job_runs_to_completion() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("in.xlsx");
    let output = dir.path().join("out.xlsx");
    {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        sheet.write_string(0, 1, "1234567").unwrap();
        sheet.write_string(1, 1, "bad").unwrap();
        workbook.save(&input).unwrap();
    }
    let app = app(dir.path());

    let (status, started) = send_json(
        &app,
        "POST",
        "/api/jobs",
        Some(json!({"input": input, "output": output})),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    let uri = format!("/api/jobs/{}", started["id"].as_str().unwrap());

    let mut job = Value::Null;
    for _ in 0..200 {
        let (_, current) = send_json(&app, "GET", &uri, None).await;
        job = current;
        if job["finished"] == true {
            break;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }

    assert_eq!(job["finished"], true);
    assert_eq!(job["error"], Value::Null);
    assert_eq!(job["inserted"], 1);
    assert_eq!(job["skipped"], 1);
    assert_eq!(job["summary"]["inserted"][0]["cell"], "A1");
    assert!(output.exists());

    let (_, jobs) = send_json(&app, "GET", "/api/jobs", None).await;
    assert_eq!(jobs.as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn test_index_page() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path());

    let (status, bytes, _) = send(&app, "GET", "/", None).await;

    assert_eq!(status, StatusCode::OK);
    let html = String::from_utf8_lossy(&bytes);
    assert!(html.contains("/api/jobs"));
    assert!(html.contains("window.__BOOT_TIME="));
}
