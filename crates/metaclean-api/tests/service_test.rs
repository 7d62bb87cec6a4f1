mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use helpers::{file_form, TestApp, API_KEY};
use metaclean_core::{CleanResponse, MetadataResponse};
use metaclean_processing::test_helpers::{tagged_file, FakeTool};
use serde_json::Value;

#[tokio::test]
async fn health_is_open_and_cheap() {
    let app = TestApp::with_key();

    let response = app.server.get("/health").await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>(), serde_json::json!({"status": "ok"}));
    assert!(app.tool.calls().is_empty());
}

#[tokio::test]
async fn deep_health_reports_tool_version() {
    let app = TestApp::new();

    let response = app.server.get("/health/deep").await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["tool"], "fake-exiftool");
    assert_eq!(body["tool_version"], "0.0-fake");
}

#[tokio::test]
async fn deep_health_is_503_without_tool() {
    let app = TestApp::with(FakeTool::new().unavailable(), |_| {});

    let response = app.server.get("/health/deep").await;

    assert_eq!(response.status_code(), 503);
    let body: Value = response.json();
    assert_eq!(body["status"], "unavailable");
    assert!(body.get("tool_version").is_none());
}

#[tokio::test]
async fn metadata_returns_report_and_original_name() {
    let app = TestApp::new();
    let bytes = tagged_file(&["Make : Canon", "Model : EOS 5D"]);

    let response = app
        .server
        .post("/metadata")
        .multipart(file_form("Holiday Photo.JPG", bytes))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: MetadataResponse = response.json();
    assert_eq!(body.filename, "Holiday Photo.JPG");
    assert_eq!(body.metadata, "Make : Canon\nModel : EOS 5D");
    assert!(app.workspace_is_empty());
}

#[tokio::test]
async fn metadata_without_tags_is_sentinel() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/metadata")
        .multipart(file_form("plain.gif", b"GIF89a".to_vec()))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["metadata"], "No metadata");
}

#[tokio::test]
async fn clean_returns_stripped_bytes() {
    let app = TestApp::new();
    let bytes = tagged_file(&["GPSLatitude : 48 deg 51' 29.52\" N"]);

    let response = app
        .server
        .post("/clean")
        .multipart(file_form("../../secret/me.png", bytes))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: CleanResponse = response.json();
    assert_eq!(body.filename, "../../secret/me.png");
    assert_eq!(body.after_meta, "No metadata");

    let result = body.decode().unwrap();
    assert_eq!(result.cleaned_bytes, b"PIXELS");
    assert!(app.workspace_is_empty());

    // Nothing was written outside the workspace root
    for path in app.tool.touched_paths() {
        assert!(path.starts_with(app.workspace_root.path()), "{}", path.display());
        assert!(!path.exists());
    }
}

#[tokio::test]
async fn clean_failure_is_500_with_details() {
    let app = TestApp::with(
        FakeTool::new().failing_strip("Error: Not a valid JPG (looks more like a PNG)"),
        |_| {},
    );

    let response = app
        .server
        .post("/clean")
        .multipart(file_form("broken.jpg", b"\x89PNG".to_vec()))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["error"], "failed to clean file");
    assert_eq!(body["code"], "TOOL_FAILURE");
    assert_eq!(
        body["details"],
        "Error: Not a valid JPG (looks more like a PNG)"
    );
    assert!(body.get("cleaned_file_b64").is_none());
    assert!(app.workspace_is_empty());
}

#[tokio::test]
async fn disallowed_extension_is_rejected_before_the_tool() {
    let app = TestApp::new();

    for path in ["/metadata", "/clean"] {
        let response = app
            .server
            .post(path)
            .multipart(file_form("notes.txt", b"hello".to_vec()))
            .await;

        assert_eq!(response.status_code(), 400);
        let body: Value = response.json();
        assert_eq!(body["error"], "filetype not allowed");
        assert_eq!(body["code"], "UNSUPPORTED_TYPE");
        assert_eq!(body["recoverable"], false);
    }
    assert!(app.tool.calls().is_empty());
    assert!(app.workspace_is_empty());
}

#[tokio::test]
async fn missing_file_field_is_400() {
    let app = TestApp::new();

    let form = MultipartForm::new().add_text("comment", "no upload here");
    let response = app.server.post("/clean").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["error"], "no file");
}

#[tokio::test]
async fn non_multipart_body_is_400() {
    let app = TestApp::new();

    let response = app.server.post("/metadata").text("just text").await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["error"], "no file");
}

#[tokio::test]
async fn empty_filename_is_400() {
    let app = TestApp::new();

    let form = MultipartForm::new().add_part("file", Part::bytes(b"data".to_vec()));
    let response = app.server.post("/metadata").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    assert_eq!(response.json::<Value>()["error"], "no file");
}

#[tokio::test]
async fn duplicate_file_fields_are_400() {
    let app = TestApp::new();

    let form = MultipartForm::new()
        .add_part("file", Part::bytes(b"a".to_vec()).file_name("a.png"))
        .add_part("file", Part::bytes(b"b".to_vec()).file_name("b.png"));
    let response = app.server.post("/clean").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    assert!(app.tool.calls().is_empty());
}

#[tokio::test]
async fn oversized_file_is_413() {
    let app = TestApp::with(FakeTool::new(), |c| c.max_file_size_bytes = 1024);

    let response = app
        .server
        .post("/clean")
        .multipart(file_form("big.png", vec![7u8; 4096]))
        .await;

    assert_eq!(response.status_code(), 413);
    assert_eq!(response.json::<Value>()["code"], "PAYLOAD_TOO_LARGE");
    assert!(app.tool.calls().is_empty());
}

#[tokio::test]
async fn body_over_transport_limit_is_413() {
    let app = TestApp::with(FakeTool::new(), |c| c.max_file_size_bytes = 1024);

    let response = app
        .server
        .post("/clean")
        .multipart(file_form("huge.png", vec![7u8; 256 * 1024]))
        .await;

    assert_eq!(response.status_code(), 413);
    assert!(app.tool.calls().is_empty());
}

#[tokio::test]
async fn responses_carry_request_id() {
    let app = TestApp::new();

    let response = app
        .server
        .get("/health")
        .add_header("X-Request-ID", "abc-123")
        .await;
    assert_eq!(response.header("X-Request-ID"), "abc-123");

    let response = app.server.get("/health").await;
    assert!(!response.header("X-Request-ID").is_empty());
}

#[tokio::test]
async fn missing_and_wrong_keys_look_identical() {
    let app = TestApp::with_key();

    let missing = app
        .server
        .post("/metadata")
        .multipart(file_form("a.png", tagged_file(&["Make : X"])))
        .await;
    let wrong = app
        .server
        .post("/metadata")
        .add_header("X-API-KEY", "not-the-key")
        .multipart(file_form("a.png", tagged_file(&["Make : X"])))
        .await;

    assert_eq!(missing.status_code(), 401);
    assert_eq!(wrong.status_code(), 401);
    assert_eq!(missing.text(), wrong.text());

    let body: Value = missing.json();
    assert_eq!(body["error"], "Unauthorized");
    assert!(body.get("details").is_none());
    assert!(app.tool.calls().is_empty());
}

#[tokio::test]
async fn auth_runs_before_validation() {
    let app = TestApp::with_key();

    let response = app
        .server
        .post("/clean")
        .multipart(file_form("notes.txt", b"hello".to_vec()))
        .await;

    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn valid_key_in_any_header_case_is_accepted() {
    let app = TestApp::with_key();

    let response = app
        .server
        .post("/clean")
        .add_header("x-api-key", API_KEY)
        .multipart(file_form("a.jpeg", tagged_file(&["Artist : Me"])))
        .await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.json::<Value>()["after_meta"], "No metadata");
}

#[tokio::test]
async fn open_mode_needs_no_key() {
    let app = TestApp::new();

    let response = app
        .server
        .post("/metadata")
        .multipart(file_form("a.png", tagged_file(&["Make : X"])))
        .await;

    assert_eq!(response.status_code(), 200);
}
