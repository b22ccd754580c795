use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use axum::response::Response;
use tower::ServiceExt;

use panicguard_core::{FaultKind, MemorySink, Sentinel};
use panicguard_server::api::{self, AppState};
use panicguard_server::config::PanicguardConfig;
use panicguard_storage::{FileInfo, FileStorage, MemoryStorage, Query, StorageError};

const BOUNDARY: &str = "panicguard-test-boundary";

// -- Helpers --------------------------------------------------------------

struct TestApp {
    router: Router,
    storage: Arc<MemoryStorage>,
    sink: MemorySink,
}

fn build_app(config: &PanicguardConfig) -> TestApp {
    let storage = Arc::new(MemoryStorage::new(config.storage.clone()));
    let sink = MemorySink::new();
    let state = AppState {
        storage: storage.clone(),
    };
    let router = api::router(state, config, Arc::new(sink.clone()));
    TestApp {
        router,
        storage,
        sink,
    }
}

/// Backend whose every call fails with the given sentinel.
struct FailingStorage {
    sentinel: Sentinel,
}

impl FailingStorage {
    fn error(&self) -> StorageError {
        StorageError::detailed(self.sentinel, "bucket iterator failed")
    }
}

#[async_trait]
impl FileStorage for FailingStorage {
    async fn upload(
        &self,
        _prefix: &str,
        _content_type: &str,
        _data: bytes::Bytes,
    ) -> Result<String, StorageError> {
        Err(self.error())
    }

    async fn get_url(&self, _path: &str) -> Result<String, StorageError> {
        Err(self.error())
    }

    async fn remove(&self, _path: &str) -> Result<(), StorageError> {
        Err(self.error())
    }

    async fn list(&self, _query: &Query) -> Result<Vec<FileInfo>, StorageError> {
        Err(self.error())
    }
}

fn failing_app(sentinel: Sentinel) -> (Router, MemorySink) {
    let sink = MemorySink::new();
    let state = AppState {
        storage: Arc::new(FailingStorage { sentinel }),
    };
    let router = api::router(state, &PanicguardConfig::default(), Arc::new(sink.clone()));
    (router, sink)
}

fn default_app() -> TestApp {
    build_app(&PanicguardConfig::default())
}

fn multipart_body(prefix: Option<&str>, file: Option<&[u8]>) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(prefix) = prefix {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"prefix\"\r\n\r\n{prefix}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(file) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"note.txt\"\r\nContent-Type: text/plain\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(file);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn upload(app: &TestApp, prefix: Option<&str>, file: Option<&[u8]>) -> Response {
    let req = Request::builder()
        .method(Method::POST)
        .uri("/storage")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(prefix, file)))
        .unwrap();
    app.router.clone().oneshot(req).await.unwrap()
}

async fn send_json(app: &TestApp, method: Method, body: &str) -> Response {
    let req = Request::builder()
        .method(method)
        .uri("/storage")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_owned()))
        .unwrap();
    app.router.clone().oneshot(req).await.unwrap()
}

async fn get(app: &TestApp, uri: &str) -> Response {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.router.clone().oneshot(req).await.unwrap()
}

async fn body_bytes(response: Response) -> axum::body::Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
}

async fn body_json(response: Response) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

async fn uploaded_path(app: &TestApp, prefix: &str, data: &[u8]) -> String {
    let response = upload(app, Some(prefix), Some(data)).await;
    assert_eq!(response.status(), StatusCode::OK);
    body_json(response).await["path"]
        .as_str()
        .unwrap()
        .to_owned()
}

// -- Health ---------------------------------------------------------------

#[tokio::test]
async fn health_returns_ok() {
    let app = default_app();
    let response = get(&app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
}

// -- Upload ---------------------------------------------------------------

#[tokio::test]
async fn upload_stores_file_under_prefix() {
    let app = default_app();
    let path = uploaded_path(&app, "photos", b"hello world").await;

    assert!(path.starts_with("photos/"), "unexpected path {path}");
    assert_eq!(app.storage.content(&path).unwrap(), &b"hello world"[..]);
    assert!(app.sink.is_empty());
}

#[tokio::test]
async fn upload_without_file_part_is_execute_fault() {
    let app = default_app();
    let response = upload(&app, Some("photos"), None).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["kind"], "errExecute");
    assert_eq!(json["error"], "file is required");
    assert!(app.storage.is_empty());

    let records = app.sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, FaultKind::Execute);
}

#[tokio::test]
async fn upload_with_non_multipart_body_is_execute_fault() {
    let app = default_app();
    let response = send_json(&app, Method::POST, r#"{"path":"a"}"#).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["kind"], "errExecute");
    assert_eq!(app.sink.len(), 1);
}

#[tokio::test]
async fn upload_with_invalid_prefix_is_db_execute_fault() {
    let app = default_app();
    let response = upload(&app, Some(".well-known/acme-challenge"), Some(b"x")).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["kind"], "errDBExecute");
    assert!(
        json["error"]
            .as_str()
            .unwrap()
            .starts_with("fail to upload file")
    );
}

// -- Publicize ------------------------------------------------------------

#[tokio::test]
async fn publicize_returns_public_url() {
    let app = default_app();
    let path = uploaded_path(&app, "docs", b"report").await;

    let response = send_json(&app, Method::PUT, &format!(r#"{{"path":"{path}"}}"#)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(
        json["url"],
        format!("http://localhost/panicguard-file/{path}")
    );
    assert!(app.storage.is_public(&path));
}

#[tokio::test]
async fn publicize_without_path_is_variable_fault() {
    let app = default_app();
    let response = send_json(&app, Method::PUT, "{}").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["kind"], "errVariable");
    assert_eq!(json["error"], "path is required");
}

#[tokio::test]
async fn publicize_with_malformed_json_is_json_unmarshal_fault() {
    let app = default_app();
    let response = send_json(&app, Method::PUT, "not json").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["kind"], "errJSONUnmarshal");

    let records = app.sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, FaultKind::JsonUnmarshal);
}

#[tokio::test]
async fn publicize_unknown_object_is_row_not_found() {
    let app = default_app();
    let response = send_json(&app, Method::PUT, r#"{"path":"docs/missing"}"#).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["kind"], "errDBRowNotFound");
    assert_eq!(json["error"], "file not exist");
}

// -- Remove ---------------------------------------------------------------

#[tokio::test]
async fn remove_deletes_object() {
    let app = default_app();
    let path = uploaded_path(&app, "tmp", b"scratch").await;

    let response = send_json(&app, Method::DELETE, &format!(r#"{{"path":"{path}"}}"#)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(&body_bytes(response).await[..], b"ok");
    assert!(app.storage.is_empty());
    assert!(app.sink.is_empty());
}

#[tokio::test]
async fn remove_unknown_object_is_db_execute_fault() {
    let app = default_app();
    let response = send_json(&app, Method::DELETE, r#"{"path":"tmp/missing"}"#).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["kind"], "errDBExecute");
    assert_eq!(json["error"], "fail to remove file: object doesn't exist");
}

#[tokio::test]
async fn remove_with_empty_path_is_variable_fault() {
    let app = default_app();
    let response = send_json(&app, Method::DELETE, r#"{"path":""}"#).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// -- List -----------------------------------------------------------------

#[tokio::test]
async fn list_returns_uploaded_objects() {
    let app = default_app();
    let first = uploaded_path(&app, "photos", b"one").await;
    let second = uploaded_path(&app, "photos", b"two").await;

    let response = get(&app, "/storage?prefix=photos").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let mut paths: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["path"].as_str().unwrap())
        .collect();
    paths.sort_unstable();

    let mut expected = vec![first.as_str(), second.as_str()];
    expected.sort_unstable();
    assert_eq!(paths, expected);
}

#[tokio::test]
async fn list_with_delimiter_folds_folders() {
    let app = default_app();
    uploaded_path(&app, "photos/2024", b"a").await;
    uploaded_path(&app, "photos/2025", b"b").await;

    let response = get(&app, "/storage?prefix=photos&delimiter=/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let folders: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["folders"]["name"].as_str().unwrap())
        .collect();
    assert_eq!(folders, vec!["2024", "2025"]);
}

#[tokio::test]
async fn list_unmatched_prefix_is_empty() {
    let app = default_app();
    uploaded_path(&app, "photos/2025", b"a").await;

    let response = get(&app, "/storage?prefix=photos/2026").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));

    let response = get(&app, "/storage?prefix=photos/2026&delimiter=/").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
    assert!(app.sink.is_empty());
}

#[tokio::test]
async fn list_get_file_failure_is_row_not_found() {
    let (router, sink) = failing_app(Sentinel::GetFile);
    let req = Request::builder()
        .uri("/storage?prefix=photos")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["kind"], "errDBRowNotFound");
    assert_eq!(json["error"], "fail to get file: bucket iterator failed");

    let records = sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind, FaultKind::DbRowNotFound);
    assert_eq!(records[0].root, "fail to get file");
}

#[tokio::test]
async fn list_other_backend_failure_is_db_execute() {
    let (router, sink) = failing_app(Sentinel::InitialFileClient);
    let req = Request::builder()
        .uri("/storage")
        .body(Body::empty())
        .unwrap();
    let response = router.oneshot(req).await.unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = body_json(response).await;
    assert_eq!(json["kind"], "errDBExecute");
    assert_eq!(sink.len(), 1);
}

#[tokio::test]
async fn list_without_filters_on_empty_store_is_empty() {
    let app = default_app();
    let response = get(&app, "/storage").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!([]));
}

// -- Recovery labels ------------------------------------------------------

#[tokio::test]
async fn faults_are_reported_with_recovery_labels() {
    let app = default_app();
    send_json(&app, Method::PUT, "{}").await;

    let records = app.sink.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].system.as_deref(), Some("panicguard-server"));
    assert_eq!(records[0].message, "http server error");
    assert_eq!(records[0].error, "path is required");
}

#[tokio::test]
async fn storage_route_is_configurable() {
    let config = PanicguardConfig::from_toml(
        r#"
        [server]
        storage_route = "/files"

        [recovery]
        system = "media"
        "#,
    )
    .unwrap();
    let app = build_app(&config);

    let req = Request::builder()
        .method(Method::PUT)
        .uri("/files")
        .body(Body::from("{}"))
        .unwrap();
    let response = app.router.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.sink.records()[0].system.as_deref(), Some("media"));

    let response = get(&app, "/storage").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(app.sink.len(), 1);
}
