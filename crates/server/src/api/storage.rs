//! File storage routes.
//!
//! Handlers never return errors. Every failure is wrapped into a
//! [`Fault`] of the kind the route assigns to it and raised; the recovery
//! boundary installed by [`super::router`] reports it and writes the
//! response.

use axum::Json;
use axum::extract::multipart::MultipartRejection;
use axum::extract::rejection::QueryRejection;
use axum::extract::{Multipart, Query, State};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use panicguard_core::{Fault, FaultKind, Raise, Sentinel};
use panicguard_storage::query::{with_delimiter, with_prefix};
use panicguard_storage::{FileInfo, StorageError};

use super::AppState;

/// Content type recorded for uploads whose part carries none.
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// A required request field was absent or empty.
#[derive(Debug, Error)]
#[error("{0} is required")]
pub struct MissingField(pub &'static str);

/// Body of the publicize and remove routes.
#[derive(Debug, Deserialize)]
pub struct PathRequest {
    #[serde(default)]
    pub path: String,
}

impl PathRequest {
    fn parse(body: &Bytes) -> Self {
        let req: Self = serde_json::from_slice(body).or_raise(FaultKind::JsonUnmarshal);
        if req.path.is_empty() {
            Fault::variable(MissingField("path")).raise();
        }
        req
    }
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub path: String,
}

#[derive(Debug, Serialize)]
pub struct UrlResponse {
    pub url: String,
}

/// Query string of the list route.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub delimiter: String,
    #[serde(default)]
    pub prefix: String,
}

/// `POST <storage_route>` -- store the multipart `file` part below the
/// optional `prefix` form field.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Json<UploadResponse> {
    let mut multipart = multipart.or_raise(FaultKind::Execute);

    let mut prefix = String::new();
    let mut file = None;
    while let Some(field) = multipart.next_field().await.or_raise(FaultKind::Execute) {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("prefix") => prefix = field.text().await.or_raise(FaultKind::Execute),
            Some("file") => {
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_owned();
                let data = field.bytes().await.or_raise(FaultKind::Execute);
                file = Some((content_type, data));
            }
            other => debug!(field = ?other, "ignoring multipart field"),
        }
    }

    let Some((content_type, data)) = file else {
        Fault::execute(MissingField("file")).raise()
    };

    let size = data.len();
    let path = state
        .storage
        .upload(&prefix, &content_type, data)
        .await
        .or_raise(FaultKind::DbExecute);

    info!(path = %path, size, "file uploaded");
    Json(UploadResponse { path })
}

/// `PUT <storage_route>` -- make the object at `path` public and return its
/// URL.
pub async fn publicize(State(state): State<AppState>, body: Bytes) -> Json<UrlResponse> {
    let req = PathRequest::parse(&body);

    let url = state
        .storage
        .get_url(&req.path)
        .await
        .or_raise_with(|e: StorageError| {
            if e.is(Sentinel::FileNotExist) {
                Fault::db_row_not_found(e)
            } else {
                Fault::db_execute(e)
            }
        });

    Json(UrlResponse { url })
}

/// `DELETE <storage_route>` -- delete the object at `path`.
pub async fn remove(State(state): State<AppState>, body: Bytes) -> &'static str {
    let req = PathRequest::parse(&body);

    state
        .storage
        .remove(&req.path)
        .await
        .or_raise(FaultKind::DbExecute);

    info!(path = %req.path, "file removed");
    "ok"
}

/// `GET <storage_route>?delimiter=&prefix=` -- list objects.
pub async fn list(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Json<Vec<FileInfo>> {
    let Query(params) = params.or_raise(FaultKind::Variable);

    let mut query = panicguard_storage::Query::default();
    if !params.delimiter.is_empty() {
        query = with_delimiter(query, params.delimiter);
    }
    if !params.prefix.is_empty() {
        query = with_prefix(query, params.prefix);
    }

    let files = state
        .storage
        .list(&query)
        .await
        .or_raise_with(|e: StorageError| {
            if e.is(Sentinel::GetFile) {
                Fault::db_row_not_found(e)
            } else {
                Fault::db_execute(e)
            }
        });

    Json(files)
}
