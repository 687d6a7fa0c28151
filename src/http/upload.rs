//! Multipart upload endpoint over the composition pipeline.
//!
//! `POST /upload` takes one or more SVG files under the `files` field and answers with the URLs
//! of the combined SVG and its PNG render.

use std::path::Path;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;

use crate::compose::orchestrator::Composer;
use crate::foundation::error::DrapeError;

/// Multipart field carrying the SVG files.
pub const FILES_FIELD: &str = "files";

/// JSON body of every non-200 answer.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default)]
    pub retryable: bool,
}

/// Routes for the upload service.
pub fn router(composer: Arc<Composer>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/upload", post(upload))
        .route("/healthz", get(|| async { "ok" }))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(composer)
}

/// Serve the files under `dir` at the path prefix `mount`, so URLs handed out by an
/// [`FsArtifactStore`](crate::FsArtifactStore) with that base resolve against this server.
///
/// A `mount` that is not a path (`https://cdn...`) means the directory is published elsewhere;
/// `router` is returned as is.
pub fn with_artifact_dir(router: Router, mount: &str, dir: impl AsRef<Path>) -> Router {
    if !mount.starts_with('/') {
        tracing::debug!(mount, "artifact base is not a local path; not serving artifacts");
        return router;
    }
    let serve = ServeDir::new(dir.as_ref());
    match mount.trim_end_matches('/') {
        "" => router.fallback_service(serve),
        prefix => router.nest_service(prefix, serve),
    }
}

async fn upload(State(composer): State<Arc<Composer>>, mut multipart: Multipart) -> Response {
    let mut files = Vec::new();
    loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.name() != Some(FILES_FIELD) {
                    continue;
                }
                match field.bytes().await {
                    Ok(bytes) => files.push(bytes.to_vec()),
                    Err(e) => return bad_request(format!("unreadable upload: {e}")),
                }
            }
            Ok(None) => break,
            Err(e) => return bad_request(format!("malformed multipart body: {e}")),
        }
    }

    if files.is_empty() {
        return bad_request("No files uploaded");
    }

    // A client that disconnects drops this future; the guard then cancels the pipeline.
    let cancel = CancellationToken::new();
    let _guard = cancel.clone().drop_guard();

    let count = files.len();
    match composer.compose_and_store(files, &cancel).await {
        Ok(urls) => {
            tracing::info!(files = count, svg_url = %urls.svg_url, "upload combined");
            (StatusCode::OK, Json(urls)).into_response()
        }
        Err(DrapeError::Input(msg)) => bad_request(msg),
        Err(err) => {
            tracing::error!(files = count, %err, "upload failed");
            let body = ErrorBody {
                error: "Failed to process SVG files".to_string(),
                details: Some(err.to_string()),
                retryable: err.is_retryable(),
            };
            (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
        }
    }
}

fn bad_request(msg: impl Into<String>) -> Response {
    let body = ErrorBody {
        error: msg.into(),
        details: None,
        retryable: false,
    };
    (StatusCode::BAD_REQUEST, Json(body)).into_response()
}
