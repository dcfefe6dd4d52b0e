//! HTTP handlers for upload and link resolution.
//! Streams the uploaded body straight to the backend without buffering and
//! delegates storage concerns to `ShareService`.

use crate::{
    errors::AppError,
    services::{
        link_service::LinkResolution,
        share_service::{ShareService, UploadError, UploadOutcome},
    },
};
use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use futures::StreamExt;
use serde::Deserialize;
use serde_json::json;
use std::io;
use tokio_util::io::StreamReader;

/// Query params accepted by the upload endpoint.
#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub sharing: Option<String>,
}

/// Query flags accepted by the link endpoint. Presence-based: any non-empty
/// value is truthy.
#[derive(Debug, Deserialize)]
pub struct LinkQuery {
    pub ios: Option<String>,
    pub stream: Option<String>,
}

fn flag_set(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.is_empty())
}

/// Upload a single file via `POST /api/upload`.
///
/// The first multipart field named `file` is streamed to the backend; every
/// other field (including a client-supplied key hint) is skipped. With
/// `?sharing=true` the response carries a full share link instead of the
/// stored key.
pub async fn upload_file(
    State(service): State<ShareService>,
    Query(q): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<Response, AppError> {
    let sharing = q.sharing.as_deref() == Some("true");

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::bad_request(format!("malformed multipart body: {}", err)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();

        let stream =
            field.map(|chunk| chunk.map_err(|err| io::Error::new(io::ErrorKind::Other, err)));
        let mut reader = StreamReader::new(Box::pin(stream));

        let outcome = service.upload(&mut reader, &content_type, sharing).await?;
        let body = match outcome {
            UploadOutcome::Key(key) => json!({ "key": key }),
            UploadOutcome::Link(link) => json!({ "link": link }),
        };
        return Ok(Json(body).into_response());
    }

    Err(UploadError::MissingFile.into())
}

/// Resolve a stored key via `GET /api/link/{key}`.
///
/// Precedence is fixed: `ios` redirects to the player-scheme link, `stream`
/// redirects to the share link, otherwise all link forms come back as JSON.
/// Resolution is purely syntactic; an unknown key yields a dead link, not an
/// error.
pub async fn get_links(
    State(service): State<ShareService>,
    Path(key): Path<String>,
    Query(q): Query<LinkQuery>,
) -> Response {
    let ios = flag_set(q.ios.as_deref());
    let stream = flag_set(q.stream.as_deref());

    match service.links.resolve(&key, ios, stream) {
        LinkResolution::Redirect(location) => moved_permanently(&location),
        LinkResolution::Links(links) => Json(links).into_response(),
    }
}

/// Literal `301 Moved Permanently`. axum's `Redirect::permanent` answers 308;
/// this endpoint's contract is 301.
fn moved_permanently(location: &str) -> Response {
    match HeaderValue::from_str(location) {
        Ok(value) => {
            let mut response = StatusCode::MOVED_PERMANENTLY.into_response();
            response.headers_mut().insert(header::LOCATION, value);
            response
        }
        // A path segment that decodes to control bytes cannot form a
        // Location header.
        Err(_) => {
            AppError::bad_request("key contains characters not allowed in a link").into_response()
        }
    }
}
