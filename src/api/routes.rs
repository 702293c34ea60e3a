//! Request handlers for the file server

use crate::api::AppState;
use crate::error::{Error, Result};
use axum::{
    Json,
    body::Body,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use std::path::Path;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tracing::{debug, warn};

/// GET /health - liveness check
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Fallback handler serving `GET /file=<name>`.
///
/// The whole request path is one `file=<name>` token (not a query string),
/// so this is registered as the router fallback and parses the path itself.
/// Anything that is not a well-formed `file=` lookup is a 404; a `<name>`
/// that points outside the served directory is a 403.
pub async fn serve_file(
    State(state): State<AppState>,
    method: Method,
    headers: HeaderMap,
    uri: Uri,
) -> Result<Response> {
    if method != Method::GET && method != Method::HEAD {
        return Response::builder()
            .status(StatusCode::METHOD_NOT_ALLOWED)
            .body(Body::empty())
            .map_err(|e| Error::Server(e.to_string()));
    }

    let raw_path = uri.path();
    let decoded = urlencoding::decode(raw_path)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| raw_path.to_string());
    let request = decoded.trim_start_matches('/');

    let Some(name) = request.strip_prefix("file=") else {
        debug!(path = raw_path, "Request is not a file lookup");
        return Err(Error::FileNotFound {
            name: request.to_string(),
        });
    };

    validate_name(name)?;

    let file_path = state.serve_dir.join(name);
    let metadata = tokio::fs::metadata(&file_path)
        .await
        .map_err(|_| Error::FileNotFound {
            name: name.to_string(),
        })?;
    if !metadata.is_file() {
        // Directory listings are never exposed, only exact-name lookups
        return Err(Error::FileNotFound {
            name: name.to_string(),
        });
    }

    let file_size = metadata.len();
    let content_type = content_type_for(name);

    if let Some(range_header) = headers.get(header::RANGE)
        && let Ok(range_str) = range_header.to_str()
    {
        match parse_range_header(range_str, file_size) {
            Some(RangeRequest::Satisfiable { start, end }) => {
                return serve_range(&file_path, content_type, file_size, start, end).await;
            }
            Some(RangeRequest::Unsatisfiable) => {
                debug!(name = name, range = range_str, "Unsatisfiable range");
                return Response::builder()
                    .status(StatusCode::RANGE_NOT_SATISFIABLE)
                    .header(header::CONTENT_RANGE, format!("bytes */{}", file_size))
                    .body(Body::empty())
                    .map_err(|e| Error::Server(e.to_string()));
            }
            // A malformed Range header is ignored and the full file served
            None => {}
        }
    }

    debug!(name = name, bytes = file_size, "Streaming full file");
    let file = tokio::fs::File::open(&file_path).await?;
    let stream = ReaderStream::new(file);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, file_size.to_string())
        .header(header::ACCEPT_RANGES, "bytes")
        .body(Body::from_stream(stream))
        .map_err(|e| Error::Server(e.to_string()))
}

/// Stream one byte range of a file as a 206 response
async fn serve_range(
    file_path: &Path,
    content_type: &'static str,
    file_size: u64,
    start: u64,
    end: u64,
) -> Result<Response> {
    let mut file = tokio::fs::File::open(file_path).await?;
    file.seek(std::io::SeekFrom::Start(start)).await?;

    let content_length = end - start + 1;
    debug!(
        path = %file_path.display(),
        start = start,
        end = end,
        "Streaming byte range"
    );
    let stream = ReaderStream::new(file.take(content_length));

    Response::builder()
        .status(StatusCode::PARTIAL_CONTENT)
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_LENGTH, content_length.to_string())
        .header(
            header::CONTENT_RANGE,
            format!("bytes {}-{}/{}", start, end, file_size),
        )
        .header(header::ACCEPT_RANGES, "bytes")
        .body(Body::from_stream(stream))
        .map_err(|e| Error::Server(e.to_string()))
}

/// Reject any request name that could escape the served directory.
///
/// The directory is served straight from disk, so this is a mandatory
/// invariant: no `..`, no separators, no absolute paths, no empty names.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty()
        || name.contains("..")
        || name.contains('/')
        || name.contains('\\')
        || Path::new(name).is_absolute()
    {
        warn!(name = name, "Rejected file request");
        return Err(Error::PathTraversal {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Content type by file extension
fn content_type_for(name: &str) -> &'static str {
    let extension = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("pls") => "audio/x-scpls",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, PartialEq, Eq)]
enum RangeRequest {
    Satisfiable { start: u64, end: u64 },
    Unsatisfiable,
}

/// Parse a single `bytes=start-end` range header.
///
/// Suffix (`-500`) and open-ended (`500-`) forms are supported; an `end`
/// past the file is clamped. Returns `None` for anything malformed (the
/// caller then serves the whole file) and `Unsatisfiable` for a range that
/// starts at or beyond the end of the file.
fn parse_range_header(range_str: &str, file_size: u64) -> Option<RangeRequest> {
    let range_part = range_str.strip_prefix("bytes=")?;
    let (start_str, end_str) = range_part.split_once('-')?;

    if start_str.is_empty() {
        // Suffix range: "-500" means the last 500 bytes
        let suffix_len: u64 = end_str.parse().ok()?;
        if suffix_len == 0 || file_size == 0 {
            return Some(RangeRequest::Unsatisfiable);
        }
        let start = file_size.saturating_sub(suffix_len);
        return Some(RangeRequest::Satisfiable {
            start,
            end: file_size - 1,
        });
    }

    let start: u64 = start_str.parse().ok()?;
    if start >= file_size {
        return Some(RangeRequest::Unsatisfiable);
    }

    let end = if end_str.is_empty() {
        file_size - 1
    } else {
        let end: u64 = end_str.parse().ok()?;
        end.min(file_size - 1)
    };

    if start > end {
        return Some(RangeRequest::Unsatisfiable);
    }

    Some(RangeRequest::Satisfiable { start, end })
}
