//! HTTP error response handling for the file server
//!
//! Converts domain errors to HTTP responses with appropriate status codes
//! and JSON error bodies. Per-request errors are fully local: a failed
//! request produces a response here and never affects other connections.

use crate::error::{ApiError, Error, ToHttpStatus};
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let api_error: ApiError = self.into();

        (status_code, Json(api_error)).into_response()
    }
}
