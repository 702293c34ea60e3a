//! Error types for radioreddit
//!
//! This module provides error handling for the whole crate, including:
//! - Domain-specific error variants (listing, playlist, serving)
//! - HTTP status code mapping for the file server
//! - Structured error responses with machine-readable error codes

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for radioreddit operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for radioreddit
///
/// Extraction failure is deliberately *not* represented here: the downloader
/// running and producing nothing is an expected outcome, carried as data in
/// [`crate::extract::ExtractionResult`]. Only problems with the machinery
/// itself (a missing binary, an unreachable API, bad input) are errors.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad input: unknown listing type, empty subreddit, malformed URL
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The subreddit listing contained no playable candidate post
    #[error("no playable post found in r/{subreddit}")]
    NoPostFound {
        /// The subreddit that was queried
        subreddit: String,
    },

    /// The listing API could not be reached or returned an unusable response
    #[error("listing API unavailable: {0}")]
    UpstreamUnavailable(String),

    /// Playlist target already exists and overwrite is disabled
    #[error("{} exists, not overwriting", path.display())]
    AlreadyExists {
        /// The playlist path that already exists
        path: PathBuf,
    },

    /// Playlist requested over a directory with no audio files
    #[error("no audio files found under {}", dir.display())]
    NoFilesFound {
        /// The directory that was searched
        dir: PathBuf,
    },

    /// A request named a file outside the served directory
    #[error("path traversal rejected: {name}")]
    PathTraversal {
        /// The offending request name
        name: String,
    },

    /// The requested file does not exist in the served directory
    #[error("file not found: {name}")]
    FileNotFound {
        /// The requested file name
        name: String,
    },

    /// External tool execution failed (the downloader binary itself)
    #[error("external tool error: {0}")]
    ExternalTool(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP server error
    #[error("server error: {0}")]
    Server(String),
}

/// Error response format returned by the file server
///
/// # Example JSON Response
///
/// ```json
/// {
///   "error": {
///     "code": "path_traversal",
///     "message": "path traversal rejected: ../secret"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// The error details
    pub error: ErrorDetail,
}

/// Detailed error information for server responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g. "file_not_found")
    pub code: String,

    /// Human-readable error message
    pub message: String,

    /// Optional additional context about the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    /// Create a new API error with code and message
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    /// Create an API error with additional details
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: serde_json::Value,
    ) -> Self {
        Self {
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
                details: Some(details),
            },
        }
    }
}

/// Convert errors to HTTP status codes for server responses
pub trait ToHttpStatus {
    /// Get the HTTP status code for this error
    fn status_code(&self) -> u16;

    /// Get the machine-readable error code
    fn error_code(&self) -> &str;
}

impl ToHttpStatus for Error {
    fn status_code(&self) -> u16 {
        match self {
            // 400 Bad Request - client error (invalid input)
            Error::InvalidArgument(_) => 400,

            // 403 Forbidden - mandatory invariant, the directory is served
            // straight from disk
            Error::PathTraversal { .. } => 403,

            // 404 Not Found
            Error::NoPostFound { .. } => 404,
            Error::FileNotFound { .. } => 404,
            Error::NoFilesFound { .. } => 404,

            // 409 Conflict - resource already present
            Error::AlreadyExists { .. } => 409,

            // 500 Internal Server Error
            Error::Io(_) => 500,
            Error::Serialization(_) => 500,
            Error::Server(_) => 500,

            // 502 Bad Gateway - external service errors
            Error::UpstreamUnavailable(_) => 502,
            Error::Network(_) => 502,

            // 503 Service Unavailable - missing or broken external tool
            Error::ExternalTool(_) => 503,
        }
    }

    fn error_code(&self) -> &str {
        match self {
            Error::InvalidArgument(_) => "invalid_argument",
            Error::NoPostFound { .. } => "no_post_found",
            Error::UpstreamUnavailable(_) => "upstream_unavailable",
            Error::AlreadyExists { .. } => "already_exists",
            Error::NoFilesFound { .. } => "no_files_found",
            Error::PathTraversal { .. } => "path_traversal",
            Error::FileNotFound { .. } => "file_not_found",
            Error::ExternalTool(_) => "external_tool_error",
            Error::Io(_) => "io_error",
            Error::Network(_) => "network_error",
            Error::Serialization(_) => "serialization_error",
            Error::Server(_) => "server_error",
        }
    }
}

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let code = error.error_code().to_string();
        let message = error.to_string();

        let details = match &error {
            Error::FileNotFound { name } => Some(serde_json::json!({
                "name": name,
            })),
            Error::PathTraversal { name } => Some(serde_json::json!({
                "name": name,
            })),
            _ => None,
        };

        match details {
            Some(details) => ApiError::with_details(code, message, details),
            None => ApiError::new(code, message),
        }
    }
}
