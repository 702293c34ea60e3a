//! HTTP file server module
//!
//! A read-only serving layer over the directory the pipeline writes into.
//! The server never generates or regenerates playlists or audio; it resolves
//! `GET /file=<name>` lookups against its base directory and streams bytes.
//!
//! Concurrency model: one tokio task per accepted connection, so a slow or
//! long-lived streaming client never blocks acceptance of new connections.
//! Handlers share nothing but the read-only base directory path.

use crate::config::ServerConfig;
use crate::error::{Error, Result};
use axum::{Router, routing::get};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

mod error_response;
pub mod routes;

/// Shared state for request handlers: only the served directory
#[derive(Clone)]
pub struct AppState {
    /// Directory request names are resolved against (read-only)
    pub serve_dir: Arc<PathBuf>,
}

/// Create the file-serving router.
///
/// # Routes
///
/// - `GET /health` - liveness check
/// - `GET /file=<name>` - stream a file from the served directory
///   (registered as the fallback because the whole path is one token)
pub fn create_router(serve_dir: PathBuf) -> Router {
    let state = AppState {
        serve_dir: Arc::new(serve_dir),
    };

    Router::new()
        .route("/health", get(routes::health_check))
        .fallback(routes::serve_file)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Start the file server on the configured bind address.
///
/// Binds a TCP listener, serves until an interrupt signal arrives, then
/// stops accepting and lets in-flight responses drain (best-effort; a
/// client that never finishes reading is not waited for indefinitely by
/// the process exiting afterwards).
///
/// # Errors
///
/// Returns an error if the served directory does not exist, the address
/// cannot be bound, or the serve loop fails.
///
/// # Example
///
/// ```no_run
/// use radioreddit::config::ServerConfig;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = ServerConfig::default();
///
/// // Serve (blocks until interrupted)
/// radioreddit::api::start_server(config).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_server(config: ServerConfig) -> Result<()> {
    if !config.serve_dir.is_dir() {
        return Err(Error::InvalidArgument(format!(
            "serve directory {} does not exist",
            config.serve_dir.display()
        )));
    }

    tracing::info!(
        address = %config.bind_address,
        dir = %config.serve_dir.display(),
        "Starting file server"
    );

    let app = create_router(config.serve_dir);

    let listener = TcpListener::bind(config.bind_address)
        .await
        .map_err(Error::Io)?;

    tracing::info!(address = %config.bind_address, "File server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(crate::wait_for_signal())
        .await
        .map_err(|e| Error::Server(e.to_string()))?;

    tracing::info!("File server stopped");
    Ok(())
}
