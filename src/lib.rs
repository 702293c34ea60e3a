//! # radioreddit
//!
//! Turn a subreddit into a radio station. The pipeline selects an
//! audio-bearing post from a subreddit listing, hands its link to an
//! external media downloader to produce an mp3, organizes the resulting
//! files into `.pls` playlists, and serves both playlists and audio to
//! remote players over plain HTTP.
//!
//! ## Design Philosophy
//!
//! - **Disk is the source of truth** - no component caches directory
//!   contents between calls; the server is a pure read-only layer over
//!   files the pipeline wrote
//! - **Failure is data** - a downloader run that produces nothing comes
//!   back as a failed [`extract::ExtractionResult`], not an error
//! - **Narrow seams** - the external downloader sits behind the
//!   [`extract::Extractor`] trait so tests can swap it out
//! - **No global state** - configuration is plain data passed by value
//!   into constructors
//!
//! ## Quick Start
//!
//! ```no_run
//! use radioreddit::{Config, RadioReddit, listing::ListingType};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let station = RadioReddit::new(Config::default())?;
//!
//!     let result = station
//!         .create_mp3_from_subreddit("jazznoir", ListingType::Random, Path::new("./mp3"))
//!         .await?;
//!     if result.succeeded {
//!         println!("wrote {:?}", result.output_path);
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// HTTP file server
pub mod api;
/// Configuration types
pub mod config;
/// Error types
pub mod error;
/// Audio extraction via an external downloader
pub mod extract;
/// Subreddit listing selection
pub mod listing;
/// Playlist file generation
pub mod playlist;
/// Pipeline front object
pub mod station;

// Re-export commonly used types
pub use config::{Config, ExtractorConfig, ListingConfig, ServerConfig};
pub use error::{ApiError, Error, ErrorDetail, Result, ToHttpStatus};
pub use extract::{ExtractionErrorKind, ExtractionResult, Extractor, YtdlExtractor};
pub use listing::{ListingClient, ListingType, Post};
pub use playlist::{PlaylistEntry, PlaylistSpec, build_playlist, default_playlist_path};
pub use station::RadioReddit;

/// Wait for a termination signal.
///
/// - **Unix:** listens for SIGTERM and SIGINT, with fallbacks if signal
///   registration fails.
/// - **Windows/other:** listens for Ctrl+C via `tokio::signal::ctrl_c()`.
#[cfg(unix)]
pub(crate) async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    // Signal registration may fail in restricted environments (containers, tests)
    let sigterm_result = signal(SignalKind::terminate());
    let sigint_result = signal(SignalKind::interrupt());

    match (sigterm_result, sigint_result) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {
                    tracing::info!("Received SIGTERM signal");
                }
                _ = sigint.recv() => {
                    tracing::info!("Received SIGINT signal (Ctrl+C)");
                }
            }
        }
        (Err(e), _) => {
            tracing::warn!(error = %e, "Could not register SIGTERM handler, waiting for SIGINT only");
            if let Ok(mut sigint) = signal(SignalKind::interrupt()) {
                sigint.recv().await;
                tracing::info!("Received SIGINT signal (Ctrl+C)");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
        (_, Err(e)) => {
            tracing::warn!(error = %e, "Could not register SIGINT handler, waiting for SIGTERM only");
            if let Ok(mut sigterm) = signal(SignalKind::terminate()) {
                sigterm.recv().await;
                tracing::info!("Received SIGTERM signal");
            } else {
                tracing::error!("Could not register any signal handlers, using ctrl_c fallback");
                tokio::signal::ctrl_c().await.ok();
            }
        }
    }
}

#[cfg(not(unix))]
pub(crate) async fn wait_for_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => {
            tracing::info!("Received Ctrl+C signal");
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C signal");
        }
    }
}
