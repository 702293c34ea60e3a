//! Configuration types for radioreddit

use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Listing API configuration (endpoint, timeout)
///
/// Groups settings for talking to the reddit listing API.
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListingConfig {
    /// Base URI of the listing API (default: "https://www.reddit.com")
    #[serde(default = "default_api_uri")]
    pub api_uri: String,

    /// HTTP request timeout in seconds (default: 30)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self {
            api_uri: default_api_uri(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// External downloader configuration
///
/// Groups settings for the media-downloader binary that turns a linked page
/// into an audio file. Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Path to the downloader executable (auto-detected if None)
    #[serde(default)]
    pub ytdl_path: Option<PathBuf>,

    /// Whether to search PATH for the downloader if no explicit path is set
    /// (default: true)
    #[serde(default = "default_true")]
    pub search_path: bool,

    /// Audio format requested from the downloader (default: "mp3")
    #[serde(default = "default_audio_format")]
    pub audio_format: String,

    /// Restrict output filenames to ASCII without spaces (default: true)
    #[serde(default = "default_true")]
    pub restrict_filenames: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            ytdl_path: None,
            search_path: true,
            audio_format: default_audio_format(),
            restrict_filenames: true,
        }
    }
}

/// File server configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address and port the server binds to (default: 0.0.0.0:30080)
    #[serde(default = "default_bind_address")]
    pub bind_address: SocketAddr,

    /// Directory the server resolves request names against
    #[serde(default = "default_serve_dir")]
    pub serve_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            serve_dir: default_serve_dir(),
        }
    }
}

/// Main configuration for radioreddit
///
/// Fields are organized into logical sub-configs:
/// - [`listing`](ListingConfig) - listing API endpoint and timeout
/// - [`extractor`](ExtractorConfig) - downloader binary and flags
/// - [`server`](ServerConfig) - file server bind address and directory
///
/// Sub-config fields are flattened for serialization, so the JSON/TOML
/// format has no nesting. Configuration is always passed by value into
/// component constructors; there is no process-global state.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Config {
    /// Listing API settings
    #[serde(flatten)]
    pub listing: ListingConfig,

    /// Downloader settings
    #[serde(flatten)]
    pub extractor: ExtractorConfig,

    /// File server settings
    #[serde(flatten)]
    pub server: ServerConfig,
}

fn default_api_uri() -> String {
    "https://www.reddit.com".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_audio_format() -> String {
    "mp3".to_string()
}

fn default_true() -> bool {
    true
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 30080))
}

fn default_serve_dir() -> PathBuf {
    PathBuf::from("./mp3")
}
