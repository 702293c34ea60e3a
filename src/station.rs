//! The radio station front object
//!
//! [`RadioReddit`] wires the listing client, the extractor, and the playlist
//! builder together behind one handle. Each `create` operation is one
//! sequential pipeline run: select a post, extract, then (optionally) build
//! a playlist over the same directory. There is no concurrent extraction
//! and no retry with a different post - a failed stage surfaces as-is.

use crate::config::Config;
use crate::error::Result;
use crate::extract::{ExtractionResult, Extractor, YtdlExtractor};
use crate::listing::{ListingClient, ListingType};
use crate::playlist::{self, PlaylistSpec};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Main pipeline instance (cloneable - the extractor is Arc-wrapped)
#[derive(Clone)]
pub struct RadioReddit {
    config: Arc<Config>,
    listing: Arc<ListingClient>,
    extractor: Arc<dyn Extractor>,
}

impl RadioReddit {
    /// Create a station from configuration.
    ///
    /// Discovers the downloader binary up front so a misconfigured host
    /// fails here rather than halfway through a pipeline run.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built or no downloader
    /// binary can be located.
    pub fn new(config: Config) -> Result<Self> {
        let extractor = Arc::new(YtdlExtractor::from_config(&config.extractor)?);
        Self::with_extractor(config, extractor)
    }

    /// Create a station with an explicit [`Extractor`] implementation.
    ///
    /// This is the seam for swapping the external downloader out in tests.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_extractor(config: Config, extractor: Arc<dyn Extractor>) -> Result<Self> {
        let listing = Arc::new(ListingClient::new(config.listing.clone())?);
        Ok(Self {
            config: Arc::new(config),
            listing,
            extractor,
        })
    }

    /// The configuration this station was built with
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Extract audio from a URL into `dest_dir`.
    ///
    /// # Errors
    /// Propagates machinery errors from the extractor (invalid URL, broken
    /// binary). A downloader run that produces no file is *not* an error;
    /// it comes back as a failed [`ExtractionResult`].
    pub async fn create_mp3(&self, url: &str, dest_dir: &Path) -> Result<ExtractionResult> {
        info!(
            extractor = self.extractor.name(),
            url = url,
            dest = %dest_dir.display(),
            "Starting extraction"
        );
        self.extractor.extract(url, dest_dir).await
    }

    /// Select a post from a subreddit and extract audio from its link.
    ///
    /// Composes the listing selector with the extractor: exactly one listing
    /// call and one extraction attempt. A listing failure propagates with
    /// its own error kind; no other post is tried.
    ///
    /// # Errors
    /// Everything [`ListingClient::select_post`] and [`Self::create_mp3`]
    /// can return.
    pub async fn create_mp3_from_subreddit(
        &self,
        subreddit: &str,
        listing_type: ListingType,
        dest_dir: &Path,
    ) -> Result<ExtractionResult> {
        let post = self.listing.select_post(subreddit, listing_type).await?;
        info!(
            subreddit = subreddit,
            post_id = %post.id,
            title = %post.title,
            "Selected post"
        );
        self.create_mp3(&post.url, dest_dir).await
    }

    /// Build a playlist file over a directory of audio files.
    ///
    /// # Errors
    /// Everything [`playlist::build_playlist`] can return.
    pub fn create_playlist(&self, spec: &PlaylistSpec) -> Result<PathBuf> {
        playlist::build_playlist(spec)
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ListingConfig;
    use crate::error::Error;
    use crate::extract::ExtractionErrorKind;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    /// Extractor double that writes a file on demand and counts calls
    struct MockExtractor {
        succeed: bool,
        calls: AtomicUsize,
    }

    impl MockExtractor {
        fn new(succeed: bool) -> Self {
            Self {
                succeed,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl Extractor for MockExtractor {
        async fn extract(&self, url: &str, dest_dir: &Path) -> Result<ExtractionResult> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.succeed {
                std::fs::create_dir_all(dest_dir).unwrap();
                let out = dest_dir.join("mock.mp3");
                std::fs::write(&out, b"audio").unwrap();
                Ok(ExtractionResult::success(url, out))
            } else {
                Ok(ExtractionResult::failure(
                    url,
                    ExtractionErrorKind::ExtractionFailed,
                ))
            }
        }

        fn name(&self) -> &'static str {
            "mock"
        }
    }

    fn listing_body(url: &str) -> serde_json::Value {
        serde_json::json!({
            "kind": "Listing",
            "data": { "children": [
                { "kind": "t3", "data": {
                    "id": "p1", "url": url, "title": "A track", "is_self": false
                }}
            ]}
        })
    }

    fn config_for(server: &MockServer) -> Config {
        Config {
            listing: ListingConfig {
                api_uri: server.uri(),
                request_timeout_secs: 5,
            },
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_create_mp3_from_subreddit_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/jazznoir/hot.json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(listing_body("https://youtu.be/abc")),
            )
            .mount(&server)
            .await;

        let temp_dir = TempDir::new().unwrap();
        let extractor = Arc::new(MockExtractor::new(true));
        let station = RadioReddit::with_extractor(config_for(&server), extractor.clone()).unwrap();

        let result = station
            .create_mp3_from_subreddit("jazznoir", ListingType::Hot, temp_dir.path())
            .await
            .unwrap();

        assert!(result.succeeded);
        assert_eq!(result.source_url, "https://youtu.be/abc");
        assert!(result.output_path.unwrap().is_file());
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_extraction_is_not_retried_with_another_post() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/jazznoir/hot.json"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(listing_body("https://youtu.be/abc")),
            )
            .mount(&server)
            .await;

        let extractor = Arc::new(MockExtractor::new(false));
        let station = RadioReddit::with_extractor(config_for(&server), extractor.clone()).unwrap();

        let temp_dir = TempDir::new().unwrap();
        let result = station
            .create_mp3_from_subreddit("jazznoir", ListingType::Hot, temp_dir.path())
            .await
            .unwrap();

        assert!(!result.succeeded);
        assert_eq!(
            result.error_kind,
            Some(ExtractionErrorKind::ExtractionFailed)
        );
        // One listing call, one extraction attempt, nothing more
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_listing_failure_propagates_without_extraction() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/r/ghosttown/hot.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "kind": "Listing", "data": { "children": [] }
            })))
            .mount(&server)
            .await;

        let extractor = Arc::new(MockExtractor::new(true));
        let station = RadioReddit::with_extractor(config_for(&server), extractor.clone()).unwrap();

        let temp_dir = TempDir::new().unwrap();
        let err = station
            .create_mp3_from_subreddit("ghosttown", ListingType::Hot, temp_dir.path())
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NoPostFound { .. }));
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_extraction_then_playlist_over_same_dir() {
        let temp_dir = TempDir::new().unwrap();
        let extractor = Arc::new(MockExtractor::new(true));
        let station =
            RadioReddit::with_extractor(Config::default(), extractor).unwrap();

        let result = station
            .create_mp3("https://youtu.be/abc", temp_dir.path())
            .await
            .unwrap();
        assert!(result.succeeded);

        let playlist_path = temp_dir.path().join("station.pls");
        let written = station
            .create_playlist(&PlaylistSpec {
                mp3_dir: temp_dir.path().to_path_buf(),
                playlist_path: playlist_path.clone(),
                overwrite: true,
                recurse: false,
                uri_prefix: None,
            })
            .unwrap();

        let content = std::fs::read_to_string(written).unwrap();
        assert!(content.contains("mock"));
        assert!(content.contains("NumberOfEntries=1\n"));
    }
}
