//! End-to-end pipeline test: listing selection → extraction → playlist
//! generation → HTTP serving, with the external downloader replaced by a
//! mock and the listing API by a local wiremock server.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use radioreddit::api::create_router;
use radioreddit::config::{Config, ListingConfig};
use radioreddit::extract::{ExtractionErrorKind, ExtractionResult, Extractor};
use radioreddit::listing::ListingType;
use radioreddit::playlist::PlaylistSpec;
use radioreddit::station::RadioReddit;
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Stands in for the downloader binary: writes one mp3 per call
struct ScriptedExtractor {
    filename: &'static str,
    succeed: bool,
}

#[async_trait]
impl Extractor for ScriptedExtractor {
    async fn extract(
        &self,
        url: &str,
        dest_dir: &Path,
    ) -> radioreddit::Result<ExtractionResult> {
        if !self.succeed {
            return Ok(ExtractionResult::failure(
                url,
                ExtractionErrorKind::ExtractionFailed,
            ));
        }
        std::fs::create_dir_all(dest_dir)?;
        let out = dest_dir.join(self.filename);
        std::fs::write(&out, b"fake mp3 bytes")?;
        Ok(ExtractionResult::success(url, out))
    }

    fn name(&self) -> &'static str {
        "scripted"
    }
}

async fn mock_listing(server: &MockServer, subreddit: &str, listing: &str, post_url: &str) {
    let body = serde_json::json!({
        "kind": "Listing",
        "data": { "children": [
            { "kind": "t3", "data": {
                "id": "abc123",
                "url": post_url,
                "title": "Late night set",
                "is_self": false
            }}
        ]}
    });
    Mock::given(method("GET"))
        .and(path(format!("/r/{subreddit}/{listing}.json")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn station_with(server: &MockServer, extractor: Arc<dyn Extractor>) -> RadioReddit {
    let config = Config {
        listing: ListingConfig {
            api_uri: server.uri(),
            request_timeout_secs: 5,
        },
        ..Config::default()
    };
    RadioReddit::with_extractor(config, extractor).expect("station construction")
}

#[tokio::test]
async fn full_pipeline_from_listing_to_served_bytes() {
    let api = MockServer::start().await;
    mock_listing(&api, "jazznoir", "hot", "https://youtu.be/abc").await;

    let mp3_dir = TempDir::new().expect("tempdir");
    let station = station_with(
        &api,
        Arc::new(ScriptedExtractor {
            filename: "late_night_set.mp3",
            succeed: true,
        }),
    );

    // Extraction lands one file in the directory
    let result = station
        .create_mp3_from_subreddit("jazznoir", ListingType::Hot, mp3_dir.path())
        .await
        .expect("pipeline run");
    assert!(result.succeeded);

    // Playlist enumerates it with server-resolvable URIs
    let playlist_path = mp3_dir.path().join("station.pls");
    station
        .create_playlist(&PlaylistSpec {
            mp3_dir: mp3_dir.path().to_path_buf(),
            playlist_path: playlist_path.clone(),
            overwrite: true,
            recurse: false,
            uri_prefix: Some("http://127.0.0.1:30080/file=".to_string()),
        })
        .expect("playlist build");

    let playlist = std::fs::read_to_string(&playlist_path).expect("playlist readable");
    assert!(playlist.contains("File1=http://127.0.0.1:30080/file=late_night_set.mp3"));
    assert!(playlist.contains("NumberOfEntries=1"));

    // The server hands out both artifacts
    let app = create_router(mp3_dir.path().to_path_buf());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/file=station.pls")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/x-scpls");

    let response = app
        .oneshot(
            Request::builder()
                .uri("/file=late_night_set.mp3")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_LENGTH], "14");
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    assert_eq!(&body[..], b"fake mp3 bytes");
}

#[tokio::test]
async fn failed_extraction_leaves_nothing_and_playlist_refuses_empty_dir() {
    let api = MockServer::start().await;
    mock_listing(&api, "jazznoir", "new", "https://nowhere.example/post").await;

    let mp3_dir = TempDir::new().expect("tempdir");
    let station = station_with(
        &api,
        Arc::new(ScriptedExtractor {
            filename: "unused.mp3",
            succeed: false,
        }),
    );

    let result = station
        .create_mp3_from_subreddit("jazznoir", ListingType::New, mp3_dir.path())
        .await
        .expect("pipeline run");
    assert!(!result.succeeded);
    assert_eq!(
        result.error_kind,
        Some(ExtractionErrorKind::ExtractionFailed)
    );

    // No partial file in the directory
    let leftovers: Vec<_> = std::fs::read_dir(mp3_dir.path())
        .expect("read_dir")
        .collect();
    assert!(leftovers.is_empty());

    // So playlist generation has nothing to enumerate
    let err = station
        .create_playlist(&PlaylistSpec {
            mp3_dir: mp3_dir.path().to_path_buf(),
            playlist_path: mp3_dir.path().join("station.pls"),
            overwrite: true,
            recurse: false,
            uri_prefix: None,
        })
        .expect_err("no files");
    assert!(matches!(err, radioreddit::Error::NoFilesFound { .. }));
}
