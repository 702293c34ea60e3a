//! Traits and types for audio extraction

use async_trait::async_trait;
use std::fmt;
use std::path::{Path, PathBuf};

/// Why an extraction attempt produced no usable file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractionErrorKind {
    /// The downloader ran but produced no audio file
    ExtractionFailed,
    /// The downloader skipped the target because it already exists
    AlreadyExists,
    /// No extractor supports the URL's domain
    UnsupportedDomain,
}

impl fmt::Display for ExtractionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExtractionErrorKind::ExtractionFailed => "extraction failed",
            ExtractionErrorKind::AlreadyExists => "output file already exists",
            ExtractionErrorKind::UnsupportedDomain => "unsupported extractor domain",
        };
        f.write_str(s)
    }
}

/// Terminal record of one extraction attempt
///
/// Created once per attempt and never mutated. A failed attempt is an
/// expected, recoverable outcome, so it is carried here as data rather
/// than raised as an error.
#[must_use]
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// The URL extraction was attempted against
    pub source_url: String,
    /// Path of the audio file written, if any
    pub output_path: Option<PathBuf>,
    /// Whether an audio file was produced
    pub succeeded: bool,
    /// Failure classification when `succeeded` is false
    pub error_kind: Option<ExtractionErrorKind>,
}

impl ExtractionResult {
    /// Record a successful attempt that wrote `output_path`
    pub fn success(source_url: impl Into<String>, output_path: PathBuf) -> Self {
        Self {
            source_url: source_url.into(),
            output_path: Some(output_path),
            succeeded: true,
            error_kind: None,
        }
    }

    /// Record a failed attempt
    pub fn failure(source_url: impl Into<String>, kind: ExtractionErrorKind) -> Self {
        Self {
            source_url: source_url.into(),
            output_path: None,
            succeeded: false,
            error_kind: Some(kind),
        }
    }
}

/// Capability interface for turning a URL into an audio file on disk
///
/// The pipeline only ever talks to this trait, so the external downloader
/// can be swapped or mocked in tests without touching pipeline logic.
///
/// # Examples
///
/// ```no_run
/// use radioreddit::extract::{Extractor, YtdlExtractor};
/// use std::path::Path;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let extractor = YtdlExtractor::from_path()
///     .expect("no downloader binary in PATH");
///
/// let result = extractor
///     .extract("https://youtu.be/abc", Path::new("./mp3"))
///     .await?;
/// if result.succeeded {
///     println!("wrote {:?}", result.output_path);
/// }
/// # Ok(())
/// # }
/// ```
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract audio from `url` into `dest_dir`.
    ///
    /// `dest_dir` is created if missing. The attempt's outcome, success or
    /// failure, is reported in the returned [`ExtractionResult`].
    ///
    /// # Errors
    ///
    /// Returns an error only when the machinery itself is broken:
    /// - `url` is not a syntactically valid URL
    /// - the downloader binary cannot be executed at all
    /// - `dest_dir` cannot be created
    async fn extract(&self, url: &str, dest_dir: &Path) -> crate::Result<ExtractionResult>;

    /// Human-readable name for logging
    fn name(&self) -> &'static str;
}
