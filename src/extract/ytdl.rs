//! CLI-based extractor using the external youtube-dl/yt-dlp binary

use super::parser::{self, ExtractionOutcome};
use super::traits::{ExtractionErrorKind, ExtractionResult, Extractor};
use crate::config::ExtractorConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{debug, warn};

/// Extractor that shells out to youtube-dl (or its drop-in successor yt-dlp)
///
/// The binary is invoked once per extraction with `--extract-audio` and the
/// configured audio format, writing into the destination directory. The
/// subprocess call blocks its task until the binary exits; there is no
/// timeout.
///
/// # Examples
///
/// ```no_run
/// use radioreddit::extract::YtdlExtractor;
/// use std::path::PathBuf;
///
/// // Explicit path
/// let extractor = YtdlExtractor::new(PathBuf::from("/usr/bin/youtube-dl"));
///
/// // Or auto-discover from PATH
/// let extractor = YtdlExtractor::from_path()
///     .expect("no downloader binary in PATH");
/// ```
#[derive(Debug)]
pub struct YtdlExtractor {
    binary_path: PathBuf,
    audio_format: String,
    restrict_filenames: bool,
}

impl YtdlExtractor {
    /// Create an extractor with an explicit binary path and default flags
    pub fn new(binary_path: PathBuf) -> Self {
        Self {
            binary_path,
            audio_format: "mp3".to_string(),
            restrict_filenames: true,
        }
    }

    /// Attempt to find a downloader binary in PATH.
    ///
    /// Tries `youtube-dl` first, then `yt-dlp` (which takes the same flags).
    ///
    /// # Returns
    ///
    /// `Some(YtdlExtractor)` if either binary is found, `None` otherwise.
    pub fn from_path() -> Option<Self> {
        which::which("youtube-dl")
            .or_else(|_| which::which("yt-dlp"))
            .ok()
            .map(Self::new)
    }

    /// Build an extractor from configuration.
    ///
    /// An explicit `ytdl_path` wins; otherwise PATH is searched when
    /// `search_path` is enabled.
    ///
    /// # Errors
    /// [`Error::ExternalTool`] if no binary can be located.
    pub fn from_config(config: &ExtractorConfig) -> Result<Self> {
        let binary_path = match (&config.ytdl_path, config.search_path) {
            (Some(path), _) => path.clone(),
            (None, true) => which::which("youtube-dl")
                .or_else(|_| which::which("yt-dlp"))
                .map_err(|_| {
                    Error::ExternalTool(
                        "neither youtube-dl nor yt-dlp found in PATH".to_string(),
                    )
                })?,
            (None, false) => {
                return Err(Error::ExternalTool(
                    "no downloader path configured and PATH search is disabled".to_string(),
                ));
            }
        };

        debug!(binary = %binary_path.display(), "Downloader binary defined");
        Ok(Self {
            binary_path,
            audio_format: config.audio_format.clone(),
            restrict_filenames: config.restrict_filenames,
        })
    }

    /// The argument list for one extraction run (binary not included)
    fn command_args(&self, url: &str, dest_dir: &Path) -> Vec<OsString> {
        let mut output_template = OsString::from("--output=");
        output_template.push(dest_dir.as_os_str());
        output_template.push("/%(title)s.%(ext)s");

        let mut args = vec![
            OsString::from("--extract-audio"),
            OsString::from(format!("--audio-format={}", self.audio_format)),
            output_template,
        ];
        if self.restrict_filenames {
            args.push(OsString::from("--restrict-filenames"));
        }
        args.push(OsString::from("--verbose"));
        args.push(OsString::from(url));
        args
    }

    /// List the extractor names the downloader supports.
    ///
    /// Runs `--list-extractors` and normalizes the output (downcased, cut at
    /// the first `:`).
    ///
    /// # Errors
    /// [`Error::ExternalTool`] if the binary cannot be executed.
    pub async fn extractor_domains(&self) -> Result<Vec<String>> {
        let output = Command::new(&self.binary_path)
            .arg("--list-extractors")
            .output()
            .await
            .map_err(|e| {
                Error::ExternalTool(format!(
                    "failed to execute {}: {}",
                    self.binary_path.display(),
                    e
                ))
            })?;

        Ok(parser::parse_extractor_list(&output.stdout))
    }

    /// Check whether any extractor supports the given domain.
    ///
    /// Dots are stripped from the domain before matching so that shortener
    /// hosts like `youtu.be` match their extractor name (`youtube`).
    ///
    /// # Errors
    /// [`Error::ExternalTool`] if the binary cannot be executed.
    pub async fn domain_is_supported(&self, domain: &str) -> Result<bool> {
        let stripped = domain.to_lowercase().replace('.', "");
        let extractors = self.extractor_domains().await?;
        let supported = extractors
            .iter()
            .any(|name| !name.is_empty() && stripped.contains(name.as_str()));
        debug!(domain = domain, supported = supported, "Extractor domain check");
        Ok(supported)
    }
}

// remove_dir refuses to delete a non-empty directory, so this can only ever
// undo the directory creation of a run that produced nothing.
fn remove_created_dir(created: bool, dest_dir: &Path) {
    if created && std::fs::remove_dir(dest_dir).is_ok() {
        debug!(dir = %dest_dir.display(), "Removed empty destination directory");
    }
}

#[async_trait]
impl Extractor for YtdlExtractor {
    async fn extract(&self, url: &str, dest_dir: &Path) -> Result<ExtractionResult> {
        let parsed = url::Url::parse(url)
            .map_err(|e| Error::InvalidArgument(format!("'{}' is not a valid URL: {}", url, e)))?;

        if let Some(host) = parsed.host_str()
            && !self.domain_is_supported(host).await?
        {
            warn!(url = url, host = host, "No extractor supports this domain");
            return Ok(ExtractionResult::failure(
                url,
                ExtractionErrorKind::UnsupportedDomain,
            ));
        }

        let created_dest = !dest_dir.is_dir();
        tokio::fs::create_dir_all(dest_dir).await?;

        debug!(
            binary = %self.binary_path.display(),
            url = url,
            dest = %dest_dir.display(),
            "Executing downloader"
        );
        let output = Command::new(&self.binary_path)
            .args(self.command_args(url, dest_dir))
            .output()
            .await
            .map_err(|e| {
                Error::ExternalTool(format!(
                    "failed to execute {}: {}",
                    self.binary_path.display(),
                    e
                ))
            })?;

        if !output.status.success() {
            for line in parser::error_lines(&output.stderr) {
                warn!(url = url, "{}", line);
            }
            remove_created_dir(created_dest, dest_dir);
            return Ok(ExtractionResult::failure(
                url,
                ExtractionErrorKind::ExtractionFailed,
            ));
        }

        match parser::parse_extraction_output(&output.stdout) {
            ExtractionOutcome::Destination(path) if path.is_file() => {
                debug!(path = %path.display(), "Successfully wrote audio file");
                Ok(ExtractionResult::success(url, path))
            }
            ExtractionOutcome::Destination(path) => {
                warn!(
                    path = %path.display(),
                    "Downloader reported a destination that does not exist"
                );
                remove_created_dir(created_dest, dest_dir);
                Ok(ExtractionResult::failure(
                    url,
                    ExtractionErrorKind::ExtractionFailed,
                ))
            }
            ExtractionOutcome::AlreadyExists(path) => {
                debug!(path = %path.display(), "Output already exists, skipped");
                Ok(ExtractionResult::failure(
                    url,
                    ExtractionErrorKind::AlreadyExists,
                ))
            }
            ExtractionOutcome::Unrecognized => {
                warn!(url = url, "Downloader exited cleanly but wrote no audio file");
                remove_created_dir(created_dest, dest_dir);
                Ok(ExtractionResult::failure(
                    url,
                    ExtractionErrorKind::ExtractionFailed,
                ))
            }
        }
    }

    fn name(&self) -> &'static str {
        "ytdl"
    }
}
