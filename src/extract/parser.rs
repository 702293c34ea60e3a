//! Parser for downloader command output

use std::path::PathBuf;
use std::str;

/// What the downloader's stdout tells us about an attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractionOutcome {
    /// An audio file was written to this path
    Destination(PathBuf),
    /// Post-processing was skipped because the target already exists
    AlreadyExists(PathBuf),
    /// No recognizable outcome line was found
    Unrecognized,
}

/// Parse the downloader's stdout for the extraction outcome.
///
/// Two line shapes matter, both produced during audio post-processing:
///
/// - `[ffmpeg] Destination: /path/to/file.mp3` (youtube-dl) or
///   `[ExtractAudio] Destination: ...` (yt-dlp) - the file that was written
/// - `[ffmpeg] Post-process file /path/to/file.mp3 exists, skipping` - the
///   target was already there, nothing was written
pub fn parse_extraction_output(stdout: &[u8]) -> ExtractionOutcome {
    let output = str::from_utf8(stdout).unwrap_or_default();

    for line in output.lines() {
        if line.contains("Post-process file") && line.trim_end().ends_with("skipping") {
            // The path sits between "Post-process file " and " exists"
            if let Some(before_exists) = line.split(" exists").next()
                && let Some(path) = before_exists.split_whitespace().next_back()
            {
                return ExtractionOutcome::AlreadyExists(PathBuf::from(path));
            }
        }

        if (line.contains("[ffmpeg] Destination:") || line.contains("[ExtractAudio] Destination:"))
            && let Some((_, path)) = line.split_once(": ")
        {
            return ExtractionOutcome::Destination(PathBuf::from(path.trim()));
        }
    }

    ExtractionOutcome::Unrecognized
}

/// Collect the `ERROR:`-prefixed lines from the downloader's stderr.
///
/// These are the downloader's own diagnostics (geo blocks, removed videos,
/// unsupported pages) and are worth logging verbatim on failure.
pub fn error_lines(stderr: &[u8]) -> Vec<String> {
    str::from_utf8(stderr)
        .unwrap_or_default()
        .lines()
        .filter(|line| line.starts_with("ERROR"))
        .map(|line| line.to_string())
        .collect()
}

/// Parse the output of `--list-extractors` into comparable extractor names.
///
/// Names are downcased and cut at the first `:` - the listing has entries
/// like `youtube:playlist` and mixed-case names like `AdultSwim`, and we
/// only match on the bare site name.
pub fn parse_extractor_list(stdout: &[u8]) -> Vec<String> {
    str::from_utf8(stdout)
        .unwrap_or_default()
        .lines()
        .filter(|line| !line.is_empty())
        .filter_map(|line| line.split(':').next())
        .map(|name| name.to_lowercase())
        .collect()
}
