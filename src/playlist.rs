//! Playlist file generation
//!
//! Scans a directory for audio files and writes a `.pls` playlist mapping a
//! logical URI to each file. The directory is re-read on every call; disk is
//! the source of truth and nothing is cached between invocations.
//!
//! The `.pls` shape is parsed positionally by player software, so it is part
//! of the contract:
//!
//! ```text
//! [playlist]
//! File1=<uri>
//! Title1=<display name>
//! ...
//! NumberOfEntries=<count>
//! Version=2
//! ```

use crate::error::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// One playlist line pair: where the player finds the file and what it
/// displays while playing it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaylistEntry {
    /// Shown by the player; the file stem
    pub display_name: String,
    /// Either an absolute filesystem path or `uri_prefix + basename`
    pub resolved_uri: String,
}

/// Input for one playlist build
#[derive(Clone, Debug)]
pub struct PlaylistSpec {
    /// Directory to search for audio files
    pub mp3_dir: PathBuf,
    /// Path of the playlist file to write
    pub playlist_path: PathBuf,
    /// Whether an existing playlist file may be replaced
    pub overwrite: bool,
    /// Whether to search subdirectories of `mp3_dir`
    pub recurse: bool,
    /// When set, entries become `uri_prefix + basename` instead of
    /// absolute paths (remote playback through the file server)
    pub uri_prefix: Option<String>,
}

/// The conventional playlist path for a directory:
/// `<mp3_dir>/<basename>.pls`.
pub fn default_playlist_path(mp3_dir: &Path) -> PathBuf {
    let stem = mp3_dir
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "playlist".to_string());
    mp3_dir.join(format!("{}.pls", stem))
}

/// Build a playlist file from the audio files under `spec.mp3_dir`.
///
/// Files are enumerated in lexical path order, so re-running against an
/// unchanged directory produces byte-identical output. An empty playlist is
/// never written.
///
/// # Errors
/// - [`Error::AlreadyExists`] if the target exists and `overwrite` is false
///   (the existing file is left untouched)
/// - [`Error::NoFilesFound`] if no audio files match
/// - [`Error::Io`] if the directory cannot be read or the file written
pub fn build_playlist(spec: &PlaylistSpec) -> Result<PathBuf> {
    if !spec.overwrite && spec.playlist_path.is_file() {
        return Err(Error::AlreadyExists {
            path: spec.playlist_path.clone(),
        });
    }

    let files = find_audio_files(&spec.mp3_dir, spec.recurse)?;
    if files.is_empty() {
        return Err(Error::NoFilesFound {
            dir: spec.mp3_dir.clone(),
        });
    }

    let entries: Vec<PlaylistEntry> = files
        .iter()
        .map(|file| entry_for(file, spec.uri_prefix.as_deref()))
        .collect();

    debug!(
        playlist = %spec.playlist_path.display(),
        entries = entries.len(),
        "Writing playlist"
    );
    std::fs::write(&spec.playlist_path, render_pls(&entries))?;
    Ok(spec.playlist_path.clone())
}

/// Enumerate `*.mp3` files under `dir`, sorted in lexical path order.
///
/// Without `recurse` only direct children are considered. Paths come back
/// absolute so playlist entries resolve no matter where the player runs.
fn find_audio_files(dir: &Path, recurse: bool) -> Result<Vec<PathBuf>> {
    let dir = std::fs::canonicalize(dir)?;
    debug!(dir = %dir.display(), recurse = recurse, "Searching for audio files");

    let max_depth = if recurse { usize::MAX } else { 1 };
    let mut files: Vec<PathBuf> = WalkDir::new(&dir)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| {
            entry
                .path()
                .extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("mp3"))
        })
        .map(|entry| entry.into_path())
        .collect();

    files.sort();
    Ok(files)
}

fn entry_for(file: &Path, uri_prefix: Option<&str>) -> PlaylistEntry {
    let basename = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let display_name = file
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| basename.clone());

    let resolved_uri = match uri_prefix {
        Some(prefix) => format!("{}{}", prefix, basename),
        None => file.display().to_string(),
    };

    PlaylistEntry {
        display_name,
        resolved_uri,
    }
}

fn render_pls(entries: &[PlaylistEntry]) -> String {
    let mut out = String::from("[playlist]\n");
    for (index, entry) in entries.iter().enumerate() {
        let number = index + 1;
        out.push_str(&format!("File{}={}\n", number, entry.resolved_uri));
        out.push_str(&format!("Title{}={}\n", number, entry.display_name));
    }
    out.push_str(&format!("NumberOfEntries={}\n", entries.len()));
    out.push_str("Version=2\n");
    out
}
