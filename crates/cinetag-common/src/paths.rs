//! Path conventions shared by the scanner, the writer, and the subtitle fetcher.
//!
//! A processed asset always follows the same layout on disk:
//!
//! - `<dir>/<stem><marker>.<ext>` is the remux output before it is swapped in
//! - `<dir>/<stem>.<ext>.bak` holds the pre-mutation bytes after the swap
//! - `<dir>/<stem>.<lang>.srt` is a downloaded subtitle sidecar

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::{Error, Result};

/// Extensions the scanner picks up.
const VIDEO_EXTENSIONS: &[&str] = &["mkv", "mp4", "avi", "mov"];

/// Suffix appended to backups of mutated files.
pub const BACKUP_EXTENSION: &str = "bak";

/// Marker inserted before the extension of remux output files.
pub const DEFAULT_PROCESSED_MARKER: &str = "_processed";

/// Check if a path has a video file extension (case-insensitive).
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use cinetag_common::paths::is_video_file;
///
/// assert!(is_video_file(Path::new("movie.mkv")));
/// assert!(is_video_file(Path::new("/path/to/video.MP4")));
/// assert!(!is_video_file(Path::new("movie.mkv.bak")));
/// ```
pub fn is_video_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| VIDEO_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Get the list of video file extensions.
#[must_use]
pub fn video_extensions() -> &'static [&'static str] {
    VIDEO_EXTENSIONS
}

/// Returns `true` when `file_name` carries the processed marker anywhere.
pub fn has_processed_marker(file_name: &str, marker: &str) -> bool {
    !marker.is_empty() && file_name.contains(marker)
}

/// Path the remux output is written to before it replaces the original.
///
/// ```
/// use std::path::Path;
/// use cinetag_common::paths::processed_path;
///
/// assert_eq!(
///     processed_path(Path::new("/m/Movie.2020.mkv"), "_processed"),
///     Path::new("/m/Movie.2020_processed.mkv"),
/// );
/// ```
pub fn processed_path(path: &Path, marker: &str) -> PathBuf {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file_name = match path.extension() {
        Some(ext) => format!("{stem}{marker}.{}", ext.to_string_lossy()),
        None => format!("{stem}{marker}"),
    };

    path.with_file_name(file_name)
}

/// Backup path for a file: the full file name with `.bak` appended.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".");
    name.push(BACKUP_EXTENSION);
    PathBuf::from(name)
}

/// Original path a backup was created from, if `backup` is a backup path.
pub fn original_from_backup(backup: &Path) -> Option<PathBuf> {
    let name = backup.file_name()?.to_str()?;
    let original = name.strip_suffix(&format!(".{BACKUP_EXTENSION}"))?;
    if original.is_empty() {
        return None;
    }
    Some(backup.with_file_name(original))
}

/// Original path a processed output belongs to, if `processed` follows the
/// `<stem><marker>.<ext>` layout.
pub fn original_from_processed(processed: &Path, marker: &str) -> Option<PathBuf> {
    if marker.is_empty() {
        return None;
    }
    let stem = processed.file_stem()?.to_str()?;
    let original_stem = stem.strip_suffix(marker)?;
    if original_stem.is_empty() {
        return None;
    }

    let file_name = match processed.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{original_stem}.{ext}"),
        None => original_stem.to_string(),
    };
    Some(processed.with_file_name(file_name))
}

/// `Ok` when `path` is an existing directory.
pub fn ensure_directory(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(Error::not_found(path.display().to_string()));
    }
    if !path.is_dir() {
        return Err(Error::invalid_input(format!(
            "not a directory: {}",
            path.display()
        )));
    }
    Ok(())
}

/// Sidecar subtitle path next to a video: `<stem>.<language>.<extension>`.
///
/// ```
/// use std::path::Path;
/// use cinetag_common::paths::sidecar_subtitle_path;
///
/// assert_eq!(
///     sidecar_subtitle_path(Path::new("/m/Movie.mkv"), "pt-BR", "srt"),
///     Path::new("/m/Movie.pt-BR.srt"),
/// );
/// ```
pub fn sidecar_subtitle_path(video: &Path, language: &str, extension: &str) -> PathBuf {
    let stem = video
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let file_name = if language.is_empty() {
        format!("{stem}.{extension}")
    } else {
        format!("{stem}.{language}.{extension}")
    };
    video.with_file_name(file_name)
}
