//! Media library scanner.
//!
//! Lists the video files of one directory (no recursion) that still need
//! processing, in file-name order.

pub mod recovery;

use anyhow::{Context, Result};
use cinetag_common::paths::{backup_path, has_processed_marker, is_video_file};
use cinetag_common::MediaKind;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub use recovery::{check_directory, RecoveryFinding};

/// A video file picked up by the scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MediaItem {
    pub file_path: PathBuf,
    pub raw_filename: String,
    /// Search query derived from the file name.
    pub extracted_title: String,
    pub kind: MediaKind,
}

impl MediaItem {
    /// Build an item by parsing the file name of `path`.
    pub fn from_path(path: &Path) -> Self {
        let raw_filename = file_name(path);
        let parsed = cinetag_parser::parse(&raw_filename);
        Self {
            file_path: path.to_path_buf(),
            raw_filename,
            extracted_title: parsed.title,
            kind: parsed.kind,
        }
    }

    pub fn is_series(&self) -> bool {
        self.kind.is_series()
    }
}

/// Why a directory entry was not selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// The name carries the processed marker.
    ProcessedMarker,
    /// Not a video extension.
    NotVideo,
    /// A `<file>.bak` sibling exists.
    AlreadyProcessed,
}

/// Scanner for discovering unprocessed video files.
pub struct Scanner {
    processed_marker: String,
}

impl Scanner {
    pub fn new(processed_marker: impl Into<String>) -> Self {
        Self {
            processed_marker: processed_marker.into(),
        }
    }

    /// Decide whether a file should be skipped.
    pub fn skip_reason(&self, path: &Path) -> Option<SkipReason> {
        if has_processed_marker(&file_name(path), &self.processed_marker) {
            return Some(SkipReason::ProcessedMarker);
        }
        if !is_video_file(path) {
            return Some(SkipReason::NotVideo);
        }
        if backup_path(path).exists() {
            return Some(SkipReason::AlreadyProcessed);
        }
        None
    }

    /// Eligible video files directly inside `dir`, sorted by file name.
    pub fn scan_directory(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        info!("Scanning directory: {:?}", dir);
        let mut selected = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .sort_by_file_name()
        {
            let entry = entry.with_context(|| format!("Failed to read directory {:?}", dir))?;
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            match self.skip_reason(path) {
                Some(SkipReason::ProcessedMarker) => {
                    info!("File {:?} already processed, skipping", entry.file_name());
                }
                Some(SkipReason::AlreadyProcessed) => {
                    info!("File {:?} has a backup, skipping", entry.file_name());
                }
                Some(SkipReason::NotVideo) => {
                    debug!("Not a video file: {:?}", entry.file_name());
                }
                None => selected.push(path.to_path_buf()),
            }
        }

        info!("Scan complete: {} files selected from {:?}", selected.len(), dir);
        Ok(selected)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}
