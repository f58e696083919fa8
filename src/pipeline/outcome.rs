//! What a run found and what it did to each file.

use std::fmt;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::state::PipelineState;
use crate::metadata::MetadataCandidate;
use crate::scanner::MediaItem;

/// A scanned file with the candidate it resolved to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingWorkItem {
    pub item: MediaItem,
    pub candidate: MetadataCandidate,
}

/// Why a scanned file has no candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum UnresolvedReason {
    /// No language produced a usable hit.
    NotFound,
    /// The provider could not be queried.
    ProviderError(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Unresolved {
    pub item: MediaItem,
    pub reason: UnresolvedReason,
}

/// Outcome of Phase 1.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScanReport {
    /// Resolved files, in scan order.
    pub pending: Vec<PendingWorkItem>,
    pub unresolved: Vec<Unresolved>,
}

impl ScanReport {
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// One line per queued file, shown before asking for confirmation.
    pub fn listing(&self) -> String {
        let mut lines = vec![format!("{} file(s) will be tagged:", self.pending.len())];
        for work in &self.pending {
            let year = work
                .candidate
                .release_year()
                .map(|y| format!(" ({y})"))
                .unwrap_or_default();
            lines.push(format!(
                "  {} -> {}{} [{}]",
                work.item.raw_filename, work.candidate.display_title, year, work.candidate.kind
            ));
        }
        if !self.unresolved.is_empty() {
            lines.push(format!("{} file(s) without a match:", self.unresolved.len()));
            for miss in &self.unresolved {
                lines.push(format!("  {}", miss.item.raw_filename));
            }
        }
        lines.join("\n")
    }
}

/// What happened to the subtitle step of a tagged file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SubtitleOutcome {
    Fetched,
    NotFound,
    /// The first audio stream is already in the skip language.
    SkippedAudioLanguage,
    /// A subtitle stream in the target language is embedded.
    SkippedEmbedded,
    /// No release year to search with.
    SkippedNoYear,
    /// No subtitle provider configured, or turned off for this run.
    Disabled,
}

impl fmt::Display for SubtitleOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            SubtitleOutcome::Fetched => "subtitle downloaded",
            SubtitleOutcome::NotFound => "no subtitle found",
            SubtitleOutcome::SkippedAudioLanguage => "subtitle skipped (audio already in language)",
            SubtitleOutcome::SkippedEmbedded => "subtitle skipped (already embedded)",
            SubtitleOutcome::SkippedNoYear => "subtitle skipped (no release year)",
            SubtitleOutcome::Disabled => "subtitles disabled",
        };
        f.write_str(text)
    }
}

/// Terminal state of one file in Phase 2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ProcessingOutcome {
    MetadataApplied {
        path: PathBuf,
        subtitle: SubtitleOutcome,
    },
    MetadataFailed {
        reason: String,
    },
    UnsupportedFormat,
}

impl ProcessingOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, ProcessingOutcome::MetadataApplied { .. })
    }

    pub fn subtitle(&self) -> Option<SubtitleOutcome> {
        match self {
            ProcessingOutcome::MetadataApplied { subtitle, .. } => Some(*subtitle),
            _ => None,
        }
    }
}

impl fmt::Display for ProcessingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessingOutcome::MetadataApplied { subtitle, .. } => {
                write!(f, "metadata applied, {subtitle}")
            }
            ProcessingOutcome::MetadataFailed { reason } => write!(f, "failed: {reason}"),
            ProcessingOutcome::UnsupportedFormat => f.write_str("unsupported format (only mkv and mp4 are tagged)"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileReport {
    pub file_path: PathBuf,
    pub display_title: String,
    pub outcome: ProcessingOutcome,
}

/// Everything a run did, printed and logged at the end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub state: PipelineState,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// Files that were queued for tagging.
    pub planned: usize,
    pub unresolved: Vec<Unresolved>,
    pub files: Vec<FileReport>,
}

impl RunReport {
    /// Files were queued but nothing was applied and nothing was cancelled.
    pub fn is_dry_run(&self) -> bool {
        self.state == PipelineState::Done && self.files.is_empty() && self.planned > 0
    }

    pub fn applied(&self) -> usize {
        self.files.iter().filter(|f| f.outcome.is_applied()).count()
    }

    pub fn failed(&self) -> usize {
        self.files
            .iter()
            .filter(|f| matches!(f.outcome, ProcessingOutcome::MetadataFailed { .. }))
            .count()
    }

    pub fn subtitles_fetched(&self) -> usize {
        self.files
            .iter()
            .filter(|f| f.outcome.subtitle() == Some(SubtitleOutcome::Fetched))
            .count()
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.state == PipelineState::Cancelled {
            return write!(f, "Cancelled, {} file(s) left untouched", self.planned);
        }
        if self.is_dry_run() {
            writeln!(f, "Dry run, {} file(s) would be tagged", self.planned)?;
        }
        for file in &self.files {
            let name = file
                .file_path
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default();
            writeln!(f, "  {name} -> {}: {}", file.display_title, file.outcome)?;
        }
        for unresolved in &self.unresolved {
            let reason = match &unresolved.reason {
                UnresolvedReason::NotFound => "no match".to_string(),
                UnresolvedReason::ProviderError(e) => format!("lookup failed: {e}"),
            };
            writeln!(f, "  {} -> {reason}", unresolved.item.raw_filename)?;
        }
        write!(
            f,
            "{} tagged, {} failed, {} unresolved, {} subtitles downloaded ({:.1}s)",
            self.applied(),
            self.failed(),
            self.unresolved.len(),
            self.subtitles_fetched(),
            (self.finished_at - self.started_at).num_milliseconds() as f64 / 1000.0
        )
    }
}
