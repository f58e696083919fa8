//! Scan, confirm, apply.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use cinetag_common::paths::DEFAULT_PROCESSED_MARKER;
use tempfile::NamedTempFile;
use tracing::{debug, error, info, warn};

use super::confirm::Confirmation;
use super::outcome::{
    FileReport, PendingWorkItem, ProcessingOutcome, RunReport, ScanReport, SubtitleOutcome,
    Unresolved, UnresolvedReason,
};
use super::state::PipelineState;
use super::writer::MetadataWriter;
use crate::images::PosterFetcher;
use crate::metadata::{MediaDetails, MetadataCandidate, Resolver};
use crate::probe::Inspector;
use crate::scanner::{check_directory, MediaItem, Scanner};
use crate::subtitles::Fetcher;

/// Audio language that makes a subtitle unnecessary.
pub const DEFAULT_SKIP_AUDIO_LANGUAGE: &str = "por";

/// Embedded subtitle language that makes a download unnecessary.
pub const DEFAULT_EMBEDDED_LANGUAGE: &str = "por";

/// Knobs of a single run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub processed_marker: String,
    pub skip_audio_language: String,
    pub embedded_language: String,
    /// Stop after the listing, touching nothing.
    pub dry_run: bool,
    pub subtitles: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            processed_marker: DEFAULT_PROCESSED_MARKER.to_string(),
            skip_audio_language: DEFAULT_SKIP_AUDIO_LANGUAGE.to_string(),
            embedded_language: DEFAULT_EMBEDDED_LANGUAGE.to_string(),
            dry_run: false,
            subtitles: true,
        }
    }
}

/// What the probes said about a file before it was tagged.
#[derive(Debug, Clone, Default)]
struct StreamFacts {
    audio_language: Option<String>,
    embedded_subtitle: bool,
}

/// Drives one run over one directory.
pub struct Orchestrator {
    resolver: Resolver,
    inspector: Arc<dyn Inspector>,
    writer: Arc<dyn MetadataWriter>,
    fetcher: Arc<dyn Fetcher>,
    confirmation: Box<dyn Confirmation>,
    posters: Option<PosterFetcher>,
    settings: PipelineSettings,
    state: PipelineState,
}

impl Orchestrator {
    pub fn new(
        resolver: Resolver,
        inspector: Arc<dyn Inspector>,
        writer: Arc<dyn MetadataWriter>,
        fetcher: Arc<dyn Fetcher>,
        confirmation: Box<dyn Confirmation>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            resolver,
            inspector,
            writer,
            fetcher,
            confirmation,
            posters: None,
            settings,
            state: PipelineState::Scanning,
        }
    }

    /// Download cover art through `posters` before tagging.
    pub fn with_posters(mut self, posters: PosterFetcher) -> Self {
        self.posters = Some(posters);
        self
    }

    /// Run the whole pipeline over `dir`.
    ///
    /// Only a directory that cannot be read fails the run. Per-file problems
    /// end up in the returned report.
    pub async fn run(mut self, dir: &Path) -> Result<RunReport> {
        let started_at = Utc::now();

        self.recovery_check(dir);
        let scan = self.scan(dir).await?;
        self.state.advance(PipelineState::AwaitingConfirmation)?;

        let planned = scan.pending.len();
        let mut files = Vec::new();

        if scan.is_empty() {
            info!(unresolved = scan.unresolved.len(), "Nothing to process");
            self.state.advance(PipelineState::Done)?;
        } else if self.settings.dry_run {
            info!("Dry run, nothing will be modified\n{}", scan.listing());
            self.state.advance(PipelineState::Done)?;
        } else {
            info!(files = planned, "Awaiting confirmation");
            self.confirmation.present(&scan.listing())?;
            let prompt = format!("Apply metadata to {planned} file(s)?");

            if self.confirmation.confirm(&prompt)? {
                self.state.advance(PipelineState::Applying)?;
                files = self.apply(&scan.pending).await;
                self.state.advance(PipelineState::Done)?;
            } else {
                info!("Cancelled by user");
                self.state.advance(PipelineState::Cancelled)?;
            }
        }

        let report = RunReport {
            state: self.state,
            started_at,
            finished_at: Utc::now(),
            planned,
            unresolved: scan.unresolved,
            files,
        };
        info!(
            state = ?report.state,
            applied = report.applied(),
            failed = report.failed(),
            unresolved = report.unresolved.len(),
            "Run finished"
        );
        Ok(report)
    }

    fn recovery_check(&self, dir: &Path) {
        match check_directory(dir, &self.settings.processed_marker) {
            Ok(findings) if !findings.is_empty() => {
                warn!(count = findings.len(), "Leftovers from an interrupted run found");
            }
            Ok(_) => {}
            Err(e) => warn!(error = %format!("{e:#}"), "Recovery check failed"),
        }
    }

    /// Phase 1: list eligible files and resolve each one.
    pub async fn scan(&self, dir: &Path) -> Result<ScanReport> {
        let scanner = Scanner::new(self.settings.processed_marker.as_str());
        let mut report = ScanReport::default();

        for path in scanner.scan_directory(dir)? {
            let item = MediaItem::from_path(&path);
            debug!(file = %item.raw_filename, title = %item.extracted_title, kind = %item.kind, "Parsed");

            match self.resolver.resolve(&item.extracted_title, item.kind).await {
                Ok(Some(candidate)) => report.pending.push(PendingWorkItem { item, candidate }),
                Ok(None) => {
                    warn!(file = %item.raw_filename, title = %item.extracted_title, "No match, skipping");
                    report.unresolved.push(Unresolved {
                        item,
                        reason: UnresolvedReason::NotFound,
                    });
                }
                Err(e) => {
                    let message = format!("{e:#}");
                    warn!(file = %item.raw_filename, error = %message, "Lookup failed, skipping");
                    report.unresolved.push(Unresolved {
                        item,
                        reason: UnresolvedReason::ProviderError(message),
                    });
                }
            }
        }

        Ok(report)
    }

    /// Phase 2: process each item in order. One item's failure never stops
    /// the others.
    pub async fn apply(&self, pending: &[PendingWorkItem]) -> Vec<FileReport> {
        let mut files = Vec::with_capacity(pending.len());
        for (n, work) in pending.iter().enumerate() {
            info!(
                file = %work.item.raw_filename,
                "Processing {}/{}",
                n + 1,
                pending.len()
            );
            let outcome = self.process(work).await;
            info!(file = %work.item.raw_filename, %outcome, "Processed");
            files.push(FileReport {
                file_path: work.item.file_path.clone(),
                display_title: work.candidate.display_title.clone(),
                outcome,
            });
        }
        files
    }

    async fn process(&self, work: &PendingWorkItem) -> ProcessingOutcome {
        let path = &work.item.file_path;

        if !self.writer.supports(path) {
            info!(file = %work.item.raw_filename, "Container not supported for tagging");
            return ProcessingOutcome::UnsupportedFormat;
        }

        let facts = self.inspect(path).await;

        let details = match self.resolver.details(&work.candidate).await {
            Ok(details) => details,
            Err(e) => {
                let reason = format!("details lookup failed: {e:#}");
                warn!(file = %work.item.raw_filename, %reason, "Skipping");
                return ProcessingOutcome::MetadataFailed { reason };
            }
        };

        // Dropping the handle deletes the temporary cover.
        let cover = self.cover(&work.candidate).await;
        let cover_path = cover.as_ref().map(|c| c.path().to_path_buf());

        if let Err(reason) = self
            .write(path, &work.candidate, &details, cover_path)
            .await
        {
            return ProcessingOutcome::MetadataFailed { reason };
        }
        drop(cover);

        let year = details
            .release_year()
            .or_else(|| work.candidate.release_year());
        let subtitle = self
            .subtitle(path, &work.candidate.display_title, year, &facts)
            .await;

        ProcessingOutcome::MetadataApplied {
            path: path.clone(),
            subtitle,
        }
    }

    async fn inspect(&self, path: &Path) -> StreamFacts {
        let inspector = Arc::clone(&self.inspector);
        let path = path.to_path_buf();
        let language = self.settings.embedded_language.clone();

        let probed = tokio::task::spawn_blocking(move || StreamFacts {
            audio_language: inspector.audio_language(&path),
            embedded_subtitle: inspector.has_embedded_subtitle(&path, &language),
        })
        .await;

        match probed {
            Ok(facts) => {
                debug!(audio = ?facts.audio_language, embedded = facts.embedded_subtitle, "Probed");
                facts
            }
            Err(e) => {
                warn!(error = %e, "Probe task failed");
                StreamFacts::default()
            }
        }
    }

    async fn cover(&self, candidate: &MetadataCandidate) -> Option<NamedTempFile> {
        let posters = self.posters.as_ref()?;
        let poster_path = candidate.poster_path.as_deref().filter(|p| !p.is_empty())?;
        let url = self.resolver.provider().image_url(poster_path);

        match posters.download(&url).await {
            Ok(file) => Some(file),
            Err(e) => {
                warn!(url, error = %format!("{e:#}"), "Cover download failed, tagging without one");
                None
            }
        }
    }

    async fn write(
        &self,
        path: &Path,
        candidate: &MetadataCandidate,
        details: &MediaDetails,
        cover: Option<PathBuf>,
    ) -> std::result::Result<(), String> {
        let writer = Arc::clone(&self.writer);
        let target = path.to_path_buf();
        let candidate = candidate.clone();
        let details = details.clone();

        let written = tokio::task::spawn_blocking(move || {
            writer.write(&target, &candidate, &details, cover.as_deref())
        })
        .await;

        match written {
            Ok(Ok(tagged)) => {
                info!(path = %tagged.display(), "Metadata written");
                Ok(())
            }
            Ok(Err(e @ cinetag_av::Error::SwapIncomplete { .. })) => {
                error!(file = %path.display(), error = %e, "Swap left incomplete");
                Err(e.to_string())
            }
            Ok(Err(e)) => {
                warn!(file = %path.display(), error = %e, "Metadata write failed");
                Err(e.to_string())
            }
            Err(e) => {
                warn!(file = %path.display(), error = %e, "Write task failed");
                Err(format!("write task failed: {e}"))
            }
        }
    }

    async fn subtitle(
        &self,
        path: &Path,
        title: &str,
        year: Option<i32>,
        facts: &StreamFacts,
    ) -> SubtitleOutcome {
        if !self.settings.subtitles || !self.fetcher.is_available() {
            return SubtitleOutcome::Disabled;
        }
        if facts.audio_language.as_deref() == Some(self.settings.skip_audio_language.as_str()) {
            info!(file = %path.display(), "Audio already in target language, no subtitle needed");
            return SubtitleOutcome::SkippedAudioLanguage;
        }
        if facts.embedded_subtitle {
            info!(file = %path.display(), "Subtitle already embedded");
            return SubtitleOutcome::SkippedEmbedded;
        }
        let Some(year) = year else {
            info!(file = %path.display(), "No release year, skipping subtitle search");
            return SubtitleOutcome::SkippedNoYear;
        };

        if self.fetcher.fetch(path, title, year).await {
            SubtitleOutcome::Fetched
        } else {
            SubtitleOutcome::NotFound
        }
    }
}
