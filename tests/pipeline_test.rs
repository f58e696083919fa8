//! Pipeline integration tests
//!
//! Runs the orchestrator over a temporary directory with in-memory stand-ins
//! for TMDB, ffprobe, ffmpeg and OpenSubtitles.

use assert_matches::assert_matches;
use async_trait::async_trait;
use cinetag::images::PosterFetcher;
use cinetag::metadata::{MediaDetails, MetadataCandidate, MetadataProvider, Resolver};
use cinetag::pipeline::{
    Confirmation, MetadataWriter, Orchestrator, PipelineSettings, PipelineState,
    ProcessingOutcome, SubtitleOutcome, UnresolvedReason,
};
use cinetag::probe::Inspector;
use cinetag::subtitles::Fetcher;
use cinetag_common::MediaKind;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

// ---------------------------------------------------------------------------
// Stand-ins
// ---------------------------------------------------------------------------

#[derive(Default)]
struct FakeProvider {
    /// (title, language) -> results
    hits: HashMap<(String, String), Vec<MetadataCandidate>>,
    failing_titles: Vec<String>,
    failing_details: Vec<String>,
    release_dates: HashMap<String, String>,
    /// Prefix of every poster URL
    image_base: String,
    searches: Mutex<Vec<(String, String)>>,
}

impl FakeProvider {
    fn hit(mut self, title: &str, language: &str, id: &str, date: Option<&str>) -> Self {
        let candidate = MetadataCandidate {
            provider_id: id.to_string(),
            display_title: format!("{title} ({language})"),
            release_date: date.map(String::from),
            poster_path: None,
            genre_ids: vec![],
            kind: MediaKind::Movie,
            language: language.to_string(),
        };
        self.hits
            .entry((title.to_string(), language.to_string()))
            .or_default()
            .push(candidate);
        self
    }

    /// Give the most recent hit for `title` a poster.
    fn poster(mut self, title: &str, language: &str, poster_path: &str) -> Self {
        if let Some(last) = self
            .hits
            .get_mut(&(title.to_string(), language.to_string()))
            .and_then(|hits| hits.last_mut())
        {
            last.poster_path = Some(poster_path.to_string());
        }
        self
    }

    fn searches(&self) -> Vec<(String, String)> {
        self.searches.lock().unwrap().clone()
    }
}

#[async_trait]
impl MetadataProvider for FakeProvider {
    fn name(&self) -> &'static str {
        "fake"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn search(
        &self,
        title: &str,
        _kind: MediaKind,
        language: &str,
    ) -> anyhow::Result<Vec<MetadataCandidate>> {
        self.searches
            .lock()
            .unwrap()
            .push((title.to_string(), language.to_string()));
        if self.failing_titles.iter().any(|t| t == title) {
            anyhow::bail!("connection reset");
        }
        Ok(self
            .hits
            .get(&(title.to_string(), language.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn details(
        &self,
        provider_id: &str,
        _kind: MediaKind,
        _language: &str,
    ) -> anyhow::Result<MediaDetails> {
        if self.failing_details.iter().any(|id| id == provider_id) {
            anyhow::bail!("HTTP 500");
        }
        Ok(MediaDetails {
            display_title: String::new(),
            release_date: self.release_dates.get(provider_id).cloned(),
            genres: vec!["Drama".to_string()],
        })
    }

    fn image_url(&self, poster_path: &str) -> String {
        format!("{}{poster_path}", self.image_base)
    }
}

#[derive(Default)]
struct FakeInspector {
    /// file name -> audio language
    audio: HashMap<String, String>,
    /// file names with an embedded subtitle in the target language
    embedded: Vec<String>,
}

fn name_of(path: &Path) -> String {
    path.file_name().unwrap().to_string_lossy().into_owned()
}

impl Inspector for FakeInspector {
    fn audio_language(&self, path: &Path) -> Option<String> {
        self.audio.get(&name_of(path)).cloned()
    }

    fn has_embedded_subtitle(&self, path: &Path, _language: &str) -> bool {
        self.embedded.contains(&name_of(path))
    }
}

/// Copies the original to `.bak` and rewrites it. Names containing "Broken"
/// fail like a rejected remux, names containing "Swap" fail like an
/// interrupted second rename.
#[derive(Default)]
struct FakeWriter {
    written: Mutex<Vec<PathBuf>>,
    /// Cover bytes seen per write, `None` when tagged without one
    covers: Mutex<Vec<Option<Vec<u8>>>>,
}

impl FakeWriter {
    fn written(&self) -> Vec<String> {
        self.written.lock().unwrap().iter().map(|p| name_of(p)).collect()
    }

    fn covers(&self) -> Vec<Option<Vec<u8>>> {
        self.covers.lock().unwrap().clone()
    }
}

impl MetadataWriter for FakeWriter {
    fn supports(&self, path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("mkv") | Some("mp4")
        )
    }

    fn write(
        &self,
        path: &Path,
        candidate: &MetadataCandidate,
        _details: &MediaDetails,
        cover: Option<&Path>,
    ) -> Result<PathBuf, cinetag_av::Error> {
        self.written.lock().unwrap().push(path.to_path_buf());
        self.covers
            .lock()
            .unwrap()
            .push(cover.map(|c| fs::read(c).unwrap()));

        let name = name_of(path);
        if name.contains("Broken") {
            return Err(cinetag_av::Error::tool_failed("ffmpeg", "Invalid data found"));
        }
        let backup = cinetag_common::paths::backup_path(path);
        if name.contains("Swap") {
            fs::rename(path, &backup)?;
            return Err(cinetag_av::Error::SwapIncomplete {
                backup,
                processed: cinetag_common::paths::processed_path(path, "_processed"),
            });
        }
        fs::copy(path, &backup)?;
        fs::write(path, format!("tagged {}", candidate.display_title))?;
        Ok(path.to_path_buf())
    }
}

struct FakeFetcher {
    available: bool,
    result: bool,
    calls: Mutex<Vec<(String, String, i32)>>,
}

impl FakeFetcher {
    fn new(result: bool) -> Self {
        Self {
            available: true,
            result,
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<(String, String, i32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Fetcher for FakeFetcher {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn fetch(&self, video: &Path, title: &str, year: i32) -> bool {
        self.calls
            .lock()
            .unwrap()
            .push((name_of(video), title.to_string(), year));
        self.result
    }
}

struct ScriptedConfirmation {
    answer: bool,
    asked: Arc<AtomicUsize>,
}

impl Confirmation for ScriptedConfirmation {
    fn confirm(&mut self, _prompt: &str) -> anyhow::Result<bool> {
        self.asked.fetch_add(1, Ordering::SeqCst);
        Ok(self.answer)
    }
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    dir: TempDir,
    provider: Arc<FakeProvider>,
    writer: Arc<FakeWriter>,
    fetcher: Arc<FakeFetcher>,
    asked: Arc<AtomicUsize>,
    orchestrator: Orchestrator,
}

fn harness(
    files: &[&str],
    provider: FakeProvider,
    inspector: FakeInspector,
    fetcher: FakeFetcher,
    answer: bool,
    settings: PipelineSettings,
) -> Harness {
    let dir = tempfile::tempdir().unwrap();
    for name in files {
        fs::write(dir.path().join(name), b"original").unwrap();
    }

    let provider = Arc::new(provider);
    let writer = Arc::new(FakeWriter::default());
    let fetcher = Arc::new(fetcher);
    let asked = Arc::new(AtomicUsize::new(0));

    let orchestrator = Orchestrator::new(
        Resolver::new(provider.clone(), "pt-BR", "en-US"),
        Arc::new(inspector),
        writer.clone(),
        fetcher.clone(),
        Box::new(ScriptedConfirmation {
            answer,
            asked: asked.clone(),
        }),
        settings,
    );

    Harness {
        dir,
        provider,
        writer,
        fetcher,
        asked,
        orchestrator,
    }
}

fn simple(files: &[&str], provider: FakeProvider) -> Harness {
    harness(
        files,
        provider,
        FakeInspector::default(),
        FakeFetcher::new(true),
        true,
        PipelineSettings::default(),
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_remux_failure_does_not_stop_other_files() {
    let provider = FakeProvider::default()
        .hit("A Broken", "pt-BR", "1", Some("2020-01-01"))
        .hit("B Fine", "pt-BR", "2", Some("2021-05-05"));
    let h = simple(&["A.Broken.2020.mkv", "B.Fine.2021.mkv"], provider);
    let dir = h.dir.path().to_path_buf();

    let report = h.orchestrator.run(&dir).await.unwrap();

    assert_eq!(report.state, PipelineState::Done);
    assert_eq!(h.writer.written(), vec!["A.Broken.2020.mkv", "B.Fine.2021.mkv"]);
    assert_matches!(&report.files[0].outcome, ProcessingOutcome::MetadataFailed { reason } if reason.contains("Invalid data"));
    assert_matches!(
        &report.files[1].outcome,
        ProcessingOutcome::MetadataApplied { path, subtitle: SubtitleOutcome::Fetched } if *path == dir.join("B.Fine.2021.mkv")
    );

    // The failed file is untouched and has no backup
    assert_eq!(fs::read(dir.join("A.Broken.2020.mkv")).unwrap(), b"original");
    assert!(!dir.join("A.Broken.2020.mkv.bak").exists());
    assert_eq!(fs::read(dir.join("B.Fine.2021.mkv.bak")).unwrap(), b"original");
    assert_eq!(report.applied(), 1);
    assert_eq!(report.failed(), 1);
}

#[tokio::test]
async fn test_only_processed_files_means_no_prompt() {
    let h = simple(
        &["Movie.2020_processed.mkv", "Show.S01E01_processed.mp4", "notes.txt"],
        FakeProvider::default(),
    );
    let dir = h.dir.path().to_path_buf();

    let report = h.orchestrator.run(&dir).await.unwrap();

    assert_eq!(report.state, PipelineState::Done);
    assert_eq!(report.planned, 0);
    assert!(report.files.is_empty());
    assert_eq!(h.asked.load(Ordering::SeqCst), 0);
    assert!(h.provider.searches().is_empty());
}

#[tokio::test]
async fn test_portuguese_audio_skips_subtitles() {
    let provider = FakeProvider::default().hit("Tropa de Elite", "pt-BR", "7347", Some("2007-10-05"));
    let inspector = FakeInspector {
        audio: [("Tropa.de.Elite.2007.mkv".to_string(), "por".to_string())].into(),
        // Embedded probe result must not matter
        embedded: vec![],
    };
    let h = harness(
        &["Tropa.de.Elite.2007.mkv"],
        provider,
        inspector,
        FakeFetcher::new(true),
        true,
        PipelineSettings::default(),
    );
    let dir = h.dir.path().to_path_buf();

    let report = h.orchestrator.run(&dir).await.unwrap();

    assert_eq!(
        report.files[0].outcome.subtitle(),
        Some(SubtitleOutcome::SkippedAudioLanguage)
    );
    assert!(h.fetcher.calls().is_empty());
}

#[tokio::test]
async fn test_embedded_subtitle_skips_download() {
    let provider = FakeProvider::default().hit("Oppenheimer", "pt-BR", "872585", Some("2023-07-19"));
    let inspector = FakeInspector {
        audio: [("Oppenheimer.2023.mkv".to_string(), "eng".to_string())].into(),
        embedded: vec!["Oppenheimer.2023.mkv".to_string()],
    };
    let h = harness(
        &["Oppenheimer.2023.mkv"],
        provider,
        inspector,
        FakeFetcher::new(true),
        true,
        PipelineSettings::default(),
    );
    let dir = h.dir.path().to_path_buf();

    let report = h.orchestrator.run(&dir).await.unwrap();

    assert_eq!(
        report.files[0].outcome.subtitle(),
        Some(SubtitleOutcome::SkippedEmbedded)
    );
    assert!(h.fetcher.calls().is_empty());
}

#[tokio::test]
async fn test_subtitle_fetched_with_title_and_year() {
    let mut provider = FakeProvider::default().hit("As Marvels", "pt-BR", "609681", Some("2023-11-08"));
    provider
        .release_dates
        .insert("609681".to_string(), "2023-11-10".to_string());
    let h = simple(&["As.Marvels.2023.1080p.BluRay.mkv"], provider);
    let dir = h.dir.path().to_path_buf();

    let report = h.orchestrator.run(&dir).await.unwrap();

    assert_eq!(report.subtitles_fetched(), 1);
    assert_eq!(
        h.fetcher.calls(),
        vec![(
            "As.Marvels.2023.1080p.BluRay.mkv".to_string(),
            "As Marvels (pt-BR)".to_string(),
            2023
        )]
    );
}

#[tokio::test]
async fn test_subtitle_not_found_keeps_metadata() {
    let provider = FakeProvider::default().hit("Obscure", "pt-BR", "5", Some("1999-01-01"));
    let h = harness(
        &["Obscure.1999.mkv"],
        provider,
        FakeInspector::default(),
        FakeFetcher::new(false),
        true,
        PipelineSettings::default(),
    );
    let dir = h.dir.path().to_path_buf();

    let report = h.orchestrator.run(&dir).await.unwrap();

    assert!(report.files[0].outcome.is_applied());
    assert_eq!(report.files[0].outcome.subtitle(), Some(SubtitleOutcome::NotFound));
}

#[tokio::test]
async fn test_missing_year_skips_subtitles() {
    let provider = FakeProvider::default().hit("Home Video", "pt-BR", "9", None);
    let h = simple(&["Home.Video.mkv"], provider);
    let dir = h.dir.path().to_path_buf();

    let report = h.orchestrator.run(&dir).await.unwrap();

    assert_eq!(
        report.files[0].outcome.subtitle(),
        Some(SubtitleOutcome::SkippedNoYear)
    );
    assert!(h.fetcher.calls().is_empty());
}

#[tokio::test]
async fn test_subtitles_disabled() {
    let provider = FakeProvider::default().hit("Movie", "pt-BR", "1", Some("2020-01-01"));
    let settings = PipelineSettings {
        subtitles: false,
        ..Default::default()
    };
    let h = harness(
        &["Movie.2020.mkv"],
        provider,
        FakeInspector::default(),
        FakeFetcher::new(true),
        true,
        settings,
    );
    let dir = h.dir.path().to_path_buf();

    let report = h.orchestrator.run(&dir).await.unwrap();

    assert_eq!(report.files[0].outcome.subtitle(), Some(SubtitleOutcome::Disabled));
    assert!(h.fetcher.calls().is_empty());
}

#[tokio::test]
async fn test_unavailable_fetcher_is_disabled() {
    let provider = FakeProvider::default().hit("Movie", "pt-BR", "1", Some("2020-01-01"));
    let fetcher = FakeFetcher {
        available: false,
        ..FakeFetcher::new(true)
    };
    let h = harness(
        &["Movie.2020.mkv"],
        provider,
        FakeInspector::default(),
        fetcher,
        true,
        PipelineSettings::default(),
    );
    let dir = h.dir.path().to_path_buf();

    let report = h.orchestrator.run(&dir).await.unwrap();

    assert_eq!(report.files[0].outcome.subtitle(), Some(SubtitleOutcome::Disabled));
}

#[tokio::test]
async fn test_fallback_language_and_stable_primary() {
    let provider = FakeProvider::default()
        .hit("Ironheart", "en-US", "114472", Some("2025-06-24"))
        .hit("A Mulher no Jardim", "pt-BR", "1211483", Some("2025-03-26"));
    let h = simple(
        &[
            "A.Mulher.no.Jardim.2025.1080p.BluRay.DUAL.5.1.mkv",
            "Ironheart.S01E01.1080p.WEB-DL.DUAL.5.1.mkv",
        ],
        provider,
    );
    let dir = h.dir.path().to_path_buf();

    let scan = h.orchestrator.scan(&dir).await.unwrap();

    assert_eq!(scan.pending.len(), 2);
    assert_eq!(scan.pending[0].candidate.language, "pt-BR");
    assert_eq!(scan.pending[1].candidate.language, "en-US");
    assert_eq!(scan.pending[1].item.kind, MediaKind::Series);

    // Every file starts in the primary language, whatever happened before
    let searches = h.provider.searches();
    assert_eq!(
        searches,
        vec![
            ("A Mulher no Jardim".to_string(), "pt-BR".to_string()),
            ("Ironheart".to_string(), "pt-BR".to_string()),
            ("Ironheart".to_string(), "en-US".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_unresolved_files_are_reported() {
    let provider = FakeProvider {
        failing_titles: vec!["Offline".to_string()],
        ..Default::default()
    }
    .hit("Known", "pt-BR", "1", Some("2020-01-01"));
    let h = simple(&["Known.2020.mkv", "Nobody.Knows.2019.mkv", "Offline.2018.mkv"], provider);
    let dir = h.dir.path().to_path_buf();

    let report = h.orchestrator.run(&dir).await.unwrap();

    assert_eq!(report.planned, 1);
    assert_eq!(report.unresolved.len(), 2);
    assert_eq!(report.unresolved[0].item.raw_filename, "Nobody.Knows.2019.mkv");
    assert_eq!(report.unresolved[0].reason, UnresolvedReason::NotFound);
    assert_matches!(&report.unresolved[1].reason, UnresolvedReason::ProviderError(e) if e.contains("connection reset"));
    assert_eq!(h.writer.written(), vec!["Known.2020.mkv"]);
}

#[tokio::test]
async fn test_cancel_touches_nothing() {
    let provider = FakeProvider::default().hit("Movie", "pt-BR", "1", Some("2020-01-01"));
    let h = harness(
        &["Movie.2020.mkv"],
        provider,
        FakeInspector::default(),
        FakeFetcher::new(true),
        false,
        PipelineSettings::default(),
    );
    let dir = h.dir.path().to_path_buf();

    let report = h.orchestrator.run(&dir).await.unwrap();

    assert_eq!(report.state, PipelineState::Cancelled);
    assert_eq!(h.asked.load(Ordering::SeqCst), 1);
    assert!(h.writer.written().is_empty());
    assert!(!dir.join("Movie.2020.mkv.bak").exists());
    assert!(report.to_string().contains("Cancelled"));
}

#[tokio::test]
async fn test_dry_run_lists_without_prompting() {
    let provider = FakeProvider::default().hit("Movie", "pt-BR", "1", Some("2020-01-01"));
    let settings = PipelineSettings {
        dry_run: true,
        ..Default::default()
    };
    let h = harness(
        &["Movie.2020.mkv"],
        provider,
        FakeInspector::default(),
        FakeFetcher::new(true),
        true,
        settings,
    );
    let dir = h.dir.path().to_path_buf();

    let report = h.orchestrator.run(&dir).await.unwrap();

    assert_eq!(report.state, PipelineState::Done);
    assert!(report.is_dry_run());
    assert_eq!(h.asked.load(Ordering::SeqCst), 0);
    assert!(h.writer.written().is_empty());
}

#[tokio::test]
async fn test_unsupported_container_is_skipped() {
    let provider = FakeProvider::default()
        .hit("Old Clip", "pt-BR", "3", Some("2001-01-01"))
        .hit("New Clip", "pt-BR", "4", Some("2022-01-01"));
    let h = simple(&["New.Clip.2022.mp4", "Old.Clip.2001.avi"], provider);
    let dir = h.dir.path().to_path_buf();

    let report = h.orchestrator.run(&dir).await.unwrap();

    assert!(report.files[0].outcome.is_applied());
    assert_eq!(report.files[1].outcome, ProcessingOutcome::UnsupportedFormat);
    assert_eq!(h.writer.written(), vec!["New.Clip.2022.mp4"]);
}

#[tokio::test]
async fn test_details_failure_skips_write() {
    let provider = FakeProvider {
        failing_details: vec!["1".to_string()],
        ..Default::default()
    }
    .hit("Movie", "pt-BR", "1", Some("2020-01-01"));
    let h = simple(&["Movie.2020.mkv"], provider);
    let dir = h.dir.path().to_path_buf();

    let report = h.orchestrator.run(&dir).await.unwrap();

    assert_matches!(&report.files[0].outcome, ProcessingOutcome::MetadataFailed { reason } if reason.contains("details"));
    assert!(h.writer.written().is_empty());
}

#[tokio::test]
async fn test_rerun_skips_backed_up_files() {
    let provider = FakeProvider::default().hit("Movie", "pt-BR", "1", Some("2020-01-01"));
    let h = simple(&["Movie.2020.mkv"], provider);
    let dir = h.dir.path().to_path_buf();

    let first = h.orchestrator.run(&dir).await.unwrap();
    assert_eq!(first.applied(), 1);

    let provider = FakeProvider::default().hit("Movie", "pt-BR", "1", Some("2020-01-01"));
    let again = simple(&[], provider);
    let scan = again.orchestrator.scan(&dir).await.unwrap();
    assert!(scan.is_empty());

    let entries = fs::read_dir(&dir).unwrap().count();
    assert_eq!(entries, 2);
}

#[tokio::test]
async fn test_incomplete_swap_fails_without_subtitle() {
    let provider = FakeProvider::default()
        .hit("Swap One", "pt-BR", "1", Some("2020-01-01"))
        .hit("Swap Two", "pt-BR", "2", Some("2021-01-01"));
    let h = simple(&["Swap.One.2020.mkv", "Swap.Two.2021.mkv"], provider);
    let dir = h.dir.path().to_path_buf();

    let report = h.orchestrator.run(&dir).await.unwrap();

    assert_eq!(report.failed(), 2);
    for file in &report.files {
        assert_matches!(&file.outcome, ProcessingOutcome::MetadataFailed { reason } if reason.contains("swap incomplete"));
        assert_eq!(file.outcome.subtitle(), None);
    }
    assert!(h.fetcher.calls().is_empty());
    // The original stays reachable through its backup
    assert_eq!(fs::read(dir.join("Swap.One.2020.mkv.bak")).unwrap(), b"original");
}

#[tokio::test]
async fn test_cover_download_failure_still_tags() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/found.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"jpeg".to_vec()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing.jpg"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let provider = FakeProvider {
        image_base: server.uri(),
        ..Default::default()
    }
    .hit("With Cover", "pt-BR", "1", Some("2020-01-01"))
    .poster("With Cover", "pt-BR", "/found.jpg")
    .hit("Without Cover", "pt-BR", "2", Some("2021-01-01"))
    .poster("Without Cover", "pt-BR", "/missing.jpg");
    let h = simple(&["With.Cover.2020.mkv", "Without.Cover.2021.mkv"], provider);
    let dir = h.dir.path().to_path_buf();

    let orchestrator = h.orchestrator.with_posters(PosterFetcher::new().unwrap());
    let report = orchestrator.run(&dir).await.unwrap();

    assert_eq!(report.applied(), 2);
    assert_eq!(
        h.writer.written(),
        vec!["With.Cover.2020.mkv", "Without.Cover.2021.mkv"]
    );
    assert_eq!(h.writer.covers(), vec![Some(b"jpeg".to_vec()), None]);
}
