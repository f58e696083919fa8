//! Finds, downloads and stores one subtitle next to a video.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use cinetag_common::paths::sidecar_subtitle_path;
use tracing::{info, warn};

use super::provider::{SubtitleProvider, SubtitleQuery};

pub const DEFAULT_SUBTITLE_LANGUAGE: &str = "pt-BR";
const SUBTITLE_EXTENSION: &str = "srt";

/// The subtitle step as the pipeline sees it.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// `false` when no provider is configured.
    fn is_available(&self) -> bool;

    /// Fetch a subtitle for `video`. Every failure is logged and reported as
    /// `false`.
    async fn fetch(&self, video: &Path, title: &str, year: i32) -> bool;
}

/// [`Fetcher`] backed by a [`SubtitleProvider`].
#[derive(Clone)]
pub struct SubtitleFetcher {
    provider: Option<Arc<dyn SubtitleProvider>>,
    language: String,
}

impl SubtitleFetcher {
    pub fn new(provider: Arc<dyn SubtitleProvider>, language: impl Into<String>) -> Self {
        Self {
            provider: Some(provider),
            language: language.into(),
        }
    }

    /// A fetcher that reports itself unavailable.
    pub fn disabled() -> Self {
        Self {
            provider: None,
            language: DEFAULT_SUBTITLE_LANGUAGE.to_string(),
        }
    }

    /// Query for `video`, with season/episode taken from its file name.
    pub fn query_for(&self, video: &Path, title: &str, year: i32) -> SubtitleQuery {
        let episode = video
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| cinetag_parser::parse(name).episode);

        SubtitleQuery {
            title: title.to_string(),
            year,
            season: episode.map(|e| e.season),
            episode: episode.map(|e| e.episode),
            language: self.language.clone(),
        }
    }

    async fn try_fetch(
        &self,
        provider: &dyn SubtitleProvider,
        video: &Path,
        title: &str,
        year: i32,
    ) -> Result<Option<PathBuf>> {
        let query = self.query_for(video, title, year);
        let files = provider.search(&query).await?;

        let Some(file) = files.into_iter().next() else {
            return Ok(None);
        };

        let content = provider.download(&file).await?;
        let target = sidecar_subtitle_path(video, &self.language, SUBTITLE_EXTENSION);
        tokio::fs::write(&target, content)
            .await
            .with_context(|| format!("Failed to write subtitle {}", target.display()))?;

        Ok(Some(target))
    }
}

#[async_trait]
impl Fetcher for SubtitleFetcher {
    fn is_available(&self) -> bool {
        self.provider.is_some()
    }

    async fn fetch(&self, video: &Path, title: &str, year: i32) -> bool {
        let Some(provider) = self.provider.as_deref() else {
            return false;
        };

        let source = provider.name();
        match self.try_fetch(provider, video, title, year).await {
            Ok(Some(target)) => {
                info!(source, video = %video.display(), subtitle = %target.display(), "Subtitle saved");
                true
            }
            Ok(None) => {
                info!(source, title, year, language = %self.language, "No subtitle found");
                false
            }
            Err(e) => {
                warn!(source, video = %video.display(), error = %format!("{e:#}"), "Subtitle download failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subtitles::provider::SubtitleFile;
    use std::sync::Mutex;

    struct StubProvider {
        files: Vec<SubtitleFile>,
        fail_download: bool,
        queries: Mutex<Vec<SubtitleQuery>>,
    }

    #[async_trait]
    impl SubtitleProvider for StubProvider {
        fn name(&self) -> &'static str {
            "stub"
        }

        async fn search(&self, query: &SubtitleQuery) -> Result<Vec<SubtitleFile>> {
            self.queries.lock().unwrap().push(query.clone());
            Ok(self.files.clone())
        }

        async fn download(&self, file: &SubtitleFile) -> Result<Vec<u8>> {
            if self.fail_download {
                anyhow::bail!("quota exceeded");
            }
            Ok(format!("1\n00:00:01,000 --> 00:00:02,000\nfile {}\n", file.file_id).into_bytes())
        }
    }

    fn stub(files: Vec<SubtitleFile>, fail_download: bool) -> Arc<StubProvider> {
        Arc::new(StubProvider {
            files,
            fail_download,
            queries: Mutex::new(Vec::new()),
        })
    }

    fn file(id: u64) -> SubtitleFile {
        SubtitleFile {
            file_id: id,
            file_name: None,
            language: Some("pt-BR".into()),
        }
    }

    #[tokio::test]
    async fn saves_first_file_as_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("Ironheart.S01E02.1080p.mkv");
        let provider = stub(vec![file(7), file(8)], false);
        let fetcher = SubtitleFetcher::new(provider.clone(), "pt-BR");

        assert!(fetcher.fetch(&video, "Ironheart", 2025).await);

        let sidecar = dir.path().join("Ironheart.S01E02.1080p.pt-BR.srt");
        assert!(std::fs::read_to_string(sidecar).unwrap().contains("file 7"));

        let queries = provider.queries.lock().unwrap();
        assert_eq!(queries[0].season, Some(1));
        assert_eq!(queries[0].episode, Some(2));
        assert_eq!(queries[0].year, 2025);
    }

    #[tokio::test]
    async fn no_match_is_false() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("Movie.2020.mkv");
        let fetcher = SubtitleFetcher::new(stub(Vec::new(), false), "pt-BR");

        assert!(!fetcher.fetch(&video, "Movie", 2020).await);
        assert!(!dir.path().join("Movie.2020.pt-BR.srt").exists());
    }

    #[tokio::test]
    async fn provider_error_is_false() {
        let dir = tempfile::tempdir().unwrap();
        let video = dir.path().join("Movie.2020.mkv");
        let fetcher = SubtitleFetcher::new(stub(vec![file(1)], true), "pt-BR");

        assert!(!fetcher.fetch(&video, "Movie", 2020).await);
    }

    #[tokio::test]
    async fn disabled_fetcher() {
        let fetcher = SubtitleFetcher::disabled();
        assert!(!fetcher.is_available());
        assert!(!fetcher.fetch(Path::new("/x/Movie.mkv"), "Movie", 2020).await);
    }

    #[test]
    fn movie_query_has_no_episode() {
        let fetcher = SubtitleFetcher::disabled();
        let query = fetcher.query_for(Path::new("/x/As.Marvels.2023.mkv"), "As Marvels", 2023);
        assert_eq!(query.season, None);
        assert_eq!(query.episode, None);
        assert_eq!(query.language, "pt-BR");
    }
}
