//! ffprobe invocation.

use super::compact::{parse_compact_streams, StreamTag};
use crate::command;
use crate::tools::FFPROBE;
use crate::{Error, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

/// How long one probe may run before it is killed.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Stream category passed to `-select_streams`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Audio,
    Subtitle,
}

impl StreamKind {
    fn selector(self) -> &'static str {
        match self {
            StreamKind::Audio => "a",
            StreamKind::Subtitle => "s",
        }
    }
}

/// Handle on an `ffprobe` executable.
#[derive(Debug, Clone)]
pub struct Ffprobe {
    program: PathBuf,
    timeout: Duration,
}

impl Default for Ffprobe {
    fn default() -> Self {
        Self::new(FFPROBE)
    }
}

impl Ffprobe {
    /// Use the given program (a bare name is looked up on `PATH`).
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Kill probes that run longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// List the streams of one kind with their language tags.
    pub fn streams(&self, path: &Path, kind: StreamKind) -> Result<Vec<StreamTag>> {
        if !path.exists() {
            return Err(Error::file_not_found(path));
        }

        let mut probe = Command::new(&self.program);
        probe
            .args(["-v", "0", "-select_streams", kind.selector()])
            .args(["-show_entries", "stream=index:stream_tags=language"])
            .args(["-of", "compact=p=0:nk=1"])
            .arg(path);
        let output = command::run(&mut probe, FFPROBE, Some(self.timeout))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::tool_failed(FFPROBE, stderr.trim()));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|e| Error::malformed_output(FFPROBE, format!("invalid UTF-8: {e}")))?;

        parse_compact_streams(&stdout)
    }

    /// Language tag of the first audio stream.
    ///
    /// Probe failures are logged and reported as `None`.
    pub fn audio_language(&self, path: &Path) -> Option<String> {
        match self.streams(path, StreamKind::Audio) {
            Ok(streams) => streams.into_iter().next().and_then(|s| s.language),
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(path = %path.display(), error = %e, "Audio language probe failed");
                let _ = e;
                None
            }
        }
    }

    /// Whether any subtitle stream is tagged exactly `language`.
    ///
    /// Probe failures are logged and reported as `false`.
    pub fn has_embedded_subtitle(&self, path: &Path, language: &str) -> bool {
        match self.streams(path, StreamKind::Subtitle) {
            Ok(streams) => streams
                .iter()
                .any(|s| s.language.as_deref() == Some(language)),
            Err(e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(path = %path.display(), error = %e, "Subtitle stream probe failed");
                let _ = e;
                false
            }
        }
    }
}
